//! The resolved type sum and ownership qualifiers.

/// Ownership qualifier attached to nominal and container types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// `own<T>`: unique owner
    Own,
    /// `share<T>`: shared owner; participates in the DAG requirement
    Share,
    /// `use<T>`: non-owning reference; restricted by the null-safety pass
    Use,
    /// Default for primitives and by-value containers
    #[default]
    Value,
}

impl Ownership {
    /// The surface marker spelling, or `None` for the value default.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            Ownership::Own => Some("own"),
            Ownership::Share => Some("share"),
            Ownership::Use => Some("use"),
            Ownership::Value => None,
        }
    }
}

/// Built-in scalar kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// IEEE double (`number`)
    Number,
    /// 32-bit integer (`int`)
    Integer,
    /// 53-bit safe integer (`int53`)
    Integer53,
    String,
    Boolean,
    Void,
    Never,
}

impl PrimitiveKind {
    /// The surface spelling of this primitive.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Number => "number",
            PrimitiveKind::Integer => "int",
            PrimitiveKind::Integer53 => "int53",
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Void => "void",
            PrimitiveKind::Never => "never",
        }
    }
}

/// Whether a named type refers to a class or an interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamedKind {
    Class,
    Interface,
}

/// A field of an anonymous struct type.
#[derive(Clone, Debug, PartialEq)]
pub struct StructField {
    pub name: String,
    pub ty: Type,
}

/// The resolved type sum.
///
/// Ownership is preserved exactly as written for `Named`, `Struct`, `Array`
/// and `Map`; it is never silently rewritten after resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Primitive(PrimitiveKind),
    Named {
        name: String,
        kind: NamedKind,
        ownership: Ownership,
        type_args: Vec<Type>,
    },
    /// Anonymous record; structurally identified by its sorted signature.
    Struct {
        fields: Vec<StructField>,
        ownership: Ownership,
    },
    Array {
        element: Box<Type>,
        ownership: Ownership,
    },
    Map {
        key: Box<Type>,
        value: Box<Type>,
        ownership: Ownership,
    },
    Union { variants: Vec<Type> },
    Intersection { members: Vec<Type> },
    /// Sugar for a union with `null`
    Nullable { inner: Box<Type> },
    Function {
        params: Vec<Type>,
        return_type: Box<Type>,
    },
    /// Async result carrier
    Promise { result: Box<Type> },
    /// A resolved alias reference: identity kept for diagnostics, resolution
    /// cached for everything else.
    Alias {
        name: String,
        resolved: Box<Type>,
    },
}

impl Type {
    pub const NUMBER: Type = Type::Primitive(PrimitiveKind::Number);
    pub const INT: Type = Type::Primitive(PrimitiveKind::Integer);
    pub const STRING: Type = Type::Primitive(PrimitiveKind::String);
    pub const BOOLEAN: Type = Type::Primitive(PrimitiveKind::Boolean);
    pub const VOID: Type = Type::Primitive(PrimitiveKind::Void);
    pub const NEVER: Type = Type::Primitive(PrimitiveKind::Never);

    /// A class reference with the given ownership and no type arguments.
    pub fn class(name: impl Into<String>, ownership: Ownership) -> Type {
        Type::Named {
            name: name.into(),
            kind: NamedKind::Class,
            ownership,
            type_args: Vec::new(),
        }
    }

    /// An interface reference with the given ownership and no type arguments.
    pub fn interface(name: impl Into<String>, ownership: Ownership) -> Type {
        Type::Named {
            name: name.into(),
            kind: NamedKind::Interface,
            ownership,
            type_args: Vec::new(),
        }
    }

    /// A by-value array of `element`.
    pub fn array(element: Type) -> Type {
        Type::Array {
            element: Box::new(element),
            ownership: Ownership::Value,
        }
    }

    /// A by-value map from `key` to `value`.
    pub fn map(key: Type, value: Type) -> Type {
        Type::Map {
            key: Box::new(key),
            value: Box::new(value),
            ownership: Ownership::Value,
        }
    }

    /// Peel alias carriers down to the underlying type.
    pub fn resolved(&self) -> &Type {
        let mut ty = self;
        while let Type::Alias { resolved, .. } = ty {
            ty = resolved;
        }
        ty
    }

    /// The ownership qualifier of this type, seen through aliases.
    /// Variants with no ownership slot report the value default.
    pub fn ownership(&self) -> Ownership {
        match self.resolved() {
            Type::Named { ownership, .. }
            | Type::Struct { ownership, .. }
            | Type::Array { ownership, .. }
            | Type::Map { ownership, .. } => *ownership,
            _ => Ownership::Value,
        }
    }

    /// Whether this type is `use<T>`-qualified, seen through aliases.
    pub fn is_use(&self) -> bool {
        self.ownership() == Ownership::Use
    }

    /// Whether this resolves to the string primitive.
    pub fn is_string(&self) -> bool {
        matches!(self.resolved(), Type::Primitive(PrimitiveKind::String))
    }

    /// Whether this resolves to `void`.
    pub fn is_void(&self) -> bool {
        matches!(self.resolved(), Type::Primitive(PrimitiveKind::Void))
    }

    /// Whether this resolves to a numeric primitive.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.resolved(),
            Type::Primitive(
                PrimitiveKind::Number | PrimitiveKind::Integer | PrimitiveKind::Integer53
            )
        )
    }

    /// Whether this resolves to `promise(T)`; returns the result type.
    pub fn promise_result(&self) -> Option<&Type> {
        match self.resolved() {
            Type::Promise { result } => Some(result),
            _ => None,
        }
    }

    /// A stable structural signature.
    ///
    /// Struct fields are sorted by name so `{x, y}` and `{y, x}` intern to
    /// the same key. Alias carriers are transparent: the signature is the
    /// signature of the resolved type, which makes re-lowering idempotent.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out);
        out
    }

    fn write_signature(&self, out: &mut String) {
        match self {
            Type::Primitive(kind) => out.push_str(kind.name()),
            Type::Named {
                name,
                ownership,
                type_args,
                ..
            } => {
                if let Some(marker) = ownership.marker() {
                    out.push_str(marker);
                    out.push('<');
                    Self::write_named_ref(name, type_args, out);
                    out.push('>');
                } else {
                    Self::write_named_ref(name, type_args, out);
                }
            }
            Type::Struct { fields, ownership } => {
                if let Some(marker) = ownership.marker() {
                    out.push_str(marker);
                    out.push('<');
                    Self::write_struct_fields(fields, out);
                    out.push('>');
                } else {
                    Self::write_struct_fields(fields, out);
                }
            }
            Type::Array { element, ownership } => {
                if let Some(marker) = ownership.marker() {
                    out.push_str(marker);
                    out.push('<');
                }
                out.push_str("array[");
                element.write_signature(out);
                out.push(']');
                if ownership.marker().is_some() {
                    out.push('>');
                }
            }
            Type::Map {
                key,
                value,
                ownership,
            } => {
                if let Some(marker) = ownership.marker() {
                    out.push_str(marker);
                    out.push('<');
                }
                out.push_str("map[");
                key.write_signature(out);
                out.push(',');
                value.write_signature(out);
                out.push(']');
                if ownership.marker().is_some() {
                    out.push('>');
                }
            }
            Type::Union { variants } => {
                out.push_str("union(");
                for (i, v) in variants.iter().enumerate() {
                    if i > 0 {
                        out.push('|');
                    }
                    v.write_signature(out);
                }
                out.push(')');
            }
            Type::Intersection { members } => {
                out.push_str("isect(");
                for (i, m) in members.iter().enumerate() {
                    if i > 0 {
                        out.push('&');
                    }
                    m.write_signature(out);
                }
                out.push(')');
            }
            Type::Nullable { inner } => {
                out.push_str("opt(");
                inner.write_signature(out);
                out.push(')');
            }
            Type::Function {
                params,
                return_type,
            } => {
                out.push_str("fn(");
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    p.write_signature(out);
                }
                out.push_str(")->");
                return_type.write_signature(out);
            }
            Type::Promise { result } => {
                out.push_str("promise(");
                result.write_signature(out);
                out.push(')');
            }
            Type::Alias { resolved, .. } => resolved.write_signature(out),
        }
    }

    fn write_named_ref(name: &str, type_args: &[Type], out: &mut String) {
        out.push_str(name);
        if !type_args.is_empty() {
            out.push('<');
            for (i, arg) in type_args.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                arg.write_signature(out);
            }
            out.push('>');
        }
    }

    fn write_struct_fields(fields: &[StructField], out: &mut String) {
        let mut sorted: Vec<&StructField> = fields.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        out.push('{');
        for (i, field) in sorted.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&field.name);
            out.push(':');
            field.ty.write_signature(out);
        }
        out.push('}');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_struct(order: &[(&str, Type)]) -> Type {
        Type::Struct {
            fields: order
                .iter()
                .map(|(name, ty)| StructField {
                    name: (*name).to_string(),
                    ty: ty.clone(),
                })
                .collect(),
            ownership: Ownership::Value,
        }
    }

    #[test]
    fn struct_signature_is_field_order_independent() {
        let a = point_struct(&[("x", Type::NUMBER), ("y", Type::NUMBER)]);
        let b = point_struct(&[("y", Type::NUMBER), ("x", Type::NUMBER)]);
        assert_eq!(a.signature(), b.signature());
    }

    #[test]
    fn alias_signature_is_transparent() {
        let aliased = Type::Alias {
            name: "Id".into(),
            resolved: Box::new(Type::STRING),
        };
        assert_eq!(aliased.signature(), Type::STRING.signature());
        assert_eq!(aliased.resolved(), &Type::STRING);
    }

    #[test]
    fn ownership_reads_through_alias() {
        let shared = Type::Alias {
            name: "NodeRef".into(),
            resolved: Box::new(Type::class("Node", Ownership::Share)),
        };
        assert_eq!(shared.ownership(), Ownership::Share);
        assert!(!shared.is_use());
    }

    #[test]
    fn share_marker_shows_in_signature() {
        let ty = Type::class("Node", Ownership::Share);
        assert_eq!(ty.signature(), "share<Node>");
        let plain = Type::class("Node", Ownership::Value);
        assert_eq!(plain.signature(), "Node");
    }

    #[test]
    fn promise_result_projection() {
        let ty = Type::Promise {
            result: Box::new(Type::INT),
        };
        assert_eq!(ty.promise_result(), Some(&Type::INT));
        assert_eq!(Type::INT.promise_result(), None);
    }
}
