//! Surface type syntax.
//!
//! Ownership qualifiers (`own<T>`, `share<T>`, `use<T>`), containers
//! (`Array<T>`, `Map<K, V>`, `Promise<T>`) and primitives all arrive as
//! plain named type references; the lowerer interprets the well-known names.
//! Only shapes the reference syntax cannot express get their own variants.

use serde::{Deserialize, Serialize};

use gsc_common::Loc;

/// A field of an anonymous object type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectTypeField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

/// Source-level type syntax, as the parser hands it over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeExpr {
    /// A type reference: `Point`, `share<Node>`, `Array<number>`, `string`,
    /// `null`. Primitives, ownership markers, containers, aliases, classes
    /// and interfaces are all spelled this way.
    Named {
        name: String,
        #[serde(default, rename = "typeArgs")]
        type_args: Vec<TypeExpr>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    /// An anonymous object type: `{ x: number, y: number }`.
    Object {
        fields: Vec<ObjectTypeField>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    /// `A | B | ...`
    Union { variants: Vec<TypeExpr> },
    /// `A & B & ...`
    Intersection { members: Vec<TypeExpr> },
    /// `(a: T, b: U) => R`, erased to parameter types and a result.
    Function {
        params: Vec<TypeExpr>,
        #[serde(rename = "returnType")]
        return_type: Box<TypeExpr>,
    },
    /// The unknown-dynamic type. Rejected by the validator (GS109).
    Any {
        #[serde(default)]
        loc: Option<Loc>,
    },
}

impl TypeExpr {
    /// Shorthand for a bare named type with no arguments.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            type_args: Vec::new(),
            loc: None,
        }
    }

    /// Shorthand for a one-argument named type (`share<T>`, `Array<T>`, ...).
    pub fn generic(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            type_args: args,
            loc: None,
        }
    }

    /// The location of this type syntax, when the parser recorded one.
    pub fn loc(&self) -> Option<Loc> {
        match self {
            TypeExpr::Named { loc, .. } | TypeExpr::Object { loc, .. } | TypeExpr::Any { loc } => {
                *loc
            }
            TypeExpr::Union { variants } => variants.first().and_then(TypeExpr::loc),
            TypeExpr::Intersection { members } => members.first().and_then(TypeExpr::loc),
            TypeExpr::Function { params, return_type } => params
                .first()
                .and_then(TypeExpr::loc)
                .or_else(|| return_type.loc()),
        }
    }

    /// Whether any `Any` node occurs inside this type syntax.
    pub fn contains_any(&self) -> bool {
        match self {
            TypeExpr::Any { .. } => true,
            TypeExpr::Named { type_args, .. } => type_args.iter().any(TypeExpr::contains_any),
            TypeExpr::Object { fields, .. } => fields.iter().any(|f| f.ty.contains_any()),
            TypeExpr::Union { variants } => variants.iter().any(TypeExpr::contains_any),
            TypeExpr::Intersection { members } => members.iter().any(TypeExpr::contains_any),
            TypeExpr::Function { params, return_type } => {
                params.iter().any(TypeExpr::contains_any) || return_type.contains_any()
            }
        }
    }
}
