//! IR type -> C++ type text.
//!
//! Pointer shape by ownership:
//! - gc mode: every class/interface reference is a raw collector-traced
//!   pointer, values stay values.
//! - ownership mode: `own` -> `gs::Own<T>`, `share` -> `gs::Share<T>`,
//!   `use` -> `gs::Use<T>`, default -> value.
//!
//! Containers map to the runtime's value types, `Promise<T>` to the
//! coroutine task, unions to `std::variant`, nullable to `std::optional`.

use gsc_common::MemoryMode;
use gsc_ir::{Ownership, PrimitiveKind, Type};

use crate::sanitize;
use crate::EmitError;

use super::CppEmitter;

impl CppEmitter {
    pub(crate) fn cpp_type(&mut self, ty: &Type) -> Result<String, EmitError> {
        match ty {
            Type::Primitive(kind) => Ok(primitive(*kind).to_string()),
            Type::Named {
                name,
                ownership,
                type_args,
                ..
            } => {
                let mut base = sanitize::identifier(name);
                if !type_args.is_empty() {
                    let args: Vec<String> = type_args
                        .iter()
                        .map(|arg| self.cpp_type(arg))
                        .collect::<Result<_, _>>()?;
                    base = format!("{base}<{}>", args.join(", "));
                }
                Ok(self.shaped(base, *ownership))
            }
            Type::Struct { fields, ownership } => {
                // Deep-first: nested anonymous structs intern before the
                // enclosing one so emitted definitions are ordered.
                for field in fields {
                    self.cpp_type(&field.ty)?;
                }
                let base = self.registry.intern(fields);
                Ok(self.shaped(base, *ownership))
            }
            Type::Array { element, ownership } => {
                let base = format!("gs::Array<{}>", self.cpp_type(element)?);
                Ok(self.shaped(base, *ownership))
            }
            Type::Map {
                key,
                value,
                ownership,
            } => {
                let base = format!(
                    "gs::Map<{}, {}>",
                    self.cpp_type(key)?,
                    self.cpp_type(value)?
                );
                Ok(self.shaped(base, *ownership))
            }
            Type::Union { variants } => {
                let parts: Vec<String> = variants
                    .iter()
                    .map(|variant| self.cpp_type(variant))
                    .collect::<Result<_, _>>()?;
                Ok(format!("std::variant<{}>", parts.join(", ")))
            }
            Type::Intersection { members } => {
                // Intersections of object shapes merge into one anonymous
                // struct; anything else has no C++ rendering.
                let mut merged: Vec<gsc_ir::StructField> = Vec::new();
                for member in members {
                    match member.resolved() {
                        Type::Struct { fields, .. } => {
                            for field in fields {
                                if !merged.iter().any(|m| m.name == field.name) {
                                    merged.push(field.clone());
                                }
                            }
                        }
                        other => {
                            return Err(EmitError::new(
                                format!("cannot intersect non-object type '{other}'"),
                                None,
                            ));
                        }
                    }
                }
                for field in &merged {
                    self.cpp_type(&field.ty)?;
                }
                Ok(self.registry.intern(&merged))
            }
            Type::Nullable { inner } => Ok(format!("std::optional<{}>", self.cpp_type(inner)?)),
            Type::Function {
                params,
                return_type,
            } => {
                let params: Vec<String> = params
                    .iter()
                    .map(|param| self.cpp_type(param))
                    .collect::<Result<_, _>>()?;
                Ok(format!(
                    "std::function<{}({})>",
                    self.cpp_type(return_type)?,
                    params.join(", ")
                ))
            }
            Type::Promise { result } => Ok(format!("gs::Task<{}>", self.cpp_type(result)?)),
            Type::Alias { name, .. } => Ok(sanitize::identifier(name)),
        }
    }

    /// Wrap a record-ish base type in the mode's pointer shape.
    fn shaped(&self, base: String, ownership: Ownership) -> String {
        match self.mode {
            MemoryMode::Gc => match ownership {
                Ownership::Value => base,
                // The collector owns everything; all qualifiers flatten to
                // a traced raw pointer.
                Ownership::Own | Ownership::Share | Ownership::Use => format!("{base}*"),
            },
            MemoryMode::Ownership => match ownership {
                Ownership::Own => format!("gs::Own<{base}>"),
                Ownership::Share => format!("gs::Share<{base}>"),
                Ownership::Use => format!("gs::Use<{base}>"),
                Ownership::Value => base,
            },
        }
    }

    /// `.` or `->` for a member access on a value of this type.
    pub(crate) fn member_operator(&self, ty: &Type) -> &'static str {
        match ty.resolved() {
            Type::Named { ownership, .. } | Type::Struct { ownership, .. } => {
                match (self.mode, ownership) {
                    (_, Ownership::Value) => ".",
                    _ => "->",
                }
            }
            Type::Array { ownership, .. } | Type::Map { ownership, .. } => {
                match ownership {
                    Ownership::Value => ".",
                    _ => "->",
                }
            }
            Type::Nullable { .. } => "->",
            _ => ".",
        }
    }
}

fn primitive(kind: PrimitiveKind) -> &'static str {
    match kind {
        PrimitiveKind::Number => "double",
        PrimitiveKind::Integer => "int32_t",
        PrimitiveKind::Integer53 => "int64_t",
        PrimitiveKind::String => "gs::String",
        PrimitiveKind::Boolean => "bool",
        PrimitiveKind::Void => "void",
        PrimitiveKind::Never => "void",
    }
}
