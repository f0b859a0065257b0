//! Surface-syntax rendering of resolved types.
//!
//! Used by diagnostics (cycle reports name field types) and by the
//! same-language emitter. Aliases render by their alias name, which is why
//! the identity is preserved on the node.

use std::fmt;

use crate::types::{Ownership, Type};

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => f.write_str(kind.name()),
            Type::Named {
                name,
                ownership,
                type_args,
                ..
            } => {
                write_ownership_open(f, *ownership)?;
                f.write_str(name)?;
                if !type_args.is_empty() {
                    f.write_str("<")?;
                    write_list(f, type_args, ", ")?;
                    f.write_str(">")?;
                }
                write_ownership_close(f, *ownership)
            }
            Type::Struct { fields, ownership } => {
                write_ownership_open(f, *ownership)?;
                f.write_str("{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                f.write_str(" }")?;
                write_ownership_close(f, *ownership)
            }
            Type::Array { element, ownership } => {
                write_ownership_open(f, *ownership)?;
                write!(f, "Array<{element}>")?;
                write_ownership_close(f, *ownership)
            }
            Type::Map {
                key,
                value,
                ownership,
            } => {
                write_ownership_open(f, *ownership)?;
                write!(f, "Map<{key}, {value}>")?;
                write_ownership_close(f, *ownership)
            }
            Type::Union { variants } => write_list(f, variants, " | "),
            Type::Intersection { members } => write_list(f, members, " & "),
            Type::Nullable { inner } => write!(f, "{inner} | null"),
            Type::Function {
                params,
                return_type,
            } => {
                f.write_str("(")?;
                write_list(f, params, ", ")?;
                write!(f, ") => {return_type}")
            }
            Type::Promise { result } => write!(f, "Promise<{result}>"),
            Type::Alias { name, .. } => f.write_str(name),
        }
    }
}

fn write_ownership_open(f: &mut fmt::Formatter<'_>, ownership: Ownership) -> fmt::Result {
    if let Some(marker) = ownership.marker() {
        write!(f, "{marker}<")?;
    }
    Ok(())
}

fn write_ownership_close(f: &mut fmt::Formatter<'_>, ownership: Ownership) -> fmt::Result {
    if ownership.marker().is_some() {
        f.write_str(">")?;
    }
    Ok(())
}

fn write_list(f: &mut fmt::Formatter<'_>, types: &[Type], sep: &str) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}
