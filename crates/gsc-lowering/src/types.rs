//! Surface type resolution.
//!
//! Interprets the parser's type syntax into the resolved [`ir::Type`] sum.
//! Ownership comes from the `own<...>` / `share<...>` / `use<...>` markers;
//! everything else defaults to value semantics, except class and interface
//! references, which default to `Share`. That default lives here and only
//! here (see `resolve_named`); no other site assigns one.

use gsc_ast as ast;
use gsc_ast::SymbolKind;
use gsc_common::SourceLoc;
use gsc_ir::{NamedKind, Ownership, StructField, Type};

use crate::{Lowerer, LoweringError, Result};

impl<'a> Lowerer<'a> {
    /// Resolve surface type syntax to its IR type.
    pub(crate) fn resolve_type(&mut self, ty: &ast::TypeExpr) -> Result<Type> {
        match ty {
            ast::TypeExpr::Named {
                name,
                type_args,
                loc,
            } => self.resolve_named(name, type_args, self.source_loc(*loc)),
            ast::TypeExpr::Object { fields, .. } => {
                let fields = fields
                    .iter()
                    .map(|field| {
                        Ok(StructField {
                            name: field.name.clone(),
                            ty: self.resolve_type(&field.ty)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Type::Struct {
                    fields,
                    ownership: Ownership::Value,
                })
            }
            ast::TypeExpr::Union { variants } => self.resolve_union(variants),
            ast::TypeExpr::Intersection { members } => {
                let members = members
                    .iter()
                    .map(|member| self.resolve_type(member))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Type::Intersection { members })
            }
            ast::TypeExpr::Function {
                params,
                return_type,
            } => {
                let params = params
                    .iter()
                    .map(|param| self.resolve_type(param))
                    .collect::<Result<Vec<_>>>()?;
                let return_type = Box::new(self.resolve_type(return_type)?);
                Ok(Type::Function {
                    params,
                    return_type,
                })
            }
            ast::TypeExpr::Any { loc } => Err(LoweringError::new(
                "the 'any' type cannot be lowered",
                self.source_loc(*loc),
            )),
        }
    }

    fn resolve_named(
        &mut self,
        name: &str,
        type_args: &[ast::TypeExpr],
        loc: Option<SourceLoc>,
    ) -> Result<Type> {
        // Primitives
        let primitive = match name {
            "number" => Some(Type::NUMBER),
            "int" => Some(Type::INT),
            "int53" => Some(Type::Primitive(gsc_ir::PrimitiveKind::Integer53)),
            "string" => Some(Type::STRING),
            "boolean" => Some(Type::BOOLEAN),
            "void" => Some(Type::VOID),
            "never" => Some(Type::NEVER),
            _ => None,
        };
        if let Some(ty) = primitive {
            if !type_args.is_empty() {
                return Err(LoweringError::new(
                    format!("primitive type '{name}' takes no type arguments"),
                    loc,
                ));
            }
            return Ok(ty);
        }

        // Ownership markers wrap the type they qualify
        if let Some(ownership) = match name {
            "own" => Some(Ownership::Own),
            "share" => Some(Ownership::Share),
            "use" => Some(Ownership::Use),
            _ => None,
        } {
            let [inner] = type_args else {
                return Err(LoweringError::new(
                    format!("'{name}<...>' takes exactly one type argument"),
                    loc,
                ));
            };
            let inner = self.resolve_type(inner)?;
            return self.apply_ownership(inner, ownership, loc);
        }

        // Built-in containers
        match name {
            "Array" => {
                let [element] = type_args else {
                    return Err(LoweringError::new("'Array<...>' takes one type argument", loc));
                };
                return Ok(Type::Array {
                    element: Box::new(self.resolve_type(element)?),
                    ownership: Ownership::Value,
                });
            }
            "Map" => {
                let [key, value] = type_args else {
                    return Err(LoweringError::new("'Map<...>' takes two type arguments", loc));
                };
                return Ok(Type::Map {
                    key: Box::new(self.resolve_type(key)?),
                    value: Box::new(self.resolve_type(value)?),
                    ownership: Ownership::Value,
                });
            }
            "Promise" => {
                let [result] = type_args else {
                    return Err(LoweringError::new(
                        "'Promise<...>' takes one type argument",
                        loc,
                    ));
                };
                return Ok(Type::Promise {
                    result: Box::new(self.resolve_type(result)?),
                });
            }
            _ => {}
        }

        // Type parameters of the enclosing declaration resolve to bare
        // value-typed names.
        if self.type_params.iter().any(|p| p == name) {
            return Ok(Type::Named {
                name: name.to_string(),
                kind: NamedKind::Class,
                ownership: Ownership::Value,
                type_args: Vec::new(),
            });
        }

        // Declared names via the symbol oracle
        match self.symbols.kind_of(name) {
            Some(kind @ (SymbolKind::Class | SymbolKind::Interface)) => {
                let kind = match kind {
                    SymbolKind::Class => NamedKind::Class,
                    _ => NamedKind::Interface,
                };
                let type_args = type_args
                    .iter()
                    .map(|arg| self.resolve_type(arg))
                    .collect::<Result<Vec<_>>>()?;
                // Unannotated class and interface references default to
                // shared ownership.
                Ok(Type::Named {
                    name: name.to_string(),
                    kind,
                    ownership: Ownership::Share,
                    type_args,
                })
            }
            Some(SymbolKind::TypeAlias) => {
                let resolved = self.resolve_alias(name, loc.clone())?;
                Ok(Type::Alias {
                    name: name.to_string(),
                    resolved: Box::new(resolved),
                })
            }
            _ => Err(LoweringError::new(
                format!("cannot resolve type name '{name}'"),
                loc,
            )),
        }
    }

    /// Resolve an alias by name through the module-scoped table, caching the
    /// result. Alias cycles are internal errors.
    pub(crate) fn resolve_alias(&mut self, name: &str, loc: Option<SourceLoc>) -> Result<Type> {
        if let Some(cached) = self.alias_cache.get(name) {
            return Ok(cached.clone());
        }
        if self.alias_in_progress.iter().any(|n| n == name) {
            return Err(LoweringError::new(
                format!("type alias '{name}' is cyclic"),
                loc,
            ));
        }
        let Some(syntax) = self.alias_syntax.get(name).copied() else {
            return Err(LoweringError::new(
                format!("cannot resolve type alias '{name}'"),
                loc,
            ));
        };
        self.alias_in_progress.push(name.to_string());
        let resolved = self.resolve_type(syntax);
        self.alias_in_progress.pop();
        let resolved = resolved?;
        self.alias_cache.insert(name.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// Attach an ownership qualifier to a resolved type. Markers are only
    /// meaningful on nominal types, structs, and containers; anything else
    /// is an internal error. Marking an alias re-qualifies the aliased type.
    fn apply_ownership(
        &self,
        ty: Type,
        ownership: Ownership,
        loc: Option<SourceLoc>,
    ) -> Result<Type> {
        match ty {
            Type::Named {
                name,
                kind,
                type_args,
                ..
            } => Ok(Type::Named {
                name,
                kind,
                ownership,
                type_args,
            }),
            Type::Struct { fields, .. } => Ok(Type::Struct { fields, ownership }),
            Type::Array { element, .. } => Ok(Type::Array { element, ownership }),
            Type::Map { key, value, .. } => Ok(Type::Map {
                key,
                value,
                ownership,
            }),
            Type::Alias { resolved, .. } => self.apply_ownership(*resolved, ownership, loc),
            other => Err(LoweringError::new(
                format!(
                    "ownership marker '{}' cannot qualify type '{other}'",
                    ownership.marker().unwrap_or("value")
                ),
                loc,
            )),
        }
    }

    /// Resolve a union, folding `null`/`undefined` variants into the
    /// nullable sugar.
    fn resolve_union(&mut self, variants: &[ast::TypeExpr]) -> Result<Type> {
        let mut nullish = false;
        let mut resolved = Vec::new();
        for variant in variants {
            if let ast::TypeExpr::Named { name, .. } = variant {
                if name == "null" || name == "undefined" {
                    nullish = true;
                    continue;
                }
            }
            resolved.push(self.resolve_type(variant)?);
        }
        let inner = match resolved.len() {
            0 => {
                return Err(LoweringError::new(
                    "a union cannot consist solely of null/undefined",
                    None,
                ));
            }
            1 => resolved.remove(0),
            _ => Type::Union { variants: resolved },
        };
        if nullish {
            Ok(Type::Nullable {
                inner: Box::new(inner),
            })
        } else {
            Ok(inner)
        }
    }
}
