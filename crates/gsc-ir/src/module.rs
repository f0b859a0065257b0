//! IR modules and declarations.

use gsc_common::SourceLoc;

use crate::tree::{Expression, Statement};
use crate::types::Type;

/// One imported name, optionally renamed.
#[derive(Clone, Debug, PartialEq)]
pub struct Import {
    /// Import path as written in the source (`"./util"`)
    pub from: String,
    /// `(name, alias)` pairs; alias is `None` when not renamed
    pub names: Vec<(String, Option<String>)>,
}

impl Import {
    /// The basename of the imported module, used for include/import
    /// rewriting by the emitters.
    pub fn basename(&self) -> &str {
        let file = self
            .from
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.from.as_str());
        file.split_once('.').map_or(file, |(stem, _)| stem)
    }
}

/// A typed parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

/// A function, either module-level or nested inside another body.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Vec<Statement>,
    pub is_async: bool,
    /// Set by the peephole pass when a nested function calls itself; the
    /// emitters render it as a self-referential callable.
    pub is_recursive: bool,
    pub loc: Option<SourceLoc>,
}

/// A class field.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub is_readonly: bool,
    pub initializer: Option<Expression>,
    pub loc: Option<SourceLoc>,
}

/// A class constructor.
#[derive(Clone, Debug, PartialEq)]
pub struct Constructor {
    pub params: Vec<Param>,
    pub body: Vec<Statement>,
    pub loc: Option<SourceLoc>,
}

/// A class method.
#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub is_static: bool,
    pub is_async: bool,
    pub body: Vec<Statement>,
    pub loc: Option<SourceLoc>,
}

/// A class declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Class {
    pub name: String,
    pub type_params: Vec<String>,
    pub extends: Option<String>,
    pub implements: Vec<String>,
    pub fields: Vec<Field>,
    pub constructor: Option<Constructor>,
    pub methods: Vec<Method>,
    pub loc: Option<SourceLoc>,
}

/// An interface property.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: Type,
    pub loc: Option<SourceLoc>,
}

/// An interface method signature.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceMethod {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub loc: Option<SourceLoc>,
}

/// An interface declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Interface {
    pub name: String,
    pub type_params: Vec<String>,
    pub extends: Vec<String>,
    pub properties: Vec<Property>,
    pub methods: Vec<InterfaceMethod>,
    pub loc: Option<SourceLoc>,
}

/// A type alias, kept for the same-language emitter; all uses were resolved
/// during lowering.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeAlias {
    pub name: String,
    pub ty: Type,
    pub loc: Option<SourceLoc>,
}

/// A module-level constant.
#[derive(Clone, Debug, PartialEq)]
pub struct Const {
    pub name: String,
    pub ty: Type,
    pub initializer: Expression,
    pub loc: Option<SourceLoc>,
}

/// Module-level declarations.
#[derive(Clone, Debug, PartialEq)]
pub enum Declaration {
    Function(Function),
    Class(Class),
    Interface(Interface),
    TypeAlias(TypeAlias),
    Const(Const),
}

impl Declaration {
    /// The declared name.
    pub fn name(&self) -> &str {
        match self {
            Declaration::Function(d) => &d.name,
            Declaration::Class(d) => &d.name,
            Declaration::Interface(d) => &d.name,
            Declaration::TypeAlias(d) => &d.name,
            Declaration::Const(d) => &d.name,
        }
    }
}

/// A lowered module. Created once per source file by the lowerer and
/// immutable afterwards, apart from in-place peephole rewrites.
#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    /// Basename without extension (`"foo"` for `dir/foo.gs`)
    pub name: String,
    /// Source path as given to the compiler
    pub path: String,
    pub imports: Vec<Import>,
    pub declarations: Vec<Declaration>,
    /// Ordered top-level statements; the module that owns a non-empty list
    /// is the program entry point.
    pub init_statements: Vec<Statement>,
}

impl Module {
    /// Iterate declared classes.
    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Class(class) => Some(class),
            _ => None,
        })
    }

    /// Iterate declared interfaces.
    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Interface(iface) => Some(iface),
            _ => None,
        })
    }

    /// Iterate declared functions.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Function(func) => Some(func),
            _ => None,
        })
    }

    /// Whether this module owns the program entry point.
    pub fn has_entry_point(&self) -> bool {
        !self.init_statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_basename_rewriting() {
        let import = Import {
            from: "./lib/util.gs".into(),
            names: vec![("helper".into(), None)],
        };
        assert_eq!(import.basename(), "util");
        let bare = Import {
            from: "other".into(),
            names: Vec::new(),
        };
        assert_eq!(bare.basename(), "other");
    }
}
