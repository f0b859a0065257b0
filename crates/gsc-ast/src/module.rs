//! Modules and declarations.

use serde::{Deserialize, Serialize};

use gsc_common::Loc;

use crate::expr::Expression;
use crate::stmt::Statement;
use crate::types::TypeExpr;

/// One imported name, optionally renamed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImportName {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
}

/// `import { a, b as c } from "./other"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Import {
    pub from: String,
    pub names: Vec<ImportName>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A function or method parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
}

/// A free function declaration (also used for nested functions).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default, rename = "typeParams")]
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    #[serde(rename = "returnType")]
    pub return_type: TypeExpr,
    pub body: Vec<Statement>,
    #[serde(default, rename = "isAsync")]
    pub is_async: bool,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A class field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default, rename = "isReadonly")]
    pub is_readonly: bool,
    #[serde(default)]
    pub initializer: Option<Expression>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A class constructor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    pub params: Vec<Param>,
    pub body: Vec<Statement>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A class method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    #[serde(rename = "returnType")]
    pub return_type: TypeExpr,
    #[serde(default, rename = "isStatic")]
    pub is_static: bool,
    #[serde(default, rename = "isAsync")]
    pub is_async: bool,
    pub body: Vec<Statement>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A class declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default, rename = "typeParams")]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub constructor: Option<ConstructorDecl>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// An interface property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// An interface method signature.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterfaceMethod {
    pub name: String,
    pub params: Vec<Param>,
    #[serde(rename = "returnType")]
    pub return_type: TypeExpr,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// An interface declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default, rename = "typeParams")]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDecl>,
    #[serde(default)]
    pub methods: Vec<InterfaceMethod>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A type alias declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeAliasDecl {
    pub name: String,
    #[serde(default, rename = "typeParams")]
    pub type_params: Vec<String>,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// A module-level constant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConstDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    pub initializer: Expression,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// Module-level declarations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Declaration {
    Function(FunctionDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Const(ConstDecl),
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

/// One top-level item: either a declaration or a loose statement. Loose
/// statements accumulate, in order, into the module's init statements
/// during lowering and become the program entry point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    Declaration(Declaration),
    Statement(Statement),
}

/// A named source unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Path of the source file as given to the compiler
    pub path: String,
    #[serde(default)]
    pub imports: Vec<Import>,
    pub items: Vec<Item>,
}

impl Module {
    /// The module basename without extension (`"dir/foo.gs"` -> `"foo"`).
    pub fn basename(&self) -> &str {
        let file = self
            .path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.path.as_str());
        file.split_once('.').map_or(file, |(stem, _)| stem)
    }

    /// Iterate the declarations in source order.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.items.iter().filter_map(|item| match item {
            Item::Declaration(decl) => Some(decl),
            Item::Statement(_) => None,
        })
    }
}
