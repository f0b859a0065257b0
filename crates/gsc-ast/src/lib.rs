//! Source AST for the gsc GoodScript compiler.
//!
//! The parser and typechecker of the source toolchain are collaborators, not
//! part of this compiler: they hand us a fully-typed AST serialized as JSON
//! (`*.ast.json`), plus enough symbol information to classify names. This
//! crate is that contract:
//! - the AST sums (`Declaration`, `Statement`, `Expression`, `TypeExpr`)
//! - the `Module` unit
//! - the `SymbolOracle` trait and its whole-program table implementation
//!
//! The AST deliberately still contains constructs *outside* the GoodScript
//! subset (`with`, `for...in`, `var`, comma expressions, ...) so the subset
//! validator has something to reject.

pub mod expr;
pub mod module;
pub mod stmt;
pub mod symbols;
pub mod types;

pub use expr::{
    AssignOp, BinaryOp, Expression, LambdaBody, Literal, ObjectProperty, TemplatePart, UnaryOp,
};
pub use module::{
    ClassDecl, ConstDecl, ConstructorDecl, Declaration, FieldDecl, FunctionDecl, Import,
    ImportName, InterfaceDecl, InterfaceMethod, Item, MethodDecl, Module, Param, PropertyDecl,
    TypeAliasDecl,
};
pub use stmt::{CatchClause, DeclKeyword, Statement, SwitchCase};
pub use symbols::{ProgramSymbols, SymbolKind, SymbolOracle};
pub use types::{ObjectTypeField, TypeExpr};

/// Deserialize a module from the parser collaborator's JSON form.
pub fn module_from_json(text: &str) -> serde_json::Result<Module> {
    serde_json::from_str(text)
}
