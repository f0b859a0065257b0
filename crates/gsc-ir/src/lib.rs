//! Typed, ownership-annotated intermediate representation.
//!
//! The IR is a forest: each function body is a tree of statements and
//! expressions, and every expression carries its resolved [`Type`]. Nodes
//! are created by the lowerer, mutated only by the peephole pass, and
//! consumed by emitters. All sums are plain enums matched exhaustively;
//! adding a variant breaks every match site on purpose.

pub mod display;
pub mod module;
pub mod tree;
pub mod types;

pub use module::{
    Class, Const, Constructor, Declaration, Field, Function, Import, Interface, InterfaceMethod,
    Method, Module, Param, Property, TypeAlias,
};
pub use tree::{BinOp, Capture, CatchClause, ExprKind, Expression, Literal, Statement, UnOp};
pub use types::{NamedKind, Ownership, PrimitiveKind, StructField, Type};
