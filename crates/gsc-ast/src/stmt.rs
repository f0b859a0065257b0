//! Source statements.
//!
//! The statement sum still carries the constructs the subset forbids
//! (`with`, `for...in`, `var`); the validator reports them and the lowerer
//! refuses them as internal errors if validation was skipped.

use serde::{Deserialize, Serialize};

use gsc_common::Loc;

use crate::expr::Expression;
use crate::module::FunctionDecl;
use crate::types::TypeExpr;

/// The declaration keyword of a variable statement. `var` is outside the
/// subset (GS105).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKeyword {
    Let,
    Const,
    Var,
}

/// A `catch` clause.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub name: String,
    pub body: Vec<Statement>,
}

/// One `case` (or `default`, when `test` is absent) of a switch statement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    #[serde(default)]
    pub test: Option<Expression>,
    pub body: Vec<Statement>,
    #[serde(default)]
    pub loc: Option<Loc>,
}

/// Source statements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Statement {
    VariableDeclaration {
        keyword: DeclKeyword,
        name: String,
        #[serde(default, rename = "type")]
        declared_type: Option<TypeExpr>,
        #[serde(default)]
        initializer: Option<Expression>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Expression {
        expr: Expression,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Return {
        #[serde(default)]
        value: Option<Expression>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Throw {
        expr: Expression,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Try {
        body: Vec<Statement>,
        #[serde(default)]
        catch: Option<CatchClause>,
        #[serde(default)]
        finally: Option<Vec<Statement>>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    If {
        cond: Expression,
        then: Vec<Statement>,
        #[serde(default)]
        otherwise: Option<Vec<Statement>>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    While {
        cond: Expression,
        body: Vec<Statement>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    For {
        #[serde(default)]
        init: Option<Box<Statement>>,
        #[serde(default)]
        cond: Option<Expression>,
        #[serde(default)]
        update: Option<Expression>,
        body: Vec<Statement>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    ForOf {
        variable: String,
        #[serde(default, rename = "variableType")]
        variable_type: Option<TypeExpr>,
        iterable: Expression,
        body: Vec<Statement>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    /// Member-key iteration. Outside the subset (GS104).
    ForIn {
        variable: String,
        object: Expression,
        body: Vec<Statement>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Switch {
        subject: Expression,
        cases: Vec<SwitchCase>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Break {
        #[serde(default)]
        loc: Option<Loc>,
    },
    Continue {
        #[serde(default)]
        loc: Option<Loc>,
    },
    Block {
        statements: Vec<Statement>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    /// A nested function declaration.
    Function(FunctionDecl),
    /// `with (obj) { ... }`. Outside the subset (GS101).
    With {
        object: Expression,
        body: Vec<Statement>,
        #[serde(default)]
        loc: Option<Loc>,
    },
}

impl Statement {
    /// The location of this statement, when the parser recorded one.
    pub fn loc(&self) -> Option<Loc> {
        match self {
            Statement::VariableDeclaration { loc, .. }
            | Statement::Expression { loc, .. }
            | Statement::Return { loc, .. }
            | Statement::Throw { loc, .. }
            | Statement::Try { loc, .. }
            | Statement::If { loc, .. }
            | Statement::While { loc, .. }
            | Statement::For { loc, .. }
            | Statement::ForOf { loc, .. }
            | Statement::ForIn { loc, .. }
            | Statement::Switch { loc, .. }
            | Statement::Break { loc }
            | Statement::Continue { loc }
            | Statement::Block { loc, .. }
            | Statement::With { loc, .. } => *loc,
            Statement::Function(decl) => decl.loc,
        }
    }
}
