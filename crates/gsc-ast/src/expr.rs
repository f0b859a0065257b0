//! Source expressions.

use serde::{Deserialize, Serialize};

use gsc_common::Loc;

use crate::module::Param;
use crate::stmt::Statement;
use crate::types::TypeExpr;

/// Literal values as the parser delivers them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", content = "value")]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
}

/// Binary operators, including the loose-equality forms the validator
/// rejects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
    #[serde(rename = "===")]
    StrictEq,
    #[serde(rename = "!==")]
    StrictNe,
    #[serde(rename = "==")]
    LooseEq,
    #[serde(rename = "!=")]
    LooseNe,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "??")]
    NullishCoalesce,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "<<")]
    Shl,
    #[serde(rename = ">>")]
    Shr,
    #[serde(rename = "instanceof")]
    InstanceOf,
}

/// Unary operators, including the forms the validator rejects (`delete`,
/// `void`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "-")]
    Neg,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "~")]
    BitNot,
    #[serde(rename = "delete")]
    Delete,
    #[serde(rename = "void")]
    Void,
    #[serde(rename = "typeof")]
    TypeOf,
}

/// Assignment operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    AddAssign,
    #[serde(rename = "-=")]
    SubAssign,
    #[serde(rename = "*=")]
    MulAssign,
    #[serde(rename = "/=")]
    DivAssign,
}

/// One property of an object literal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectProperty {
    pub name: String,
    pub value: Expression,
}

/// A lambda body is either a bare expression or a statement block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", content = "body")]
pub enum LambdaBody {
    Expr(Box<Expression>),
    Block(Vec<Statement>),
}

/// One segment of a template literal: either literal text or an
/// interpolated expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", content = "value")]
pub enum TemplatePart {
    Text(String),
    Expr(Box<Expression>),
}

/// Source expressions. Every expression carries the static type the
/// typechecker collaborator computed for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Expression {
    Literal {
        value: Literal,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Identifier {
        name: String,
        #[serde(rename = "type")]
        ty: TypeExpr,
        #[serde(default)]
        loc: Option<Loc>,
    },
    This {
        #[serde(default)]
        loc: Option<Loc>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
        #[serde(rename = "type")]
        ty: TypeExpr,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Conditional {
        cond: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Member {
        object: Box<Expression>,
        member: String,
        /// `obj?.m` sets this
        #[serde(default)]
        optional: bool,
        #[serde(rename = "type")]
        ty: TypeExpr,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
        #[serde(rename = "type")]
        ty: TypeExpr,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expression>,
        value: Box<Expression>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
        #[serde(rename = "type")]
        ty: TypeExpr,
        #[serde(default)]
        loc: Option<Loc>,
    },
    New {
        #[serde(rename = "className")]
        class_name: String,
        args: Vec<Expression>,
        #[serde(default, rename = "typeArgs")]
        type_args: Vec<TypeExpr>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    ArrayLiteral {
        elements: Vec<Expression>,
        #[serde(rename = "type")]
        ty: TypeExpr,
        #[serde(default)]
        loc: Option<Loc>,
    },
    ObjectLiteral {
        properties: Vec<ObjectProperty>,
        #[serde(rename = "type")]
        ty: TypeExpr,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Lambda {
        params: Vec<Param>,
        #[serde(default, rename = "returnType")]
        return_type: Option<TypeExpr>,
        body: LambdaBody,
        /// Arrow lambdas keep the enclosing `this`; function expressions do
        /// not (GS108 cares about the difference).
        #[serde(default, rename = "isArrow")]
        is_arrow: bool,
        #[serde(default)]
        loc: Option<Loc>,
    },
    TemplateLiteral {
        parts: Vec<TemplatePart>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    Await {
        expr: Box<Expression>,
        #[serde(default)]
        loc: Option<Loc>,
    },
    /// `a, b` in expression position. Always a subset violation (GS112);
    /// commas separating arguments or array elements never parse to this.
    Comma {
        exprs: Vec<Expression>,
        #[serde(default)]
        loc: Option<Loc>,
    },
}

impl Expression {
    /// The location of this expression, when the parser recorded one.
    pub fn loc(&self) -> Option<Loc> {
        match self {
            Expression::Literal { loc, .. }
            | Expression::Identifier { loc, .. }
            | Expression::This { loc }
            | Expression::Binary { loc, .. }
            | Expression::Unary { loc, .. }
            | Expression::Conditional { loc, .. }
            | Expression::Member { loc, .. }
            | Expression::Index { loc, .. }
            | Expression::Assign { loc, .. }
            | Expression::Call { loc, .. }
            | Expression::New { loc, .. }
            | Expression::ArrayLiteral { loc, .. }
            | Expression::ObjectLiteral { loc, .. }
            | Expression::Lambda { loc, .. }
            | Expression::TemplateLiteral { loc, .. }
            | Expression::Await { loc, .. }
            | Expression::Comma { loc, .. } => *loc,
        }
    }

    /// Shorthand for an untyped identifier (tests and synthesized nodes).
    pub fn ident(name: impl Into<String>, ty: TypeExpr) -> Self {
        Expression::Identifier {
            name: name.into(),
            ty,
            loc: None,
        }
    }

    /// Whether this expression is a string, number, boolean, null or
    /// undefined literal.
    pub fn is_literal(&self) -> bool {
        matches!(self, Expression::Literal { .. })
    }
}
