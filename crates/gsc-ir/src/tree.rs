//! IR statements and expressions.
//!
//! Unlike the source AST, everything here is typed: each [`Expression`]
//! carries its resolved [`Type`]. The subset-only constructs (`with`,
//! `for...in`, loose equality, ...) have no representation at all; switch
//! statements were lowered into if/else chains on the way in.

use gsc_common::SourceLoc;

use crate::module::{Function, Param};
use crate::types::Type;

/// Literal values.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
}

/// Binary operators surviving lowering (strict comparisons only).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    /// `===`
    Eq,
    /// `!==`
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    NullishCoalesce,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    InstanceOf,
}

impl BinOp {
    /// The surface spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Eq => "===",
            BinOp::Ne => "!==",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::NullishCoalesce => "??",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::InstanceOf => "instanceof",
        }
    }
}

/// Unary operators surviving lowering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Plus,
    Not,
    BitNot,
    TypeOf,
}

impl UnOp {
    /// The surface spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Plus => "+",
            UnOp::Not => "!",
            UnOp::BitNot => "~",
            UnOp::TypeOf => "typeof",
        }
    }
}

/// A free variable captured by a lambda, recorded with its type at the
/// capture site.
#[derive(Clone, Debug, PartialEq)]
pub struct Capture {
    pub name: String,
    pub ty: Type,
}

/// A typed IR expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Expression {
    pub kind: ExprKind,
    pub ty: Type,
    pub loc: Option<SourceLoc>,
}

impl Expression {
    /// Construct an expression without a source location.
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Expression {
            kind,
            ty,
            loc: None,
        }
    }

    /// Construct an expression with a source location.
    pub fn at(kind: ExprKind, ty: Type, loc: Option<SourceLoc>) -> Self {
        Expression { kind, ty, loc }
    }

    /// Shorthand for an identifier expression.
    pub fn ident(name: impl Into<String>, ty: Type) -> Self {
        Expression::new(ExprKind::Identifier(name.into()), ty)
    }

    /// Whether this is an identifier, and its name if so.
    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

/// Expression shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Identifier(String),
    This,
    Binary {
        op: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expression>,
    },
    Conditional {
        cond: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
    },
    Member {
        object: Box<Expression>,
        member: String,
        optional: bool,
    },
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
    },
    Assign {
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    /// A statement-level call of an async function: the emitter inserts the
    /// runtime's blocking wait around the inner call.
    AwaitSync(Box<Expression>),
    New {
        class_name: String,
        args: Vec<Expression>,
        type_args: Vec<Type>,
    },
    ArrayLiteral(Vec<Expression>),
    /// An object literal; its type is an interned anonymous struct.
    StructLiteral {
        fields: Vec<(String, Expression)>,
    },
    Lambda {
        params: Vec<Param>,
        captures: Vec<Capture>,
        body: Vec<Statement>,
        return_type: Type,
    },
    Await(Box<Expression>),
    /// Peephole-introduced: a string concatenation chain of three or more
    /// parts, to be emitted through the runtime's string builder.
    StringBuilder { parts: Vec<Expression> },
}

/// A `catch` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    pub name: String,
    pub body: Vec<Statement>,
}

/// IR statements.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    VariableDeclaration {
        name: String,
        ty: Type,
        mutable: bool,
        initializer: Option<Expression>,
        loc: Option<SourceLoc>,
    },
    Assignment {
        target: Expression,
        value: Expression,
        loc: Option<SourceLoc>,
    },
    Expression {
        expr: Expression,
        loc: Option<SourceLoc>,
    },
    Return {
        value: Option<Expression>,
        loc: Option<SourceLoc>,
    },
    Throw {
        expr: Expression,
        loc: Option<SourceLoc>,
    },
    Try {
        body: Vec<Statement>,
        catch: Option<CatchClause>,
        finally: Option<Vec<Statement>>,
        loc: Option<SourceLoc>,
    },
    If {
        cond: Expression,
        then: Vec<Statement>,
        otherwise: Option<Vec<Statement>>,
        loc: Option<SourceLoc>,
    },
    While {
        cond: Expression,
        body: Vec<Statement>,
        loc: Option<SourceLoc>,
    },
    For {
        init: Option<Box<Statement>>,
        cond: Option<Expression>,
        update: Option<Expression>,
        body: Vec<Statement>,
        loc: Option<SourceLoc>,
    },
    ForOf {
        variable: String,
        variable_ty: Type,
        iterable: Expression,
        body: Vec<Statement>,
        loc: Option<SourceLoc>,
    },
    Break { loc: Option<SourceLoc> },
    Continue { loc: Option<SourceLoc> },
    Block {
        statements: Vec<Statement>,
        loc: Option<SourceLoc>,
    },
    /// A nested function declaration.
    Function(Box<Function>),
    /// Peephole-introduced: declare a string builder local.
    BuilderDecl {
        name: String,
        loc: Option<SourceLoc>,
    },
    /// Peephole-introduced: append a part to a string builder local.
    BuilderAppend {
        builder: String,
        value: Expression,
        loc: Option<SourceLoc>,
    },
    /// Peephole-introduced: assign the builder's finalized string to the
    /// original accumulator variable.
    BuilderFinish {
        builder: String,
        target: Expression,
        loc: Option<SourceLoc>,
    },
    /// Peephole-introduced: reserve array capacity before a counted push
    /// loop.
    ArrayReserve {
        array: Expression,
        capacity: Expression,
        loc: Option<SourceLoc>,
    },
}

impl Statement {
    /// The source location of this statement, when known.
    pub fn loc(&self) -> Option<&SourceLoc> {
        match self {
            Statement::VariableDeclaration { loc, .. }
            | Statement::Assignment { loc, .. }
            | Statement::Expression { loc, .. }
            | Statement::Return { loc, .. }
            | Statement::Throw { loc, .. }
            | Statement::Try { loc, .. }
            | Statement::If { loc, .. }
            | Statement::While { loc, .. }
            | Statement::For { loc, .. }
            | Statement::ForOf { loc, .. }
            | Statement::Break { loc }
            | Statement::Continue { loc }
            | Statement::Block { loc, .. }
            | Statement::BuilderDecl { loc, .. }
            | Statement::BuilderAppend { loc, .. }
            | Statement::BuilderFinish { loc, .. }
            | Statement::ArrayReserve { loc, .. } => loc.as_ref(),
            Statement::Function(func) => func.loc.as_ref(),
        }
    }
}
