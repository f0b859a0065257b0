//! Expression lowering.
//!
//! A direct syntactic translation; evaluation order is preserved. Template
//! literals become `+` chains over `string`, optional member accesses keep
//! their flag, compound assignments desugar to plain assignment, and lambdas
//! get their free-variable captures recorded.

use gsc_ast as ast;
use gsc_ir::{self as ir, BinOp, ExprKind, Expression, Literal, Ownership, Type, UnOp};

use crate::{Lowerer, LoweringError, Result, captures};

impl<'a> Lowerer<'a> {
    pub(crate) fn lower_expression(&mut self, expr: &ast::Expression) -> Result<Expression> {
        let loc = self.source_loc(expr.loc());
        match expr {
            ast::Expression::Literal { value, .. } => {
                let (literal, ty) = lower_literal(value);
                Ok(Expression::at(ExprKind::Literal(literal), ty, loc))
            }
            ast::Expression::Identifier { name, ty, .. } => {
                let ty = self.resolve_type(ty)?;
                Ok(Expression::at(ExprKind::Identifier(name.clone()), ty, loc))
            }
            ast::Expression::This { .. } => {
                let Some(class) = self.current_class.clone() else {
                    return Err(LoweringError::new("'this' outside of a class body", loc));
                };
                Ok(Expression::at(
                    ExprKind::This,
                    Type::class(class, Ownership::Value),
                    loc,
                ))
            }
            ast::Expression::Binary {
                op,
                left,
                right,
                ty,
                ..
            } => {
                let op = lower_binary_op(*op, loc.clone())?;
                let left = self.lower_expression(left)?;
                let right = self.lower_expression(right)?;
                let ty = self.resolve_type(ty)?;
                Ok(Expression::at(
                    ExprKind::Binary {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    ty,
                    loc,
                ))
            }
            ast::Expression::Unary { op, operand, .. } => {
                let operand = self.lower_expression(operand)?;
                let (op, ty) = match op {
                    ast::UnaryOp::Neg => (UnOp::Neg, operand.ty.clone()),
                    ast::UnaryOp::Plus => (UnOp::Plus, operand.ty.clone()),
                    ast::UnaryOp::Not => (UnOp::Not, Type::BOOLEAN),
                    ast::UnaryOp::BitNot => (UnOp::BitNot, Type::INT),
                    ast::UnaryOp::TypeOf => (UnOp::TypeOf, Type::STRING),
                    ast::UnaryOp::Delete | ast::UnaryOp::Void => {
                        return Err(LoweringError::new(
                            "operator outside the GoodScript subset reached lowering",
                            loc,
                        ));
                    }
                };
                Ok(Expression::at(
                    ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    ty,
                    loc,
                ))
            }
            ast::Expression::Conditional {
                cond,
                then,
                otherwise,
                ..
            } => {
                let cond = self.lower_expression(cond)?;
                let then = self.lower_expression(then)?;
                let otherwise = self.lower_expression(otherwise)?;
                let ty = then.ty.clone();
                Ok(Expression::at(
                    ExprKind::Conditional {
                        cond: Box::new(cond),
                        then: Box::new(then),
                        otherwise: Box::new(otherwise),
                    },
                    ty,
                    loc,
                ))
            }
            ast::Expression::Member {
                object,
                member,
                optional,
                ty,
                ..
            } => {
                let object = self.lower_expression(object)?;
                let ty = self.resolve_type(ty)?;
                Ok(Expression::at(
                    ExprKind::Member {
                        object: Box::new(object),
                        member: member.clone(),
                        optional: *optional,
                    },
                    ty,
                    loc,
                ))
            }
            ast::Expression::Index {
                object, index, ty, ..
            } => {
                let object = self.lower_expression(object)?;
                let index = self.lower_expression(index)?;
                let ty = self.resolve_type(ty)?;
                Ok(Expression::at(
                    ExprKind::Index {
                        object: Box::new(object),
                        index: Box::new(index),
                    },
                    ty,
                    loc,
                ))
            }
            ast::Expression::Assign {
                op, target, value, ..
            } => {
                let target = self.lower_expression(target)?;
                let value = self.lower_expression(value)?;
                // Compound assignment desugars to `target = target op value`.
                let value = match op {
                    ast::AssignOp::Assign => value,
                    ast::AssignOp::AddAssign
                    | ast::AssignOp::SubAssign
                    | ast::AssignOp::MulAssign
                    | ast::AssignOp::DivAssign => {
                        let bin_op = match op {
                            ast::AssignOp::AddAssign => BinOp::Add,
                            ast::AssignOp::SubAssign => BinOp::Sub,
                            ast::AssignOp::MulAssign => BinOp::Mul,
                            _ => BinOp::Div,
                        };
                        let ty = target.ty.clone();
                        Expression::at(
                            ExprKind::Binary {
                                op: bin_op,
                                left: Box::new(target.clone()),
                                right: Box::new(value),
                            },
                            ty,
                            loc.clone(),
                        )
                    }
                };
                let ty = value.ty.clone();
                Ok(Expression::at(
                    ExprKind::Assign {
                        target: Box::new(target),
                        value: Box::new(value),
                    },
                    ty,
                    loc,
                ))
            }
            ast::Expression::Call {
                callee, args, ty, ..
            } => {
                let callee = self.lower_expression(callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.lower_expression(arg))
                    .collect::<Result<Vec<_>>>()?;
                let ty = self.resolve_type(ty)?;
                Ok(Expression::at(
                    ExprKind::Call {
                        callee: Box::new(callee),
                        args,
                    },
                    ty,
                    loc,
                ))
            }
            ast::Expression::New {
                class_name,
                args,
                type_args,
                ..
            } => {
                let args = args
                    .iter()
                    .map(|arg| self.lower_expression(arg))
                    .collect::<Result<Vec<_>>>()?;
                let type_args = type_args
                    .iter()
                    .map(|arg| self.resolve_type(arg))
                    .collect::<Result<Vec<_>>>()?;
                let ty = Type::Named {
                    name: class_name.clone(),
                    kind: gsc_ir::NamedKind::Class,
                    ownership: Ownership::Share,
                    type_args: type_args.clone(),
                };
                Ok(Expression::at(
                    ExprKind::New {
                        class_name: class_name.clone(),
                        args,
                        type_args,
                    },
                    ty,
                    loc,
                ))
            }
            ast::Expression::ArrayLiteral { elements, ty, .. } => {
                let elements = elements
                    .iter()
                    .map(|element| self.lower_expression(element))
                    .collect::<Result<Vec<_>>>()?;
                let ty = self.resolve_type(ty)?;
                Ok(Expression::at(ExprKind::ArrayLiteral(elements), ty, loc))
            }
            ast::Expression::ObjectLiteral { properties, ty, .. } => {
                let fields = properties
                    .iter()
                    .map(|prop| Ok((prop.name.clone(), self.lower_expression(&prop.value)?)))
                    .collect::<Result<Vec<_>>>()?;
                let ty = self.resolve_type(ty)?;
                Ok(Expression::at(ExprKind::StructLiteral { fields }, ty, loc))
            }
            ast::Expression::Lambda {
                params,
                return_type,
                body,
                ..
            } => self.lower_lambda(params, return_type.as_ref(), body, loc),
            ast::Expression::TemplateLiteral { parts, .. } => self.lower_template(parts, loc),
            ast::Expression::Await { expr, .. } => {
                let inner = self.lower_expression(expr)?;
                let ty = inner.ty.promise_result().cloned().ok_or_else(|| {
                    LoweringError::new(
                        format!("awaited expression has non-Promise type '{}'", inner.ty),
                        loc.clone(),
                    )
                })?;
                Ok(Expression::at(ExprKind::Await(Box::new(inner)), ty, loc))
            }
            ast::Expression::Comma { .. } => Err(LoweringError::new(
                "comma expression outside the GoodScript subset reached lowering",
                loc,
            )),
        }
    }

    fn lower_lambda(
        &mut self,
        params: &[ast::Param],
        return_type: Option<&ast::TypeExpr>,
        body: &ast::LambdaBody,
        loc: Option<gsc_common::SourceLoc>,
    ) -> Result<Expression> {
        let params = self.lower_params(params)?;
        self.push_scope(&params);
        let (body, inferred) = match body {
            ast::LambdaBody::Expr(expr) => {
                let value = self.lower_expression(expr)?;
                let ty = value.ty.clone();
                let ret = ir::Statement::Return {
                    value: Some(value),
                    loc: loc.clone(),
                };
                (vec![ret], ty)
            }
            ast::LambdaBody::Block(statements) => {
                let body = self.lower_body(statements)?;
                (body, Type::VOID)
            }
        };
        self.pop_scope();

        let return_type = match return_type {
            Some(ty) => self.resolve_type(ty)?,
            None => inferred,
        };

        // Free variables of the body, excluding the lambda's own bindings,
        // resolved against the enclosing local scopes.
        let captures = captures::collect(&body, &params, &self.scopes);

        let ty = Type::Function {
            params: params.iter().map(|p| p.ty.clone()).collect(),
            return_type: Box::new(return_type.clone()),
        };
        Ok(Expression::at(
            ExprKind::Lambda {
                params,
                captures,
                body,
                return_type,
            },
            ty,
            loc,
        ))
    }

    /// Template literals lower to a `+` chain over `string`, with a leading
    /// empty string when the first part is an interpolation.
    fn lower_template(
        &mut self,
        parts: &[ast::TemplatePart],
        loc: Option<gsc_common::SourceLoc>,
    ) -> Result<Expression> {
        let mut chain: Option<Expression> = None;
        for part in parts {
            let piece = match part {
                ast::TemplatePart::Text(text) => Expression::at(
                    ExprKind::Literal(Literal::String(text.clone())),
                    Type::STRING,
                    loc.clone(),
                ),
                ast::TemplatePart::Expr(expr) => self.lower_expression(expr)?,
            };
            chain = Some(match chain {
                None if piece.ty.is_string() => piece,
                None => {
                    let empty = Expression::at(
                        ExprKind::Literal(Literal::String(String::new())),
                        Type::STRING,
                        loc.clone(),
                    );
                    concat(empty, piece, loc.clone())
                }
                Some(left) => concat(left, piece, loc.clone()),
            });
        }
        Ok(chain.unwrap_or_else(|| {
            Expression::at(
                ExprKind::Literal(Literal::String(String::new())),
                Type::STRING,
                loc,
            )
        }))
    }
}

fn concat(
    left: Expression,
    right: Expression,
    loc: Option<gsc_common::SourceLoc>,
) -> Expression {
    Expression::at(
        ExprKind::Binary {
            op: BinOp::Add,
            left: Box::new(left),
            right: Box::new(right),
        },
        Type::STRING,
        loc,
    )
}

fn lower_literal(literal: &ast::Literal) -> (Literal, Type) {
    match literal {
        ast::Literal::Number(value) => (Literal::Number(*value), Type::NUMBER),
        ast::Literal::String(value) => (Literal::String(value.clone()), Type::STRING),
        ast::Literal::Boolean(value) => (Literal::Boolean(*value), Type::BOOLEAN),
        ast::Literal::Null => (
            Literal::Null,
            Type::Nullable {
                inner: Box::new(Type::NEVER),
            },
        ),
        ast::Literal::Undefined => (
            Literal::Undefined,
            Type::Nullable {
                inner: Box::new(Type::NEVER),
            },
        ),
    }
}

fn lower_binary_op(
    op: ast::BinaryOp,
    loc: Option<gsc_common::SourceLoc>,
) -> Result<BinOp> {
    Ok(match op {
        ast::BinaryOp::Add => BinOp::Add,
        ast::BinaryOp::Sub => BinOp::Sub,
        ast::BinaryOp::Mul => BinOp::Mul,
        ast::BinaryOp::Div => BinOp::Div,
        ast::BinaryOp::Rem => BinOp::Rem,
        ast::BinaryOp::StrictEq => BinOp::Eq,
        ast::BinaryOp::StrictNe => BinOp::Ne,
        ast::BinaryOp::Lt => BinOp::Lt,
        ast::BinaryOp::Le => BinOp::Le,
        ast::BinaryOp::Gt => BinOp::Gt,
        ast::BinaryOp::Ge => BinOp::Ge,
        ast::BinaryOp::And => BinOp::And,
        ast::BinaryOp::Or => BinOp::Or,
        ast::BinaryOp::NullishCoalesce => BinOp::NullishCoalesce,
        ast::BinaryOp::BitAnd => BinOp::BitAnd,
        ast::BinaryOp::BitOr => BinOp::BitOr,
        ast::BinaryOp::BitXor => BinOp::BitXor,
        ast::BinaryOp::Shl => BinOp::Shl,
        ast::BinaryOp::Shr => BinOp::Shr,
        ast::BinaryOp::InstanceOf => BinOp::InstanceOf,
        ast::BinaryOp::LooseEq | ast::BinaryOp::LooseNe => {
            return Err(LoweringError::new(
                "loose equality outside the GoodScript subset reached lowering",
                loc,
            ));
        }
    })
}
