//! Statement lowering.
//!
//! Top-level assignments become assignment statements, statement-level
//! calls of async functions get the synchronous-await marker, and switch
//! statements (legal in the subset when every case terminates) lower into
//! if/else chains over the subject.

use gsc_ast as ast;
use gsc_ir::{self as ir, BinOp, ExprKind, Expression, Type};

use crate::{Lowerer, LoweringError, Result};

impl<'a> Lowerer<'a> {
    pub(crate) fn lower_body(&mut self, body: &[ast::Statement]) -> Result<Vec<ir::Statement>> {
        body.iter().map(|stmt| self.lower_statement(stmt)).collect()
    }

    pub(crate) fn lower_statement(&mut self, stmt: &ast::Statement) -> Result<ir::Statement> {
        let loc = self.source_loc(stmt.loc());
        match stmt {
            ast::Statement::VariableDeclaration {
                keyword,
                name,
                declared_type,
                initializer,
                ..
            } => {
                if *keyword == ast::DeclKeyword::Var {
                    return Err(LoweringError::new(
                        "'var' outside the GoodScript subset reached lowering",
                        loc,
                    ));
                }
                let initializer = initializer
                    .as_ref()
                    .map(|init| self.lower_expression(init))
                    .transpose()?;
                let ty = match declared_type {
                    Some(ty) => self.resolve_type(ty)?,
                    None => match &initializer {
                        Some(init) => init.ty.clone(),
                        None => {
                            return Err(LoweringError::new(
                                format!("variable '{name}' has neither a type nor an initializer"),
                                loc,
                            ));
                        }
                    },
                };
                self.bind_local(name, ty.clone());
                Ok(ir::Statement::VariableDeclaration {
                    name: name.clone(),
                    ty,
                    mutable: *keyword == ast::DeclKeyword::Let,
                    initializer,
                    loc,
                })
            }
            ast::Statement::Expression { expr, .. } => self.lower_expression_statement(expr, loc),
            ast::Statement::Return { value, .. } => {
                let value = value
                    .as_ref()
                    .map(|value| self.lower_expression(value))
                    .transpose()?;
                Ok(ir::Statement::Return { value, loc })
            }
            ast::Statement::Throw { expr, .. } => {
                let expr = self.lower_expression(expr)?;
                Ok(ir::Statement::Throw { expr, loc })
            }
            ast::Statement::Try {
                body,
                catch,
                finally,
                ..
            } => {
                let body = self.lower_block(body)?;
                let catch = match catch {
                    Some(clause) => {
                        self.scopes.push(vec![(clause.name.clone(), Type::STRING)]);
                        let body = self.lower_body(&clause.body)?;
                        self.pop_scope();
                        Some(ir::CatchClause {
                            name: clause.name.clone(),
                            body,
                        })
                    }
                    None => None,
                };
                let finally = finally
                    .as_ref()
                    .map(|body| self.lower_block(body))
                    .transpose()?;
                Ok(ir::Statement::Try {
                    body,
                    catch,
                    finally,
                    loc,
                })
            }
            ast::Statement::If {
                cond,
                then,
                otherwise,
                ..
            } => {
                let cond = self.lower_expression(cond)?;
                let then = self.lower_block(then)?;
                let otherwise = otherwise
                    .as_ref()
                    .map(|body| self.lower_block(body))
                    .transpose()?;
                Ok(ir::Statement::If {
                    cond,
                    then,
                    otherwise,
                    loc,
                })
            }
            ast::Statement::While { cond, body, .. } => {
                let cond = self.lower_expression(cond)?;
                let body = self.lower_block(body)?;
                Ok(ir::Statement::While { cond, body, loc })
            }
            ast::Statement::For {
                init,
                cond,
                update,
                body,
                ..
            } => {
                self.scopes.push(Vec::new());
                let init = init
                    .as_ref()
                    .map(|init| self.lower_statement(init))
                    .transpose()?
                    .map(Box::new);
                let cond = cond
                    .as_ref()
                    .map(|cond| self.lower_expression(cond))
                    .transpose()?;
                let update = update
                    .as_ref()
                    .map(|update| self.lower_expression(update))
                    .transpose()?;
                let body = self.lower_body(body)?;
                self.pop_scope();
                Ok(ir::Statement::For {
                    init,
                    cond,
                    update,
                    body,
                    loc,
                })
            }
            ast::Statement::ForOf {
                variable,
                variable_type,
                iterable,
                body,
                ..
            } => {
                let iterable = self.lower_expression(iterable)?;
                let variable_ty = match variable_type {
                    Some(ty) => self.resolve_type(ty)?,
                    None => match iterable.ty.resolved() {
                        Type::Array { element, .. } => element.as_ref().clone(),
                        other => {
                            return Err(LoweringError::new(
                                format!("cannot infer element type of iteration over '{other}'"),
                                loc,
                            ));
                        }
                    },
                };
                self.scopes
                    .push(vec![(variable.clone(), variable_ty.clone())]);
                let body = self.lower_body(body)?;
                self.pop_scope();
                Ok(ir::Statement::ForOf {
                    variable: variable.clone(),
                    variable_ty,
                    iterable,
                    body,
                    loc,
                })
            }
            ast::Statement::Switch { subject, cases, .. } => self.lower_switch(subject, cases, loc),
            ast::Statement::Break { .. } => Ok(ir::Statement::Break { loc }),
            ast::Statement::Continue { .. } => Ok(ir::Statement::Continue { loc }),
            ast::Statement::Block { statements, .. } => {
                let statements = self.lower_block(statements)?;
                Ok(ir::Statement::Block { statements, loc })
            }
            ast::Statement::Function(decl) => {
                // Record the nested function under its name so recursion can
                // be detected later and captures can reference it.
                let func = self.lower_function(decl)?;
                self.bind_local(
                    &func.name,
                    Type::Function {
                        params: func.params.iter().map(|p| p.ty.clone()).collect(),
                        return_type: Box::new(func.return_type.clone()),
                    },
                );
                Ok(ir::Statement::Function(Box::new(func)))
            }
            ast::Statement::With { .. } => Err(LoweringError::new(
                "'with' outside the GoodScript subset reached lowering",
                loc,
            )),
            ast::Statement::ForIn { .. } => Err(LoweringError::new(
                "'for...in' outside the GoodScript subset reached lowering",
                loc,
            )),
        }
    }

    fn lower_block(&mut self, body: &[ast::Statement]) -> Result<Vec<ir::Statement>> {
        self.scopes.push(Vec::new());
        let body = self.lower_body(body);
        self.pop_scope();
        body
    }

    /// Expression statements: assignments become assignment statements, and
    /// a bare call returning `Promise<T>` outside an `await` is wrapped with
    /// the synchronous-await marker for the emitter.
    fn lower_expression_statement(
        &mut self,
        expr: &ast::Expression,
        loc: Option<gsc_common::SourceLoc>,
    ) -> Result<ir::Statement> {
        let lowered = self.lower_expression(expr)?;
        let Expression {
            kind,
            ty,
            loc: expr_loc,
        } = lowered;
        if let ExprKind::Assign { target, value } = kind {
            return Ok(ir::Statement::Assignment {
                target: *target,
                value: *value,
                loc,
            });
        }
        let lowered = Expression {
            kind,
            ty,
            loc: expr_loc,
        };
        let awaited_result = match &lowered.kind {
            ExprKind::Call { .. } => lowered.ty.promise_result().cloned(),
            _ => None,
        };
        let lowered = match awaited_result {
            Some(result) => Expression::at(
                ExprKind::AwaitSync(Box::new(lowered)),
                result,
                loc.clone(),
            ),
            None => lowered,
        };
        Ok(ir::Statement::Expression { expr: lowered, loc })
    }

    /// A switch whose cases all terminate lowers to an if/else chain:
    /// consecutive empty cases group into one disjunction, the trailing
    /// `break` of each case is dropped, and the default case becomes the
    /// final `else`.
    fn lower_switch(
        &mut self,
        subject: &ast::Expression,
        cases: &[ast::SwitchCase],
        loc: Option<gsc_common::SourceLoc>,
    ) -> Result<ir::Statement> {
        let subject = self.lower_expression(subject)?;

        // Group each non-empty body with the (possibly empty) cases that
        // fall into it.
        let mut arms: Vec<(Vec<Expression>, Vec<ir::Statement>)> = Vec::new();
        let mut default_body: Option<Vec<ir::Statement>> = None;
        let mut pending_tests: Vec<Expression> = Vec::new();
        for case in cases {
            let is_default = case.test.is_none();
            if let Some(test) = &case.test {
                pending_tests.push(self.lower_expression(test)?);
            }
            if case.body.is_empty() && !is_default {
                continue;
            }
            self.scopes.push(Vec::new());
            let mut body = self.lower_body(&case.body)?;
            self.pop_scope();
            if matches!(body.last(), Some(ir::Statement::Break { .. })) {
                body.pop();
            }
            if is_default {
                default_body = Some(body);
            } else {
                arms.push((std::mem::take(&mut pending_tests), body));
            }
        }

        // Build the chain back-to-front.
        let mut otherwise = default_body;
        for (tests, body) in arms.into_iter().rev() {
            let cond = tests
                .into_iter()
                .map(|test| equals(subject.clone(), test))
                .reduce(|left, right| {
                    Expression::new(
                        ExprKind::Binary {
                            op: BinOp::Or,
                            left: Box::new(left),
                            right: Box::new(right),
                        },
                        Type::BOOLEAN,
                    )
                })
                .ok_or_else(|| {
                    LoweringError::new("switch case group without a test", loc.clone())
                })?;
            otherwise = Some(vec![ir::Statement::If {
                cond,
                then: body,
                otherwise,
                loc: loc.clone(),
            }]);
        }

        match otherwise {
            Some(mut chain) if chain.len() == 1 => Ok(chain.remove(0)),
            Some(statements) => Ok(ir::Statement::Block { statements, loc }),
            None => Ok(ir::Statement::Block {
                statements: Vec::new(),
                loc,
            }),
        }
    }
}

fn equals(subject: Expression, test: Expression) -> Expression {
    Expression::new(
        ExprKind::Binary {
            op: BinOp::Eq,
            left: Box::new(subject),
            right: Box::new(test),
        },
        Type::BOOLEAN,
    )
}
