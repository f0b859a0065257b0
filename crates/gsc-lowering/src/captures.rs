//! Free-variable analysis for lambdas, plus the await scan used by async
//! propagation.
//!
//! Capture detection is conservative: any name bound anywhere inside the
//! lambda (params, locals, nested functions, catch clauses) is considered
//! local, and the remaining identifier uses are looked up in the enclosing
//! function's scopes. Module-level names never capture.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use gsc_ir::{Capture, ExprKind, Expression, Param, Statement, Type};

/// Record the free variables of a lambda body against the enclosing scopes.
pub(crate) fn collect(
    body: &[Statement],
    params: &[Param],
    enclosing: &[Vec<(String, Type)>],
) -> Vec<Capture> {
    let mut bound: FxHashSet<String> = params.iter().map(|p| p.name.clone()).collect();
    collect_bound_names(body, &mut bound);

    // First-use order, deduplicated. Names that resolve to nothing in the
    // enclosing scopes are module-level and never capture.
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut free: SmallVec<[Capture; 4]> = SmallVec::new();
    visit_identifiers(body, &mut |name| {
        if bound.contains(name) || !seen.insert(name.to_string()) {
            return;
        }
        if let Some(ty) = lookup(enclosing, name) {
            free.push(Capture {
                name: name.to_string(),
                ty: ty.clone(),
            });
        }
    });
    free.into_vec()
}

fn lookup<'t>(enclosing: &'t [Vec<(String, Type)>], name: &str) -> Option<&'t Type> {
    enclosing
        .iter()
        .rev()
        .find_map(|scope| scope.iter().rev().find(|(n, _)| n == name).map(|(_, t)| t))
}

/// Every name bound inside the body, at any depth.
fn collect_bound_names(body: &[Statement], bound: &mut FxHashSet<String>) {
    for stmt in body {
        match stmt {
            Statement::VariableDeclaration { name, .. } => {
                bound.insert(name.clone());
            }
            Statement::ForOf { variable, body, .. } => {
                bound.insert(variable.clone());
                collect_bound_names(body, bound);
            }
            Statement::Function(func) => {
                bound.insert(func.name.clone());
                for param in &func.params {
                    bound.insert(param.name.clone());
                }
                collect_bound_names(&func.body, bound);
            }
            Statement::Try {
                body,
                catch,
                finally,
                ..
            } => {
                collect_bound_names(body, bound);
                if let Some(catch) = catch {
                    bound.insert(catch.name.clone());
                    collect_bound_names(&catch.body, bound);
                }
                if let Some(finally) = finally {
                    collect_bound_names(finally, bound);
                }
            }
            Statement::If {
                then, otherwise, ..
            } => {
                collect_bound_names(then, bound);
                if let Some(otherwise) = otherwise {
                    collect_bound_names(otherwise, bound);
                }
            }
            Statement::While { body, .. } => collect_bound_names(body, bound),
            Statement::For { init, body, .. } => {
                if let Some(init) = init {
                    collect_bound_names(std::slice::from_ref(init), bound);
                }
                collect_bound_names(body, bound);
            }
            Statement::Block { statements, .. } => collect_bound_names(statements, bound),
            _ => {}
        }
    }
}

// =============================================================================
// Identifier walk
// =============================================================================

fn visit_identifiers(body: &[Statement], visit: &mut impl FnMut(&str)) {
    for stmt in body {
        visit_statement(stmt, visit);
    }
}

fn visit_statement(stmt: &Statement, visit: &mut impl FnMut(&str)) {
    match stmt {
        Statement::VariableDeclaration { initializer, .. } => {
            if let Some(init) = initializer {
                visit_expression(init, visit);
            }
        }
        Statement::Assignment { target, value, .. } => {
            visit_expression(target, visit);
            visit_expression(value, visit);
        }
        Statement::Expression { expr, .. } => visit_expression(expr, visit),
        Statement::Return { value, .. } => {
            if let Some(value) = value {
                visit_expression(value, visit);
            }
        }
        Statement::Throw { expr, .. } => visit_expression(expr, visit),
        Statement::Try {
            body,
            catch,
            finally,
            ..
        } => {
            visit_identifiers(body, visit);
            if let Some(catch) = catch {
                visit_identifiers(&catch.body, visit);
            }
            if let Some(finally) = finally {
                visit_identifiers(finally, visit);
            }
        }
        Statement::If {
            cond,
            then,
            otherwise,
            ..
        } => {
            visit_expression(cond, visit);
            visit_identifiers(then, visit);
            if let Some(otherwise) = otherwise {
                visit_identifiers(otherwise, visit);
            }
        }
        Statement::While { cond, body, .. } => {
            visit_expression(cond, visit);
            visit_identifiers(body, visit);
        }
        Statement::For {
            init,
            cond,
            update,
            body,
            ..
        } => {
            if let Some(init) = init {
                visit_statement(init, visit);
            }
            if let Some(cond) = cond {
                visit_expression(cond, visit);
            }
            if let Some(update) = update {
                visit_expression(update, visit);
            }
            visit_identifiers(body, visit);
        }
        Statement::ForOf {
            iterable, body, ..
        } => {
            visit_expression(iterable, visit);
            visit_identifiers(body, visit);
        }
        Statement::Break { .. } | Statement::Continue { .. } => {}
        Statement::Block { statements, .. } => visit_identifiers(statements, visit),
        Statement::Function(func) => visit_identifiers(&func.body, visit),
        Statement::BuilderDecl { .. } => {}
        Statement::BuilderAppend { value, .. } => visit_expression(value, visit),
        Statement::BuilderFinish { target, .. } => visit_expression(target, visit),
        Statement::ArrayReserve {
            array, capacity, ..
        } => {
            visit_expression(array, visit);
            visit_expression(capacity, visit);
        }
    }
}

fn visit_expression(expr: &Expression, visit: &mut impl FnMut(&str)) {
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::This => {}
        ExprKind::Identifier(name) => visit(name),
        ExprKind::Binary { left, right, .. } => {
            visit_expression(left, visit);
            visit_expression(right, visit);
        }
        ExprKind::Unary { operand, .. } => visit_expression(operand, visit),
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => {
            visit_expression(cond, visit);
            visit_expression(then, visit);
            visit_expression(otherwise, visit);
        }
        ExprKind::Member { object, .. } => visit_expression(object, visit),
        ExprKind::Index { object, index } => {
            visit_expression(object, visit);
            visit_expression(index, visit);
        }
        ExprKind::Assign { target, value } => {
            visit_expression(target, visit);
            visit_expression(value, visit);
        }
        ExprKind::Call { callee, args } => {
            visit_expression(callee, visit);
            for arg in args {
                visit_expression(arg, visit);
            }
        }
        ExprKind::AwaitSync(inner) | ExprKind::Await(inner) => visit_expression(inner, visit),
        ExprKind::New { args, .. } => {
            for arg in args {
                visit_expression(arg, visit);
            }
        }
        ExprKind::ArrayLiteral(elements) => {
            for element in elements {
                visit_expression(element, visit);
            }
        }
        ExprKind::StructLiteral { fields } => {
            for (_, value) in fields {
                visit_expression(value, visit);
            }
        }
        ExprKind::Lambda { body, .. } => visit_identifiers(body, visit),
        ExprKind::StringBuilder { parts } => {
            for part in parts {
                visit_expression(part, visit);
            }
        }
    }
}

// =============================================================================
// Await scan (async propagation)
// =============================================================================

/// Whether a function body contains an `await` expression, ignoring nested
/// functions and lambdas (their asyncness is their own).
pub(crate) fn body_contains_await(body: &[Statement]) -> bool {
    body.iter().any(statement_contains_await)
}

fn statement_contains_await(stmt: &Statement) -> bool {
    match stmt {
        Statement::VariableDeclaration { initializer, .. } => initializer
            .as_ref()
            .is_some_and(expression_contains_await),
        Statement::Assignment { target, value, .. } => {
            expression_contains_await(target) || expression_contains_await(value)
        }
        Statement::Expression { expr, .. } => expression_contains_await(expr),
        Statement::Return { value, .. } => {
            value.as_ref().is_some_and(expression_contains_await)
        }
        Statement::Throw { expr, .. } => expression_contains_await(expr),
        Statement::Try {
            body,
            catch,
            finally,
            ..
        } => {
            body_contains_await(body)
                || catch.as_ref().is_some_and(|c| body_contains_await(&c.body))
                || finally.as_ref().is_some_and(|f| body_contains_await(f))
        }
        Statement::If {
            cond,
            then,
            otherwise,
            ..
        } => {
            expression_contains_await(cond)
                || body_contains_await(then)
                || otherwise.as_ref().is_some_and(|o| body_contains_await(o))
        }
        Statement::While { cond, body, .. } => {
            expression_contains_await(cond) || body_contains_await(body)
        }
        Statement::For {
            init,
            cond,
            update,
            body,
            ..
        } => {
            init.as_ref().is_some_and(|i| statement_contains_await(i))
                || cond.as_ref().is_some_and(expression_contains_await)
                || update.as_ref().is_some_and(expression_contains_await)
                || body_contains_await(body)
        }
        Statement::ForOf {
            iterable, body, ..
        } => expression_contains_await(iterable) || body_contains_await(body),
        Statement::Break { .. } | Statement::Continue { .. } => false,
        Statement::Block { statements, .. } => body_contains_await(statements),
        Statement::Function(_) => false,
        Statement::BuilderDecl { .. } => false,
        Statement::BuilderAppend { value, .. } => expression_contains_await(value),
        Statement::BuilderFinish { .. } => false,
        Statement::ArrayReserve { .. } => false,
    }
}

fn expression_contains_await(expr: &Expression) -> bool {
    match &expr.kind {
        ExprKind::Await(_) => true,
        ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::This => false,
        ExprKind::Binary { left, right, .. } => {
            expression_contains_await(left) || expression_contains_await(right)
        }
        ExprKind::Unary { operand, .. } => expression_contains_await(operand),
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => {
            expression_contains_await(cond)
                || expression_contains_await(then)
                || expression_contains_await(otherwise)
        }
        ExprKind::Member { object, .. } => expression_contains_await(object),
        ExprKind::Index { object, index } => {
            expression_contains_await(object) || expression_contains_await(index)
        }
        ExprKind::Assign { target, value } => {
            expression_contains_await(target) || expression_contains_await(value)
        }
        ExprKind::Call { callee, args } => {
            expression_contains_await(callee) || args.iter().any(expression_contains_await)
        }
        ExprKind::AwaitSync(inner) => expression_contains_await(inner),
        ExprKind::New { args, .. } => args.iter().any(expression_contains_await),
        ExprKind::ArrayLiteral(elements) => elements.iter().any(expression_contains_await),
        ExprKind::StructLiteral { fields } => {
            fields.iter().any(|(_, value)| expression_contains_await(value))
        }
        ExprKind::Lambda { .. } => false,
        ExprKind::StringBuilder { parts } => parts.iter().any(expression_contains_await),
    }
}
