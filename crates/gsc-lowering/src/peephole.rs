//! Localized IR rewrites, bounded by a single function body.
//!
//! Three recognizers run in order over every function body:
//! 1. string-builder rewriting (concatenation chains and in-loop
//!    accumulation),
//! 2. array reserve insertion for counted push loops,
//! 3. recursive nested-function marking.
//!
//! Rewrites never change observable output for well-typed programs.

use tracing::debug;

use gsc_ir::{
    BinOp, Class, Declaration, ExprKind, Expression, Module, Statement, Type,
};

/// Run all peephole rewrites over every function body of a module.
pub fn optimize_module(module: &mut Module) {
    let mut rewrites = 0usize;
    for decl in &mut module.declarations {
        match decl {
            Declaration::Function(func) => optimize_body(&mut func.body, &mut rewrites),
            Declaration::Class(class) => optimize_class(class, &mut rewrites),
            Declaration::Interface(_) | Declaration::TypeAlias(_) => {}
            Declaration::Const(konst) => {
                rewrite_expression(&mut konst.initializer, &mut rewrites);
            }
        }
    }
    optimize_body(&mut module.init_statements, &mut rewrites);
    debug!(module = %module.name, rewrites, "peephole pass finished");
}

fn optimize_class(class: &mut Class, rewrites: &mut usize) {
    for field in &mut class.fields {
        if let Some(init) = &mut field.initializer {
            rewrite_expression(init, rewrites);
        }
    }
    if let Some(ctor) = &mut class.constructor {
        optimize_body(&mut ctor.body, rewrites);
    }
    for method in &mut class.methods {
        optimize_body(&mut method.body, rewrites);
    }
}

/// One function body: apply the loop recognizers and recursion marking at
/// every statement depth, then rewrite concatenation chains. Nested
/// function declarations and lambdas restart as their own function body
/// with a fresh builder counter.
fn optimize_body(body: &mut Vec<Statement>, rewrites: &mut usize) {
    let mut builders = 0usize;
    optimize_statement_list(body, &mut builders, rewrites);
    for stmt in body.iter_mut() {
        rewrite_statement(stmt, rewrites);
    }
}

/// The structural recognizers for one statement list, then for every
/// nested list reachable from it. The builder counter is shared across the
/// whole function body so hoisted names stay unique.
fn optimize_statement_list(
    body: &mut Vec<Statement>,
    builders: &mut usize,
    rewrites: &mut usize,
) {
    hoist_loop_concats(body, builders, rewrites);
    insert_array_reserves(body, rewrites);
    mark_recursive_functions(body);
    for stmt in body.iter_mut() {
        descend(stmt, builders, rewrites);
    }
}

fn descend(stmt: &mut Statement, builders: &mut usize, rewrites: &mut usize) {
    match stmt {
        Statement::Function(func) => optimize_body(&mut func.body, rewrites),
        Statement::If {
            then, otherwise, ..
        } => {
            optimize_statement_list(then, builders, rewrites);
            if let Some(otherwise) = otherwise {
                optimize_statement_list(otherwise, builders, rewrites);
            }
        }
        Statement::While { body, .. }
        | Statement::For { body, .. }
        | Statement::ForOf { body, .. }
        | Statement::Block {
            statements: body, ..
        } => {
            optimize_statement_list(body, builders, rewrites);
        }
        Statement::Try {
            body,
            catch,
            finally,
            ..
        } => {
            optimize_statement_list(body, builders, rewrites);
            if let Some(catch) = catch {
                optimize_statement_list(&mut catch.body, builders, rewrites);
            }
            if let Some(finally) = finally {
                optimize_statement_list(finally, builders, rewrites);
            }
        }
        _ => {}
    }
}

// =============================================================================
// Recognizer 1a: in-loop string accumulation
// =============================================================================

/// `r = r + x` inside a `while`/`for` body hoists to a builder: construct
/// before the loop (seeded with the current value of `r`), append inside,
/// assign the finalized string after.
fn hoist_loop_concats(body: &mut Vec<Statement>, builders: &mut usize, rewrites: &mut usize) {
    let mut index = 0;
    while index < body.len() {
        let loop_body = match &mut body[index] {
            Statement::While { body, .. } | Statement::For { body, .. } => Some(body),
            _ => None,
        };
        let Some(loop_body) = loop_body else {
            index += 1;
            continue;
        };

        let mut hoisted: Option<(String, String)> = None;
        for stmt in loop_body.iter_mut() {
            let Statement::Assignment { target, value, loc } = stmt else {
                continue;
            };
            let Some(acc) = target.as_identifier() else {
                continue;
            };
            if !target.ty.is_string() {
                continue;
            }
            let mut parts = Vec::new();
            flatten_concat(value, &mut parts);
            let leads_with_acc = parts
                .first()
                .is_some_and(|part| part.as_identifier() == Some(acc));
            if parts.len() < 2 || !leads_with_acc {
                continue;
            }

            let builder = format!("__sb{}", *builders);
            *builders += 1;
            let appends: Vec<Statement> = parts
                .iter()
                .skip(1)
                .map(|part| Statement::BuilderAppend {
                    builder: builder.clone(),
                    value: (*part).clone(),
                    loc: loc.clone(),
                })
                .collect();
            hoisted = Some((builder, acc.to_string()));
            *stmt = match appends.len() {
                1 => {
                    let mut appends = appends;
                    appends.remove(0)
                }
                _ => Statement::Block {
                    statements: appends,
                    loc: None,
                },
            };
            break;
        }

        if let Some((builder, acc)) = hoisted {
            *rewrites += 1;
            let acc_ident = Expression::ident(acc, Type::STRING);
            body.insert(
                index,
                Statement::BuilderDecl {
                    name: builder.clone(),
                    loc: None,
                },
            );
            body.insert(
                index + 1,
                Statement::BuilderAppend {
                    builder: builder.clone(),
                    value: acc_ident.clone(),
                    loc: None,
                },
            );
            body.insert(
                index + 3,
                Statement::BuilderFinish {
                    builder,
                    target: acc_ident,
                    loc: None,
                },
            );
            index += 4;
        } else {
            index += 1;
        }
    }
}

// =============================================================================
// Recognizer 1b: concatenation chains
// =============================================================================

fn rewrite_statement(stmt: &mut Statement, rewrites: &mut usize) {
    match stmt {
        Statement::VariableDeclaration { initializer, .. } => {
            if let Some(init) = initializer {
                rewrite_expression(init, rewrites);
            }
        }
        Statement::Assignment { target, value, .. } => {
            rewrite_expression(target, rewrites);
            rewrite_expression(value, rewrites);
        }
        Statement::Expression { expr, .. } => rewrite_expression(expr, rewrites),
        Statement::Return { value, .. } => {
            if let Some(value) = value {
                rewrite_expression(value, rewrites);
            }
        }
        Statement::Throw { expr, .. } => rewrite_expression(expr, rewrites),
        Statement::Try {
            body,
            catch,
            finally,
            ..
        } => {
            for stmt in body.iter_mut() {
                rewrite_statement(stmt, rewrites);
            }
            if let Some(catch) = catch {
                for stmt in catch.body.iter_mut() {
                    rewrite_statement(stmt, rewrites);
                }
            }
            if let Some(finally) = finally {
                for stmt in finally.iter_mut() {
                    rewrite_statement(stmt, rewrites);
                }
            }
        }
        Statement::If {
            cond,
            then,
            otherwise,
            ..
        } => {
            rewrite_expression(cond, rewrites);
            for stmt in then.iter_mut() {
                rewrite_statement(stmt, rewrites);
            }
            if let Some(otherwise) = otherwise {
                for stmt in otherwise.iter_mut() {
                    rewrite_statement(stmt, rewrites);
                }
            }
        }
        Statement::While { cond, body, .. } => {
            rewrite_expression(cond, rewrites);
            for stmt in body.iter_mut() {
                rewrite_statement(stmt, rewrites);
            }
        }
        Statement::For {
            init,
            cond,
            update,
            body,
            ..
        } => {
            if let Some(init) = init {
                rewrite_statement(init, rewrites);
            }
            if let Some(cond) = cond {
                rewrite_expression(cond, rewrites);
            }
            if let Some(update) = update {
                rewrite_expression(update, rewrites);
            }
            for stmt in body.iter_mut() {
                rewrite_statement(stmt, rewrites);
            }
        }
        Statement::ForOf {
            iterable, body, ..
        } => {
            rewrite_expression(iterable, rewrites);
            for stmt in body.iter_mut() {
                rewrite_statement(stmt, rewrites);
            }
        }
        Statement::Break { .. } | Statement::Continue { .. } => {}
        Statement::Block { statements, .. } => {
            for stmt in statements.iter_mut() {
                rewrite_statement(stmt, rewrites);
            }
        }
        // Nested function bodies are optimized as their own pass.
        Statement::Function(_) => {}
        Statement::BuilderDecl { .. } => {}
        Statement::BuilderAppend { value, .. } => rewrite_expression(value, rewrites),
        Statement::BuilderFinish { .. } => {}
        Statement::ArrayReserve { .. } => {}
    }
}

/// Post-order: rewrite children first, then this node if it heads a
/// string-typed `+` chain of three or more parts.
fn rewrite_expression(expr: &mut Expression, rewrites: &mut usize) {
    match &mut expr.kind {
        ExprKind::Binary { left, right, .. } => {
            rewrite_expression(left, rewrites);
            rewrite_expression(right, rewrites);
        }
        ExprKind::Unary { operand, .. } => rewrite_expression(operand, rewrites),
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => {
            rewrite_expression(cond, rewrites);
            rewrite_expression(then, rewrites);
            rewrite_expression(otherwise, rewrites);
        }
        ExprKind::Member { object, .. } => rewrite_expression(object, rewrites),
        ExprKind::Index { object, index } => {
            rewrite_expression(object, rewrites);
            rewrite_expression(index, rewrites);
        }
        ExprKind::Assign { target, value } => {
            rewrite_expression(target, rewrites);
            rewrite_expression(value, rewrites);
        }
        ExprKind::Call { callee, args } => {
            rewrite_expression(callee, rewrites);
            for arg in args.iter_mut() {
                rewrite_expression(arg, rewrites);
            }
        }
        ExprKind::AwaitSync(inner) | ExprKind::Await(inner) => {
            rewrite_expression(inner, rewrites);
        }
        ExprKind::New { args, .. } => {
            for arg in args.iter_mut() {
                rewrite_expression(arg, rewrites);
            }
        }
        ExprKind::ArrayLiteral(elements) => {
            for element in elements.iter_mut() {
                rewrite_expression(element, rewrites);
            }
        }
        ExprKind::StructLiteral { fields } => {
            for (_, value) in fields.iter_mut() {
                rewrite_expression(value, rewrites);
            }
        }
        // A lambda is its own function body.
        ExprKind::Lambda { body, .. } => optimize_body(body, rewrites),
        ExprKind::StringBuilder { parts } => {
            for part in parts.iter_mut() {
                rewrite_expression(part, rewrites);
            }
        }
        ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::This => {}
    }

    if is_string_concat(expr) {
        let mut parts = Vec::new();
        flatten_concat(expr, &mut parts);
        if parts.len() >= 3 {
            let parts: Vec<Expression> = parts.into_iter().cloned().collect();
            *rewrites += 1;
            expr.kind = ExprKind::StringBuilder { parts };
        }
    }
}

fn is_string_concat(expr: &Expression) -> bool {
    matches!(&expr.kind, ExprKind::Binary { op: BinOp::Add, .. }) && expr.ty.is_string()
}

/// Flatten a string `+` chain into its parts, left to right.
fn flatten_concat<'e>(expr: &'e Expression, out: &mut Vec<&'e Expression>) {
    if let ExprKind::Binary {
        op: BinOp::Add,
        left,
        right,
    } = &expr.kind
    {
        if expr.ty.is_string() {
            flatten_concat(left, out);
            flatten_concat(right, out);
            return;
        }
    }
    out.push(expr);
}

// =============================================================================
// Recognizer 2: array reserve for counted push loops
// =============================================================================

fn insert_array_reserves(body: &mut Vec<Statement>, rewrites: &mut usize) {
    let mut index = 0;
    while index < body.len() {
        let reserves = match &body[index] {
            Statement::For {
                init: Some(init),
                cond: Some(cond),
                body: loop_body,
                ..
            } => counted_push_reserves(init, cond, loop_body),
            _ => Vec::new(),
        };
        let count = reserves.len();
        for (offset, stmt) in reserves.into_iter().enumerate() {
            body.insert(index + offset, stmt);
            *rewrites += 1;
        }
        index += count + 1;
    }
}

/// For `for (let i = ...; i < bound; ...)` with `arr.push(x)` in the body,
/// produce one `arr.reserve(bound)` per pushed array. The bound must be an
/// identifier or a literal.
fn counted_push_reserves(
    init: &Statement,
    cond: &Expression,
    loop_body: &[Statement],
) -> Vec<Statement> {
    let Statement::VariableDeclaration {
        name: induction, ..
    } = init
    else {
        return Vec::new();
    };
    let ExprKind::Binary {
        op: BinOp::Lt | BinOp::Le,
        left,
        right,
    } = &cond.kind
    else {
        return Vec::new();
    };
    if left.as_identifier() != Some(induction.as_str()) {
        return Vec::new();
    }
    let bound_ok = matches!(
        &right.kind,
        ExprKind::Identifier(_) | ExprKind::Literal(_)
    );
    if !bound_ok {
        return Vec::new();
    }

    let mut seen = Vec::new();
    let mut reserves = Vec::new();
    for stmt in loop_body {
        let Statement::Expression { expr, loc } = stmt else {
            continue;
        };
        let ExprKind::Call { callee, .. } = &expr.kind else {
            continue;
        };
        let ExprKind::Member { object, member, .. } = &callee.kind else {
            continue;
        };
        if member != "push" {
            continue;
        }
        let Some(array) = object.as_identifier() else {
            continue;
        };
        if seen.iter().any(|name| name == array) {
            continue;
        }
        seen.push(array.to_string());
        reserves.push(Statement::ArrayReserve {
            array: (**object).clone(),
            capacity: (**right).clone(),
            loc: loc.clone(),
        });
    }
    reserves
}

// =============================================================================
// Recognizer 3: recursive nested functions
// =============================================================================

fn mark_recursive_functions(body: &mut [Statement]) {
    for stmt in body.iter_mut() {
        if let Statement::Function(func) = stmt {
            if body_calls_name(&func.body, &func.name) {
                func.is_recursive = true;
            }
        }
    }
}

/// Exhaustive walk: does any statement in the body call `name`?
fn body_calls_name(body: &[Statement], name: &str) -> bool {
    let mut found = false;
    for stmt in body {
        visit_calls(stmt, &mut |callee: &Expression| {
            if callee.as_identifier() == Some(name) {
                found = true;
            }
        });
    }
    found
}

fn visit_calls(stmt: &Statement, visit: &mut impl FnMut(&Expression)) {
    visit_statement_exprs(stmt, &mut |expr: &Expression| {
        if let ExprKind::Call { callee, .. } = &expr.kind {
            visit(callee);
        }
    });
}

fn visit_statement_exprs(stmt: &Statement, visit: &mut impl FnMut(&Expression)) {
    match stmt {
        Statement::VariableDeclaration { initializer, .. } => {
            if let Some(init) = initializer {
                visit_expr_tree(init, visit);
            }
        }
        Statement::Assignment { target, value, .. } => {
            visit_expr_tree(target, visit);
            visit_expr_tree(value, visit);
        }
        Statement::Expression { expr, .. } => visit_expr_tree(expr, visit),
        Statement::Return { value, .. } => {
            if let Some(value) = value {
                visit_expr_tree(value, visit);
            }
        }
        Statement::Throw { expr, .. } => visit_expr_tree(expr, visit),
        Statement::Try {
            body,
            catch,
            finally,
            ..
        } => {
            for stmt in body {
                visit_statement_exprs(stmt, visit);
            }
            if let Some(catch) = catch {
                for stmt in &catch.body {
                    visit_statement_exprs(stmt, visit);
                }
            }
            if let Some(finally) = finally {
                for stmt in finally {
                    visit_statement_exprs(stmt, visit);
                }
            }
        }
        Statement::If {
            cond,
            then,
            otherwise,
            ..
        } => {
            visit_expr_tree(cond, visit);
            for stmt in then {
                visit_statement_exprs(stmt, visit);
            }
            if let Some(otherwise) = otherwise {
                for stmt in otherwise {
                    visit_statement_exprs(stmt, visit);
                }
            }
        }
        Statement::While { cond, body, .. } => {
            visit_expr_tree(cond, visit);
            for stmt in body {
                visit_statement_exprs(stmt, visit);
            }
        }
        Statement::For {
            init,
            cond,
            update,
            body,
            ..
        } => {
            if let Some(init) = init {
                visit_statement_exprs(init, visit);
            }
            if let Some(cond) = cond {
                visit_expr_tree(cond, visit);
            }
            if let Some(update) = update {
                visit_expr_tree(update, visit);
            }
            for stmt in body {
                visit_statement_exprs(stmt, visit);
            }
        }
        Statement::ForOf {
            iterable, body, ..
        } => {
            visit_expr_tree(iterable, visit);
            for stmt in body {
                visit_statement_exprs(stmt, visit);
            }
        }
        Statement::Break { .. } | Statement::Continue { .. } => {}
        Statement::Block { statements, .. } => {
            for stmt in statements {
                visit_statement_exprs(stmt, visit);
            }
        }
        Statement::Function(func) => {
            for stmt in &func.body {
                visit_statement_exprs(stmt, visit);
            }
        }
        Statement::BuilderDecl { .. } => {}
        Statement::BuilderAppend { value, .. } => visit_expr_tree(value, visit),
        Statement::BuilderFinish { target, .. } => visit_expr_tree(target, visit),
        Statement::ArrayReserve {
            array, capacity, ..
        } => {
            visit_expr_tree(array, visit);
            visit_expr_tree(capacity, visit);
        }
    }
}

fn visit_expr_tree(expr: &Expression, visit: &mut impl FnMut(&Expression)) {
    visit(expr);
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::This => {}
        ExprKind::Binary { left, right, .. } => {
            visit_expr_tree(left, visit);
            visit_expr_tree(right, visit);
        }
        ExprKind::Unary { operand, .. } => visit_expr_tree(operand, visit),
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => {
            visit_expr_tree(cond, visit);
            visit_expr_tree(then, visit);
            visit_expr_tree(otherwise, visit);
        }
        ExprKind::Member { object, .. } => visit_expr_tree(object, visit),
        ExprKind::Index { object, index } => {
            visit_expr_tree(object, visit);
            visit_expr_tree(index, visit);
        }
        ExprKind::Assign { target, value } => {
            visit_expr_tree(target, visit);
            visit_expr_tree(value, visit);
        }
        ExprKind::Call { callee, args } => {
            visit_expr_tree(callee, visit);
            for arg in args {
                visit_expr_tree(arg, visit);
            }
        }
        ExprKind::AwaitSync(inner) | ExprKind::Await(inner) => visit_expr_tree(inner, visit),
        ExprKind::New { args, .. } => {
            for arg in args {
                visit_expr_tree(arg, visit);
            }
        }
        ExprKind::ArrayLiteral(elements) => {
            for element in elements {
                visit_expr_tree(element, visit);
            }
        }
        ExprKind::StructLiteral { fields } => {
            for (_, value) in fields {
                visit_expr_tree(value, visit);
            }
        }
        ExprKind::Lambda { body, .. } => {
            for stmt in body {
                visit_statement_exprs(stmt, visit);
            }
        }
        ExprKind::StringBuilder { parts } => {
            for part in parts {
                visit_expr_tree(part, visit);
            }
        }
    }
}
