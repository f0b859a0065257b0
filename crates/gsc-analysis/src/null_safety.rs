//! The `use<T>` escape rules.
//!
//! A `use<T>` reference is a non-owning loan: it may enter a function as a
//! parameter and live in a local, but it may never be stored in a field or
//! interface property (GS401), declared as a return type (GS402), or
//! returned through an identifier regardless of the declared return type
//! (GS403).
//!
//! The whole pass is a no-op in gc mode.

use tracing::debug;

use gsc_common::diagnostics::{Diagnostic, codes, diagnostic};
use gsc_common::MemoryMode;
use gsc_ir::{
    Declaration, ExprKind, Expression, Function, Module, Ownership, Statement, Type,
};

/// Check one module. Diagnostics come out in declaration order.
pub fn check_module(module: &Module, mode: MemoryMode) -> Vec<Diagnostic> {
    if !mode.ownership_is_fatal() {
        return Vec::new();
    }
    let mut diagnostics = Vec::new();
    for decl in &module.declarations {
        match decl {
            Declaration::Class(class) => {
                for field in &class.fields {
                    if contains_use(&field.ty) {
                        let path = format!("{}.{}", class.name, field.name);
                        diagnostics.push(
                            diagnostic(codes::USE_IN_FIELD, &[&path])
                                .at_opt(field.loc.clone()),
                        );
                    }
                }
                if let Some(ctor) = &class.constructor {
                    check_body(&ctor.body, &mut diagnostics);
                }
                for method in &class.methods {
                    if method.return_type.is_use() {
                        diagnostics.push(
                            diagnostic(codes::USE_AS_RETURN_TYPE, &[])
                                .at_opt(method.loc.clone()),
                        );
                    }
                    check_body(&method.body, &mut diagnostics);
                }
            }
            Declaration::Interface(iface) => {
                for prop in &iface.properties {
                    if contains_use(&prop.ty) {
                        let path = format!("{}.{}", iface.name, prop.name);
                        diagnostics.push(
                            diagnostic(codes::USE_IN_FIELD, &[&path]).at_opt(prop.loc.clone()),
                        );
                    }
                }
                for method in &iface.methods {
                    if method.return_type.is_use() {
                        diagnostics.push(
                            diagnostic(codes::USE_AS_RETURN_TYPE, &[])
                                .at_opt(method.loc.clone()),
                        );
                    }
                }
            }
            Declaration::Function(func) => check_function(func, &mut diagnostics),
            Declaration::TypeAlias(_) | Declaration::Const(_) => {}
        }
    }
    check_body(&module.init_statements, &mut diagnostics);
    debug!(
        module = %module.name,
        count = diagnostics.len(),
        "null-safety check finished"
    );
    diagnostics
}

fn check_function(func: &Function, diagnostics: &mut Vec<Diagnostic>) {
    if func.return_type.is_use() {
        diagnostics.push(diagnostic(codes::USE_AS_RETURN_TYPE, &[]).at_opt(func.loc.clone()));
    }
    check_body(&func.body, diagnostics);
}

/// Walk a body for escaping returns, nested functions, and lambdas.
fn check_body(body: &[Statement], diagnostics: &mut Vec<Diagnostic>) {
    for stmt in body {
        match stmt {
            Statement::Return {
                value: Some(value),
                loc,
            } => {
                if let ExprKind::Identifier(name) = &value.kind {
                    if value.ty.is_use() {
                        diagnostics.push(
                            diagnostic(codes::USE_RETURNED, &[name])
                                .at_opt(value.loc.clone().or_else(|| loc.clone())),
                        );
                    }
                }
                check_expression(value, diagnostics);
            }
            Statement::VariableDeclaration { initializer, .. } => {
                if let Some(init) = initializer {
                    check_expression(init, diagnostics);
                }
            }
            Statement::Assignment { target, value, .. } => {
                check_expression(target, diagnostics);
                check_expression(value, diagnostics);
            }
            Statement::Expression { expr, .. } => check_expression(expr, diagnostics),
            Statement::Throw { expr, .. } => check_expression(expr, diagnostics),
            Statement::Try {
                body,
                catch,
                finally,
                ..
            } => {
                check_body(body, diagnostics);
                if let Some(catch) = catch {
                    check_body(&catch.body, diagnostics);
                }
                if let Some(finally) = finally {
                    check_body(finally, diagnostics);
                }
            }
            Statement::If {
                cond,
                then,
                otherwise,
                ..
            } => {
                check_expression(cond, diagnostics);
                check_body(then, diagnostics);
                if let Some(otherwise) = otherwise {
                    check_body(otherwise, diagnostics);
                }
            }
            Statement::While { cond, body, .. } => {
                check_expression(cond, diagnostics);
                check_body(body, diagnostics);
            }
            Statement::For {
                init,
                cond,
                update,
                body,
                ..
            } => {
                if let Some(init) = init {
                    check_body(std::slice::from_ref(init), diagnostics);
                }
                if let Some(cond) = cond {
                    check_expression(cond, diagnostics);
                }
                if let Some(update) = update {
                    check_expression(update, diagnostics);
                }
                check_body(body, diagnostics);
            }
            Statement::ForOf {
                iterable, body, ..
            } => {
                check_expression(iterable, diagnostics);
                check_body(body, diagnostics);
            }
            Statement::Block { statements, .. } => check_body(statements, diagnostics),
            Statement::Function(func) => check_function(func, diagnostics),
            Statement::Return { value: None, .. }
            | Statement::Break { .. }
            | Statement::Continue { .. }
            | Statement::BuilderDecl { .. }
            | Statement::BuilderFinish { .. } => {}
            Statement::BuilderAppend { value, .. } => check_expression(value, diagnostics),
            Statement::ArrayReserve { .. } => {}
        }
    }
}

/// Lambdas are functions too: their declared return types obey GS402 and
/// their bodies are walked for GS403.
fn check_expression(expr: &Expression, diagnostics: &mut Vec<Diagnostic>) {
    match &expr.kind {
        ExprKind::Lambda {
            return_type, body, ..
        } => {
            if return_type.is_use() {
                diagnostics
                    .push(diagnostic(codes::USE_AS_RETURN_TYPE, &[]).at_opt(expr.loc.clone()));
            }
            check_body(body, diagnostics);
        }
        ExprKind::Binary { left, right, .. } => {
            check_expression(left, diagnostics);
            check_expression(right, diagnostics);
        }
        ExprKind::Unary { operand, .. } => check_expression(operand, diagnostics),
        ExprKind::Conditional {
            cond,
            then,
            otherwise,
        } => {
            check_expression(cond, diagnostics);
            check_expression(then, diagnostics);
            check_expression(otherwise, diagnostics);
        }
        ExprKind::Member { object, .. } => check_expression(object, diagnostics),
        ExprKind::Index { object, index } => {
            check_expression(object, diagnostics);
            check_expression(index, diagnostics);
        }
        ExprKind::Assign { target, value } => {
            check_expression(target, diagnostics);
            check_expression(value, diagnostics);
        }
        ExprKind::Call { callee, args } => {
            check_expression(callee, diagnostics);
            for arg in args {
                check_expression(arg, diagnostics);
            }
        }
        ExprKind::AwaitSync(inner) | ExprKind::Await(inner) => check_expression(inner, diagnostics),
        ExprKind::New { args, .. } => {
            for arg in args {
                check_expression(arg, diagnostics);
            }
        }
        ExprKind::ArrayLiteral(elements) => {
            for element in elements {
                check_expression(element, diagnostics);
            }
        }
        ExprKind::StructLiteral { fields } => {
            for (_, value) in fields {
                check_expression(value, diagnostics);
            }
        }
        ExprKind::StringBuilder { parts } => {
            for part in parts {
                check_expression(part, diagnostics);
            }
        }
        ExprKind::Literal(_) | ExprKind::Identifier(_) | ExprKind::This => {}
    }
}

/// Whether `use<T>` occurs anywhere inside a type, however deeply nested.
fn contains_use(ty: &Type) -> bool {
    if ty.ownership() == Ownership::Use {
        return true;
    }
    match ty.resolved() {
        Type::Named { type_args, .. } => type_args.iter().any(contains_use),
        Type::Struct { fields, .. } => fields.iter().any(|f| contains_use(&f.ty)),
        Type::Array { element, .. } => contains_use(element),
        Type::Map { key, value, .. } => contains_use(key) || contains_use(value),
        Type::Union { variants } => variants.iter().any(contains_use),
        Type::Intersection { members } => members.iter().any(contains_use),
        Type::Nullable { inner } => contains_use(inner),
        Type::Function {
            params,
            return_type,
        } => params.iter().any(contains_use) || contains_use(return_type),
        Type::Promise { result } => contains_use(result),
        Type::Primitive(_) => false,
        Type::Alias { .. } => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_use_sees_through_nesting() {
        let deep = Type::map(
            Type::STRING,
            Type::array(Type::Struct {
                fields: vec![gsc_ir::StructField {
                    name: "p".into(),
                    ty: Type::class("Pool", Ownership::Use),
                }],
                ownership: Ownership::Value,
            }),
        );
        assert!(contains_use(&deep));
        assert!(!contains_use(&Type::array(Type::class(
            "Pool",
            Ownership::Share
        ))));
    }
}
