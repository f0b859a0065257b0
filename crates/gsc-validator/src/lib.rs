//! Good-parts subset validator.
//!
//! Walks the source AST of one module and reports every construct outside
//! the GoodScript subset as a `GS1xx` diagnostic. The walk never halts on
//! the first finding; diagnostics come out in source order. A "good
//! program" is one that produces no error-severity diagnostic here.
//!
//! The validator runs before lowering and is the only pass that ever sees
//! the forbidden constructs; the lowerer treats them as internal errors.

use tracing::debug;

use gsc_ast::{
    BinaryOp, ClassDecl, Declaration, Expression, FunctionDecl, InterfaceDecl, Item, LambdaBody,
    Literal, Module, Statement, SwitchCase, TypeExpr, UnaryOp,
};
use gsc_common::diagnostics::{Diagnostic, codes, diagnostic};
use gsc_common::Loc;

/// Boxed primitive wrappers whose constructor form is rejected (GS116).
/// Plain conversion calls (`Number("3")`) stay legal.
const PRIMITIVE_WRAPPERS: &[&str] = &["Number", "String", "Boolean"];

/// Validate a single module, producing its subset diagnostics in source
/// order.
pub fn validate_module(module: &Module) -> Vec<Diagnostic> {
    let mut validator = Validator {
        file: &module.path,
        diagnostics: Vec::new(),
        this_allowed: false,
    };
    for item in &module.items {
        match item {
            Item::Declaration(decl) => validator.check_declaration(decl),
            Item::Statement(stmt) => validator.check_statement(stmt),
        }
    }
    debug!(
        module = %module.path,
        count = validator.diagnostics.len(),
        "subset validation finished"
    );
    validator.diagnostics
}

struct Validator<'a> {
    file: &'a str,
    diagnostics: Vec<Diagnostic>,
    /// Whether `this` is legal at the current position (inside class
    /// methods, constructors, field initializers, and arrow lambdas
    /// nested in them).
    this_allowed: bool,
}

impl<'a> Validator<'a> {
    fn report(&mut self, code: u32, args: &[&str], loc: Option<Loc>) {
        let loc = loc.map(|l| l.in_file(self.file));
        self.diagnostics.push(diagnostic(code, args).at_opt(loc));
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn check_declaration(&mut self, decl: &Declaration) {
        match decl {
            Declaration::Function(func) => self.check_function(func),
            Declaration::Class(class) => self.check_class(class),
            Declaration::Interface(iface) => self.check_interface(iface),
            Declaration::TypeAlias(alias) => self.check_type(&alias.ty),
            Declaration::Const(konst) => {
                self.check_type(&konst.ty);
                self.check_expression(&konst.initializer);
            }
        }
    }

    fn check_function(&mut self, func: &FunctionDecl) {
        for param in &func.params {
            self.check_type(&param.ty);
        }
        self.check_type(&func.return_type);
        let was_allowed = std::mem::replace(&mut self.this_allowed, false);
        self.check_body(&func.body);
        self.this_allowed = was_allowed;
    }

    fn check_class(&mut self, class: &ClassDecl) {
        let was_allowed = std::mem::replace(&mut self.this_allowed, true);
        for field in &class.fields {
            self.check_type(&field.ty);
            if let Some(init) = &field.initializer {
                self.check_expression(init);
            }
        }
        if let Some(ctor) = &class.constructor {
            for param in &ctor.params {
                self.check_type(&param.ty);
            }
            self.check_body(&ctor.body);
        }
        for method in &class.methods {
            for param in &method.params {
                self.check_type(&param.ty);
            }
            self.check_type(&method.return_type);
            self.check_body(&method.body);
        }
        self.this_allowed = was_allowed;
    }

    fn check_interface(&mut self, iface: &InterfaceDecl) {
        for prop in &iface.properties {
            self.check_type(&prop.ty);
        }
        for method in &iface.methods {
            for param in &method.params {
                self.check_type(&param.ty);
            }
            self.check_type(&method.return_type);
        }
    }

    fn check_body(&mut self, body: &[Statement]) {
        for stmt in body {
            self.check_statement(stmt);
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn check_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::With { object, body, loc } => {
                self.report(codes::WITH_STATEMENT, &[], *loc);
                self.check_expression(object);
                self.check_body(body);
            }
            Statement::ForIn {
                object, body, loc, ..
            } => {
                self.report(codes::FOR_IN_LOOP, &[], *loc);
                self.check_expression(object);
                self.check_body(body);
            }
            Statement::VariableDeclaration {
                keyword,
                declared_type,
                initializer,
                loc,
                ..
            } => {
                if *keyword == gsc_ast::DeclKeyword::Var {
                    self.report(codes::VAR_DECLARATION, &[], *loc);
                }
                if let Some(ty) = declared_type {
                    self.check_type(ty);
                }
                if let Some(init) = initializer {
                    self.check_expression(init);
                }
            }
            Statement::Expression { expr, .. } => self.check_expression(expr),
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    self.check_expression(value);
                }
            }
            Statement::Throw { expr, .. } => self.check_expression(expr),
            Statement::Try {
                body,
                catch,
                finally,
                ..
            } => {
                self.check_body(body);
                if let Some(catch) = catch {
                    self.check_body(&catch.body);
                }
                if let Some(finally) = finally {
                    self.check_body(finally);
                }
            }
            Statement::If {
                cond,
                then,
                otherwise,
                ..
            } => {
                self.check_condition(cond);
                self.check_expression(cond);
                self.check_body(then);
                if let Some(otherwise) = otherwise {
                    self.check_body(otherwise);
                }
            }
            Statement::While { cond, body, .. } => {
                self.check_condition(cond);
                self.check_expression(cond);
                self.check_body(body);
            }
            Statement::For {
                init,
                cond,
                update,
                body,
                ..
            } => {
                if let Some(init) = init {
                    self.check_statement(init);
                }
                if let Some(cond) = cond {
                    self.check_expression(cond);
                }
                if let Some(update) = update {
                    self.check_expression(update);
                }
                self.check_body(body);
            }
            Statement::ForOf {
                variable_type,
                iterable,
                body,
                ..
            } => {
                if let Some(ty) = variable_type {
                    self.check_type(ty);
                }
                self.check_expression(iterable);
                self.check_body(body);
            }
            Statement::Switch {
                subject, cases, ..
            } => {
                self.check_expression(subject);
                self.check_switch_cases(cases);
            }
            Statement::Break { .. } | Statement::Continue { .. } => {}
            Statement::Block { statements, .. } => self.check_body(statements),
            Statement::Function(decl) => self.check_function(decl),
        }
    }

    /// GS113: a non-empty case must end with `break`, `return`, `throw`, or
    /// `continue`. Empty bodies group with the following case and are fine.
    fn check_switch_cases(&mut self, cases: &[SwitchCase]) {
        for (index, case) in cases.iter().enumerate() {
            if let Some(test) = &case.test {
                self.check_expression(test);
            }
            self.check_body(&case.body);
            let is_last = index + 1 == cases.len();
            if !case.body.is_empty() && !is_last && !ends_terminal(&case.body) {
                self.report(codes::SWITCH_FALLTHROUGH, &[], case.loc);
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn check_expression(&mut self, expr: &Expression) {
        match expr {
            Expression::Literal { .. } => {}
            // GS109 checks written type annotations only; the static types
            // the oracle attaches to expressions are not re-reported here.
            Expression::Identifier { name, loc, .. } => {
                if name == "arguments" {
                    self.report(codes::ARGUMENTS_OBJECT, &[], *loc);
                }
            }
            Expression::This { loc } => {
                if !self.this_allowed {
                    self.report(codes::THIS_OUTSIDE_METHOD, &[], *loc);
                }
            }
            Expression::Binary {
                op,
                left,
                right,
                loc,
                ..
            } => {
                match op {
                    BinaryOp::LooseEq => self.report(codes::LOOSE_EQUALITY, &[], *loc),
                    BinaryOp::LooseNe => self.report(codes::LOOSE_INEQUALITY, &[], *loc),
                    _ => {}
                }
                self.check_expression(left);
                self.check_expression(right);
            }
            Expression::Unary { op, operand, loc } => {
                match op {
                    UnaryOp::Delete => self.report(codes::DELETE_OPERATOR, &[], *loc),
                    UnaryOp::Void => self.report(codes::VOID_OPERATOR, &[], *loc),
                    UnaryOp::Not => self.check_condition(operand),
                    _ => {}
                }
                self.check_expression(operand);
            }
            Expression::Conditional {
                cond,
                then,
                otherwise,
                ..
            } => {
                self.check_expression(cond);
                self.check_expression(then);
                self.check_expression(otherwise);
            }
            Expression::Member {
                object,
                member,
                loc,
                ..
            } => {
                if member == "prototype" || member == "__proto__" {
                    self.report(codes::PROTOTYPE_MUTATION, &[], *loc);
                }
                self.check_expression(object);
            }
            Expression::Index { object, index, .. } => {
                self.check_expression(object);
                self.check_expression(index);
            }
            Expression::Assign { target, value, .. } => {
                self.check_expression(target);
                self.check_expression(value);
            }
            Expression::Call {
                callee, args, loc, ..
            } => {
                self.check_call(callee, args, *loc);
            }
            Expression::New {
                class_name,
                args,
                loc,
                ..
            } => {
                if class_name == "Function" {
                    self.report(codes::EVAL_CALL, &[], *loc);
                } else if PRIMITIVE_WRAPPERS.contains(&class_name.as_str()) {
                    self.report(codes::PRIMITIVE_WRAPPER_NEW, &[class_name], *loc);
                }
                for arg in args {
                    self.check_expression(arg);
                }
            }
            Expression::ArrayLiteral { elements, .. } => {
                for element in elements {
                    self.check_expression(element);
                }
            }
            Expression::ObjectLiteral { properties, .. } => {
                for prop in properties {
                    self.check_expression(&prop.value);
                }
            }
            Expression::Lambda {
                params,
                return_type,
                body,
                is_arrow,
                ..
            } => {
                for param in params {
                    self.check_type(&param.ty);
                }
                if let Some(ty) = return_type {
                    self.check_type(ty);
                }
                let was_allowed = self.this_allowed;
                if !is_arrow {
                    self.this_allowed = false;
                }
                match body {
                    LambdaBody::Expr(expr) => self.check_expression(expr),
                    LambdaBody::Block(statements) => self.check_body(statements),
                }
                self.this_allowed = was_allowed;
            }
            Expression::TemplateLiteral { parts, .. } => {
                for part in parts {
                    if let gsc_ast::TemplatePart::Expr(expr) = part {
                        self.check_expression(expr);
                    }
                }
            }
            Expression::Await { expr, .. } => self.check_expression(expr),
            Expression::Comma { loc, exprs } => {
                self.report(codes::COMMA_EXPRESSION, &[], *loc);
                for expr in exprs {
                    self.check_expression(expr);
                }
            }
        }
    }

    fn check_call(&mut self, callee: &Expression, args: &[Expression], loc: Option<Loc>) {
        if let Expression::Identifier { name, .. } = callee {
            match name.as_str() {
                "eval" => self.report(codes::EVAL_CALL, &[], loc),
                "require" | "import" => {
                    let literal_path = matches!(
                        args.first(),
                        Some(Expression::Literal {
                            value: Literal::String(_),
                            ..
                        })
                    );
                    if !literal_path {
                        self.report(codes::DYNAMIC_IMPORT_PATH, &[], loc);
                    }
                }
                _ => {}
            }
        }
        self.check_expression(callee);
        for arg in args {
            self.check_expression(arg);
        }
    }

    // =========================================================================
    // Conditions (GS110) and types (GS109)
    // =========================================================================

    /// GS110: `if`/`while` conditions and `!` operands must be boolean.
    fn check_condition(&mut self, expr: &Expression) {
        if !is_boolean_condition(expr) {
            self.report(codes::TRUTHY_CHECK, &[], expr.loc());
        }
    }

    fn check_type(&mut self, ty: &TypeExpr) {
        match ty {
            TypeExpr::Any { loc } => self.report(codes::ANY_TYPE, &[], *loc),
            TypeExpr::Named {
                name,
                type_args,
                loc,
            } => {
                if name == "any" {
                    self.report(codes::ANY_TYPE, &[], *loc);
                }
                for arg in type_args {
                    self.check_type(arg);
                }
            }
            TypeExpr::Object { fields, .. } => {
                for field in fields {
                    self.check_type(&field.ty);
                }
            }
            TypeExpr::Union { variants } => {
                for variant in variants {
                    self.check_type(variant);
                }
            }
            TypeExpr::Intersection { members } => {
                for member in members {
                    self.check_type(member);
                }
            }
            TypeExpr::Function {
                params,
                return_type,
            } => {
                for param in params {
                    self.check_type(param);
                }
                self.check_type(return_type);
            }
        }
    }
}

/// Whether a case body's last statement terminates the case.
fn ends_terminal(body: &[Statement]) -> bool {
    match body.last() {
        Some(
            Statement::Break { .. }
            | Statement::Return { .. }
            | Statement::Throw { .. }
            | Statement::Continue { .. },
        ) => true,
        Some(Statement::Block { statements, .. }) => ends_terminal(statements),
        _ => false,
    }
}

/// Whether an expression is an explicitly boolean condition: a comparison,
/// a boolean literal, a logical composite of those, or a value whose static
/// type is `boolean`.
fn is_boolean_condition(expr: &Expression) -> bool {
    match expr {
        Expression::Literal {
            value: Literal::Boolean(_),
            ..
        } => true,
        Expression::Binary {
            op, left, right, ..
        } => match op {
            BinaryOp::StrictEq
            | BinaryOp::StrictNe
            | BinaryOp::LooseEq
            | BinaryOp::LooseNe
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::InstanceOf => true,
            BinaryOp::And | BinaryOp::Or => {
                is_boolean_condition(left) && is_boolean_condition(right)
            }
            _ => false,
        },
        Expression::Unary {
            op: UnaryOp::Not, ..
        } => true,
        Expression::Conditional { then, otherwise, .. } => {
            is_boolean_condition(then) && is_boolean_condition(otherwise)
        }
        Expression::Await { expr, .. } => {
            matches!(
                static_type(expr),
                Some(TypeExpr::Named { name, type_args, .. })
                    if name == "Promise" && matches!(
                        type_args.first(),
                        Some(TypeExpr::Named { name, .. }) if name == "boolean"
                    )
            )
        }
        _ => matches!(
            static_type(expr),
            Some(TypeExpr::Named { name, .. }) if name == "boolean"
        ),
    }
}

/// The typechecker-computed static type of an expression, for the variants
/// that carry one.
fn static_type(expr: &Expression) -> Option<&TypeExpr> {
    match expr {
        Expression::Identifier { ty, .. }
        | Expression::Binary { ty, .. }
        | Expression::Member { ty, .. }
        | Expression::Index { ty, .. }
        | Expression::Call { ty, .. }
        | Expression::ArrayLiteral { ty, .. }
        | Expression::ObjectLiteral { ty, .. } => Some(ty),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_condition_recognizes_comparisons() {
        let cmp = Expression::Binary {
            op: BinaryOp::StrictEq,
            left: Box::new(Expression::ident("x", TypeExpr::named("string"))),
            right: Box::new(Expression::Literal {
                value: Literal::Null,
                loc: None,
            }),
            ty: TypeExpr::named("boolean"),
            loc: None,
        };
        assert!(is_boolean_condition(&cmp));
        assert!(!is_boolean_condition(&Expression::ident(
            "x",
            TypeExpr::named("string")
        )));
        assert!(is_boolean_condition(&Expression::ident(
            "ok",
            TypeExpr::named("boolean")
        )));
    }
}
