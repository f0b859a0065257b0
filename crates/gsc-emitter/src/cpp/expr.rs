//! IR expression -> C++ expression text.
//!
//! Subexpressions are parenthesized generously; readability of the emitted
//! code loses to correctness of precedence.

use gsc_common::MemoryMode;
use gsc_ir::{BinOp, ExprKind, Expression, Literal, Type, UnOp};

use crate::sanitize;
use crate::EmitError;

use super::CppEmitter;

impl CppEmitter {
    pub(crate) fn cpp_expr(&mut self, expr: &Expression) -> Result<String, EmitError> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(self.literal(literal)),
            ExprKind::Identifier(name) => Ok(sanitize::identifier(name)),
            ExprKind::This => Ok("this".to_string()),
            ExprKind::Binary { op, left, right } => {
                let lhs = self.cpp_expr(left)?;
                let rhs = self.cpp_expr(right)?;
                Ok(match op {
                    BinOp::Eq => format!("({lhs} == {rhs})"),
                    BinOp::Ne => format!("({lhs} != {rhs})"),
                    BinOp::NullishCoalesce => format!("gs::coalesce({lhs}, {rhs})"),
                    BinOp::InstanceOf => {
                        format!("gs::instance_of<{rhs}>({lhs})")
                    }
                    other => format!("({lhs} {} {rhs})", other.symbol()),
                })
            }
            ExprKind::Unary { op, operand } => {
                let operand_text = self.cpp_expr(operand)?;
                Ok(match op {
                    UnOp::TypeOf => format!("gs::type_of({operand_text})"),
                    other => format!("({}{operand_text})", other.symbol()),
                })
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => Ok(format!(
                "({} ? {} : {})",
                self.cpp_expr(cond)?,
                self.cpp_expr(then)?,
                self.cpp_expr(otherwise)?
            )),
            ExprKind::Member {
                object,
                member,
                optional,
            } => {
                let op = self.member_operator(&object.ty);
                let object_text = self.cpp_expr(object)?;
                let member = sanitize::member(member);
                if *optional {
                    // obj?.m: null-check the receiver, yield the runtime
                    // null otherwise.
                    Ok(format!(
                        "(({object_text}) ? ({object_text}){op}{member} : gs::null)"
                    ))
                } else {
                    Ok(format!("{object_text}{op}{member}"))
                }
            }
            ExprKind::Index { object, index } => {
                let deref = match self.member_operator(&object.ty) {
                    "->" => "*",
                    _ => "",
                };
                let object_text = self.cpp_expr(object)?;
                let index = self.cpp_expr(index)?;
                if deref.is_empty() {
                    Ok(format!("{object_text}[{index}]"))
                } else {
                    Ok(format!("(*{object_text})[{index}]"))
                }
            }
            ExprKind::Assign { target, value } => Ok(format!(
                "{} = {}",
                self.cpp_expr(target)?,
                self.cpp_expr(value)?
            )),
            ExprKind::Call { callee, args } => {
                let callee = self.cpp_expr(callee)?;
                let args = self.expr_list(args)?;
                Ok(format!("{callee}({args})"))
            }
            ExprKind::AwaitSync(inner) => {
                // Statement-level call of an async function: block on the
                // task.
                Ok(format!("gs::wait({})", self.cpp_expr(inner)?))
            }
            ExprKind::New {
                class_name,
                args,
                type_args,
            } => {
                let mut name = sanitize::identifier(class_name);
                if !type_args.is_empty() {
                    let args: Vec<String> = type_args
                        .iter()
                        .map(|arg| self.cpp_type(arg))
                        .collect::<Result<_, _>>()?;
                    name = format!("{name}<{}>", args.join(", "));
                }
                let args = self.expr_list(args)?;
                Ok(match self.mode {
                    MemoryMode::Gc => format!("gs::gc_new<{name}>({args})"),
                    MemoryMode::Ownership => format!("gs::make_share<{name}>({args})"),
                })
            }
            ExprKind::ArrayLiteral(elements) => {
                let element_ty = match expr.ty.resolved() {
                    Type::Array { element, .. } => self.cpp_type(element)?,
                    other => {
                        return Err(EmitError::new(
                            format!("array literal with non-array type '{other}'"),
                            expr.loc.clone(),
                        ));
                    }
                };
                let elements = self.expr_list(elements)?;
                Ok(format!("gs::Array<{element_ty}>{{{elements}}}"))
            }
            ExprKind::StructLiteral { fields } => {
                let struct_fields = match expr.ty.resolved() {
                    Type::Struct {
                        fields: struct_fields,
                        ..
                    } => struct_fields.clone(),
                    other => {
                        return Err(EmitError::new(
                            format!("object literal with non-struct type '{other}'"),
                            expr.loc.clone(),
                        ));
                    }
                };
                for field in &struct_fields {
                    self.cpp_type(&field.ty)?;
                }
                let name = self.registry.intern(&struct_fields);
                // Designated initializers follow the interned (sorted)
                // field order.
                let mut sorted: Vec<&(String, Expression)> = fields.iter().collect();
                sorted.sort_by(|a, b| a.0.cmp(&b.0));
                let inits: Vec<String> = sorted
                    .iter()
                    .map(|(field, value)| {
                        Ok(format!(
                            ".{} = {}",
                            sanitize::member(field),
                            self.cpp_expr(value)?
                        ))
                    })
                    .collect::<Result<_, EmitError>>()?;
                Ok(format!("{name}{{{}}}", inits.join(", ")))
            }
            ExprKind::Lambda {
                params,
                captures,
                body,
                return_type,
            } => {
                let capture_list: Vec<String> = captures
                    .iter()
                    .map(|capture| sanitize::identifier(&capture.name))
                    .collect();
                let params: Vec<String> = params
                    .iter()
                    .map(|param| {
                        Ok(format!(
                            "{} {}",
                            self.cpp_type(&param.ty)?,
                            sanitize::identifier(&param.name)
                        ))
                    })
                    .collect::<Result<_, EmitError>>()?;
                let ret = self.cpp_type(return_type)?;
                let mut writer = crate::writer::SourceWriter::new();
                writer.increase_indent();
                self.emit_body(body, &mut writer)?;
                let body_text = writer.finish();
                Ok(format!(
                    "[{}]({}) -> {ret} {{\n{body_text}}}",
                    capture_list.join(", "),
                    params.join(", ")
                ))
            }
            ExprKind::Await(inner) => Ok(format!("co_await {}", self.cpp_expr(inner)?)),
            ExprKind::StringBuilder { parts } => {
                let mut out = String::from("gs::StringBuilder()");
                for part in parts {
                    out.push_str(&format!(".append({})", self.cpp_expr(part)?));
                }
                out.push_str(".str()");
                Ok(out)
            }
        }
    }

    fn expr_list(&mut self, exprs: &[Expression]) -> Result<String, EmitError> {
        let parts: Vec<String> = exprs
            .iter()
            .map(|expr| self.cpp_expr(expr))
            .collect::<Result<_, _>>()?;
        Ok(parts.join(", "))
    }

    fn literal(&self, literal: &Literal) -> String {
        match literal {
            Literal::Number(value) => number_literal(*value),
            Literal::String(value) => string_literal(value),
            Literal::Boolean(value) => value.to_string(),
            Literal::Null | Literal::Undefined => "gs::null".to_string(),
        }
    }
}

/// Fraction-less doubles keep an explicit `.0` so arithmetic stays in
/// floating point.
fn number_literal(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 9e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if (ch as u32) < 0x20 => {
                out.push_str(&format!("\\x{:02x}", ch as u32));
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_literals_stay_floating() {
        assert_eq!(number_literal(100.0), "100.0");
        assert_eq!(number_literal(0.5), "0.5");
        assert_eq!(number_literal(-3.0), "-3.0");
    }

    #[test]
    fn string_literals_escape() {
        assert_eq!(string_literal("a\"b\n"), "\"a\\\"b\\n\"");
    }
}
