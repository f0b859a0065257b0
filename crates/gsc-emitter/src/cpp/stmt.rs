//! IR statement -> C++ statement text.

use gsc_ir::{CatchClause, Statement};

use crate::sanitize;
use crate::writer::SourceWriter;
use crate::EmitError;

use super::CppEmitter;

impl CppEmitter {
    pub(crate) fn emit_body(
        &mut self,
        body: &[Statement],
        writer: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        for stmt in body {
            self.emit_statement(stmt, writer)?;
        }
        Ok(())
    }

    pub(crate) fn emit_statement(
        &mut self,
        stmt: &Statement,
        writer: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        match stmt {
            Statement::VariableDeclaration {
                name,
                ty,
                mutable,
                initializer,
                ..
            } => {
                let cpp_ty = self.cpp_type(ty)?;
                let prefix = if *mutable { "" } else { "const " };
                let name = sanitize::identifier(name);
                match initializer {
                    Some(init) => {
                        let init = self.cpp_expr(init)?;
                        writer.line(&format!("{prefix}{cpp_ty} {name} = {init};"));
                    }
                    None => writer.line(&format!("{prefix}{cpp_ty} {name}{{}};")),
                }
            }
            Statement::Assignment { target, value, .. } => {
                let target = self.cpp_expr(target)?;
                let value = self.cpp_expr(value)?;
                writer.line(&format!("{target} = {value};"));
            }
            Statement::Expression { expr, .. } => {
                let expr = self.cpp_expr(expr)?;
                writer.line(&format!("{expr};"));
            }
            Statement::Return { value, .. } => {
                // Returns in async bodies are coroutine returns.
                let keyword = if self.in_async { "co_return" } else { "return" };
                match value {
                    Some(value) => {
                        let value = self.cpp_expr(value)?;
                        writer.line(&format!("{keyword} {value};"));
                    }
                    None => writer.line(&format!("{keyword};")),
                }
            }
            Statement::Throw { expr, .. } => {
                let expr = self.cpp_expr(expr)?;
                writer.line(&format!("throw gs::Error({expr});"));
            }
            Statement::Try {
                body,
                catch,
                finally,
                ..
            } => {
                // No native finally; the runtime's scope guard runs the
                // block on every exit path.
                if let Some(finally) = finally {
                    writer.line("{");
                    writer.increase_indent();
                    writer.line("gs::Finally __finally([&] {");
                    writer.increase_indent();
                    self.emit_body(finally, writer)?;
                    writer.decrease_indent();
                    writer.line("});");
                    self.emit_try_catch(body, catch.as_ref(), writer)?;
                    writer.decrease_indent();
                    writer.line("}");
                } else {
                    self.emit_try_catch(body, catch.as_ref(), writer)?;
                }
            }
            Statement::If {
                cond,
                then,
                otherwise,
                ..
            } => {
                let cond = self.cpp_expr(cond)?;
                writer.line(&format!("if ({cond}) {{"));
                writer.increase_indent();
                self.emit_body(then, writer)?;
                writer.decrease_indent();
                match otherwise {
                    Some(otherwise) => {
                        writer.line("} else {");
                        writer.increase_indent();
                        self.emit_body(otherwise, writer)?;
                        writer.decrease_indent();
                        writer.line("}");
                    }
                    None => writer.line("}"),
                }
            }
            Statement::While { cond, body, .. } => {
                let cond = self.cpp_expr(cond)?;
                writer.line(&format!("while ({cond}) {{"));
                writer.increase_indent();
                self.emit_body(body, writer)?;
                writer.decrease_indent();
                writer.line("}");
            }
            Statement::For {
                init,
                cond,
                update,
                body,
                ..
            } => {
                let init = match init {
                    Some(init) => self.inline_statement(init)?,
                    None => String::new(),
                };
                let cond = match cond {
                    Some(cond) => self.cpp_expr(cond)?,
                    None => String::new(),
                };
                let update = match update {
                    Some(update) => self.cpp_expr(update)?,
                    None => String::new(),
                };
                writer.line(&format!("for ({init}; {cond}; {update}) {{"));
                writer.increase_indent();
                self.emit_body(body, writer)?;
                writer.decrease_indent();
                writer.line("}");
            }
            Statement::ForOf {
                variable,
                iterable,
                body,
                ..
            } => {
                let iterable = self.cpp_expr(iterable)?;
                writer.line(&format!(
                    "for (auto& {} : {iterable}) {{",
                    sanitize::identifier(variable)
                ));
                writer.increase_indent();
                self.emit_body(body, writer)?;
                writer.decrease_indent();
                writer.line("}");
            }
            Statement::Break { .. } => writer.line("break;"),
            Statement::Continue { .. } => writer.line("continue;"),
            Statement::Block { statements, .. } => {
                writer.line("{");
                writer.increase_indent();
                self.emit_body(statements, writer)?;
                writer.decrease_indent();
                writer.line("}");
            }
            Statement::Function(func) => {
                // Nested functions become local callables; a recursive one
                // needs the named std::function form to see itself.
                let name = sanitize::identifier(&func.name);
                let ret = self.cpp_type(&func.return_type)?;
                let params: Vec<String> = func
                    .params
                    .iter()
                    .map(|param| {
                        Ok(format!(
                            "{} {}",
                            self.cpp_type(&param.ty)?,
                            sanitize::identifier(&param.name)
                        ))
                    })
                    .collect::<Result<_, EmitError>>()?;
                let param_types: Vec<String> = func
                    .params
                    .iter()
                    .map(|param| self.cpp_type(&param.ty))
                    .collect::<Result<_, _>>()?;
                if func.is_recursive {
                    writer.line(&format!(
                        "std::function<{ret}({})> {name} = [&]({}) -> {ret} {{",
                        param_types.join(", "),
                        params.join(", ")
                    ));
                } else {
                    writer.line(&format!(
                        "auto {name} = [&]({}) -> {ret} {{",
                        params.join(", ")
                    ));
                }
                writer.increase_indent();
                self.emit_body(&func.body, writer)?;
                writer.decrease_indent();
                writer.line("};");
            }
            Statement::BuilderDecl { name, .. } => {
                writer.line(&format!("gs::StringBuilder {};", sanitize::identifier(name)));
            }
            Statement::BuilderAppend { builder, value, .. } => {
                let value = self.cpp_expr(value)?;
                writer.line(&format!(
                    "{}.append({value});",
                    sanitize::identifier(builder)
                ));
            }
            Statement::BuilderFinish {
                builder, target, ..
            } => {
                let target = self.cpp_expr(target)?;
                writer.line(&format!(
                    "{target} = {}.str();",
                    sanitize::identifier(builder)
                ));
            }
            Statement::ArrayReserve {
                array, capacity, ..
            } => {
                let op = self.member_operator(&array.ty);
                let array = self.cpp_expr(array)?;
                let capacity = self.cpp_expr(capacity)?;
                writer.line(&format!("{array}{op}reserve({capacity});"));
            }
        }
        Ok(())
    }

    fn emit_try_catch(
        &mut self,
        body: &[Statement],
        catch: Option<&CatchClause>,
        writer: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        writer.line("try {");
        writer.increase_indent();
        self.emit_body(body, writer)?;
        writer.decrease_indent();
        match catch {
            Some(clause) => {
                writer.line(&format!(
                    "}} catch (const gs::Error& {}) {{",
                    sanitize::identifier(&clause.name)
                ));
                writer.increase_indent();
                self.emit_body(&clause.body, writer)?;
                writer.decrease_indent();
                writer.line("}");
            }
            None => {
                writer.line("} catch (...) {");
                writer.line("}");
            }
        }
        Ok(())
    }

    /// A statement rendered without its trailing `;\n`, for `for` headers.
    fn inline_statement(&mut self, stmt: &Statement) -> Result<String, EmitError> {
        match stmt {
            Statement::VariableDeclaration {
                name,
                ty,
                mutable,
                initializer,
                ..
            } => {
                let cpp_ty = self.cpp_type(ty)?;
                let prefix = if *mutable { "" } else { "const " };
                let name = sanitize::identifier(name);
                match initializer {
                    Some(init) => Ok(format!("{prefix}{cpp_ty} {name} = {}", self.cpp_expr(init)?)),
                    None => Ok(format!("{prefix}{cpp_ty} {name}{{}}")),
                }
            }
            Statement::Assignment { target, value, .. } => Ok(format!(
                "{} = {}",
                self.cpp_expr(target)?,
                self.cpp_expr(value)?
            )),
            Statement::Expression { expr, .. } => self.cpp_expr(expr),
            other => Err(EmitError::new(
                format!("unsupported statement in for-loop header: {other:?}"),
                other.loc().cloned(),
            )),
        }
    }
}
