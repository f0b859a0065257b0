//! The same-language backend: re-renders the IR as GoodScript source.
//!
//! One `foo.gs` file per module. Types print through the IR's surface-
//! syntax rendering, so aliases keep their names and ownership markers
//! reappear as written. Peephole-introduced builder nodes render against
//! the source runtime's `StringBuilder` and `Array.reserve` surface.

use tracing::debug;

use gsc_ir::{
    BinOp, CatchClause, Class, Const, Declaration, ExprKind, Expression, Function, Interface,
    Literal, Method, Module, Param, Statement, TypeAlias, UnOp,
};

use crate::writer::SourceWriter;
use crate::{EmitError, EmitOutput, Emitter};

/// The GoodScript emitter. Stateless between modules.
#[derive(Default)]
pub struct GoodScriptEmitter {}

impl GoodScriptEmitter {
    pub fn new() -> Self {
        GoodScriptEmitter {}
    }
}

impl Emitter for GoodScriptEmitter {
    fn emit_module(&mut self, module: &Module) -> Result<EmitOutput, EmitError> {
        let mut writer = SourceWriter::new();
        writer.line("// Generated by gsc. Do not edit.");
        for import in &module.imports {
            let names: Vec<String> = import
                .names
                .iter()
                .map(|(name, alias)| match alias {
                    Some(alias) => format!("{name} as {alias}"),
                    None => name.clone(),
                })
                .collect();
            writer.line(&format!(
                "import {{ {} }} from \"./{}\";",
                names.join(", "),
                import.basename()
            ));
        }
        writer.blank_line();

        for decl in &module.declarations {
            self.emit_declaration(decl, &mut writer)?;
            writer.blank_line();
        }
        for stmt in &module.init_statements {
            self.emit_statement(stmt, &mut writer)?;
        }

        let mut output = EmitOutput::new();
        output.insert(format!("{}.gs", module.name), writer.finish());
        debug!(module = %module.name, "emitted GoodScript module");
        Ok(output)
    }
}

impl GoodScriptEmitter {
    fn emit_declaration(
        &mut self,
        decl: &Declaration,
        writer: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        match decl {
            Declaration::TypeAlias(TypeAlias { name, ty, .. }) => {
                writer.line(&format!("type {name} = {ty};"));
                Ok(())
            }
            Declaration::Const(Const {
                name,
                ty,
                initializer,
                ..
            }) => {
                let init = self.expr(initializer)?;
                writer.line(&format!("const {name}: {ty} = {init};"));
                Ok(())
            }
            Declaration::Function(func) => self.emit_function(func, writer),
            Declaration::Interface(iface) => self.emit_interface(iface, writer),
            Declaration::Class(class) => self.emit_class(class, writer),
        }
    }

    fn type_params(params: &[String]) -> String {
        if params.is_empty() {
            String::new()
        } else {
            format!("<{}>", params.join(", "))
        }
    }

    fn params(&mut self, params: &[Param]) -> Result<String, EmitError> {
        let parts: Vec<String> = params
            .iter()
            .map(|param| format!("{}: {}", param.name, param.ty))
            .collect();
        Ok(parts.join(", "))
    }

    fn emit_function(
        &mut self,
        func: &Function,
        writer: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        let asyncness = if func.is_async { "async " } else { "" };
        let params = self.params(&func.params)?;
        writer.line(&format!(
            "{asyncness}function {}{}({params}): {} {{",
            func.name,
            Self::type_params(&func.type_params),
            func.return_type
        ));
        writer.increase_indent();
        self.emit_body(&func.body, writer)?;
        writer.decrease_indent();
        writer.line("}");
        Ok(())
    }

    fn emit_interface(
        &mut self,
        iface: &Interface,
        writer: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        let extends = if iface.extends.is_empty() {
            String::new()
        } else {
            format!(" extends {}", iface.extends.join(", "))
        };
        writer.line(&format!(
            "interface {}{}{extends} {{",
            iface.name,
            Self::type_params(&iface.type_params)
        ));
        writer.increase_indent();
        for prop in &iface.properties {
            writer.line(&format!("{}: {};", prop.name, prop.ty));
        }
        for method in &iface.methods {
            let params = self.params(&method.params)?;
            writer.line(&format!(
                "{}({params}): {};",
                method.name, method.return_type
            ));
        }
        writer.decrease_indent();
        writer.line("}");
        Ok(())
    }

    fn emit_class(&mut self, class: &Class, writer: &mut SourceWriter) -> Result<(), EmitError> {
        let mut heritage = String::new();
        if let Some(base) = &class.extends {
            heritage.push_str(&format!(" extends {base}"));
        }
        if !class.implements.is_empty() {
            heritage.push_str(&format!(" implements {}", class.implements.join(", ")));
        }
        writer.line(&format!(
            "class {}{}{heritage} {{",
            class.name,
            Self::type_params(&class.type_params)
        ));
        writer.increase_indent();

        for field in &class.fields {
            let readonly = if field.is_readonly { "readonly " } else { "" };
            match &field.initializer {
                Some(init) => {
                    let init = self.expr(init)?;
                    writer.line(&format!("{readonly}{}: {} = {init};", field.name, field.ty));
                }
                None => writer.line(&format!("{readonly}{}: {};", field.name, field.ty)),
            }
        }

        if let Some(ctor) = &class.constructor {
            let params = self.params(&ctor.params)?;
            writer.line(&format!("constructor({params}) {{"));
            writer.increase_indent();
            self.emit_body(&ctor.body, writer)?;
            writer.decrease_indent();
            writer.line("}");
        }

        for method in &class.methods {
            self.emit_method(method, writer)?;
        }

        writer.decrease_indent();
        writer.line("}");
        Ok(())
    }

    fn emit_method(&mut self, method: &Method, writer: &mut SourceWriter) -> Result<(), EmitError> {
        let staticness = if method.is_static { "static " } else { "" };
        let asyncness = if method.is_async { "async " } else { "" };
        let params = self.params(&method.params)?;
        writer.line(&format!(
            "{staticness}{asyncness}{}({params}): {} {{",
            method.name, method.return_type
        ));
        writer.increase_indent();
        self.emit_body(&method.body, writer)?;
        writer.decrease_indent();
        writer.line("}");
        Ok(())
    }

    fn emit_body(
        &mut self,
        body: &[Statement],
        writer: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        for stmt in body {
            self.emit_statement(stmt, writer)?;
        }
        Ok(())
    }

    fn emit_statement(
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
                let keyword = if *mutable { "let" } else { "const" };
                match initializer {
                    Some(init) => {
                        let init = self.expr(init)?;
                        writer.line(&format!("{keyword} {name}: {ty} = {init};"));
                    }
                    None => writer.line(&format!("{keyword} {name}: {ty};")),
                }
            }
            Statement::Assignment { target, value, .. } => {
                let target = self.expr(target)?;
                let value = self.expr(value)?;
                writer.line(&format!("{target} = {value};"));
            }
            Statement::Expression { expr, .. } => {
                let expr = self.expr(expr)?;
                writer.line(&format!("{expr};"));
            }
            Statement::Return { value, .. } => match value {
                Some(value) => {
                    let value = self.expr(value)?;
                    writer.line(&format!("return {value};"));
                }
                None => writer.line("return;"),
            },
            Statement::Throw { expr, .. } => {
                let expr = self.expr(expr)?;
                writer.line(&format!("throw {expr};"));
            }
            Statement::Try {
                body,
                catch,
                finally,
                ..
            } => {
                writer.line("try {");
                writer.increase_indent();
                self.emit_body(body, writer)?;
                writer.decrease_indent();
                if let Some(CatchClause { name, body }) = catch {
                    writer.line(&format!("}} catch ({name}) {{"));
                    writer.increase_indent();
                    self.emit_body(body, writer)?;
                    writer.decrease_indent();
                }
                if let Some(finally) = finally {
                    writer.line("} finally {");
                    writer.increase_indent();
                    self.emit_body(finally, writer)?;
                    writer.decrease_indent();
                }
                writer.line("}");
            }
            Statement::If {
                cond,
                then,
                otherwise,
                ..
            } => {
                let cond = self.expr(cond)?;
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
                let cond = self.expr(cond)?;
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
                    Some(cond) => self.expr(cond)?,
                    None => String::new(),
                };
                let update = match update {
                    Some(update) => self.expr(update)?,
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
                let iterable = self.expr(iterable)?;
                writer.line(&format!("for (const {variable} of {iterable}) {{"));
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
            Statement::Function(func) => self.emit_function(func, writer)?,
            Statement::BuilderDecl { name, .. } => {
                writer.line(&format!("let {name} = new StringBuilder();"));
            }
            Statement::BuilderAppend { builder, value, .. } => {
                let value = self.expr(value)?;
                writer.line(&format!("{builder}.append({value});"));
            }
            Statement::BuilderFinish {
                builder, target, ..
            } => {
                let target = self.expr(target)?;
                writer.line(&format!("{target} = {builder}.toString();"));
            }
            Statement::ArrayReserve {
                array, capacity, ..
            } => {
                let array = self.expr(array)?;
                let capacity = self.expr(capacity)?;
                writer.line(&format!("{array}.reserve({capacity});"));
            }
        }
        Ok(())
    }

    fn inline_statement(&mut self, stmt: &Statement) -> Result<String, EmitError> {
        match stmt {
            Statement::VariableDeclaration {
                name,
                ty,
                mutable,
                initializer,
                ..
            } => {
                let keyword = if *mutable { "let" } else { "const" };
                match initializer {
                    Some(init) => Ok(format!("{keyword} {name}: {ty} = {}", self.expr(init)?)),
                    None => Ok(format!("{keyword} {name}: {ty}")),
                }
            }
            Statement::Assignment { target, value, .. } => {
                Ok(format!("{} = {}", self.expr(target)?, self.expr(value)?))
            }
            Statement::Expression { expr, .. } => self.expr(expr),
            other => Err(EmitError::new(
                format!("unsupported statement in for-loop header: {other:?}"),
                other.loc().cloned(),
            )),
        }
    }

    fn expr(&mut self, expr: &Expression) -> Result<String, EmitError> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(match literal {
                Literal::Number(value) => format!("{value}"),
                Literal::String(value) => format!("{value:?}"),
                Literal::Boolean(value) => value.to_string(),
                Literal::Null => "null".to_string(),
                Literal::Undefined => "undefined".to_string(),
            }),
            ExprKind::Identifier(name) => Ok(name.clone()),
            ExprKind::This => Ok("this".to_string()),
            ExprKind::Binary { op, left, right } => {
                let symbol = match op {
                    BinOp::Eq => "===",
                    BinOp::Ne => "!==",
                    other => other.symbol(),
                };
                Ok(format!(
                    "({} {symbol} {})",
                    self.expr(left)?,
                    self.expr(right)?
                ))
            }
            ExprKind::Unary { op, operand } => {
                let operand_text = self.expr(operand)?;
                Ok(match op {
                    UnOp::TypeOf => format!("typeof {operand_text}"),
                    other => format!("({}{operand_text})", other.symbol()),
                })
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => Ok(format!(
                "({} ? {} : {})",
                self.expr(cond)?,
                self.expr(then)?,
                self.expr(otherwise)?
            )),
            ExprKind::Member {
                object,
                member,
                optional,
            } => {
                let accessor = if *optional { "?." } else { "." };
                Ok(format!("{}{accessor}{member}", self.expr(object)?))
            }
            ExprKind::Index { object, index } => {
                Ok(format!("{}[{}]", self.expr(object)?, self.expr(index)?))
            }
            ExprKind::Assign { target, value } => {
                Ok(format!("{} = {}", self.expr(target)?, self.expr(value)?))
            }
            ExprKind::Call { callee, args } => {
                Ok(format!("{}({})", self.expr(callee)?, self.expr_list(args)?))
            }
            ExprKind::AwaitSync(inner) => Ok(format!("await {}", self.expr(inner)?)),
            ExprKind::New {
                class_name,
                args,
                type_args,
            } => {
                let generics = if type_args.is_empty() {
                    String::new()
                } else {
                    let parts: Vec<String> =
                        type_args.iter().map(|arg| arg.to_string()).collect();
                    format!("<{}>", parts.join(", "))
                };
                Ok(format!(
                    "new {class_name}{generics}({})",
                    self.expr_list(args)?
                ))
            }
            ExprKind::ArrayLiteral(elements) => Ok(format!("[{}]", self.expr_list(elements)?)),
            ExprKind::StructLiteral { fields } => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(name, value)| Ok(format!("{name}: {}", self.expr(value)?)))
                    .collect::<Result<_, EmitError>>()?;
                Ok(format!("{{ {} }}", parts.join(", ")))
            }
            ExprKind::Lambda {
                params,
                body,
                return_type,
                ..
            } => {
                let params = self.params(params)?;
                let mut writer = SourceWriter::new();
                writer.increase_indent();
                self.emit_body(body, &mut writer)?;
                Ok(format!(
                    "({params}): {return_type} => {{\n{}}}",
                    writer.finish()
                ))
            }
            ExprKind::Await(inner) => Ok(format!("await {}", self.expr(inner)?)),
            ExprKind::StringBuilder { parts } => {
                let mut out = String::from("new StringBuilder()");
                for part in parts {
                    out.push_str(&format!(".append({})", self.expr(part)?));
                }
                out.push_str(".toString()");
                Ok(out)
            }
        }
    }

    fn expr_list(&mut self, exprs: &[Expression]) -> Result<String, EmitError> {
        let parts: Vec<String> = exprs
            .iter()
            .map(|expr| self.expr(expr))
            .collect::<Result<_, _>>()?;
        Ok(parts.join(", "))
    }
}
