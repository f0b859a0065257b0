//! The low-level C++ backend.
//!
//! Per module `foo` this emits `foo.h` (declarations) and `foo.cpp`
//! (definitions), both inside the two-level namespace `gs::<module>`. The
//! runtime surface is referenced by name only: `gs::String`, `gs::Array`,
//! `gs::Map`, `gs::Task`, the smart-pointer wrappers `gs::Own` /
//! `gs::Share` / `gs::Use`, the collector allocator `gs::gc_new`, and the
//! blocking wait `gs::wait`.
//!
//! Generic declarations are emitted entirely in the header; everything else
//! splits into declaration and definition conventionally.

mod expr;
mod stmt;
mod types;

use tracing::debug;

use gsc_common::{MemoryMode, SourceLoc};
use gsc_ir::{Class, Const, Declaration, Function, Interface, Method, Module, Param, TypeAlias};

use crate::sanitize;
use crate::structs::StructRegistry;
use crate::writer::SourceWriter;
use crate::{EmitError, EmitOutput, Emitter};

/// The C++ emitter. One instance per compilation; per-module state is reset
/// in [`Emitter::emit_module`].
pub struct CppEmitter {
    pub(crate) mode: MemoryMode,
    pub(crate) source_map: bool,
    pub(crate) registry: StructRegistry,
    /// Second-level namespace of the module being emitted.
    namespace: String,
    /// Whether the body being emitted belongs to an async function.
    pub(crate) in_async: bool,
}

impl CppEmitter {
    pub fn new(mode: MemoryMode, source_map: bool) -> Self {
        CppEmitter {
            mode,
            source_map,
            registry: StructRegistry::new(),
            namespace: String::new(),
            in_async: false,
        }
    }

    /// `#line` directive when source maps are on.
    pub(crate) fn line_directive(&self, writer: &mut SourceWriter, loc: Option<&SourceLoc>) {
        if !self.source_map {
            return;
        }
        if let Some(loc) = loc {
            writer.line(&format!("#line {} \"{}\"", loc.line, loc.file));
        }
    }
}

impl Emitter for CppEmitter {
    fn emit_module(&mut self, module: &Module) -> Result<EmitOutput, EmitError> {
        self.registry.clear();
        self.namespace = sanitize::module_namespace(&module.name);
        self.in_async = false;

        // Declarations and definitions are rendered before assembly so the
        // struct registry is complete when the header is laid out.
        let mut decls = SourceWriter::new();
        let mut defs = SourceWriter::new();
        for decl in &module.declarations {
            self.emit_declaration(decl, &mut decls, &mut defs)?;
        }
        if !module.init_statements.is_empty() {
            self.emit_init(module, &mut decls, &mut defs)?;
        }
        let struct_defs = self.render_struct_definitions()?;

        let header = self.assemble_header(module, &struct_defs, decls.finish());
        let implementation = self.assemble_impl(module, defs.finish());

        let mut output = EmitOutput::new();
        output.insert(format!("{}.h", module.name), header);
        output.insert(format!("{}.cpp", module.name), implementation);
        debug!(module = %module.name, structs = self.registry.len(), "emitted C++ module");
        Ok(output)
    }
}

impl CppEmitter {
    /// Interned struct definitions, first-seen order. Interning is
    /// deep-first, so every definition only references structs above it.
    fn render_struct_definitions(&mut self) -> Result<String, EmitError> {
        let mut writer = SourceWriter::new();
        let mut index = 0;
        while index < self.registry.len() {
            let Some(def) = self.registry.get(index).cloned() else {
                break;
            };
            writer.line(&format!("struct {} {{", def.name));
            writer.increase_indent();
            for field in &def.fields {
                let ty = self.cpp_type(&field.ty)?;
                writer.line(&format!("{} {};", ty, sanitize::member(&field.name)));
            }
            writer.decrease_indent();
            writer.line("};");
            writer.blank_line();
            index += 1;
        }
        Ok(writer.finish())
    }

    fn assemble_header(&self, module: &Module, struct_defs: &str, decls: String) -> String {
        let mut writer = SourceWriter::new();
        writer.line("// Generated by gsc. Do not edit.");
        writer.line("#pragma once");
        writer.blank_line();
        writer.line("#include \"gs_runtime.h\"");
        for import in &module.imports {
            writer.line(&format!("#include \"{}.h\"", import.basename()));
        }
        writer.blank_line();
        writer.line("namespace gs {");
        writer.line(&format!("namespace {} {{", self.namespace));
        writer.blank_line();

        // Forward declarations keep mutually-referencing classes happy.
        let mut any_forward = false;
        for decl in &module.declarations {
            match decl {
                Declaration::Class(class) => {
                    writer.line(&format!("class {};", sanitize::identifier(&class.name)));
                    any_forward = true;
                }
                Declaration::Interface(iface) => {
                    writer.line(&format!("class {};", sanitize::identifier(&iface.name)));
                    any_forward = true;
                }
                _ => {}
            }
        }
        if any_forward {
            writer.blank_line();
        }

        writer.write(struct_defs);
        writer.write(&decls);
        writer.blank_line();
        writer.line(&format!("}}  // namespace {}", self.namespace));
        writer.line("}  // namespace gs");
        writer.finish()
    }

    fn assemble_impl(&self, module: &Module, defs: String) -> String {
        let mut writer = SourceWriter::new();
        writer.line("// Generated by gsc. Do not edit.");
        writer.line(&format!("#include \"{}.h\"", module.name));
        writer.blank_line();
        writer.line("namespace gs {");
        writer.line(&format!("namespace {} {{", self.namespace));
        writer.blank_line();
        writer.write(&defs);
        writer.blank_line();
        writer.line(&format!("}}  // namespace {}", self.namespace));
        writer.line("}  // namespace gs");

        // Only the module that owns init statements gets a program entry.
        if module.has_entry_point() {
            writer.blank_line();
            writer.line("int main(int argc, char** argv) {");
            writer.increase_indent();
            writer.line("gs::init_args(argc, argv);");
            writer.line(&format!("gs::{}::__init();", self.namespace));
            writer.line("return 0;");
            writer.decrease_indent();
            writer.line("}");
        }
        writer.finish()
    }

    fn emit_declaration(
        &mut self,
        decl: &Declaration,
        decls: &mut SourceWriter,
        defs: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        match decl {
            Declaration::TypeAlias(alias) => self.emit_type_alias(alias, decls),
            Declaration::Const(konst) => self.emit_const(konst, decls, defs),
            Declaration::Function(func) => self.emit_function(func, decls, defs),
            Declaration::Interface(iface) => self.emit_interface(iface, decls),
            Declaration::Class(class) => self.emit_class(class, decls, defs),
        }
    }

    fn emit_type_alias(
        &mut self,
        alias: &TypeAlias,
        decls: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        let ty = self.cpp_type(alias.ty.resolved())?;
        decls.line(&format!(
            "using {} = {};",
            sanitize::identifier(&alias.name),
            ty
        ));
        Ok(())
    }

    fn emit_const(
        &mut self,
        konst: &Const,
        decls: &mut SourceWriter,
        defs: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        let ty = self.cpp_type(&konst.ty)?;
        let name = sanitize::identifier(&konst.name);
        decls.line(&format!("extern const {ty} {name};"));
        let init = self.cpp_expr(&konst.initializer)?;
        self.line_directive(defs, konst.loc.as_ref());
        defs.line(&format!("const {ty} {name} = {init};"));
        Ok(())
    }

    fn template_prefix(type_params: &[String]) -> Option<String> {
        if type_params.is_empty() {
            return None;
        }
        let params: Vec<String> = type_params
            .iter()
            .map(|p| format!("typename {}", sanitize::identifier(p)))
            .collect();
        Some(format!("template <{}>", params.join(", ")))
    }

    fn signature(&mut self, name: &str, func_params: &[Param], ret: &str) -> Result<String, EmitError> {
        let params: Vec<String> = func_params
            .iter()
            .map(|param| {
                Ok(format!(
                    "{} {}",
                    self.cpp_type(&param.ty)?,
                    sanitize::identifier(&param.name)
                ))
            })
            .collect::<Result<_, EmitError>>()?;
        Ok(format!("{ret} {name}({})", params.join(", ")))
    }

    fn return_type_of(&mut self, func_ret: &gsc_ir::Type, is_async: bool) -> Result<String, EmitError> {
        if is_async {
            // Async functions return a coroutine task over the promise
            // result.
            if let Some(result) = func_ret.promise_result() {
                return Ok(format!("gs::Task<{}>", self.cpp_type(result)?));
            }
        }
        self.cpp_type(func_ret)
    }

    fn emit_function(
        &mut self,
        func: &Function,
        decls: &mut SourceWriter,
        defs: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        let name = sanitize::identifier(&func.name);
        let ret = self.return_type_of(&func.return_type, func.is_async)?;
        let signature = self.signature(&name, &func.params, &ret)?;

        if let Some(template) = Self::template_prefix(&func.type_params) {
            // Generic functions live entirely in the header.
            decls.line(&template);
            self.line_directive(decls, func.loc.as_ref());
            decls.line(&format!("{signature} {{"));
            decls.increase_indent();
            self.emit_function_body(func, decls)?;
            decls.decrease_indent();
            decls.line("}");
            decls.blank_line();
            return Ok(());
        }

        decls.line(&format!("{signature};"));
        self.line_directive(defs, func.loc.as_ref());
        defs.line(&format!("{signature} {{"));
        defs.increase_indent();
        self.emit_function_body(func, defs)?;
        defs.decrease_indent();
        defs.line("}");
        defs.blank_line();
        Ok(())
    }

    fn emit_function_body(
        &mut self,
        func: &Function,
        writer: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        let was_async = std::mem::replace(&mut self.in_async, func.is_async);
        let result = self.emit_body(&func.body, writer);
        self.in_async = was_async;
        result
    }

    fn emit_interface(
        &mut self,
        iface: &Interface,
        decls: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        if let Some(template) = Self::template_prefix(&iface.type_params) {
            decls.line(&template);
        }
        let name = sanitize::identifier(&iface.name);
        let mut heritage: Vec<String> = iface
            .extends
            .iter()
            .map(|base| format!("public {}", sanitize::identifier(base)))
            .collect();
        if heritage.is_empty() && self.mode == MemoryMode::Gc {
            heritage.push("public gs::Object".to_string());
        }
        let heritage = if heritage.is_empty() {
            String::new()
        } else {
            format!(" : {}", heritage.join(", "))
        };
        self.line_directive(decls, iface.loc.as_ref());
        decls.line(&format!("class {name}{heritage} {{"));
        decls.line("public:");
        decls.increase_indent();
        decls.line(&format!("virtual ~{name}() = default;"));
        for prop in &iface.properties {
            let ty = self.cpp_type(&prop.ty)?;
            decls.line(&format!("{} {};", ty, sanitize::member(&prop.name)));
        }
        for method in &iface.methods {
            let ret = self.cpp_type(&method.return_type)?;
            let signature =
                self.signature(&sanitize::member(&method.name), &method.params, &ret)?;
            decls.line(&format!("virtual {signature} = 0;"));
        }
        decls.decrease_indent();
        decls.line("};");
        decls.blank_line();
        Ok(())
    }

    fn emit_class(
        &mut self,
        class: &Class,
        decls: &mut SourceWriter,
        defs: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        let generic = !class.type_params.is_empty();
        let name = sanitize::identifier(&class.name);

        let mut heritage: Vec<String> = Vec::new();
        if let Some(base) = &class.extends {
            heritage.push(format!("public {}", sanitize::identifier(base)));
        }
        for iface in &class.implements {
            heritage.push(format!("public {}", sanitize::identifier(iface)));
        }
        if heritage.is_empty() && self.mode == MemoryMode::Gc {
            heritage.push("public gs::Object".to_string());
        }
        let heritage = if heritage.is_empty() {
            String::new()
        } else {
            format!(" : {}", heritage.join(", "))
        };

        if let Some(template) = Self::template_prefix(&class.type_params) {
            decls.line(&template);
        }
        self.line_directive(decls, class.loc.as_ref());
        decls.line(&format!("class {name}{heritage} {{"));
        decls.line("public:");
        decls.increase_indent();

        for field in &class.fields {
            let ty = self.cpp_type(&field.ty)?;
            let prefix = if field.is_readonly { "const " } else { "" };
            match &field.initializer {
                Some(init) => {
                    let init = self.cpp_expr(init)?;
                    decls.line(&format!(
                        "{prefix}{ty} {} = {init};",
                        sanitize::member(&field.name)
                    ));
                }
                None => {
                    decls.line(&format!("{prefix}{ty} {}{{}};", sanitize::member(&field.name)));
                }
            }
        }
        if !class.fields.is_empty() {
            decls.blank_line();
        }

        if let Some(ctor) = &class.constructor {
            let signature = self.signature(&name, &ctor.params, "")?;
            let signature = signature.trim_start().to_string();
            if generic {
                decls.line(&format!("{signature} {{"));
                decls.increase_indent();
                self.emit_body(&ctor.body, decls)?;
                decls.decrease_indent();
                decls.line("}");
            } else {
                decls.line(&format!("{signature};"));
                let qualified = self.signature(&format!("{name}::{name}"), &ctor.params, "")?;
                self.line_directive(defs, ctor.loc.as_ref());
                defs.line(&format!("{} {{", qualified.trim_start()));
                defs.increase_indent();
                self.emit_body(&ctor.body, defs)?;
                defs.decrease_indent();
                defs.line("}");
                defs.blank_line();
            }
        }

        for method in &class.methods {
            self.emit_method(class, method, generic, decls, defs)?;
        }

        decls.decrease_indent();
        decls.line("};");
        decls.blank_line();
        Ok(())
    }

    fn emit_method(
        &mut self,
        class: &Class,
        method: &Method,
        generic: bool,
        decls: &mut SourceWriter,
        defs: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        let class_name = sanitize::identifier(&class.name);
        let method_name = sanitize::member(&method.name);
        let ret = self.return_type_of(&method.return_type, method.is_async)?;
        let prefix = if method.is_static { "static " } else { "" };
        let signature = self.signature(&method_name, &method.params, &ret)?;

        if generic {
            decls.line(&format!("{prefix}{signature} {{"));
            decls.increase_indent();
            let was_async = std::mem::replace(&mut self.in_async, method.is_async);
            let result = self.emit_body(&method.body, decls);
            self.in_async = was_async;
            result?;
            decls.decrease_indent();
            decls.line("}");
            return Ok(());
        }

        decls.line(&format!("{prefix}{signature};"));
        let qualified = self.signature(
            &format!("{class_name}::{method_name}"),
            &method.params,
            &ret,
        )?;
        self.line_directive(defs, method.loc.as_ref());
        defs.line(&format!("{qualified} {{"));
        defs.increase_indent();
        let was_async = std::mem::replace(&mut self.in_async, method.is_async);
        let result = self.emit_body(&method.body, defs);
        self.in_async = was_async;
        result?;
        defs.decrease_indent();
        defs.line("}");
        defs.blank_line();
        Ok(())
    }

    fn emit_init(
        &mut self,
        module: &Module,
        decls: &mut SourceWriter,
        defs: &mut SourceWriter,
    ) -> Result<(), EmitError> {
        decls.line("void __init();");
        defs.line("void __init() {");
        defs.increase_indent();
        for stmt in &module.init_statements {
            self.line_directive(defs, stmt.loc());
            self.emit_statement(stmt, defs)?;
        }
        defs.decrease_indent();
        defs.line("}");
        defs.blank_line();
        Ok(())
    }
}
