//! AST-to-IR lowering.
//!
//! Transforms one source module at a time into the typed IR: resolves every
//! surface type through aliases, computes ownership qualifiers, records
//! lambda captures, accumulates top-level init statements, and propagates
//! asyncness. Lowering is a direct syntactic translation; nothing is
//! reordered.
//!
//! Unlike the validator and the analyzers, lowering does not collect user
//! diagnostics: anything it cannot lower is an internal error that abandons
//! the current module (the driver reports it as a compiler bug and moves on
//! to the next module).

use tracing::debug;

use gsc_ast as ast;
use gsc_ast::SymbolOracle;
use gsc_common::diagnostics::{Diagnostic, codes, diagnostic};
use gsc_common::{CompilerOptions, SourceLoc};
use gsc_ir as ir;
use indexmap::IndexMap;

mod captures;
mod expr;
pub mod peephole;
mod stmt;
mod types;

/// A fatal, per-module lowering failure.
///
/// These are compiler bugs or upstream-toolchain contract violations, not
/// user errors: the validator and the source typechecker should have kept
/// the offending shapes out.
#[derive(Clone, Debug)]
pub struct LoweringError {
    pub message: String,
    pub loc: Option<SourceLoc>,
}

impl LoweringError {
    pub(crate) fn new(message: impl Into<String>, loc: Option<SourceLoc>) -> Self {
        LoweringError {
            message: message.into(),
            loc,
        }
    }

    /// Render as a GS900-family diagnostic.
    #[must_use]
    pub fn into_diagnostic(self) -> Diagnostic {
        diagnostic(codes::INTERNAL_ERROR, &[&self.message]).at_opt(self.loc)
    }
}

impl std::fmt::Display for LoweringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.loc {
            Some(loc) => write!(f, "{}: {}", loc, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for LoweringError {}

pub(crate) type Result<T> = std::result::Result<T, LoweringError>;

/// Lower one module. The alias table is module-scoped and discarded when
/// this returns.
pub fn lower_module(
    module: &ast::Module,
    symbols: &dyn SymbolOracle,
    options: &CompilerOptions,
) -> Result<ir::Module> {
    let _ = options; // reserved: both memory modes lower identically today
    let mut lowerer = Lowerer::new(module, symbols);
    lowerer.collect_aliases();

    let mut declarations = Vec::new();
    let mut init_statements = Vec::new();
    for item in &module.items {
        match item {
            ast::Item::Declaration(decl) => declarations.push(lowerer.lower_declaration(decl)?),
            ast::Item::Statement(stmt) => init_statements.push(lowerer.lower_statement(stmt)?),
        }
    }

    debug!(
        module = %module.path,
        declarations = declarations.len(),
        init = init_statements.len(),
        "lowered module"
    );

    Ok(ir::Module {
        name: module.basename().to_string(),
        path: module.path.clone(),
        imports: module
            .imports
            .iter()
            .map(|import| ir::Import {
                from: import.from.clone(),
                names: import
                    .names
                    .iter()
                    .map(|n| (n.name.clone(), n.alias.clone()))
                    .collect(),
            })
            .collect(),
        declarations,
        init_statements,
    })
}

/// Per-module lowering state.
pub(crate) struct Lowerer<'a> {
    pub(crate) module: &'a ast::Module,
    pub(crate) symbols: &'a dyn SymbolOracle,
    /// Alias name -> surface syntax, populated up front from the module's
    /// alias declarations; insertion order is declaration order.
    pub(crate) alias_syntax: IndexMap<String, &'a ast::TypeExpr>,
    /// Alias name -> resolved type, filled lazily.
    pub(crate) alias_cache: IndexMap<String, ir::Type>,
    /// Aliases currently being resolved, for cycle detection.
    pub(crate) alias_in_progress: Vec<String>,
    /// Type parameters in scope (function or class level).
    pub(crate) type_params: Vec<String>,
    /// Lexical scopes of local bindings with their types, innermost last.
    /// Used for lambda capture recording.
    pub(crate) scopes: Vec<Vec<(String, ir::Type)>>,
    /// Name of the class whose body we are lowering, for `this`.
    pub(crate) current_class: Option<String>,
}

impl<'a> Lowerer<'a> {
    fn new(module: &'a ast::Module, symbols: &'a dyn SymbolOracle) -> Self {
        Lowerer {
            module,
            symbols,
            alias_syntax: IndexMap::new(),
            alias_cache: IndexMap::new(),
            alias_in_progress: Vec::new(),
            type_params: Vec::new(),
            scopes: Vec::new(),
            current_class: None,
        }
    }

    fn collect_aliases(&mut self) {
        for decl in self.module.declarations() {
            if let ast::Declaration::TypeAlias(alias) = decl {
                self.alias_syntax.insert(alias.name.clone(), &alias.ty);
            }
        }
    }

    pub(crate) fn source_loc(&self, loc: Option<gsc_common::Loc>) -> Option<SourceLoc> {
        loc.map(|l| l.in_file(self.module.path.as_str()))
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn lower_declaration(&mut self, decl: &ast::Declaration) -> Result<ir::Declaration> {
        match decl {
            ast::Declaration::Function(func) => {
                Ok(ir::Declaration::Function(self.lower_function(func)?))
            }
            ast::Declaration::Class(class) => Ok(ir::Declaration::Class(self.lower_class(class)?)),
            ast::Declaration::Interface(iface) => {
                Ok(ir::Declaration::Interface(self.lower_interface(iface)?))
            }
            ast::Declaration::TypeAlias(alias) => {
                let ty = self.resolve_alias(&alias.name, self.source_loc(alias.loc))?;
                Ok(ir::Declaration::TypeAlias(ir::TypeAlias {
                    name: alias.name.clone(),
                    ty,
                    loc: self.source_loc(alias.loc),
                }))
            }
            ast::Declaration::Const(konst) => {
                let ty = self.resolve_type(&konst.ty)?;
                let initializer = self.lower_expression(&konst.initializer)?;
                Ok(ir::Declaration::Const(ir::Const {
                    name: konst.name.clone(),
                    ty,
                    initializer,
                    loc: self.source_loc(konst.loc),
                }))
            }
        }
    }

    pub(crate) fn lower_function(&mut self, func: &ast::FunctionDecl) -> Result<ir::Function> {
        let outer_params = self.type_params.len();
        self.type_params.extend(func.type_params.iter().cloned());

        let params = self.lower_params(&func.params)?;
        let return_type = self.resolve_type(&func.return_type)?;

        self.push_scope(&params);
        let body = self.lower_body(&func.body)?;
        self.pop_scope();
        self.type_params.truncate(outer_params);

        let is_async = func.is_async || captures::body_contains_await(&body);
        if is_async && return_type.promise_result().is_none() {
            return Err(LoweringError::new(
                format!(
                    "async function '{}' must declare a Promise return type, found '{}'",
                    func.name, return_type
                ),
                self.source_loc(func.loc),
            ));
        }

        Ok(ir::Function {
            name: func.name.clone(),
            type_params: func.type_params.clone(),
            params,
            return_type,
            body,
            is_async,
            is_recursive: false,
            loc: self.source_loc(func.loc),
        })
    }

    fn lower_class(&mut self, class: &ast::ClassDecl) -> Result<ir::Class> {
        let outer_params = self.type_params.len();
        self.type_params.extend(class.type_params.iter().cloned());
        let previous_class = self.current_class.replace(class.name.clone());

        let mut fields = Vec::with_capacity(class.fields.len());
        for field in &class.fields {
            let ty = self.resolve_type(&field.ty)?;
            let initializer = field
                .initializer
                .as_ref()
                .map(|init| self.lower_expression(init))
                .transpose()?;
            fields.push(ir::Field {
                name: field.name.clone(),
                ty,
                is_readonly: field.is_readonly,
                initializer,
                loc: self.source_loc(field.loc),
            });
        }

        let constructor = match &class.constructor {
            Some(ctor) => {
                let params = self.lower_params(&ctor.params)?;
                self.push_scope(&params);
                let body = self.lower_body(&ctor.body)?;
                self.pop_scope();
                Some(ir::Constructor {
                    params,
                    body,
                    loc: self.source_loc(ctor.loc),
                })
            }
            None => None,
        };

        let mut methods = Vec::with_capacity(class.methods.len());
        for method in &class.methods {
            let params = self.lower_params(&method.params)?;
            let return_type = self.resolve_type(&method.return_type)?;
            self.push_scope(&params);
            let body = self.lower_body(&method.body)?;
            self.pop_scope();

            let is_async = method.is_async || captures::body_contains_await(&body);
            if is_async && return_type.promise_result().is_none() {
                return Err(LoweringError::new(
                    format!(
                        "async method '{}.{}' must declare a Promise return type, found '{}'",
                        class.name, method.name, return_type
                    ),
                    self.source_loc(method.loc),
                ));
            }

            methods.push(ir::Method {
                name: method.name.clone(),
                params,
                return_type,
                is_static: method.is_static,
                is_async,
                body,
                loc: self.source_loc(method.loc),
            });
        }

        self.current_class = previous_class;
        self.type_params.truncate(outer_params);

        Ok(ir::Class {
            name: class.name.clone(),
            type_params: class.type_params.clone(),
            extends: class.extends.clone(),
            implements: class.implements.clone(),
            fields,
            constructor,
            methods,
            loc: self.source_loc(class.loc),
        })
    }

    fn lower_interface(&mut self, iface: &ast::InterfaceDecl) -> Result<ir::Interface> {
        let outer_params = self.type_params.len();
        self.type_params.extend(iface.type_params.iter().cloned());

        let mut properties = Vec::with_capacity(iface.properties.len());
        for prop in &iface.properties {
            properties.push(ir::Property {
                name: prop.name.clone(),
                ty: self.resolve_type(&prop.ty)?,
                loc: self.source_loc(prop.loc),
            });
        }
        let mut methods = Vec::with_capacity(iface.methods.len());
        for method in &iface.methods {
            methods.push(ir::InterfaceMethod {
                name: method.name.clone(),
                params: self.lower_params(&method.params)?,
                return_type: self.resolve_type(&method.return_type)?,
                loc: self.source_loc(method.loc),
            });
        }

        self.type_params.truncate(outer_params);

        Ok(ir::Interface {
            name: iface.name.clone(),
            type_params: iface.type_params.clone(),
            extends: iface.extends.clone(),
            properties,
            methods,
            loc: self.source_loc(iface.loc),
        })
    }

    pub(crate) fn lower_params(&mut self, params: &[ast::Param]) -> Result<Vec<ir::Param>> {
        params
            .iter()
            .map(|param| {
                Ok(ir::Param {
                    name: param.name.clone(),
                    ty: self.resolve_type(&param.ty)?,
                })
            })
            .collect()
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    pub(crate) fn push_scope(&mut self, params: &[ir::Param]) {
        self.scopes.push(
            params
                .iter()
                .map(|p| (p.name.clone(), p.ty.clone()))
                .collect(),
        );
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub(crate) fn bind_local(&mut self, name: &str, ty: ir::Type) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.push((name.to_string(), ty));
        }
    }

    /// The type of a local binding, innermost first.
    pub(crate) fn local_type(&self, name: &str) -> Option<&ir::Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.iter().rev().find(|(n, _)| n == name).map(|(_, t)| t))
    }
}
