//! The symbol oracle: what kind of thing does a name refer to?
//!
//! The source toolchain's binder knows this already; the core only needs a
//! narrow read-only view to classify type references during lowering and
//! edge extraction.

use rustc_hash::FxHashMap;

use crate::module::{Declaration, Module};

/// What a top-level name declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Class,
    Interface,
    TypeAlias,
    Function,
    Const,
}

/// Read-only name classification, as provided by the binder collaborator.
pub trait SymbolOracle {
    /// The kind of the given top-level name, if it is declared anywhere in
    /// the program.
    fn kind_of(&self, name: &str) -> Option<SymbolKind>;

    /// Whether `name` declares a class.
    fn is_class(&self, name: &str) -> bool {
        self.kind_of(name) == Some(SymbolKind::Class)
    }

    /// Whether `name` declares an interface.
    fn is_interface(&self, name: &str) -> bool {
        self.kind_of(name) == Some(SymbolKind::Interface)
    }

    /// Whether `name` declares a type alias.
    fn is_alias(&self, name: &str) -> bool {
        self.kind_of(name) == Some(SymbolKind::TypeAlias)
    }
}

/// Whole-program symbol table built by scanning every module's declarations.
///
/// Later declarations never shadow earlier ones; the source toolchain has
/// already rejected duplicate top-level names.
#[derive(Clone, Debug, Default)]
pub struct ProgramSymbols {
    kinds: FxHashMap<String, SymbolKind>,
}

impl ProgramSymbols {
    /// Build the table from a set of modules.
    pub fn from_modules<'a>(modules: impl IntoIterator<Item = &'a Module>) -> Self {
        let mut kinds = FxHashMap::default();
        for module in modules {
            for decl in module.declarations() {
                let kind = match decl {
                    Declaration::Function(_) => SymbolKind::Function,
                    Declaration::Class(_) => SymbolKind::Class,
                    Declaration::Interface(_) => SymbolKind::Interface,
                    Declaration::TypeAlias(_) => SymbolKind::TypeAlias,
                    Declaration::Const(_) => SymbolKind::Const,
                };
                kinds.entry(decl.name().to_string()).or_insert(kind);
            }
        }
        ProgramSymbols { kinds }
    }

    /// Register a single name (used by tests and synthetic programs).
    pub fn insert(&mut self, name: impl Into<String>, kind: SymbolKind) {
        self.kinds.insert(name.into(), kind);
    }
}

impl SymbolOracle for ProgramSymbols {
    fn kind_of(&self, name: &str) -> Option<SymbolKind> {
        self.kinds.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ClassDecl, Item};

    #[test]
    fn classifies_declared_names() {
        let module = Module {
            path: "m.gs".into(),
            imports: Vec::new(),
            items: vec![Item::Declaration(Declaration::Class(ClassDecl {
                name: "Node".into(),
                type_params: Vec::new(),
                extends: None,
                implements: Vec::new(),
                fields: Vec::new(),
                constructor: None,
                methods: Vec::new(),
                loc: None,
            }))],
        };
        let symbols = ProgramSymbols::from_modules([&module]);
        assert!(symbols.is_class("Node"));
        assert!(!symbols.is_interface("Node"));
        assert_eq!(symbols.kind_of("Other"), None);
    }
}
