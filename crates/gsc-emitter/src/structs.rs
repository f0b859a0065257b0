//! Anonymous-struct interning.
//!
//! Object literals and anonymous record types are structurally typed in the
//! source; the backends give each distinct sorted signature exactly one
//! emitted definition, named `AnonymousStructN` in first-seen order. The
//! registry is owned by an emitter instance and cleared between modules.

use indexmap::IndexMap;

use gsc_ir::{StructField, Type};

/// One interned anonymous struct.
#[derive(Clone, Debug, PartialEq)]
pub struct InternedStruct {
    pub name: String,
    /// Fields sorted by name, the order used for the emitted definition.
    pub fields: Vec<StructField>,
}

/// Signature-keyed registry of anonymous structs.
#[derive(Debug, Default)]
pub struct StructRegistry {
    by_signature: IndexMap<String, InternedStruct>,
}

impl StructRegistry {
    pub fn new() -> Self {
        StructRegistry {
            by_signature: IndexMap::new(),
        }
    }

    /// Intern a struct type and return the emitted name. Two field sets
    /// that differ only in declaration order intern to the same entry.
    pub fn intern(&mut self, fields: &[StructField]) -> String {
        let key = Type::Struct {
            fields: fields.to_vec(),
            ownership: gsc_ir::Ownership::Value,
        }
        .signature();
        if let Some(existing) = self.by_signature.get(&key) {
            return existing.name.clone();
        }
        let name = format!("AnonymousStruct{}", self.by_signature.len());
        let mut sorted = fields.to_vec();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        self.by_signature.insert(
            key,
            InternedStruct {
                name: name.clone(),
                fields: sorted,
            },
        );
        name
    }

    /// Interned structs in first-seen order.
    pub fn definitions(&self) -> impl Iterator<Item = &InternedStruct> {
        self.by_signature.values()
    }

    /// The interned struct at a first-seen position.
    pub fn get(&self, index: usize) -> Option<&InternedStruct> {
        self.by_signature.get_index(index).map(|(_, def)| def)
    }

    pub fn len(&self) -> usize {
        self.by_signature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_signature.is_empty()
    }

    /// Drop all entries (called between modules).
    pub fn clear(&mut self) {
        self.by_signature.clear();
    }
}
