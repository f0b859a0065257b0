//! The share-ownership graph.
//!
//! One node per declared class or interface; a directed edge `A -> B` for
//! every `share<B>` a field (or interface property) of `A` owns, directly
//! or transitively. Extraction is pure and deterministic: structurally
//! equal types produce structurally equal edge sets, and adjacency keeps
//! insertion order so diagnostics are byte-stable across runs.
//!
//! Edge labels encode the traversal path from the field:
//! - `field` for a direct hit or a first-level container hit
//! - `field[i]` / `field[k]` / `field[v]` for deeper array and map slots
//! - `field|2` for union variants, `field&1` for intersection members
//! - `field.sub` for anonymous struct fields (edges land on the enclosing
//!   class, never on an anonymous node)
//!
//! `own<T>` and `use<T>` never produce edges: they cannot close a cycle of
//! owned data.

use indexmap::IndexMap;

use gsc_common::SourceLoc;
use gsc_ir::{Declaration, Module, Ownership, Type};

/// One share-edge, labelled with the originating field path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareEdge {
    pub to: String,
    /// Field path, e.g. `items[i]` or `slot|0.inner`
    pub label: String,
    pub loc: Option<SourceLoc>,
}

impl ShareEdge {
    /// The leading field name of the label (`items[i]` -> `items`).
    pub fn field_name(&self) -> &str {
        self.label
            .split(['[', '|', '&', '.'])
            .next()
            .unwrap_or(&self.label)
    }
}

/// Adjacency-list ownership graph over class/interface names.
#[derive(Clone, Debug, Default)]
pub struct OwnershipGraph {
    adjacency: IndexMap<String, Vec<ShareEdge>>,
}

impl OwnershipGraph {
    /// Build the graph for a whole program. Nodes are registered for every
    /// declared class and interface first, then edges are extracted; edges
    /// whose target is not a declared node (type parameters, primitives
    /// seen through aliases) are dropped.
    pub fn build(modules: &[Module]) -> Self {
        let mut graph = OwnershipGraph::default();
        for module in modules {
            for decl in &module.declarations {
                match decl {
                    Declaration::Class(class) => graph.add_node(&class.name),
                    Declaration::Interface(iface) => graph.add_node(&iface.name),
                    _ => {}
                }
            }
        }
        for module in modules {
            for decl in &module.declarations {
                match decl {
                    Declaration::Class(class) => {
                        for field in &class.fields {
                            graph.extract(&class.name, &field.name, &field.ty, field.loc.as_ref());
                        }
                    }
                    Declaration::Interface(iface) => {
                        for prop in &iface.properties {
                            graph.extract(&iface.name, &prop.name, &prop.ty, prop.loc.as_ref());
                        }
                    }
                    _ => {}
                }
            }
        }
        graph
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Node names in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    /// The insertion-order position of a node, if declared.
    pub fn node_index(&self, name: &str) -> Option<usize> {
        self.adjacency.get_index_of(name)
    }

    /// Outgoing edges of a node, in insertion order.
    pub fn edges_from(&self, name: &str) -> &[ShareEdge] {
        self.adjacency.get(name).map_or(&[], Vec::as_slice)
    }

    fn add_node(&mut self, name: &str) {
        self.adjacency.entry(name.to_string()).or_default();
    }

    fn add_edge(&mut self, from: &str, to: &str, label: String, loc: Option<&SourceLoc>) {
        // Targets outside the declared node set never participate in
        // ownership cycles.
        if !self.adjacency.contains_key(to) {
            return;
        }
        if let Some(edges) = self.adjacency.get_mut(from) {
            edges.push(ShareEdge {
                to: to.to_string(),
                label,
                loc: loc.cloned(),
            });
        }
    }

    /// Extract every share-edge reachable inside one field type.
    ///
    /// This single function is the extension point for new container kinds;
    /// the rules are not duplicated anywhere else.
    fn extract(&mut self, owner: &str, field: &str, ty: &Type, loc: Option<&SourceLoc>) {
        self.extract_inner(owner, field.to_string(), ty, loc, 0);
    }

    fn extract_inner(
        &mut self,
        owner: &str,
        path: String,
        ty: &Type,
        loc: Option<&SourceLoc>,
        depth: usize,
    ) {
        match ty {
            Type::Named {
                name, ownership, ..
            } => {
                if *ownership == Ownership::Share {
                    self.add_edge(owner, name, path, loc);
                }
                // own<T> / use<T> / by-value nominal references are
                // tree/back-edges and never close a cycle of owned data.
            }
            Type::Array { element, .. } => {
                // The first container level keeps the bare field label.
                let child = if depth == 0 {
                    path
                } else {
                    format!("{path}[i]")
                };
                self.extract_inner(owner, child, element, loc, depth + 1);
            }
            Type::Map { key, value, .. } => {
                let (key_path, value_path) = if depth == 0 {
                    (path.clone(), path)
                } else {
                    (format!("{path}[k]"), format!("{path}[v]"))
                };
                self.extract_inner(owner, key_path, key, loc, depth + 1);
                self.extract_inner(owner, value_path, value, loc, depth + 1);
            }
            Type::Struct { fields, .. } => {
                // Anonymous structs expand inline under the owning class.
                for field in fields {
                    let child = format!("{path}.{}", field.name);
                    self.extract_inner(owner, child, &field.ty, loc, depth + 1);
                }
            }
            Type::Union { variants } => {
                for (index, variant) in variants.iter().enumerate() {
                    let child = format!("{path}|{index}");
                    self.extract_inner(owner, child, variant, loc, depth + 1);
                }
            }
            Type::Intersection { members } => {
                for (index, member) in members.iter().enumerate() {
                    let child = format!("{path}&{index}");
                    self.extract_inner(owner, child, member, loc, depth + 1);
                }
            }
            Type::Nullable { inner } => {
                self.extract_inner(owner, path, inner, loc, depth);
            }
            Type::Alias { resolved, .. } => {
                // Aliases resolve transparently before the other rules.
                self.extract_inner(owner, path, resolved, loc, depth);
            }
            Type::Promise { result } => {
                self.extract_inner(owner, path, result, loc, depth + 1);
            }
            // Function types and primitives own no data.
            Type::Function { .. } | Type::Primitive(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsc_ir::{Class, Field, NamedKind, StructField};

    fn class_with_field(class: &str, field: &str, ty: Type) -> Module {
        Module {
            name: "m".into(),
            path: "m.gs".into(),
            imports: Vec::new(),
            declarations: vec![Declaration::Class(Class {
                name: class.into(),
                type_params: Vec::new(),
                extends: None,
                implements: Vec::new(),
                fields: vec![Field {
                    name: field.into(),
                    ty,
                    is_readonly: false,
                    initializer: None,
                    loc: None,
                }],
                constructor: None,
                methods: Vec::new(),
                loc: None,
            })],
            init_statements: Vec::new(),
        }
    }

    #[test]
    fn direct_share_field_keeps_bare_label() {
        let module = class_with_field("Node", "next", Type::class("Node", Ownership::Share));
        let graph = OwnershipGraph::build(std::slice::from_ref(&module));
        let edges = graph.edges_from("Node");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to, "Node");
        assert_eq!(edges[0].label, "next");
    }

    #[test]
    fn first_level_container_keeps_bare_label() {
        let module = class_with_field(
            "Node",
            "children",
            Type::array(Type::class("Node", Ownership::Share)),
        );
        let graph = OwnershipGraph::build(std::slice::from_ref(&module));
        assert_eq!(graph.edges_from("Node")[0].label, "children");
    }

    #[test]
    fn nested_containers_encode_the_path() {
        // children: Array<Array<share<Node>>>
        let module = class_with_field(
            "Node",
            "children",
            Type::array(Type::array(Type::class("Node", Ownership::Share))),
        );
        let graph = OwnershipGraph::build(std::slice::from_ref(&module));
        assert_eq!(graph.edges_from("Node")[0].label, "children[i]");
    }

    #[test]
    fn struct_fields_expand_under_the_owning_class() {
        let module = class_with_field(
            "Node",
            "slot",
            Type::Struct {
                fields: vec![StructField {
                    name: "inner".into(),
                    ty: Type::class("Node", Ownership::Share),
                }],
                ownership: Ownership::Value,
            },
        );
        let graph = OwnershipGraph::build(std::slice::from_ref(&module));
        let edges = graph.edges_from("Node");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].label, "slot.inner");
        assert_eq!(edges[0].field_name(), "slot");
    }

    #[test]
    fn own_and_use_produce_no_edges() {
        let module = class_with_field("Node", "parent", Type::class("Node", Ownership::Use));
        let graph = OwnershipGraph::build(std::slice::from_ref(&module));
        assert!(graph.edges_from("Node").is_empty());

        let module = class_with_field("Node", "child", Type::class("Node", Ownership::Own));
        let graph = OwnershipGraph::build(std::slice::from_ref(&module));
        assert!(graph.edges_from("Node").is_empty());
    }

    #[test]
    fn union_and_intersection_variants_are_indexed() {
        let module = class_with_field(
            "Node",
            "slot",
            Type::Union {
                variants: vec![
                    Type::STRING,
                    Type::class("Node", Ownership::Share),
                ],
            },
        );
        let graph = OwnershipGraph::build(std::slice::from_ref(&module));
        assert_eq!(graph.edges_from("Node")[0].label, "slot|1");
    }

    #[test]
    fn share_map_key_is_supported() {
        let module = class_with_field(
            "Registry",
            "byOwner",
            Type::map(
                Type::class("Registry", Ownership::Share),
                Type::STRING,
            ),
        );
        let graph = OwnershipGraph::build(std::slice::from_ref(&module));
        let edges = graph.edges_from("Registry");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].label, "byOwner");
    }

    #[test]
    fn extraction_is_deterministic() {
        let module = class_with_field(
            "Node",
            "slot",
            Type::Union {
                variants: vec![
                    Type::class("Node", Ownership::Share),
                    Type::array(Type::class("Node", Ownership::Share)),
                ],
            },
        );
        let a = OwnershipGraph::build(std::slice::from_ref(&module));
        let b = OwnershipGraph::build(std::slice::from_ref(&module));
        let edges_a: Vec<_> = a.edges_from("Node").to_vec();
        let edges_b: Vec<_> = b.edges_from("Node").to_vec();
        assert_eq!(edges_a, edges_b);
        assert_eq!(edges_a[0].label, "slot|0");
        assert_eq!(edges_a[1].label, "slot|1");
    }

    #[test]
    fn undeclared_targets_are_dropped() {
        // T is a type parameter, not a declared class.
        let module = class_with_field("Box", "item", Type::class("T", Ownership::Share));
        let graph = OwnershipGraph::build(std::slice::from_ref(&module));
        assert!(graph.edges_from("Box").is_empty());
    }

    #[test]
    fn interfaces_are_nodes_too() {
        let module = Module {
            name: "m".into(),
            path: "m.gs".into(),
            imports: Vec::new(),
            declarations: vec![Declaration::Interface(gsc_ir::Interface {
                name: "Linked".into(),
                type_params: Vec::new(),
                extends: Vec::new(),
                properties: vec![gsc_ir::Property {
                    name: "next".into(),
                    ty: Type::Named {
                        name: "Linked".into(),
                        kind: NamedKind::Interface,
                        ownership: Ownership::Share,
                        type_args: Vec::new(),
                    },
                    loc: None,
                }],
                methods: Vec::new(),
                loc: None,
            })],
            init_statements: Vec::new(),
        };
        let graph = OwnershipGraph::build(std::slice::from_ref(&module));
        assert_eq!(graph.edges_from("Linked")[0].to, "Linked");
    }
}
