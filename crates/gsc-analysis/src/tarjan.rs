//! Iterative Tarjan strongly-connected components over the ownership graph.
//!
//! The classic algorithm, run with an explicit work stack so deep chains of
//! classes cannot overflow the call stack; a configurable depth bound turns
//! pathological inputs into a compiler-internal diagnostic instead.
//!
//! O(V + E); V and E are bounded by the program's total field count.

use crate::graph::OwnershipGraph;

/// The traversal exceeded the configured depth bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthExceeded;

/// Compute the strongly connected components that matter for the DAG
/// requirement: every component with more than one node, plus every
/// single-node component with a self-edge.
///
/// Component members are returned in graph insertion order; the component
/// list follows discovery order. Both are deterministic for a given
/// program.
pub fn strongly_connected_components(
    graph: &OwnershipGraph,
    depth_limit: usize,
) -> Result<Vec<Vec<String>>, DepthExceeded> {
    let nodes: Vec<&str> = graph.nodes().collect();
    let count = nodes.len();
    let adjacency: Vec<Vec<usize>> = nodes
        .iter()
        .map(|name| {
            graph
                .edges_from(name)
                .iter()
                .filter_map(|edge| graph.node_index(&edge.to))
                .collect()
        })
        .collect();

    const UNVISITED: usize = usize::MAX;
    let mut index = vec![UNVISITED; count];
    let mut lowlink = vec![0usize; count];
    let mut on_stack = vec![false; count];
    let mut stack: Vec<usize> = Vec::new();
    let mut counter = 0usize;
    let mut components: Vec<Vec<String>> = Vec::new();

    for start in 0..count {
        if index[start] != UNVISITED {
            continue;
        }
        // (node, next outgoing edge to look at)
        let mut work: Vec<(usize, usize)> = vec![(start, 0)];
        while let Some(&(v, edge_pos)) = work.last() {
            if edge_pos == 0 {
                index[v] = counter;
                lowlink[v] = counter;
                counter += 1;
                stack.push(v);
                on_stack[v] = true;
            }
            if edge_pos < adjacency[v].len() {
                let top = work.len() - 1;
                work[top].1 += 1;
                let w = adjacency[v][edge_pos];
                if index[w] == UNVISITED {
                    if work.len() >= depth_limit {
                        return Err(DepthExceeded);
                    }
                    work.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
            } else {
                work.pop();
                if let Some(&(parent, _)) = work.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[v]);
                }
                if lowlink[v] == index[v] {
                    let mut component = Vec::new();
                    while let Some(w) = stack.pop() {
                        on_stack[w] = false;
                        component.push(w);
                        if w == v {
                            break;
                        }
                    }
                    let is_cycle =
                        component.len() > 1 || adjacency[v].iter().any(|&w| w == v);
                    if is_cycle {
                        component.sort_unstable();
                        components.push(
                            component.into_iter().map(|i| nodes[i].to_string()).collect(),
                        );
                    }
                }
            }
        }
    }

    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsc_ir::{Class, Declaration, Field, Module, Ownership, Type};

    fn module_with_classes(classes: &[(&str, &[(&str, &str)])]) -> Module {
        Module {
            name: "m".into(),
            path: "m.gs".into(),
            imports: Vec::new(),
            declarations: classes
                .iter()
                .map(|(name, fields)| {
                    Declaration::Class(Class {
                        name: (*name).to_string(),
                        type_params: Vec::new(),
                        extends: None,
                        implements: Vec::new(),
                        fields: fields
                            .iter()
                            .map(|(field, target)| Field {
                                name: (*field).to_string(),
                                ty: Type::class(*target, Ownership::Share),
                                is_readonly: false,
                                initializer: None,
                                loc: None,
                            })
                            .collect(),
                        constructor: None,
                        methods: Vec::new(),
                        loc: None,
                    })
                })
                .collect(),
            init_statements: Vec::new(),
        }
    }

    fn components_of(module: &Module) -> Vec<Vec<String>> {
        let graph = OwnershipGraph::build(std::slice::from_ref(module));
        strongly_connected_components(&graph, 10_000).expect("within depth bound")
    }

    #[test]
    fn acyclic_graph_has_no_reportable_components() {
        let module = module_with_classes(&[
            ("A", &[("b", "B")]),
            ("B", &[("c", "C")]),
            ("C", &[]),
        ]);
        assert!(components_of(&module).is_empty());
    }

    #[test]
    fn self_edge_is_a_single_node_component() {
        let module = module_with_classes(&[("Node", &[("next", "Node")])]);
        assert_eq!(components_of(&module), vec![vec!["Node".to_string()]]);
    }

    #[test]
    fn three_cycle_is_one_component_of_three() {
        let module = module_with_classes(&[
            ("A", &[("b", "B")]),
            ("B", &[("c", "C")]),
            ("C", &[("a", "A")]),
        ]);
        let components = components_of(&module);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0], vec!["A", "B", "C"]);
    }

    #[test]
    fn two_disjoint_cycles_stay_separate() {
        let module = module_with_classes(&[
            ("A", &[("b", "B")]),
            ("B", &[("a", "A")]),
            ("X", &[("y", "Y")]),
            ("Y", &[("x", "X")]),
        ]);
        let components = components_of(&module);
        assert_eq!(components.len(), 2);
        assert!(components.contains(&vec!["A".to_string(), "B".to_string()]));
        assert!(components.contains(&vec!["X".to_string(), "Y".to_string()]));
    }

    #[test]
    fn depth_bound_aborts_instead_of_overflowing() {
        // A straight chain deeper than the limit.
        let names: Vec<String> = (0..64).map(|i| format!("C{i}")).collect();
        let mut classes: Vec<(&str, Vec<(&str, &str)>)> = Vec::new();
        for i in 0..names.len() {
            let fields = if i + 1 < names.len() {
                vec![("next", names[i + 1].as_str())]
            } else {
                Vec::new()
            };
            classes.push((names[i].as_str(), fields));
        }
        let module = Module {
            name: "m".into(),
            path: "m.gs".into(),
            imports: Vec::new(),
            declarations: classes
                .iter()
                .map(|(name, fields)| {
                    Declaration::Class(Class {
                        name: (*name).to_string(),
                        type_params: Vec::new(),
                        extends: None,
                        implements: Vec::new(),
                        fields: fields
                            .iter()
                            .map(|(field, target)| Field {
                                name: (*field).to_string(),
                                ty: Type::class(*target, Ownership::Share),
                                is_readonly: false,
                                initializer: None,
                                loc: None,
                            })
                            .collect(),
                        constructor: None,
                        methods: Vec::new(),
                        loc: None,
                    })
                })
                .collect(),
            init_statements: Vec::new(),
        };
        let graph = OwnershipGraph::build(std::slice::from_ref(&module));
        assert_eq!(
            strongly_connected_components(&graph, 16),
            Err(DepthExceeded)
        );
        assert!(strongly_connected_components(&graph, 10_000).is_ok());
    }
}
