//! Whole-program semantic analyzers.
//!
//! - [`graph`]: the share-ownership graph between declared classes and
//!   interfaces, and its construction rules.
//! - [`tarjan`]: iterative strongly-connected-component detection with a
//!   safety depth bound.
//! - [`null_safety`]: the `use<T>` escape rules.
//!
//! Both analyzers collect diagnostics; neither halts. Severity of ownership
//! findings depends on the memory mode: errors under `ownership`, warnings
//! under `gc`.

pub mod graph;
pub mod null_safety;
pub mod tarjan;

use tracing::debug;

use gsc_common::diagnostics::{Diagnostic, Severity, codes, format_message, get_message};
use gsc_common::MemoryMode;
use gsc_ir::Module;

use graph::OwnershipGraph;

/// Safety bound on the SCC traversal depth. Pathological inputs abort with
/// a compiler-internal diagnostic instead of overflowing the stack.
pub const DEFAULT_SCC_DEPTH_LIMIT: usize = 10_000;

/// Run the ownership-graph analysis over a whole program.
///
/// Builds the share-edge graph, finds self-loops and strongly connected
/// components, and renders GS301/GS302 findings with mode-dependent
/// severity.
pub fn analyze_ownership(modules: &[Module], mode: MemoryMode) -> Vec<Diagnostic> {
    let graph = OwnershipGraph::build(modules);
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "ownership graph built"
    );
    let severity = if mode.ownership_is_fatal() {
        Severity::Error
    } else {
        Severity::Warning
    };

    let mut diagnostics = Vec::new();

    // Self-loops: one GS301 per class, however deeply the share<Self> is
    // nested.
    for node in graph.nodes() {
        if let Some(edge) = graph.edges_from(node).iter().find(|e| e.to == node) {
            let message = render(codes::SHARE_SELF_LOOP, &[node, edge.field_name()]);
            diagnostics.push(
                Diagnostic::with_severity(codes::SHARE_SELF_LOOP, severity, message)
                    .at_opt(edge.loc.clone()),
            );
        }
    }

    // Multi-node components: one GS302 each, cycle rendered from the
    // in-component edges in insertion order.
    match tarjan::strongly_connected_components(&graph, DEFAULT_SCC_DEPTH_LIMIT) {
        Ok(components) => {
            for component in components {
                if component.len() < 2 {
                    continue;
                }
                let cycle = render_cycle(&graph, &component);
                let message = render(codes::SHARE_CYCLE, &[&cycle]);
                let loc = component
                    .iter()
                    .flat_map(|node| graph.edges_from(node))
                    .find(|edge| component.iter().any(|n| n == &edge.to))
                    .and_then(|edge| edge.loc.clone());
                diagnostics.push(
                    Diagnostic::with_severity(codes::SHARE_CYCLE, severity, message).at_opt(loc),
                );
            }
        }
        Err(tarjan::DepthExceeded) => {
            let limit = DEFAULT_SCC_DEPTH_LIMIT.to_string();
            diagnostics.push(Diagnostic::error(
                codes::SCC_DEPTH_LIMIT,
                render(codes::SCC_DEPTH_LIMIT, &[&limit]),
            ));
        }
    }

    diagnostics
}

/// `A.b -> B.c -> C.a -> A` for a component, walking each member's
/// in-component edges in insertion order.
fn render_cycle(graph: &OwnershipGraph, component: &[String]) -> String {
    let mut segments = Vec::new();
    for node in component {
        for edge in graph.edges_from(node) {
            if component.iter().any(|n| n == &edge.to) {
                segments.push(format!("{}.{}", node, edge.field_name()));
            }
        }
    }
    let mut cycle = segments.join(" -> ");
    if let Some(first) = component.first() {
        cycle.push_str(" -> ");
        cycle.push_str(first);
    }
    cycle
}

fn render(code: u32, args: &[&str]) -> String {
    match get_message(code) {
        Some(def) => format_message(def.message, args),
        None => format!("GS{code}"),
    }
}
