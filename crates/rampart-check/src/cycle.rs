use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use rampart_config::DottedPath;

use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};

/// Directed edges between module paths, one per non-deprecated dependency
/// actually exercised by at least one real import ("Circular-
/// dependency check").
#[derive(Default)]
pub struct DependencyGraph {
    edges: Vec<(DottedPath, DottedPath)>,
}

impl DependencyGraph {
    /// A graph with no edges yet.
    pub fn new() -> DependencyGraph {
        DependencyGraph::default()
    }

    /// Record that `from` depends on `to` via a real, non-deprecated import.
    pub fn record_edge(&mut self, from: DottedPath, to: DottedPath) {
        self.edges.push((from, to));
    }

    /// Find every strongly connected component with more than one node, or
    /// any node with a self-loop, via Tarjan's algorithm, and emit one
    /// `Configuration`-free `Dependency` error per cycle naming the modules
    /// involved in path order.
    pub fn find_cycles(&self) -> Vec<Diagnostic> {
        let mut graph = DiGraph::<DottedPath, ()>::new();
        let mut index_of = HashMap::new();
        for (from, to) in &self.edges {
            let from_idx = *index_of
                .entry(from.clone())
                .or_insert_with(|| graph.add_node(from.clone()));
            let to_idx = *index_of
                .entry(to.clone())
                .or_insert_with(|| graph.add_node(to.clone()));
            graph.add_edge(from_idx, to_idx, ());
        }

        let mut diagnostics = Vec::new();
        for component in tarjan_scc(&graph) {
            let is_self_loop = component.len() == 1
                && graph.contains_edge(component[0], component[0]);
            if component.len() > 1 || is_self_loop {
                let path = describe_cycle(&graph, &component);
                diagnostics.push(Diagnostic {
                    file_path: std::path::PathBuf::new(),
                    line_number: 0,
                    import_mod_path: DottedPath::empty(),
                    severity: Severity::Error,
                    kind: DiagnosticKind::Dependency,
                    message: format!("circular dependency: {path}"),
                });
            }
        }
        diagnostics
    }
}

/// Render one strongly connected component as the path-ordered arrow
/// notation spec §8 scenario 6 calls for (`a → b → a`), by walking the
/// component's actual recorded edges back to a chosen start node rather
/// than sorting its member names alphabetically.
fn describe_cycle(graph: &DiGraph<DottedPath, ()>, component: &[NodeIndex]) -> String {
    let start = component[0];

    if component.len() == 1 {
        let name = graph[start].to_string();
        return format!("{name} → {name}");
    }

    let members: HashSet<NodeIndex> = component.iter().copied().collect();
    let mut path = vec![start];
    let mut visited = HashSet::new();
    visited.insert(start);
    let closed = find_cycle_path(graph, &members, start, start, &mut visited, &mut path);
    debug_assert!(closed, "every node in a >1-node SCC reaches back to any other member");
    if closed {
        path.push(start);
    }
    path.iter().map(|&idx| graph[idx].to_string()).collect::<Vec<_>>().join(" → ")
}

/// DFS from `current` toward `start` through nodes in `members`,
/// appending each step onto `path` and backtracking on dead ends.
/// Returns whether a path back to `start` was found.
fn find_cycle_path(
    graph: &DiGraph<DottedPath, ()>,
    members: &HashSet<NodeIndex>,
    start: NodeIndex,
    current: NodeIndex,
    visited: &mut HashSet<NodeIndex>,
    path: &mut Vec<NodeIndex>,
) -> bool {
    if current != start && graph.contains_edge(current, start) {
        return true;
    }
    for next in graph.neighbors(current) {
        if next == start || !members.contains(&next) || visited.contains(&next) {
            continue;
        }
        visited.insert(next);
        path.push(next);
        if find_cycle_path(graph, members, start, next, visited, path) {
            return true;
        }
        path.pop();
        visited.remove(&next);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_edges_no_cycles() {
        let graph = DependencyGraph::new();
        assert!(graph.find_cycles().is_empty());
    }

    #[test]
    fn two_node_cycle_is_detected() {
        let mut graph = DependencyGraph::new();
        graph.record_edge(DottedPath::parse("a"), DottedPath::parse("b"));
        graph.record_edge(DottedPath::parse("b"), DottedPath::parse("a"));
        let cycles = graph.find_cycles();
        assert_eq!(cycles.len(), 1);
    }

    #[test]
    fn self_loop_is_detected() {
        let mut graph = DependencyGraph::new();
        graph.record_edge(DottedPath::parse("a"), DottedPath::parse("a"));
        let cycles = graph.find_cycles();
        assert_eq!(cycles.len(), 1);
    }

    #[test]
    fn acyclic_graph_has_no_findings() {
        let mut graph = DependencyGraph::new();
        graph.record_edge(DottedPath::parse("a"), DottedPath::parse("b"));
        graph.record_edge(DottedPath::parse("b"), DottedPath::parse("c"));
        assert!(graph.find_cycles().is_empty());
    }
}
