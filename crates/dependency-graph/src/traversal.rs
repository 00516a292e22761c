//! Traversal algorithms and types for dependency graphs.
//!
//! Sorting is a reverse-postorder depth-first traversal: every node is
//! emitted after all the nodes it transitively depends on. The traversal uses
//! an explicit stack, so long dependency chains cannot exhaust the call stack.

use crate::DependencyGraph;
use petgraph::graph::NodeIndex;
use std::collections::HashSet;
use std::hash::Hash;
use tracing::{debug, trace};

/// A topologically sorted sequence of identifiers.
///
/// Dependencies come before the identifiers that depend on them.
pub type TopologicalOrder = Vec<String>;

/// Which nodes a sort covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Only the start node and the nodes reachable from it.
    #[default]
    Reachable,
    /// Every registered node, components not reachable from the start
    /// appended after the reachable ones.
    All,
}

/// Per-call traversal state.
#[derive(Default)]
struct SortState {
    visited: HashSet<NodeIndex>,
    sorted: Vec<NodeIndex>,
}

/// A node on the traversal stack with the position of its next destination.
struct Frame {
    node: NodeIndex,
    successors: Vec<NodeIndex>,
    next: usize,
}

impl DependencyGraph {
    /// Topological sort starting from `start`.
    ///
    /// Nodes not reachable from `start` are excluded even if registered.
    #[must_use]
    pub fn sort_reachable(&self, start: &str) -> TopologicalOrder {
        self.sort(start, SortMode::Reachable)
    }

    /// Topological sort starting from `start` that also includes every
    /// registered node not reachable from it.
    ///
    /// The result begins with exactly the output of
    /// [`sort_reachable`](Self::sort_reachable).
    #[must_use]
    pub fn sort_all(&self, start: &str) -> TopologicalOrder {
        self.sort(start, SortMode::All)
    }

    /// Depth-first topological sort from `start`.
    ///
    /// Destinations are visited in edge insertion order and each node is
    /// emitted once all of its destinations have been. A node already
    /// visited is skipped, so cyclic input terminates with every node of the
    /// cycle emitted once in first-visit order.
    ///
    /// With [`SortMode::All`], further passes are seeded from the first
    /// registered node not yet emitted until every registered node is.
    ///
    /// A `start` that was never mentioned yields a single-element pass
    /// containing just `start`.
    #[must_use]
    pub fn sort(&self, start: &str, mode: SortMode) -> TopologicalOrder {
        let mut state = SortState::default();
        let mut order = TopologicalOrder::new();
        let mut passes = 1;

        match self.index_of(start) {
            Some(root) => self.visit(root, &mut state),
            None => order.push(start.to_string()),
        }

        if mode == SortMode::All {
            // Same seed as the head of diff(sorted, nodes): the visited set
            // only grows, so earlier registered nodes never become unvisited.
            let registered = self.registered();
            let mut cursor = 0;
            while let Some(offset) = registered[cursor..]
                .iter()
                .position(|index| !state.visited.contains(index))
            {
                cursor += offset;
                let seed = registered[cursor];
                trace!("Seeding pass {} from '{}'", passes + 1, self.name(seed));
                self.visit(seed, &mut state);
                passes += 1;
            }
        }

        order.extend(
            state
                .sorted
                .into_iter()
                .map(|index| self.name(index).to_string()),
        );
        debug!(
            "Sorted {} nodes from '{}' ({:?}, {} passes)",
            order.len(),
            start,
            mode,
            passes
        );

        order
    }

    fn visit(&self, root: NodeIndex, state: &mut SortState) {
        if !state.visited.insert(root) {
            return;
        }

        let mut stack = vec![Frame {
            node: root,
            successors: self.successors(root),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if let Some(&child) = frame.successors.get(frame.next) {
                frame.next += 1;
                if state.visited.insert(child) {
                    stack.push(Frame {
                        node: child,
                        successors: self.successors(child),
                        next: 0,
                    });
                }
            } else {
                state.sorted.push(frame.node);
                stack.pop();
            }
        }
    }
}

/// Elements of `want` that are not in `have`, in `want`'s order.
///
/// Returns an empty list when every element of `want` is in `have`.
#[must_use]
pub fn diff<T>(have: &[T], want: &[T]) -> Vec<T>
where
    T: Eq + Hash + Clone,
{
    let have: HashSet<&T> = have.iter().collect();
    want.iter()
        .filter(|item| !have.contains(item))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(nodes: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for node in nodes {
            graph.insert_node(*node);
        }
        for (source, dest) in edges {
            graph.insert_edge(*source, *dest);
        }
        graph
    }

    fn scenario_graph() -> DependencyGraph {
        graph_with(
            &["a", "b", "c", "d", "e", "f", "g", "h"],
            &[
                ("a", "c"),
                ("b", "c"),
                ("b", "d"),
                ("c", "e"),
                ("d", "f"),
                ("e", "h"),
                ("e", "f"),
                ("f", "g"),
            ],
        )
    }

    #[test]
    fn test_sort_chain() {
        let graph = graph_with(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);

        assert_eq!(graph.sort_reachable("a"), ["c", "b", "a"]);
        assert_eq!(graph.sort_all("a"), ["c", "b", "a"]);
    }

    #[test]
    fn test_sort_diamond() {
        let graph = graph_with(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );

        assert_eq!(graph.sort_reachable("a"), ["d", "b", "c", "a"]);
        assert_eq!(graph.sort_all("a"), ["d", "b", "c", "a"]);
    }

    #[test]
    fn test_sort_reachable_excludes_unreachable() {
        let graph = scenario_graph();

        assert_eq!(
            graph.sort_reachable("a"),
            ["h", "g", "f", "e", "c", "a"]
        );
    }

    #[test]
    fn test_sort_all_appends_unreachable() {
        let graph = scenario_graph();

        assert_eq!(
            graph.sort_all("a"),
            ["h", "g", "f", "e", "c", "a", "d", "b"]
        );
    }

    #[test]
    fn test_sort_from_middle_of_graph() {
        let graph = scenario_graph();

        assert_eq!(graph.sort_reachable("e"), ["h", "g", "f", "e"]);
        assert_eq!(
            graph.sort_all("e"),
            ["h", "g", "f", "e", "c", "a", "d", "b"]
        );
    }

    #[test]
    fn test_sort_with_mode_matches_wrappers() {
        let graph = scenario_graph();

        assert_eq!(graph.sort("b", SortMode::Reachable), graph.sort_reachable("b"));
        assert_eq!(graph.sort("b", SortMode::All), graph.sort_all("b"));
        assert_eq!(SortMode::default(), SortMode::Reachable);
    }

    #[test]
    fn test_sort_unknown_start() {
        let graph = graph_with(&["a", "b"], &[("a", "b")]);

        assert_eq!(graph.sort_reachable("zzz"), ["zzz"]);
        assert_eq!(graph.sort_all("zzz"), ["zzz", "b", "a"]);
    }

    #[test]
    fn test_sort_empty_graph() {
        let graph = DependencyGraph::new();

        assert_eq!(graph.sort_reachable("a"), ["a"]);
        assert_eq!(graph.sort_all("a"), ["a"]);
    }

    #[test]
    fn test_sort_registered_leaf() {
        let graph = graph_with(&["a"], &[]);

        assert_eq!(graph.sort_reachable("a"), ["a"]);
    }

    #[test]
    fn test_sort_includes_unregistered_endpoints() {
        let graph = graph_with(&["a"], &[("a", "b"), ("b", "c")]);

        assert_eq!(graph.sort_reachable("a"), ["c", "b", "a"]);
        assert_eq!(graph.sort_all("a"), ["c", "b", "a"]);
    }

    #[test]
    fn test_sort_all_skips_unregistered_components() {
        let graph = graph_with(&["a", "b"], &[("x", "y")]);

        assert_eq!(graph.sort_all("a"), ["a", "b"]);
    }

    #[test]
    fn test_sort_cycle_terminates() {
        let graph = graph_with(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("c", "a")]);

        assert_eq!(graph.sort_reachable("a"), ["c", "b", "a"]);
        assert_eq!(graph.sort_reachable("b"), ["a", "c", "b"]);
        assert_eq!(graph.sort_all("c"), ["b", "a", "c"]);
    }

    #[test]
    fn test_sort_self_loop() {
        let graph = graph_with(&["a", "b"], &[("a", "a"), ("a", "b")]);

        assert_eq!(graph.sort_reachable("a"), ["b", "a"]);
    }

    #[test]
    fn test_sort_is_repeatable() {
        let graph = scenario_graph();

        let first = graph.sort_all("b");
        let second = graph.sort_all("b");
        assert_eq!(first, second);
        assert_eq!(graph.sort_reachable("b"), graph.sort_reachable("b"));
    }

    #[test]
    fn test_sort_does_not_mutate_graph() {
        let graph = scenario_graph();
        let nodes_before: Vec<String> = graph.nodes().map(String::from).collect();

        let _ = graph.sort_all("a");

        let nodes_after: Vec<String> = graph.nodes().map(String::from).collect();
        assert_eq!(nodes_before, nodes_after);
        assert_eq!(graph.edge_count(), 8);
    }

    #[test]
    fn test_sort_deep_chain() {
        let depth = 100_000;
        let mut graph = DependencyGraph::new();
        for i in 1..depth {
            graph.insert_edge(format!("n{i}"), format!("n{}", i - 1));
        }

        let sorted = graph.sort_reachable(&format!("n{}", depth - 1));
        assert_eq!(sorted.len(), depth);
        assert_eq!(sorted[0], "n0");
        assert_eq!(sorted[depth - 1], format!("n{}", depth - 1));
    }

    #[test]
    fn test_diff_equal() {
        assert!(diff(&["1", "2"], &["1", "2"]).is_empty());
    }

    #[test]
    fn test_diff_missing_element() {
        assert_eq!(diff(&["1", "2"], &["1", "2", "3"]), ["3"]);
    }

    #[test]
    fn test_diff_preserves_want_order() {
        assert_eq!(diff(&["b"], &["c", "b", "a", "d"]), ["c", "a", "d"]);
        assert!(diff::<&str>(&[], &[]).is_empty());
    }
}
