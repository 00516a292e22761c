//! Dependency graph storage using petgraph.
//!
//! Identifiers are interned into a directed graph the first time they are
//! mentioned, either by node registration or by an edge. Registration order
//! and edge insertion order are tracked explicitly so that sorting never
//! depends on petgraph's adjacency iteration order.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::debug;

/// A node in the dependency graph.
#[derive(Debug, Clone)]
struct GraphNode {
    /// Identifier of the node.
    name: String,
    /// Whether the identifier was registered with [`DependencyGraph::insert_node`].
    registered: bool,
}

/// Directed graph of string identifiers for dependency ordering.
///
/// An edge `source -> dest` means `source` depends on `dest`. Edges may
/// mention identifiers that were never registered as nodes; such identifiers
/// take part in traversal but are not part of [`nodes`](Self::nodes).
///
/// Sorting borrows the graph immutably and keeps its traversal state local to
/// the call, so a built graph can be shared and sorted from several threads.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Interned identifiers. Edge weights are global insertion ordinals.
    graph: DiGraph<GraphNode, usize>,
    /// Map from identifiers to node indices.
    name_to_node: HashMap<String, NodeIndex>,
    /// Registered nodes in registration order.
    registered: Vec<NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(source, dest)` pairs without registering any node.
    #[must_use]
    pub fn from_edges<I, S, D>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, D)>,
        S: Into<String>,
        D: Into<String>,
    {
        let mut graph = Self::new();
        graph.extend(edges);
        graph
    }

    /// Register a node.
    ///
    /// Registering an identifier twice is a no-op. An identifier first seen
    /// as an edge endpoint is registered at the current position.
    pub fn insert_node(&mut self, id: impl Into<String>) {
        let index = self.intern(id.into());
        let node = &mut self.graph[index];
        if node.registered {
            return;
        }

        node.registered = true;
        self.registered.push(index);
        debug!("Registered node '{}'", node.name);
    }

    /// Add a dependency edge from `source` to `dest`.
    ///
    /// Neither endpoint needs to be registered. Duplicate edges are ignored
    /// and self-loops are accepted.
    pub fn insert_edge(&mut self, source: impl Into<String>, dest: impl Into<String>) {
        let source = self.intern(source.into());
        let dest = self.intern(dest.into());
        if self.graph.contains_edge(source, dest) {
            return;
        }

        let ordinal = self.graph.edge_count();
        self.graph.add_edge(source, dest, ordinal);
        debug!(
            "Added edge '{}' -> '{}'",
            self.graph[source].name, self.graph[dest].name
        );
    }

    /// Registered identifiers in registration order.
    #[must_use]
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.registered.iter().map(|&index| self.name(index))
    }

    /// Destinations of `source` in the order their edges were inserted.
    ///
    /// Returns an empty list when `source` has no outgoing edges or is unknown.
    #[must_use]
    pub fn destinations(&self, source: &str) -> Vec<&str> {
        self.index_of(source)
            .map(|index| {
                self.successors(index)
                    .into_iter()
                    .map(|dest| self.name(dest))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check if an identifier is a registered node.
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.index_of(id)
            .is_some_and(|index| self.graph[index].registered)
    }

    /// Get the number of registered nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.registered.len()
    }

    /// Get the number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if the graph has neither registered nodes nor edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty() && self.graph.edge_count() == 0
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.name_to_node.get(id).copied()
    }

    pub(crate) fn name(&self, index: NodeIndex) -> &str {
        &self.graph[index].name
    }

    pub(crate) fn registered(&self) -> &[NodeIndex] {
        &self.registered
    }

    /// Outgoing neighbours of `index`, ordered by edge insertion.
    pub(crate) fn successors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<(usize, NodeIndex)> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| (*edge.weight(), edge.target()))
            .collect();
        edges.sort_unstable_by_key(|&(ordinal, _)| ordinal);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    fn intern(&mut self, name: String) -> NodeIndex {
        if let Some(&index) = self.name_to_node.get(&name) {
            return index;
        }

        let index = self.graph.add_node(GraphNode {
            name: name.clone(),
            registered: false,
        });
        self.name_to_node.insert(name, index);
        index
    }
}

impl<S, D> Extend<(S, D)> for DependencyGraph
where
    S: Into<String>,
    D: Into<String>,
{
    fn extend<I: IntoIterator<Item = (S, D)>>(&mut self, edges: I) {
        for (source, dest) in edges {
            self.insert_edge(source, dest);
        }
    }
}
