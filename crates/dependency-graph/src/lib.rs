//! Directed dependency graph with deterministic topological ordering.
//!
//! This crate provides a small in-memory graph keyed by string identifiers.
//! Callers register nodes and directed edges incrementally, then ask for the
//! order in which a node's transitive dependencies must be processed.
//!
//! # Key Types
//!
//! - [`DependencyGraph`]: The graph structure for building and sorting dependencies
//! - [`SortMode`]: Whether a sort covers only reachable nodes or every registered node
//! - [`TopologicalOrder`]: The sorted identifiers, dependencies first
//!
//! An edge `source -> dest` means "source depends on dest", so `dest` is
//! always emitted before `source`.
//!
//! # Example
//!
//! ```
//! use depgraph::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new();
//! for node in ["app", "lib", "core", "docs"] {
//!     graph.insert_node(node);
//! }
//! graph.insert_edge("app", "lib");
//! graph.insert_edge("lib", "core");
//!
//! assert_eq!(graph.sort_reachable("app"), ["core", "lib", "app"]);
//! assert_eq!(graph.sort_all("app"), ["core", "lib", "app", "docs"]);
//! ```

mod graph;
mod traversal;

pub use graph::DependencyGraph;
pub use traversal::{SortMode, TopologicalOrder, diff};
