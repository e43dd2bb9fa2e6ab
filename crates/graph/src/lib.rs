//! Dependency graph and load ordering for loadorder.
//!
//! This crate sequences module and plugin loading. Callers record
//! "depends on" relations between payload values in a [`DirectedGraph`]
//! and ask [`TopologicalOrder`] for a leaf-first load order. Circular
//! dependencies fail the whole ordering with a [`CyclicGraphError`] that
//! lists every cycle found.
//!
//! # Key Types
//!
//! - [`DirectedGraph`]: payload-keyed directed graph with insertion-ordered nodes
//! - [`Node`]: borrowed view of a single node and its dependencies
//! - [`CycleDetector`]: yes/no cycle check
//! - [`TopologicalOrder`]: load ordering and load tiers
//! - [`CyclicGraphError`] / [`Cycle`]: structured cycle diagnostics
//!
//! # Example
//!
//! ```ignore
//! use loadorder_graph::{DirectedGraph, TopologicalOrder};
//!
//! let mut graph = DirectedGraph::new();
//! graph.add_edge("economy", "permissions");
//! graph.add_edge("shop", "economy");
//!
//! let order = TopologicalOrder::create_ordered_load(graph)?;
//! assert_eq!(order, vec!["permissions", "economy", "shop"]);
//! ```

mod cycle;
mod error;
mod graph;
mod order;

pub use cycle::CycleDetector;
pub use error::{Cycle, CyclicGraphError, Result};
pub use graph::{DirectedGraph, Node};
pub use order::{LoadTiers, TopologicalOrder};
