//! Load ordering over dependency graphs.
//!
//! Ordering repeatedly takes the first node, in insertion order, that has no
//! remaining dependencies. If every remaining node still depends on
//! something, the rest of the graph is cyclic and the whole operation fails
//! with every cycle listed. No partial order is returned.

use crate::error::{CyclicGraphError, Result};
use crate::graph::DirectedGraph;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::Hash;
use tracing::{debug, trace};

/// Groups of payloads that can load together.
///
/// Every member of tier `n` depends only on members of tiers before `n`.
pub type LoadTiers<T> = Vec<Vec<T>>;

/// Leaf-first topological ordering.
///
/// For every edge `a -> b` ("a depends on b"), `b` is placed before `a`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopologicalOrder;

impl TopologicalOrder {
    /// Consume the graph and compute its load order.
    ///
    /// # Errors
    ///
    /// Returns [`CyclicGraphError`] listing every cycle when the graph
    /// cannot be fully ordered.
    #[allow(clippy::needless_pass_by_value)]
    pub fn create_ordered_load<T>(graph: DirectedGraph<T>) -> Result<Vec<T>, T>
    where
        T: Clone + Eq + Hash + fmt::Debug + fmt::Display,
    {
        Self::ordered_load(&graph)
    }

    /// Compute the load order without consuming the graph.
    ///
    /// Ties between nodes that are ready at the same time go to the one
    /// inserted first, so the result depends only on insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`CyclicGraphError`] listing every cycle when the graph
    /// cannot be fully ordered.
    pub fn ordered_load<T>(graph: &DirectedGraph<T>) -> Result<Vec<T>, T>
    where
        T: Clone + Eq + Hash + fmt::Debug + fmt::Display,
    {
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Computing load order"
        );

        // Remaining out-degree per raw node index, and the ready nodes keyed by
        // insertion rank so the first ready node is always the smallest key.
        let mut remaining = vec![0_usize; graph.index_bound()];
        let mut rank = vec![0_usize; graph.index_bound()];
        let mut ready = BTreeMap::new();

        for (position, index) in graph.node_indices().enumerate() {
            let degree = graph.successors(index).count();
            remaining[index.index()] = degree;
            rank[index.index()] = position;
            if degree == 0 {
                ready.insert(position, index);
            }
        }

        let mut order = Vec::with_capacity(graph.node_count());
        while let Some((_, index)) = ready.pop_first() {
            trace!(position = order.len(), "Placing node in load order");
            order.push(graph.payload(index).clone());

            for dependent in graph.predecessors(index) {
                let degree = &mut remaining[dependent.index()];
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(rank[dependent.index()], dependent);
                }
            }
        }

        if order.len() < graph.node_count() {
            let placed: HashSet<&T> = order.iter().collect();
            let mut unresolved = graph.clone();
            unresolved.retain(|payload| !placed.contains(payload));
            return Err(Self::cyclic(&unresolved));
        }

        debug!(nodes = order.len(), "Load order computed");
        Ok(order)
    }

    /// Group the graph into load tiers.
    ///
    /// A node with no dependencies sits in tier 0; any other node sits one
    /// tier above its highest dependency. Members of a tier keep insertion
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`CyclicGraphError`] when the graph contains cycles.
    pub fn load_tiers<T>(graph: &DirectedGraph<T>) -> Result<LoadTiers<T>, T>
    where
        T: Clone + Eq + Hash + fmt::Debug + fmt::Display,
    {
        let order = Self::ordered_load(graph)?;
        if order.is_empty() {
            return Ok(vec![]);
        }

        let mut tier_of = vec![0_usize; graph.index_bound()];
        for payload in &order {
            let Some(node) = graph.get_node(payload) else {
                continue;
            };
            let tier = node
                .dependencies()
                .filter_map(|dep| graph.get_node(dep))
                .map(|dep| tier_of[dep.slot()] + 1)
                .max()
                .unwrap_or(0);
            tier_of[node.slot()] = tier;
        }

        let mut tiers: LoadTiers<T> = vec![];
        for node in graph.nodes() {
            let tier = tier_of[node.slot()];
            if tier >= tiers.len() {
                tiers.resize(tier + 1, vec![]);
            }
            tiers[tier].push(node.payload().clone());
        }

        debug!(tiers = tiers.len(), "Load tiers computed");
        Ok(tiers)
    }

    fn cyclic<T>(unresolved: &DirectedGraph<T>) -> CyclicGraphError<T>
    where
        T: Clone + Eq + Hash + fmt::Debug + fmt::Display,
    {
        let error = CyclicGraphError::new(unresolved.find_cycles());
        debug!(
            unresolved = unresolved.node_count(),
            cycles = error.cycles().len(),
            "Cannot order dependency graph: {}",
            error.diagnostic()
        );
        error
    }
}

impl<T: Clone + Eq + Hash + fmt::Debug + fmt::Display> DirectedGraph<T> {
    /// Compute the load order of this graph, leaving it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CyclicGraphError`] when the graph contains cycles.
    pub fn load_order(&self) -> Result<Vec<T>, T> {
        TopologicalOrder::ordered_load(self)
    }

    /// Group this graph into load tiers. See [`TopologicalOrder::load_tiers`].
    ///
    /// # Errors
    ///
    /// Returns [`CyclicGraphError`] when the graph contains cycles.
    pub fn load_tiers(&self) -> Result<LoadTiers<T>, T> {
        TopologicalOrder::load_tiers(self)
    }
}
