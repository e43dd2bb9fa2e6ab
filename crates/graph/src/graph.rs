//! Directed dependency graph keyed by payload values.
//!
//! Nodes are identified by their payload: adding an edge between two values
//! creates any missing nodes, and a graph never holds two nodes with equal
//! payloads. An edge `a -> b` reads "a depends on b" (b must load first).

use indexmap::IndexMap;
use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::NodeIndexable;
use std::fmt;
use std::hash::Hash;
use tracing::debug;

/// A mutable adjacency-list directed graph over payloads of type `T`.
///
/// Node iteration follows insertion order, which keeps load ordering
/// deterministic when several nodes are equally ready.
#[derive(Clone)]
pub struct DirectedGraph<T> {
    /// Edge structure. Removing a node drops its incident edges.
    graph: StableDiGraph<T, ()>,
    /// Payload lookup, in insertion order.
    index: IndexMap<T, NodeIndex>,
}

/// A borrowed view of one node in a [`DirectedGraph`].
///
/// Two views compare equal when their payloads are equal.
pub struct Node<'a, T> {
    graph: &'a DirectedGraph<T>,
    index: NodeIndex,
}

impl<T> Clone for Node<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Node<'_, T> {}

impl<'a, T> Node<'a, T> {
    /// The payload wrapped by this node.
    #[must_use]
    pub fn payload(&self) -> &'a T {
        &self.graph.graph[self.index]
    }

    /// Payloads this node depends on (its outgoing edges).
    pub fn dependencies(self) -> impl Iterator<Item = &'a T> + 'a {
        let graph = &self.graph.graph;
        graph.neighbors(self.index).map(move |n| &graph[n])
    }

    /// Number of outgoing edges.
    #[must_use]
    pub fn out_degree(&self) -> usize {
        self.graph.graph.neighbors(self.index).count()
    }

    /// Raw storage slot, for index-addressed scratch tables.
    pub(crate) fn slot(&self) -> usize {
        self.index.index()
    }

    /// Returns true if the node has an edge to itself.
    #[must_use]
    pub fn has_self_loop(&self) -> bool {
        self.graph.graph.find_edge(self.index, self.index).is_some()
    }
}

impl<T: PartialEq> PartialEq for Node<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.payload() == other.payload()
    }
}

impl<T: Eq> Eq for Node<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Node<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("payload", self.payload())
            .field("dependencies", &self.dependencies().collect::<Vec<_>>())
            .finish()
    }
}

impl<T: Clone + Eq + Hash> DirectedGraph<T> {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            index: IndexMap::new(),
        }
    }

    /// Create an empty graph with room for the given number of nodes and edges.
    #[must_use]
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: StableDiGraph::with_capacity(nodes, edges),
            index: IndexMap::with_capacity(nodes),
        }
    }

    fn ensure_node(&mut self, payload: T) -> NodeIndex {
        if let Some(&index) = self.index.get(&payload) {
            return index;
        }

        let index = self.graph.add_node(payload.clone());
        self.index.insert(payload, index);
        debug!(nodes = self.index.len(), "Added graph node");
        index
    }

    /// Ensure a node exists for the payload and return it.
    ///
    /// Adding a payload that is already present returns the existing node.
    pub fn add(&mut self, payload: T) -> Node<'_, T> {
        let index = self.ensure_node(payload);
        Node { graph: &*self, index }
    }

    /// Add a dependency edge `from -> to`, creating missing nodes.
    ///
    /// Returns `false` when the edge was already present; the graph is then
    /// unchanged. `from == to` stores a self-loop.
    pub fn add_edge(&mut self, from: T, to: T) -> bool {
        let from = self.ensure_node(from);
        let to = self.ensure_node(to);

        if self.graph.find_edge(from, to).is_some() {
            return false;
        }

        self.graph.add_edge(from, to, ());
        true
    }

    /// Check whether a node with this payload exists.
    #[must_use]
    pub fn contains(&self, payload: &T) -> bool {
        self.index.contains_key(payload)
    }

    /// Get the node for a payload, if present.
    #[must_use]
    pub fn get_node(&self, payload: &T) -> Option<Node<'_, T>> {
        self.index
            .get(payload)
            .map(|&index| Node { graph: self, index })
    }

    /// Check whether the edge `from -> to` exists.
    #[must_use]
    pub fn has_edge(&self, from: &T, to: &T) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&a), Some(&b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    /// Remove the node for a payload along with every edge into or out of it.
    ///
    /// Returns `false` if no such node existed.
    pub fn delete(&mut self, payload: &T) -> bool {
        let Some(index) = self.index.shift_remove(payload) else {
            return false;
        };

        self.graph.remove_node(index);
        debug!(nodes = self.index.len(), "Removed graph node");
        true
    }

    /// Remove the edge `from -> to`. Both nodes stay in the graph.
    pub fn remove_edge(&mut self, from: &T, to: &T) -> bool {
        let (Some(&a), Some(&b)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };

        match self.graph.find_edge(a, b) {
            Some(edge) => self.graph.remove_edge(edge).is_some(),
            None => false,
        }
    }

    /// Keep only the nodes whose payload satisfies the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        let graph = &mut self.graph;
        self.index.retain(|payload, index| {
            let kept = keep(payload);
            if !kept {
                graph.remove_node(*index);
            }
            kept
        });
    }

    /// Return a copy of the graph with every edge reversed.
    ///
    /// Node order is preserved; the original graph is left untouched.
    #[must_use]
    pub fn reverse(&self) -> Self {
        let mut reversed = Self::with_capacity(self.node_count(), self.edge_count());

        for payload in self.index.keys() {
            reversed.ensure_node(payload.clone());
        }
        for (from, to) in self.edges() {
            reversed.add_edge(to.clone(), from.clone());
        }

        reversed
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    /// Number of edges (the sum of all out-degrees).
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns true if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterate over nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = Node<'_, T>> {
        self.index
            .values()
            .map(move |&index| Node { graph: self, index })
    }

    /// Iterate over every edge as `(from, to)` payload pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&T, &T)> {
        self.nodes().flat_map(|node| {
            let from = node.payload();
            node.dependencies().map(move |to| (from, to))
        })
    }

    /// Payloads that depend on the given one (its incoming edges).
    pub fn dependents_of(&self, payload: &T) -> impl Iterator<Item = &T> {
        let graph = &self.graph;
        self.index.get(payload).into_iter().flat_map(move |&index| {
            graph
                .neighbors_directed(index, Direction::Incoming)
                .map(move |n| &graph[n])
        })
    }

    /// Node indices in insertion order.
    pub(crate) fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.index.values().copied()
    }

    pub(crate) fn successors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> {
        self.graph.neighbors(index)
    }

    pub(crate) fn predecessors(&self, index: NodeIndex) -> impl Iterator<Item = NodeIndex> {
        self.graph.neighbors_directed(index, Direction::Incoming)
    }

    pub(crate) fn payload(&self, index: NodeIndex) -> &T {
        &self.graph[index]
    }

    pub(crate) fn node_at(&self, index: NodeIndex) -> Node<'_, T> {
        Node { graph: self, index }
    }

    /// Upper bound on raw node indices, for index-addressed scratch tables.
    pub(crate) fn index_bound(&self) -> usize {
        self.graph.node_bound()
    }
}

impl<T: Clone + Eq + Hash> Default for DirectedGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Eq + Hash> Extend<(T, T)> for DirectedGraph<T> {
    fn extend<I: IntoIterator<Item = (T, T)>>(&mut self, edges: I) {
        for (from, to) in edges {
            self.add_edge(from, to);
        }
    }
}

impl<T: Clone + Eq + Hash> FromIterator<(T, T)> for DirectedGraph<T> {
    fn from_iter<I: IntoIterator<Item = (T, T)>>(edges: I) -> Self {
        let mut graph = Self::new();
        graph.extend(edges);
        graph
    }
}

impl<T: fmt::Debug> fmt::Debug for DirectedGraph<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.index.iter().map(|(payload, &index)| {
                let deps: Vec<&T> = self
                    .graph
                    .neighbors(index)
                    .map(|n| &self.graph[n])
                    .collect();
                (payload, deps)
            }))
            .finish()
    }
}
