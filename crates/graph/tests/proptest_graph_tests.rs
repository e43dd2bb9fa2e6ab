//! Property-based tests for dependency graph invariants.
//!
//! These tests verify the behavioral contracts of the load-order engine:
//! - Load order respects every dependency and contains every node once
//! - Cycle detection agrees with petgraph on arbitrary graphs
//! - Every reported cycle really is a strongly connected group
//! - Reversal swaps edges without touching the original

use loadorder_graph::{DirectedGraph, TopologicalOrder};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

// =============================================================================
// Strategies for generating test data
// =============================================================================

/// Generate an acyclic edge list over `0..node_count`.
///
/// Nodes only depend on nodes with a lower number, so no cycle can form.
fn dag_strategy(max_nodes: u32) -> impl Strategy<Value = (u32, Vec<(u32, u32)>)> {
    (2..=max_nodes).prop_flat_map(|node_count| {
        let edge = (1..node_count).prop_flat_map(|from| (Just(from), 0..from));
        (
            Just(node_count),
            proptest::collection::vec(edge, 0..(node_count as usize * 2)),
        )
    })
}

/// Generate an arbitrary edge list, self-loops and cycles included.
fn any_graph_strategy(max_nodes: u32) -> impl Strategy<Value = Vec<(u32, u32)>> {
    (1..=max_nodes).prop_flat_map(|node_count| {
        proptest::collection::vec((0..node_count, 0..node_count), 0..(node_count as usize * 2))
    })
}

/// Generate a ring `0 -> 1 -> ... -> n-1 -> 0` of the given size range.
fn ring_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
    (1..=12_u32).prop_map(|len| (0..len).map(|i| (i, (i + 1) % len)).collect())
}

// =============================================================================
// Helper Functions
// =============================================================================

fn build_graph(node_count: u32, edges: &[(u32, u32)]) -> DirectedGraph<u32> {
    let mut graph = DirectedGraph::new();
    for node in 0..node_count {
        graph.add(node);
    }
    graph.extend(edges.iter().copied());
    graph
}

fn to_petgraph(graph: &DirectedGraph<u32>) -> DiGraph<u32, ()> {
    let mut pg = DiGraph::new();
    let indices: HashMap<u32, _> = graph
        .nodes()
        .map(|node| (*node.payload(), pg.add_node(*node.payload())))
        .collect();
    for (from, to) in graph.edges() {
        pg.add_edge(indices[from], indices[to], ());
    }
    pg
}

fn edge_set(graph: &DirectedGraph<u32>) -> HashSet<(u32, u32)> {
    graph.edges().map(|(a, b)| (*a, *b)).collect()
}

/// Order by repeatedly deleting the first node with no remaining dependencies.
fn scan_and_delete_order(mut graph: DirectedGraph<u32>) -> Option<Vec<u32>> {
    let mut order = Vec::new();
    while !graph.is_empty() {
        let leaf = graph
            .nodes()
            .find(|node| node.out_degree() == 0)
            .map(|node| *node.payload())?;
        graph.delete(&leaf);
        order.push(leaf);
    }
    Some(order)
}

/// Nodes reachable from `start` following dependency edges.
fn reachable(graph: &DirectedGraph<u32>, start: u32) -> HashSet<u32> {
    let mut seen = HashSet::new();
    let mut frontier = vec![start];
    while let Some(current) = frontier.pop() {
        if let Some(node) = graph.get_node(&current) {
            for dep in node.dependencies() {
                if seen.insert(*dep) {
                    frontier.push(*dep);
                }
            }
        }
    }
    seen
}

// =============================================================================
// Property Tests: Load Order
// =============================================================================

proptest! {
    /// Contract: for every edge `a -> b`, `b` is placed before `a`.
    #[test]
    fn load_order_respects_dependencies((node_count, edges) in dag_strategy(25)) {
        let graph = build_graph(node_count, &edges);
        let order = TopologicalOrder::create_ordered_load(graph).expect("DAG should order");

        let positions: HashMap<u32, usize> =
            order.iter().enumerate().map(|(i, n)| (*n, i)).collect();

        for (from, to) in &edges {
            prop_assert!(
                positions[to] < positions[from],
                "Dependency {} (pos {}) should come before {} (pos {})",
                to, positions[to], from, positions[from]
            );
        }
    }

    /// Contract: a successful order contains every node exactly once.
    #[test]
    fn load_order_is_complete((node_count, edges) in dag_strategy(25)) {
        let graph = build_graph(node_count, &edges);
        let order = graph.load_order().expect("DAG should order");

        prop_assert_eq!(order.len(), node_count as usize);
        let unique: HashSet<u32> = order.iter().copied().collect();
        prop_assert_eq!(unique.len(), node_count as usize);
    }

    /// Contract: ordering is deterministic for a given insertion order.
    #[test]
    fn load_order_is_deterministic((node_count, edges) in dag_strategy(20)) {
        let first = build_graph(node_count, &edges).load_order().expect("DAG should order");
        let second = build_graph(node_count, &edges).load_order().expect("DAG should order");
        prop_assert_eq!(first, second);
    }

    /// Contract: the order equals the one produced by deleting the first
    /// dependency-free node in insertion order, one node at a time, and both
    /// fail on the same graphs.
    #[test]
    fn load_order_matches_scan_and_delete(
        edges in any_graph_strategy(12),
        isolated in proptest::collection::vec(0..20_u32, 0..5),
    ) {
        let mut graph = DirectedGraph::new();
        for (i, (from, to)) in edges.iter().enumerate() {
            if let Some(node) = isolated.get(i) {
                graph.add(*node);
            }
            graph.add_edge(*from, *to);
        }

        let expected = scan_and_delete_order(graph.clone());
        prop_assert_eq!(graph.load_order().ok(), expected);
    }

    /// Contract: tiers partition the graph and dependencies sit in earlier tiers.
    #[test]
    fn load_tiers_respect_dependencies((node_count, edges) in dag_strategy(20)) {
        let graph = build_graph(node_count, &edges);
        let tiers = graph.load_tiers().expect("DAG should tier");

        let mut tier_of = HashMap::new();
        for (tier, members) in tiers.iter().enumerate() {
            for member in members {
                prop_assert!(tier_of.insert(*member, tier).is_none(), "{} in two tiers", member);
            }
        }
        prop_assert_eq!(tier_of.len(), node_count as usize);

        for (from, to) in &edges {
            prop_assert!(tier_of[to] < tier_of[from]);
        }
    }
}

// =============================================================================
// Property Tests: Cycle Detection
// =============================================================================

proptest! {
    /// Contract: the cycle check agrees with petgraph on arbitrary graphs,
    /// and ordering fails exactly when a cycle exists.
    #[test]
    fn cycle_detection_matches_petgraph(edges in any_graph_strategy(12)) {
        let graph: DirectedGraph<u32> = edges.iter().copied().collect();
        let expected = is_cyclic_directed(&to_petgraph(&graph));

        prop_assert_eq!(graph.has_cycle(), expected);
        prop_assert_eq!(graph.load_order().is_err(), expected);
        prop_assert_eq!(graph.find_cycles().is_empty(), !expected);
    }

    /// Contract: every reported cycle is strongly connected, and reported
    /// cycles never share a member.
    #[test]
    fn reported_cycles_are_strongly_connected(edges in any_graph_strategy(12)) {
        let graph: DirectedGraph<u32> = edges.iter().copied().collect();
        let mut seen = HashSet::new();

        for cycle in graph.find_cycles() {
            for member in cycle.members() {
                prop_assert!(seen.insert(*member), "{} reported in two cycles", member);
                let reach = reachable(&graph, *member);
                for other in cycle.members() {
                    prop_assert!(reach.contains(other), "{} cannot reach {}", member, other);
                }
            }
        }
    }

    /// Contract: a ring of any length fails with exactly one cycle holding all members.
    #[test]
    fn ring_reports_single_cycle(edges in ring_strategy()) {
        let graph: DirectedGraph<u32> = edges.iter().copied().collect();
        let node_count = graph.node_count();

        let err = TopologicalOrder::create_ordered_load(graph).expect_err("ring must not order");
        prop_assert_eq!(err.cycles().len(), 1);
        prop_assert_eq!(err.cycles()[0].len(), node_count);
    }
}

// =============================================================================
// Property Tests: Graph Structure
// =============================================================================

proptest! {
    /// Contract: reversing swaps every edge and reversing twice restores the graph.
    #[test]
    fn reverse_swaps_edges(edges in any_graph_strategy(12)) {
        let graph: DirectedGraph<u32> = edges.iter().copied().collect();
        let before = edge_set(&graph);
        let reversed = graph.reverse();

        let swapped: HashSet<(u32, u32)> = before.iter().map(|(a, b)| (*b, *a)).collect();
        prop_assert_eq!(edge_set(&reversed), swapped);
        prop_assert_eq!(edge_set(&reversed.reverse()), before.clone());
        prop_assert_eq!(edge_set(&graph), before);
    }

    /// Contract: counts stay consistent with the structure across deletes.
    #[test]
    fn counts_stay_consistent(edges in any_graph_strategy(12), victim in 0..12_u32) {
        let mut graph: DirectedGraph<u32> = edges.iter().copied().collect();
        let unique_edges: HashSet<(u32, u32)> = edges.iter().copied().collect();
        prop_assert_eq!(graph.edge_count(), unique_edges.len());

        graph.delete(&victim);
        let expected = unique_edges
            .iter()
            .filter(|(a, b)| *a != victim && *b != victim)
            .count();
        prop_assert_eq!(graph.edge_count(), expected);
        prop_assert_eq!(graph.nodes().map(|n| n.out_degree()).sum::<usize>(), expected);
        prop_assert!(graph.edges().all(|(a, b)| *a != victim && *b != victim));
    }
}
