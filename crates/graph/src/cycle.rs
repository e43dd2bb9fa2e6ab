//! Cycle detection and cycle enumeration.
//!
//! [`CycleDetector`] answers whether any cycle exists.
//! [`DirectedGraph::find_cycles`] lists every cycle using Tarjan's strongly
//! connected components algorithm and only runs when ordering has already
//! failed. Both walk the graph with explicit stacks, so long dependency
//! chains cannot overflow the call stack.

use crate::error::Cycle;
use crate::graph::DirectedGraph;
use petgraph::stable_graph::NodeIndex;
use std::hash::Hash;
use tracing::debug;

/// Depth-first cycle check over a [`DirectedGraph`].
///
/// Every neighbour of every node is explored. A cycle exists iff some edge
/// reaches a node that is still on the active DFS path; a self-loop counts.
#[derive(Debug)]
pub struct CycleDetector<'a, T> {
    graph: &'a DirectedGraph<T>,
}

impl<'a, T: Clone + Eq + Hash> CycleDetector<'a, T> {
    /// Create a detector borrowing the graph.
    #[must_use]
    pub fn new(graph: &'a DirectedGraph<T>) -> Self {
        Self { graph }
    }

    /// Check whether the graph contains at least one cycle.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        let bound = self.graph.index_bound();
        let mut visited = vec![false; bound];
        let mut on_path = vec![false; bound];

        for root in self.graph.node_indices() {
            if visited[root.index()] {
                continue;
            }

            visited[root.index()] = true;
            on_path[root.index()] = true;
            let mut stack = vec![(root, self.graph.successors(root))];

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                match frame.1.next() {
                    Some(next) if on_path[next.index()] => {
                        debug!("Back edge found while checking for cycles");
                        return true;
                    }
                    Some(next) if !visited[next.index()] => {
                        visited[next.index()] = true;
                        on_path[next.index()] = true;
                        stack.push((next, self.graph.successors(next)));
                    }
                    Some(_) => {}
                    None => {
                        on_path[node.index()] = false;
                        stack.pop();
                    }
                }
            }
        }

        false
    }
}

#[derive(Clone, Copy)]
struct Visit {
    index: usize,
    low_link: usize,
    on_stack: bool,
}

/// Enumerate every cycle in the graph.
///
/// Returns one [`Cycle`] per strongly connected component with at least two
/// members, plus one per node with a self-loop. Single nodes without a
/// self-loop are not cycles and are left out.
pub(crate) fn find_cycles<T: Clone + Eq + Hash>(graph: &DirectedGraph<T>) -> Vec<Cycle<T>> {
    let mut visits: Vec<Option<Visit>> = vec![None; graph.index_bound()];
    let mut next_index = 0;
    let mut stack: Vec<NodeIndex> = Vec::new();
    let mut cycles = Vec::new();

    for root in graph.node_indices() {
        if visits[root.index()].is_some() {
            continue;
        }

        let mut work = Vec::new();
        visits[root.index()] = Some(Visit {
            index: next_index,
            low_link: next_index,
            on_stack: true,
        });
        next_index += 1;
        stack.push(root);
        work.push((root, graph.successors(root)));

        while let Some(frame) = work.last_mut() {
            let node = frame.0;

            if let Some(next) = frame.1.next() {
                let seen = visits[next.index()];
                match seen {
                    None => {
                        visits[next.index()] = Some(Visit {
                            index: next_index,
                            low_link: next_index,
                            on_stack: true,
                        });
                        next_index += 1;
                        stack.push(next);
                        work.push((next, graph.successors(next)));
                    }
                    Some(seen) if seen.on_stack => {
                        if let Some(visit) = visits[node.index()].as_mut() {
                            visit.low_link = visit.low_link.min(seen.index);
                        }
                    }
                    Some(_) => {}
                }
                continue;
            }

            work.pop();
            let Some(done) = visits[node.index()] else {
                continue;
            };

            if let Some(&(parent, _)) = work.last() {
                if let Some(visit) = visits[parent.index()].as_mut() {
                    visit.low_link = visit.low_link.min(done.low_link);
                }
            }

            if done.low_link != done.index {
                continue;
            }

            let mut component = Vec::new();
            while let Some(member) = stack.pop() {
                if let Some(visit) = visits[member.index()].as_mut() {
                    visit.on_stack = false;
                }
                component.push(member);
                if member == node {
                    break;
                }
            }

            if component.len() > 1 || graph.node_at(node).has_self_loop() {
                cycles.push(Cycle::new(
                    component
                        .into_iter()
                        .map(|member| graph.payload(member).clone())
                        .collect(),
                ));
            }
        }
    }

    debug!(cycles = cycles.len(), "Enumerated strongly connected cycles");
    cycles
}

impl<T: Clone + Eq + Hash> DirectedGraph<T> {
    /// Check whether the graph contains any cycle, self-loops included.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        CycleDetector::new(self).has_cycle()
    }

    /// List every cycle in the graph.
    ///
    /// Intended for diagnostics; ordering calls this itself when it fails.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Cycle<T>> {
        find_cycles(self)
    }
}
