//! Error types for load ordering.

use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

/// Result type for ordering operations over payloads of type `P`.
pub type Result<T, P> = std::result::Result<T, CyclicGraphError<P>>;

/// One circular dependency: the payloads of a strongly connected component.
///
/// Members are listed in the order the cycle search collected them. That
/// order only groups the payloads; it is not a walk along the cycle's edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle<T> {
    members: Vec<T>,
}

impl<T> Cycle<T> {
    pub(crate) fn new(members: Vec<T>) -> Self {
        Self { members }
    }

    /// Payloads taking part in the cycle.
    #[must_use]
    pub fn members(&self) -> &[T] {
        &self.members
    }

    /// Number of payloads in the cycle. A self-loop has length one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the cycle has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns true if the payload takes part in this cycle.
    #[must_use]
    pub fn contains(&self, payload: &T) -> bool
    where
        T: PartialEq,
    {
        self.members.contains(payload)
    }

    /// Consume the cycle, returning its members.
    #[must_use]
    pub fn into_members(self) -> Vec<T> {
        self.members
    }
}

impl<T: fmt::Display> fmt::Display for Cycle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{member}")?;
        }
        f.write_str("]")
    }
}

/// The dependency graph could not be ordered because it contains cycles.
///
/// Carries every cycle found in the part of the graph that could not be
/// ordered, plus a preformatted `[A B C] [D E]` listing for logs.
#[derive(Error, Debug, Clone, Diagnostic)]
#[error("Cyclic dependencies detected: {message}")]
#[diagnostic(
    code(loadorder::graph::cyclic),
    help("Remove or invert one dependency in each listed cycle")
)]
pub struct CyclicGraphError<T: fmt::Debug + fmt::Display> {
    cycles: Vec<Cycle<T>>,
    message: String,
}

impl<T: fmt::Debug + fmt::Display> CyclicGraphError<T> {
    pub(crate) fn new(cycles: Vec<Cycle<T>>) -> Self {
        let message = cycles
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        Self { cycles, message }
    }

    /// Every cycle that blocked the ordering.
    #[must_use]
    pub fn cycles(&self) -> &[Cycle<T>] {
        &self.cycles
    }

    /// The cycle listing, one bracketed group per cycle: `[A B C] [D E]`.
    #[must_use]
    pub fn diagnostic(&self) -> &str {
        &self.message
    }

    /// Consume the error, returning the structured cycles.
    #[must_use]
    pub fn into_cycles(self) -> Vec<Cycle<T>> {
        self.cycles
    }
}
