//! Ledger of control-flow transitions that are already accounted for.

use crate::edge::Edge;
use crate::trace::Trace;
use std::collections::BTreeSet;

/// Transitions already known to be uninteresting.
///
/// Seeded with every transition of the reference trace; grows as novel
/// transitions are diverted. Entries are never removed.
#[derive(Debug, Clone, Default)]
pub struct TransitionLedger {
    known: BTreeSet<Edge>,
}

impl TransitionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the ledger with the consecutive transitions of `trace`.
    pub fn from_trace(trace: &Trace) -> Self {
        Self {
            known: trace.edges().collect(),
        }
    }

    pub fn contains(&self, edge: Edge) -> bool {
        self.known.contains(&edge)
    }

    /// Record a transition. Returns `false` if it was already known.
    pub fn record(&mut self, edge: Edge) -> bool {
        self.known.insert(edge)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Known transitions in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Edge> + '_ {
        self.known.iter().copied()
    }
}
