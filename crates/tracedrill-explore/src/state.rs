//! Interfaces to the symbolic-execution engine.
//!
//! The filter never looks inside a symbolic state. It only needs addresses,
//! the ability to drop preconstraints, and a satisfiability check; engines
//! implement these traits over their own state representation.

use crate::stash::Stashes;

/// A symbolic constraint handle.
pub trait Constraint {
    /// True when the constraint is structurally the constant `false`.
    ///
    /// This must be a cheap syntactic check; it gates the solver call.
    fn is_trivially_false(&self) -> bool;
}

/// One path being explored by the symbolic engine.
pub trait ExplorationState {
    type Constraint: Constraint;
    /// Failure reported by the engine or its solver.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Address of the block this state is about to execute.
    fn address(&self) -> u64;

    /// Addresses of the blocks already executed, oldest first.
    fn block_history(&self) -> &[u64];

    /// Number of trace steps this state has consumed.
    fn step_count(&self) -> usize;

    /// Guard of the branch that produced this state.
    fn guard(&self) -> &Self::Constraint;

    /// Current path constraints.
    fn constraints(&self) -> &[Self::Constraint];

    /// Drop the constraints injected to pin execution to the reference input.
    fn remove_preconstraints(&mut self);

    /// Ask the solver whether the current constraints have a model.
    fn is_satisfiable(&mut self) -> Result<bool, Self::Error>;
}

/// A symbolic engine able to advance every active state by one block.
///
/// After a step, states that left the reference trace must be in the
/// [`MISSED`](crate::stash::MISSED) stash.
pub trait SymbolicEngine<S: ExplorationState> {
    fn step(&mut self, stashes: &mut Stashes<S>) -> Result<(), S::Error>;
}

/// Whether the guard or any remaining constraint is trivially false.
pub fn has_false_constraint<S: ExplorationState>(state: &S) -> bool {
    state.guard().is_trivially_false()
        || state.constraints().iter().any(|c| c.is_trivially_false())
}
