//! Test doubles for the engine interfaces.

use crate::stash::{Stashes, ACTIVE, MISSED};
use crate::state::{Constraint, ExplorationState, SymbolicEngine};
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("solver timed out")]
pub struct MockSolverError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockConstraint {
    True,
    False,
    Symbolic(u32),
    /// Injected to pin the input; `Pre(false)` is trivially false.
    Pre(bool),
}

impl Constraint for MockConstraint {
    fn is_trivially_false(&self) -> bool {
        matches!(self, MockConstraint::False | MockConstraint::Pre(false))
    }
}

#[derive(Debug, Clone)]
pub struct MockState {
    pub addr: u64,
    pub history: Vec<u64>,
    pub steps: usize,
    pub guard: MockConstraint,
    pub constraints: Vec<MockConstraint>,
    /// What the solver answers once asked.
    pub satisfiable: bool,
    pub solver_fails: bool,
    pub solver_calls: usize,
    pub preconstraint_removals: usize,
}

impl MockState {
    /// A satisfiable state at `addr` with one preconstraint.
    pub fn new(addr: u64, history: Vec<u64>) -> Self {
        Self {
            addr,
            history,
            steps: 0,
            guard: MockConstraint::True,
            constraints: vec![MockConstraint::Symbolic(0), MockConstraint::Pre(true)],
            satisfiable: true,
            solver_fails: false,
            solver_calls: 0,
            preconstraint_removals: 0,
        }
    }

    /// A state that diverged from `prev` to `addr`.
    pub fn missed(prev: u64, addr: u64) -> Self {
        Self::new(addr, vec![prev])
    }

    pub fn unsatisfiable(mut self) -> Self {
        self.satisfiable = false;
        self
    }

    pub fn with_guard(mut self, guard: MockConstraint) -> Self {
        self.guard = guard;
        self
    }
}

impl ExplorationState for MockState {
    type Constraint = MockConstraint;
    type Error = MockSolverError;

    fn address(&self) -> u64 {
        self.addr
    }

    fn block_history(&self) -> &[u64] {
        &self.history
    }

    fn step_count(&self) -> usize {
        self.steps
    }

    fn guard(&self) -> &MockConstraint {
        &self.guard
    }

    fn constraints(&self) -> &[MockConstraint] {
        &self.constraints
    }

    fn remove_preconstraints(&mut self) {
        self.preconstraint_removals += 1;
        self.constraints
            .retain(|c| !matches!(c, MockConstraint::Pre(_)));
    }

    fn is_satisfiable(&mut self) -> Result<bool, MockSolverError> {
        self.solver_calls += 1;
        if self.solver_fails {
            return Err(MockSolverError);
        }
        Ok(self.satisfiable)
    }
}

/// Engine that walks active states along a fixed trace and emits scripted
/// missed states, one batch per step.
pub struct ScriptedEngine {
    trace: Vec<u64>,
    script: VecDeque<Vec<MockState>>,
    pub steps_taken: usize,
}

impl ScriptedEngine {
    pub fn new(trace: Vec<u64>, script: Vec<Vec<MockState>>) -> Self {
        Self {
            trace,
            script: script.into(),
            steps_taken: 0,
        }
    }
}

impl SymbolicEngine<MockState> for ScriptedEngine {
    fn step(&mut self, stashes: &mut Stashes<MockState>) -> Result<(), MockSolverError> {
        self.steps_taken += 1;
        for state in stashes.get_mut(ACTIVE).iter_mut() {
            state.history.push(state.addr);
            state.steps += 1;
            if let Some(&next) = self.trace.get(state.steps) {
                state.addr = next;
            }
        }
        if let Some(batch) = self.script.pop_front() {
            stashes.get_mut(MISSED).extend(batch);
        }
        Ok(())
    }
}
