//! Novelty filter: decides which off-trace states are worth diverting.
//!
//! After every engine step, states that left the reference trace land in the
//! `missed` stash. For each of them the filter forms the transition from the
//! block the trace was left at to the state's address, and diverts the state
//! only if all of the following agree:
//!
//! 1. the fuzzer bitmap slot for the transition is not `0xFF`,
//! 2. the transition is not in the [`TransitionLedger`],
//! 3. after preconstraints are dropped, no constraint is trivially false and
//!    the solver finds the path satisfiable.
//!
//! Accepted transitions are recorded so they are never reported twice.

use crate::config::{FilterConfig, PredecessorPolicy};
use crate::coverage::FuzzBitmap;
use crate::edge::Edge;
use crate::error::ConfigError;
use crate::ledger::TransitionLedger;
use crate::stash::{Stashes, DIVERTED, MISSED, PRUNED};
use crate::state::{has_false_constraint, ExplorationState, SymbolicEngine};
use crate::trace::Trace;
use log::{debug, info, warn};

/// How a transition fares against the bitmap and the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The fuzzer has already saturated this transition's slot.
    Covered,
    /// The transition is on the trace or was diverted earlier.
    Known,
    /// Worth checking for satisfiability.
    Candidate,
}

/// Outcome counts for one [`NoveltyFilter::process_step`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub missed: usize,
    pub diverted: usize,
    pub covered: usize,
    pub known: usize,
    pub trivially_false: usize,
    pub unsatisfiable: usize,
    pub no_predecessor: usize,
}

impl StepReport {
    /// Add another report's counts to this one.
    pub fn absorb(&mut self, other: &StepReport) {
        self.missed += other.missed;
        self.diverted += other.diverted;
        self.covered += other.covered;
        self.known += other.known;
        self.trivially_false += other.trivially_false;
        self.unsatisfiable += other.unsatisfiable;
        self.no_predecessor += other.no_predecessor;
    }

    /// Missed states that were not diverted.
    pub fn pruned(&self) -> usize {
        self.missed - self.diverted
    }
}

/// Exploration is over once nothing is active or one state has consumed the
/// whole trace.
pub fn is_complete(active_count: usize, max_step_count: Option<usize>, trace_len: usize) -> bool {
    active_count == 0 || max_step_count.is_some_and(|steps| steps >= trace_len)
}

/// Filters off-trace states down to novel, satisfiable transitions.
pub struct NoveltyFilter {
    trace: Trace,
    bitmap: FuzzBitmap,
    ledger: TransitionLedger,
    config: FilterConfig,
}

impl NoveltyFilter {
    /// Build a filter over an already validated trace and bitmap.
    ///
    /// Without a bitmap the inert all-`0xFF` map is used and nothing is ever
    /// diverted.
    pub fn new(trace: Trace, bitmap: Option<FuzzBitmap>, config: FilterConfig) -> Self {
        let bitmap = bitmap.unwrap_or_else(|| {
            warn!("No fuzzer bitmap supplied; every transition counts as covered");
            FuzzBitmap::inert()
        });
        let ledger = TransitionLedger::from_trace(&trace);

        info!(
            "Novelty filter ready: {} trace blocks, {} known transitions, {}/{} interesting slots",
            trace.len(),
            ledger.len(),
            bitmap.interesting_slots(),
            bitmap.len()
        );

        Self {
            trace,
            bitmap,
            ledger,
            config,
        }
    }

    /// Validate raw inputs and build a filter.
    ///
    /// Rejects an empty trace and a bitmap that is empty or not a power of
    /// two in length.
    pub fn setup(
        trace: Vec<u64>,
        bitmap: Option<Vec<u8>>,
        config: FilterConfig,
    ) -> Result<Self, ConfigError> {
        let trace = Trace::new(trace)?;
        let bitmap = bitmap.map(FuzzBitmap::new).transpose()?;
        Ok(Self::new(trace, bitmap, config))
    }

    /// Classify a transition without touching any state.
    pub fn classify(&self, edge: Edge) -> Verdict {
        self.classify_slot(edge, self.bitmap.indexer().slot(edge))
    }

    fn classify_slot(&self, edge: Edge, slot: usize) -> Verdict {
        if !self.bitmap.is_interesting_slot(slot) {
            Verdict::Covered
        } else if self.ledger.contains(edge) {
            Verdict::Known
        } else {
            Verdict::Candidate
        }
    }

    /// Advance all active states one block, then filter the missed ones.
    pub fn step<S, E>(
        &mut self,
        engine: &mut E,
        stashes: &mut Stashes<S>,
    ) -> Result<StepReport, S::Error>
    where
        S: ExplorationState,
        E: SymbolicEngine<S>,
    {
        engine.step(stashes)?;
        self.process_step(stashes)
    }

    /// Route every state in `missed` to `diverted` or `pruned`.
    ///
    /// `missed` is empty afterwards, unless the solver fails: the failing
    /// state and those not yet examined are put back into `missed` and the
    /// solver error is returned as is.
    pub fn process_step<S: ExplorationState>(
        &mut self,
        stashes: &mut Stashes<S>,
    ) -> Result<StepReport, S::Error> {
        let mut report = StepReport::default();
        let missed = stashes.take(MISSED);
        if missed.is_empty() {
            return Ok(report);
        }
        report.missed = missed.len();

        let shared_prev = match self.config.predecessor {
            PredecessorPolicy::Shared => missed[0].block_history().last().copied(),
            PredecessorPolicy::PerState => None,
        };
        let indexer = *self.bitmap.indexer();
        let mut prev_cache: Option<(u64, usize)> = None;

        let mut pending = missed.into_iter();
        while let Some(mut state) = pending.next() {
            let prev = match self.config.predecessor {
                PredecessorPolicy::Shared => shared_prev,
                PredecessorPolicy::PerState => state.block_history().last().copied(),
            };
            let Some(prev) = prev else {
                debug!("State at {:#x} has no block history", state.address());
                report.no_predecessor += 1;
                stashes.push(PRUNED, state);
                continue;
            };

            let prev_index = match prev_cache {
                Some((addr, index)) if addr == prev => index,
                _ => {
                    let index = indexer.prev_index(prev);
                    prev_cache = Some((prev, index));
                    index
                }
            };
            let edge = Edge::new(prev, state.address());
            let slot = prev_index ^ indexer.cur_index(edge.cur);

            debug!("Found {} transition", edge);

            match self.classify_slot(edge, slot) {
                Verdict::Covered => {
                    debug!("{} transition is already covered by the fuzzer", edge);
                    report.covered += 1;
                    stashes.push(PRUNED, state);
                    continue;
                }
                Verdict::Known => {
                    debug!("{} transition has already been encountered", edge);
                    report.known += 1;
                    stashes.push(PRUNED, state);
                    continue;
                }
                Verdict::Candidate => {}
            }

            state.remove_preconstraints();

            if has_false_constraint(&state) {
                debug!("State at {:#x} is trivially unsatisfiable", edge.cur);
                report.trivially_false += 1;
                stashes.push(PRUNED, state);
                continue;
            }

            match state.is_satisfiable() {
                Ok(true) => {
                    info!("New transition {}, diverting state", edge);
                    self.ledger.record(edge);
                    report.diverted += 1;
                    stashes.push(DIVERTED, state);
                }
                Ok(false) => {
                    debug!("State at {:#x} is not satisfiable", edge.cur);
                    report.unsatisfiable += 1;
                    stashes.push(PRUNED, state);
                }
                Err(e) => {
                    let missed = stashes.get_mut(MISSED);
                    missed.push(state);
                    missed.extend(pending);
                    return Err(e);
                }
            }
        }

        Ok(report)
    }

    /// Whether the driving loop should stop stepping.
    pub fn is_complete<S: ExplorationState>(&self, stashes: &Stashes<S>) -> bool {
        let active = stashes.active();
        is_complete(
            active.len(),
            active.iter().map(|s| s.step_count()).max(),
            self.trace.len(),
        )
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn bitmap(&self) -> &FuzzBitmap {
        &self.bitmap
    }

    pub fn ledger(&self) -> &TransitionLedger {
        &self.ledger
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }
}
