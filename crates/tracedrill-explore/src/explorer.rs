//! The outer exploration loop: step the engine until the trace is consumed.

use crate::config::{FilterConfig, SessionConfig};
use crate::error::LoadError;
use crate::filter::{NoveltyFilter, StepReport};
use crate::stash::Stashes;
use crate::state::{ExplorationState, SymbolicEngine};
use log::{debug, info};
use std::path::Path;

/// Drives a symbolic engine along the reference trace, filtering off-trace
/// states after every step.
pub struct Explorer<E> {
    engine: E,
    filter: NoveltyFilter,
    steps_completed: u64,
    totals: StepReport,
}

impl<E> Explorer<E> {
    pub fn new(engine: E, filter: NoveltyFilter) -> Self {
        Self {
            engine,
            filter,
            steps_completed: 0,
            totals: StepReport::default(),
        }
    }

    /// Build an explorer from a session file.
    ///
    /// Trace and bitmap paths in the session are relative to the file.
    pub fn from_session(engine: E, path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let session = SessionConfig::load(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let (trace, bitmap) = session.resolve(base)?;
        Ok(Self::new(
            engine,
            NoveltyFilter::new(trace, bitmap, session.filter),
        ))
    }

    /// Run until the filter reports completion or the step budget runs out.
    ///
    /// Solver and engine failures abort the run and are returned unchanged;
    /// counters reflect the steps completed before the failure.
    pub fn run<S>(&mut self, stashes: &mut Stashes<S>) -> Result<ExplorationReport, S::Error>
    where
        S: ExplorationState,
        E: SymbolicEngine<S>,
    {
        info!(
            "Starting exploration: {} active states, {} trace blocks",
            stashes.active().len(),
            self.filter.trace().len()
        );

        let mut budget_exhausted = false;
        while !self.filter.is_complete(stashes) {
            if let Some(max_steps) = self.filter.config().max_steps {
                if self.steps_completed >= max_steps {
                    info!("Step budget of {} exhausted, stopping early", max_steps);
                    budget_exhausted = true;
                    break;
                }
            }

            let report = self.filter.step(&mut self.engine, stashes)?;
            self.steps_completed += 1;

            if report.diverted > 0 {
                info!(
                    "Step {}: {} missed, {} diverted (total diverted: {})",
                    self.steps_completed,
                    report.missed,
                    report.diverted,
                    self.totals.diverted + report.diverted
                );
            } else {
                debug!(
                    "Step {}: {} missed, none diverted",
                    self.steps_completed, report.missed
                );
            }

            self.totals.absorb(&report);
        }

        Ok(self.generate_report(stashes, budget_exhausted))
    }

    fn generate_report<S: ExplorationState>(
        &self,
        stashes: &Stashes<S>,
        budget_exhausted: bool,
    ) -> ExplorationReport {
        ExplorationReport {
            steps: self.steps_completed,
            trace_len: self.filter.trace().len(),
            budget_exhausted,
            active_remaining: stashes.active().len(),
            diverted: stashes.diverted().len(),
            known_transitions: self.filter.ledger().len(),
            outcomes: self.totals.clone(),
        }
    }

    /// Get current exploration stats.
    pub fn stats(&self) -> ExplorationStats {
        ExplorationStats {
            steps: self.steps_completed,
            diverted: self.totals.diverted,
            known_transitions: self.filter.ledger().len(),
        }
    }

    pub fn filter(&self) -> &NoveltyFilter {
        &self.filter
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn config(&self) -> &FilterConfig {
        self.filter.config()
    }
}

/// Final exploration report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorationReport {
    pub steps: u64,
    pub trace_len: usize,
    /// Stopped by `max_steps` rather than by completion.
    pub budget_exhausted: bool,
    pub active_remaining: usize,
    /// Size of the `diverted` stash at the end of the run.
    pub diverted: usize,
    pub known_transitions: usize,
    /// Per-outcome counts summed over every step.
    pub outcomes: StepReport,
}

/// Current exploration statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorationStats {
    pub steps: u64,
    pub diverted: usize,
    pub known_transitions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::{FuzzBitmap, MAP_SIZE};
    use crate::testing::{MockSolverError, MockState, ScriptedEngine};
    use crate::trace::Trace;
    use std::fs;

    const TRACE: [u64; 4] = [0x1000, 0x1004, 0x1008, 0x100c];

    fn explorer(
        script: Vec<Vec<MockState>>,
        bitmap: Option<FuzzBitmap>,
        config: FilterConfig,
    ) -> Explorer<ScriptedEngine> {
        let trace = Trace::new(TRACE.to_vec()).unwrap();
        let engine = ScriptedEngine::new(TRACE.to_vec(), script);
        Explorer::new(engine, NoveltyFilter::new(trace, bitmap, config))
    }

    fn open_bitmap() -> Option<FuzzBitmap> {
        Some(FuzzBitmap::new(vec![0u8; MAP_SIZE]).unwrap())
    }

    fn start() -> Stashes<MockState> {
        Stashes::with_active(vec![MockState::new(TRACE[0], Vec::new())])
    }

    #[test]
    fn test_run_until_trace_consumed() {
        let mut explorer = explorer(
            vec![
                vec![MockState::missed(0x1000, 0x2000)],
                vec![
                    MockState::missed(0x1004, 0x3000),
                    MockState::missed(0x1004, 0x3004).unsatisfiable(),
                ],
                vec![MockState::missed(0x1000, 0x2000)],
            ],
            open_bitmap(),
            FilterConfig::default(),
        );
        let mut stashes = start();

        let report = explorer.run(&mut stashes).unwrap();

        assert_eq!(report.steps, TRACE.len() as u64);
        assert!(!report.budget_exhausted);
        assert_eq!(report.diverted, 2);
        assert_eq!(report.known_transitions, 3 + 2);
        assert_eq!(report.outcomes.missed, 4);
        assert_eq!(report.outcomes.unsatisfiable, 1);
        assert_eq!(report.outcomes.known, 1);
        assert_eq!(explorer.engine().steps_taken, 4);
        assert_eq!(stashes.pruned().len(), 2);
    }

    #[test]
    fn test_run_without_active_states() {
        let mut explorer = explorer(Vec::new(), open_bitmap(), FilterConfig::default());
        let mut stashes: Stashes<MockState> = Stashes::new();

        let report = explorer.run(&mut stashes).unwrap();

        assert_eq!(report.steps, 0);
        assert_eq!(explorer.engine().steps_taken, 0);
    }

    #[test]
    fn test_run_respects_step_budget() {
        let config = FilterConfig {
            max_steps: Some(2),
            ..Default::default()
        };
        let mut explorer = explorer(Vec::new(), None, config);
        let mut stashes = start();

        let report = explorer.run(&mut stashes).unwrap();

        assert_eq!(report.steps, 2);
        assert!(report.budget_exhausted);
        assert_eq!(report.active_remaining, 1);
    }

    #[test]
    fn test_run_with_inert_bitmap_diverts_nothing() {
        let mut explorer = explorer(
            vec![
                vec![MockState::missed(0x1000, 0x2000)],
                vec![MockState::missed(0x1004, 0x3000)],
            ],
            None,
            FilterConfig::default(),
        );
        let mut stashes = start();

        let report = explorer.run(&mut stashes).unwrap();

        assert_eq!(report.diverted, 0);
        assert_eq!(report.outcomes.covered, 2);
        assert_eq!(report.known_transitions, 3);
    }

    #[test]
    fn test_run_propagates_solver_failure() {
        let mut failing = MockState::missed(0x1004, 0x3000);
        failing.solver_fails = true;
        let mut explorer = explorer(
            vec![vec![MockState::missed(0x1000, 0x2000)], vec![failing]],
            open_bitmap(),
            FilterConfig::default(),
        );
        let mut stashes = start();

        let err = explorer.run(&mut stashes).unwrap_err();

        assert_eq!(err, MockSolverError);
        assert_eq!(explorer.stats().steps, 1);
        assert_eq!(explorer.stats().diverted, 1);
        assert_eq!(stashes.missed().len(), 1);
    }

    #[test]
    fn test_explorer_from_session() {
        let dir = std::env::temp_dir().join("tracedrill_test_explorer_from_session");
        let _ = fs::create_dir_all(&dir);
        fs::write(dir.join("run.trace"), "0x1000\n0x1004\n0x1008\n0x100c\n").unwrap();
        fs::write(dir.join("fuzz_bitmap"), vec![0u8; MAP_SIZE]).unwrap();
        fs::write(
            dir.join("session.json"),
            r#"{"trace": "run.trace", "bitmap": "fuzz_bitmap", "filter": {"max_steps": 10}}"#,
        )
        .unwrap();

        let engine = ScriptedEngine::new(
            TRACE.to_vec(),
            vec![vec![MockState::missed(0x1000, 0x2000)]],
        );
        let mut explorer = Explorer::from_session(engine, dir.join("session.json")).unwrap();
        assert_eq!(explorer.config().max_steps, Some(10));

        let mut stashes = start();
        let report = explorer.run(&mut stashes).unwrap();
        assert_eq!(report.diverted, 1);

        let _ = fs::remove_dir_all(&dir);
    }
}
