//! Coverage-guided novelty filter for trace-following symbolic exploration.
//!
//! A symbolic engine is pinned to a concrete input's basic-block trace by
//! preconstraints. Whenever a branch could have gone another way, the engine
//! produces a *missed* state. This crate decides which of those states are
//! worth handing to a fuzzer as new seeds:
//!
//! ```text
//! 1. Seed a ledger with every transition of the reference trace
//! 2. Step all active states one block
//! 3. For each missed state, form (last block, state address)
//! 4. Drop it if the fuzzer bitmap slot for that transition is 0xFF
//! 5. Drop it if the transition is already in the ledger
//! 6. Remove preconstraints; drop it if trivially false or unsatisfiable
//! 7. Otherwise divert it and record the transition
//! 8. Repeat until no state is active or the trace is consumed
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! # use tracedrill_explore::{ExplorationState, Stashes, SymbolicEngine};
//! # fn demo<S: ExplorationState, E: SymbolicEngine<S>>(engine: E, root: S) -> Result<(), Box<dyn std::error::Error>> {
//! use tracedrill_explore::{Explorer, FilterConfig, FuzzBitmap, NoveltyFilter, Trace};
//! use tracedrill_explore::report::format_report;
//!
//! let trace = Trace::load("run.trace")?;
//! let bitmap = FuzzBitmap::load("fuzz_bitmap")?;
//! let filter = NoveltyFilter::new(trace, Some(bitmap), FilterConfig::default());
//!
//! let mut stashes = Stashes::with_active(vec![root]);
//! let mut explorer = Explorer::new(engine, filter);
//! let report = explorer.run(&mut stashes)?;
//!
//! println!("{}", format_report(&report));
//! # Ok(())
//! # }
//! ```
//!
//! # Module Structure
//!
//! - [`edge`]: Transitions and AFL-compatible slot hashing
//! - [`coverage`]: Read-only fuzzer bitmap
//! - [`ledger`]: Known transitions
//! - [`trace`]: Reference trace loading
//! - [`state`]: Engine-facing traits
//! - [`stash`]: Named state worklists
//! - [`filter`]: The per-step novelty decision
//! - [`explorer`]: The outer stepping loop
//! - [`report`]: Exploration session reports
//!
//! # Determinism
//!
//! Given the same trace, bitmap and engine, the filter diverts the same states
//! in the same order. The ledger is a `BTreeSet` so its iteration order is
//! stable too.

pub mod config;
pub mod coverage;
pub mod edge;
pub mod error;
pub mod explorer;
pub mod filter;
pub mod ledger;
pub mod report;
pub mod stash;
pub mod state;
pub mod trace;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use config::{FilterConfig, PredecessorPolicy, SessionConfig};
pub use coverage::{FuzzBitmap, MAP_SIZE};
pub use edge::{encode, Edge, EdgeIndexer};
pub use error::{ConfigError, LoadError};
pub use explorer::{ExplorationReport, ExplorationStats, Explorer};
pub use filter::{is_complete, NoveltyFilter, StepReport, Verdict};
pub use ledger::TransitionLedger;
pub use stash::Stashes;
pub use state::{Constraint, ExplorationState, SymbolicEngine};
pub use trace::Trace;
