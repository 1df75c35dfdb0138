//! Filter and session configuration.

use crate::coverage::FuzzBitmap;
use crate::error::LoadError;
use crate::trace::Trace;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the predecessor of a missed state is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PredecessorPolicy {
    /// All missed states of a step diverged from the same block; read it
    /// from the first missed state.
    #[default]
    Shared,
    /// Read each missed state's own last executed block.
    PerState,
}

/// Tuning knobs for the novelty filter and its driver loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub predecessor: PredecessorPolicy,
    /// Upper bound on driver steps; `None` runs until completion.
    pub max_steps: Option<u64>,
}

/// A session description on disk: which trace and bitmap to use, and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Path to the reference trace.
    pub trace: PathBuf,
    /// Path to the fuzzer bitmap; the inert default is used when absent.
    #[serde(default)]
    pub bitmap: Option<PathBuf>,
    #[serde(default)]
    pub filter: FilterConfig,
}

impl SessionConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load the trace and bitmap this session points at.
    ///
    /// Relative paths are resolved against `base`.
    pub fn resolve(&self, base: &Path) -> Result<(Trace, Option<FuzzBitmap>), LoadError> {
        let trace = Trace::load(base.join(&self.trace))?;
        let bitmap = match &self.bitmap {
            Some(path) => Some(FuzzBitmap::load(base.join(path))?),
            None => None,
        };
        Ok((trace, bitmap))
    }
}
