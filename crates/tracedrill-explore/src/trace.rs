//! Reference basic-block trace followed by the symbolic engine.

use crate::edge::Edge;
use crate::error::{AddressSnafu, ConfigError, LoadError};
use snafu::ResultExt;
use std::path::Path;

/// Ordered, non-empty sequence of basic-block addresses from one concrete run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    blocks: Vec<u64>,
}

impl Trace {
    pub fn new(blocks: Vec<u64>) -> Result<Self, ConfigError> {
        if blocks.is_empty() {
            return Err(ConfigError::EmptyTrace);
        }
        Ok(Self { blocks })
    }

    /// Load a trace file.
    ///
    /// Accepts either a JSON array of integers or plain text with one address
    /// per line. Text addresses may be `0x`-prefixed hex or decimal; blank
    /// lines and `#` comments are skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, LoadError> {
        if text.trim_start().starts_with('[') {
            let blocks: Vec<u64> = serde_json::from_str(text)?;
            return Ok(Self::new(blocks)?);
        }

        let mut blocks = Vec::new();
        for (i, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            blocks.push(parse_address(line).context(AddressSnafu {
                line: i + 1,
                text: line.to_string(),
            })?);
        }
        Ok(Self::new(blocks)?)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false for a constructed trace; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[u64] {
        &self.blocks
    }

    /// Consecutive transitions `(blocks[i], blocks[i + 1])`.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.blocks.windows(2).map(|w| Edge::new(w[0], w[1]))
    }
}

/// Parse a `0x`-prefixed hex or decimal address.
pub fn parse_address(text: &str) -> Result<u64, std::num::ParseIntError> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    }
}
