//! Error types for setup and file loading.

use snafu::Snafu;
use thiserror::Error;

/// Misconfiguration detected while setting up a filter.
///
/// These are fatal: the filter refuses to start rather than compute with
/// wrong bitmap indices.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Reference trace is empty")]
    EmptyTrace,

    #[error("Coverage bitmap is empty")]
    EmptyBitmap,

    #[error("Coverage bitmap length {len} is not a power of two")]
    BitmapNotPowerOfTwo { len: usize },
}

/// Errors from loading traces, bitmaps and session files.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LoadError {
    #[snafu(display("I/O error"), context(false))]
    Io { source: std::io::Error },

    #[snafu(display("JSON error"), context(false))]
    Json { source: serde_json::Error },

    #[snafu(display("Line {line}: invalid address {text:?}"))]
    Address {
        line: usize,
        text: String,
        source: std::num::ParseIntError,
    },

    #[snafu(display("Invalid contents"), context(false))]
    Invalid { source: ConfigError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(ConfigError::EmptyTrace.to_string(), "Reference trace is empty");
        assert_eq!(
            ConfigError::BitmapNotPowerOfTwo { len: 65535 }.to_string(),
            "Coverage bitmap length 65535 is not a power of two"
        );
    }

    #[test]
    fn test_load_error_from_config_error() {
        let err: LoadError = ConfigError::EmptyBitmap.into();
        assert!(matches!(
            err,
            LoadError::Invalid {
                source: ConfigError::EmptyBitmap
            }
        ));
    }
}
