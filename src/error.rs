//! Error types for payload decoding and configuration loading.

use thiserror::Error;

/// Failure to decode an ATC service data payload.
///
/// This is the only failure the decoder can produce. The reconciler absorbs it
/// and reports "no update" instead, so callers above that layer never see it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("ATC payload must be at least {expected} bytes, got {actual}")]
    PayloadTooShort { expected: usize, actual: usize },
}

/// Invalid values in the monitor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive whole number of seconds, got '{value}'")]
    InvalidSeconds { name: &'static str, value: String },

    #[error("Invalid sensor entry '{0}', expected MAC=NAME")]
    InvalidSensorEntry(String),

    #[error("Poll interval ({poll}s) must not be shorter than scan duration ({scan}s)")]
    PollShorterThanScan { poll: u64, scan: u64 },
}
