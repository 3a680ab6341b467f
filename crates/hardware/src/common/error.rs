//! Error definitions for the cache model.
//!
//! The model itself only ever fails in two ways:
//! 1. **Configuration:** A malformed geometry rejected once, at construction.
//! 2. **Invariant violation:** An out-of-range internal index, which indicates a
//!    defect in the caller or decoder and aborts the current scenario.
//!
//! The trace and configuration front-ends add parse and I/O failures on top.

use thiserror::Error;

/// Errors produced by the cache model and its trace/config front-ends.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache geometry is malformed (non-power-of-two set count, zero line
    /// size, zero overflow capacity, inconsistent total capacity, ...).
    ///
    /// Not retryable until the configuration is corrected.
    #[error("invalid cache configuration: {0}")]
    Configuration(String),

    /// An internal index fell outside its valid range.
    ///
    /// Never produced for any address value; only by direct misuse of the
    /// store APIs with an out-of-range set index.
    #[error("cache invariant violated: {0}")]
    InvariantViolation(String),

    /// A trace line could not be parsed.
    #[error("trace line {line}: {message}")]
    Trace {
        /// One-based line number in the trace source.
        line: usize,
        /// Description of what was wrong with the line.
        message: String,
    },

    /// Reading a trace or configuration file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON configuration document could not be deserialized.
    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

impl CacheError {
    /// Shorthand for a [`CacheError::Configuration`] with a formatted message.
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Shorthand for a [`CacheError::InvariantViolation`] with a formatted message.
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Returns `true` for errors that indicate a programming defect rather
    /// than bad input.
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CacheError>;
