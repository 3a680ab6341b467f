//! Common types shared across the cache model.
//!
//! 1. **Memory Access:** Read/write classification carried by trace entries.
//! 2. **Error Handling:** The crate-wide error enum and `Result` alias.

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use data::AccessType;
pub use error::{CacheError, Result};
