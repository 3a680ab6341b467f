//! Hybrid cache behaviour model.
//!
//! This crate predicts hit/miss counts for a cache that combines a
//! set-associative store with a small fully-associative overflow table, so that
//! cache verification programs can be checked against hardware performance
//! counters. It provides:
//! 1. **Cache:** Address decomposition, set-associative store with LRU/FIFO
//!    replacement, overflow table, and the composed [`CacheModel`].
//! 2. **Configuration:** Geometry, policies, composition mode, and named presets.
//! 3. **Statistics:** Hit/miss/eviction counters and per-set usage.
//! 4. **Simulation:** Trace parsing, verification-program scenarios, and a
//!    replay harness that compares predictions with observed counters.
//!
//! ```
//! use hybridsim_core::{CacheModel, Config};
//! use hybridsim_core::cache::Outcome;
//!
//! let mut model = CacheModel::new(&Config::default().cache)?;
//! assert_eq!(model.access(0x8000_0000)?, Outcome::Miss);
//! assert_eq!(model.access(0x8000_0004)?, Outcome::Hit);
//! assert_eq!(model.stats().misses, 1);
//! # Ok::<(), hybridsim_core::common::CacheError>(())
//! ```

/// Cache structures and the composed hit/miss model.
pub mod cache;
/// Common types (access kinds, errors).
pub mod common;
/// Model configuration (defaults, enums, presets).
pub mod config;
/// Trace-driven simulation (traces, scenarios, harness).
pub mod sim;
/// Hit/miss statistics collection and reporting.
pub mod stats;

/// The composed cache model; construct with `CacheModel::new`.
pub use crate::cache::CacheModel;
/// Crate-wide error type.
pub use crate::common::CacheError;
/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
