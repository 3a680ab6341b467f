//! Validated cache geometry.
//!
//! A [`CacheGeometry`] is the immutable, checked form of a
//! [`CacheConfig`]. Every structural precondition the model relies on is
//! verified here, once, so that the hot path never has to.

use crate::common::{CacheError, Result};
use crate::config::{CacheConfig, CacheMode, ReplacementPolicy};

/// Immutable cache configuration whose invariants have been checked.
///
/// Invariants:
/// - `line_bytes`, `sets`, `ways`, `fa_entries` are all non-zero.
/// - `sets` is a power of two.
/// - `size_bytes == line_bytes * sets * ways`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheGeometry {
    size_bytes: usize,
    line_bytes: u64,
    sets: usize,
    ways: usize,
    fa_entries: usize,
    policy: ReplacementPolicy,
    fa_policy: ReplacementPolicy,
    mode: CacheMode,
    count_overflow_hits_as_hits: bool,
}

impl CacheGeometry {
    /// Validates `config` and freezes it into a geometry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Configuration`] when any invariant above is violated.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        if config.line_bytes == 0 {
            return Err(CacheError::config("line size must be non-zero"));
        }
        if config.sets == 0 || !config.sets.is_power_of_two() {
            return Err(CacheError::config(format!(
                "set count must be a non-zero power of two, got {}",
                config.sets
            )));
        }
        if config.ways == 0 {
            return Err(CacheError::config("associativity must be non-zero"));
        }
        if config.fa_entries == 0 {
            return Err(CacheError::config(
                "fully-associative table capacity must be non-zero",
            ));
        }

        let expected = config
            .line_bytes
            .checked_mul(config.sets)
            .and_then(|v| v.checked_mul(config.ways))
            .ok_or_else(|| CacheError::config("cache geometry overflows the address space"))?;
        if expected != config.size_bytes {
            return Err(CacheError::config(format!(
                "capacity {} does not equal line size {} x {} sets x {} ways = {}",
                config.size_bytes, config.line_bytes, config.sets, config.ways, expected
            )));
        }

        Ok(Self {
            size_bytes: config.size_bytes,
            line_bytes: config.line_bytes as u64,
            sets: config.sets,
            ways: config.ways,
            fa_entries: config.fa_entries,
            policy: config.policy,
            fa_policy: config.fa_policy,
            mode: config.mode,
            count_overflow_hits_as_hits: config.count_overflow_hits_as_hits,
        })
    }

    /// Total set-associative capacity in bytes.
    pub const fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Line size in bytes.
    pub const fn line_bytes(&self) -> u64 {
        self.line_bytes
    }

    /// Number of sets.
    pub const fn sets(&self) -> usize {
        self.sets
    }

    /// Lines per set.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Overflow table capacity in entries.
    pub const fn fa_entries(&self) -> usize {
        self.fa_entries
    }

    /// Replacement policy within a set.
    pub const fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    /// Eviction policy of the overflow table.
    pub const fn fa_policy(&self) -> ReplacementPolicy {
        self.fa_policy
    }

    /// Composition mode.
    pub const fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Whether hybrid-mode overflow hits count as cache hits.
    pub const fn count_overflow_hits_as_hits(&self) -> bool {
        self.count_overflow_hits_as_hits
    }

    /// Rebuilds the line address from a stored `(tag, set_index)` pair.
    pub const fn line_of(&self, tag: u64, set_index: usize) -> u64 {
        tag * self.sets as u64 + set_index as u64
    }
}

impl TryFrom<&CacheConfig> for CacheGeometry {
    type Error = CacheError;

    fn try_from(config: &CacheConfig) -> Result<Self> {
        Self::new(config)
    }
}
