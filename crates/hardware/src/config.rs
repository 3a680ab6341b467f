//! Configuration system for the cache model.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the model. It provides:
//! 1. **Defaults:** Baseline geometry modelled on the CV32A60X write-through data cache.
//! 2. **Structures:** Cache geometry/policy config and scenario placement config.
//! 3. **Enums:** Replacement policy, composition mode, and the named regression presets.
//!
//! Configuration is supplied as JSON (`Config::from_json` / `Config::from_file`) or
//! built from `Config::default()` and a [`Preset`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::{CacheError, Result};

/// Default configuration constants for the model.
///
/// These values define the baseline geometry when not explicitly overridden
/// in a JSON configuration document.
mod defaults {
    /// Total set-associative capacity in bytes (2 KiB).
    pub const CACHE_SIZE: usize = 2048;

    /// Cache line size in bytes.
    pub const CACHE_LINE: usize = 16;

    /// Number of sets. Must be a power of two.
    pub const CACHE_SETS: usize = 16;

    /// Associativity (lines per set).
    pub const CACHE_WAYS: usize = 8;

    /// Entries in the fully-associative overflow table.
    pub const FA_ENTRIES: usize = 8;

    /// Base address used when generating scenario traces (start of RAM).
    pub const SCENARIO_BASE: u64 = 0x8000_0000;
}

/// Replacement policy algorithms.
///
/// Used both for victim selection within a set and for the overflow table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// Least Recently Used: evicts the entry touched longest ago.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// First In First Out: evicts the entry installed longest ago, ignoring hits.
    #[serde(alias = "Fifo")]
    Fifo,
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lru => write!(f, "LRU"),
            Self::Fifo => write!(f, "FIFO"),
        }
    }
}

/// How the set-associative store and the overflow table are composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CacheMode {
    /// Every access goes through the set-associative store only.
    #[default]
    #[serde(alias = "SET_ASSOCIATIVE")]
    SetAssociative,
    /// Every access goes through the fully-associative table only.
    #[serde(alias = "FULLY_ASSOCIATIVE")]
    FullyAssociative,
    /// Set-associative store backed by the fully-associative table as an
    /// exclusive victim buffer.
    #[serde(alias = "HYBRID")]
    Hybrid,
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetAssociative => write!(f, "set-associative"),
            Self::FullyAssociative => write!(f, "fully-associative"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Named configurations from the hardware regression matrix.
///
/// Each preset selects a composition mode on top of an otherwise unchanged
/// geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    /// Plain write-through cache.
    #[serde(rename = "WT")]
    Wt,
    /// Write-through cache with the hybrid overflow table enabled.
    #[serde(rename = "WT_HYB")]
    WtHyb,
    /// Hybrid build forced into set-associative operation.
    #[serde(rename = "WT_HYB_FORCE_SET_ASS")]
    WtHybForceSetAss,
    /// Hybrid build forced into fully-associative operation.
    #[serde(rename = "WT_HYB_FORCE_FULL_ASS")]
    WtHybForceFullAss,
}

impl Preset {
    /// All presets, in regression-matrix order.
    pub const ALL: [Self; 4] = [
        Self::Wt,
        Self::WtHyb,
        Self::WtHybForceSetAss,
        Self::WtHybForceFullAss,
    ];

    /// The name used by the regression scripts.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wt => "WT",
            Self::WtHyb => "WT_HYB",
            Self::WtHybForceSetAss => "WT_HYB_FORCE_SET_ASS",
            Self::WtHybForceFullAss => "WT_HYB_FORCE_FULL_ASS",
        }
    }

    /// Composition mode this preset selects.
    pub const fn mode(self) -> CacheMode {
        match self {
            Self::Wt | Self::WtHybForceSetAss => CacheMode::SetAssociative,
            Self::WtHyb => CacheMode::Hybrid,
            Self::WtHybForceFullAss => CacheMode::FullyAssociative,
        }
    }

    /// Applies the preset to an existing cache configuration.
    pub fn apply(self, cache: &mut CacheConfig) {
        cache.mode = self.mode();
    }

    /// Returns the default cache configuration with this preset applied.
    pub fn config(self) -> CacheConfig {
        let mut cache = CacheConfig::default();
        self.apply(&mut cache);
        cache
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| {
                CacheError::config(format!(
                    "unknown preset `{s}` (expected one of WT, WT_HYB, WT_HYB_FORCE_SET_ASS, WT_HYB_FORCE_FULL_ASS)"
                ))
            })
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use hybridsim_core::config::{CacheMode, Config, ReplacementPolicy};
///
/// let json = r#"{
///     "cache": {
///         "size_bytes": 4096,
///         "line_bytes": 64,
///         "sets": 16,
///         "ways": 4,
///         "fa_entries": 8,
///         "fa_policy": "FIFO",
///         "mode": "Hybrid"
///     }
/// }"#;
///
/// let config = Config::from_json(json)?;
/// assert_eq!(config.cache.sets, 16);
/// assert_eq!(config.cache.policy, ReplacementPolicy::Lru);
/// assert_eq!(config.cache.mode, CacheMode::Hybrid);
/// # Ok::<(), hybridsim_core::common::CacheError>(())
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Cache geometry, policies and composition mode.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Placement of generated scenario traces.
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl Config {
    /// Parses a configuration from a JSON document.
    ///
    /// Missing fields fall back to their defaults. The geometry itself is not
    /// validated here; that happens when a model is constructed from it.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Geometry and policy configuration for one cache model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Total set-associative capacity in bytes (`line_bytes * sets * ways`).
    #[serde(default = "CacheConfig::default_size")]
    pub size_bytes: usize,

    /// Cache line size in bytes.
    #[serde(default = "CacheConfig::default_line")]
    pub line_bytes: usize,

    /// Number of sets (power of two).
    #[serde(default = "CacheConfig::default_sets")]
    pub sets: usize,

    /// Associativity (number of ways per set).
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Replacement policy within a set.
    #[serde(default)]
    pub policy: ReplacementPolicy,

    /// Number of entries in the fully-associative overflow table.
    #[serde(default = "CacheConfig::default_fa_entries")]
    pub fa_entries: usize,

    /// Eviction policy of the overflow table.
    #[serde(default = "CacheConfig::default_fa_policy")]
    pub fa_policy: ReplacementPolicy,

    /// How the two structures are composed.
    #[serde(default)]
    pub mode: CacheMode,

    /// In hybrid mode, count overflow-table hits as cache hits instead of misses.
    #[serde(default)]
    pub count_overflow_hits_as_hits: bool,
}

impl CacheConfig {
    /// Returns the default set-associative capacity in bytes.
    fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    /// Returns the default cache line size in bytes.
    fn default_line() -> usize {
        defaults::CACHE_LINE
    }

    /// Returns the default number of sets.
    fn default_sets() -> usize {
        defaults::CACHE_SETS
    }

    /// Returns the default cache associativity (number of ways).
    fn default_ways() -> usize {
        defaults::CACHE_WAYS
    }

    /// Returns the default overflow table size.
    fn default_fa_entries() -> usize {
        defaults::FA_ENTRIES
    }

    /// The overflow table defaults to FIFO; see [`crate::cache::overflow`].
    const fn default_fa_policy() -> ReplacementPolicy {
        ReplacementPolicy::Fifo
    }
}

impl Default for CacheConfig {
    /// Creates the CV32A60X-style configuration: 2 KiB, 16-byte lines, 16 sets,
    /// 8 ways, an 8-entry FIFO overflow table, set-associative mode.
    fn default() -> Self {
        Self {
            size_bytes: defaults::CACHE_SIZE,
            line_bytes: defaults::CACHE_LINE,
            sets: defaults::CACHE_SETS,
            ways: defaults::CACHE_WAYS,
            policy: ReplacementPolicy::default(),
            fa_entries: defaults::FA_ENTRIES,
            fa_policy: Self::default_fa_policy(),
            mode: CacheMode::default(),
            count_overflow_hits_as_hits: false,
        }
    }
}

/// Placement of generated scenario traces in the address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ScenarioConfig {
    /// Address of the first array touched by a scenario.
    #[serde(default = "ScenarioConfig::default_base")]
    pub base_address: u64,
}

impl ScenarioConfig {
    /// Returns the default scenario base address.
    fn default_base() -> u64 {
        defaults::SCENARIO_BASE
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            base_address: defaults::SCENARIO_BASE,
        }
    }
}
