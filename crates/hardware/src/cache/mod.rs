//! Hybrid Cache Model.
//!
//! This module implements the hit/miss oracle for a cache built from a
//! set-associative store and a small fully-associative overflow table. It
//! decomposes each address, routes it according to the configured
//! [`CacheMode`], and keeps the counters that stand in for hardware
//! performance counters.
//!
//! # Modes
//!
//! - [`CacheMode::SetAssociative`]: sets only.
//! - [`CacheMode::FullyAssociative`]: overflow table only, keyed by line address.
//! - [`CacheMode::Hybrid`]: sets first. The overflow table is an exclusive
//!   victim buffer: lines evicted from a set move into it, and a set miss that
//!   finds its line there moves the line back into the set. Such an access is
//!   counted in `overflow_hits` and, unless
//!   `count_overflow_hits_as_hits` is set, as a miss.

/// Address decomposition.
pub mod decoder;
/// Validated geometry.
pub mod geometry;
/// Fully-associative overflow table.
pub mod overflow;
/// Set replacement policy implementations (FIFO, LRU).
pub mod policies;
/// Set-associative line store.
pub mod set_assoc;

pub use decoder::{DecodedAddr, decompose};
pub use geometry::CacheGeometry;
pub use overflow::FullyAssociativeOverflow;
pub use set_assoc::SetAssociativeStore;

use tracing::{debug, trace};

use crate::common::{AccessType, Result};
use crate::config::{CacheConfig, CacheMode};
use crate::stats::CacheStats;

/// Classification of one access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The line was already resident.
    Hit,
    /// The line was not resident and has been installed.
    Miss,
}

impl Outcome {
    /// Returns `true` for [`Outcome::Hit`].
    pub const fn is_hit(self) -> bool {
        matches!(self, Self::Hit)
    }

    /// Returns `true` for [`Outcome::Miss`].
    pub const fn is_miss(self) -> bool {
        matches!(self, Self::Miss)
    }
}

/// One self-contained cache instance: geometry, line state, and counters.
///
/// Each scenario owns its own model; nothing is global, so independent
/// scenarios may run on separate threads.
#[derive(Debug)]
pub struct CacheModel {
    geometry: CacheGeometry,
    sets: SetAssociativeStore,
    overflow: FullyAssociativeOverflow,
    stats: CacheStats,
}

impl CacheModel {
    /// Validates `config` and builds a cold model.
    ///
    /// # Errors
    ///
    /// [`CacheError::Configuration`](crate::common::CacheError::Configuration)
    /// when the geometry is malformed.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        Ok(Self::from_geometry(CacheGeometry::new(config)?))
    }

    /// Builds a cold model from an already validated geometry.
    pub fn from_geometry(geometry: CacheGeometry) -> Self {
        debug!(
            size = geometry.size_bytes(),
            line = geometry.line_bytes(),
            sets = geometry.sets(),
            ways = geometry.ways(),
            fa_entries = geometry.fa_entries(),
            mode = %geometry.mode(),
            "cache model created"
        );
        Self {
            sets: SetAssociativeStore::new(geometry.sets(), geometry.ways(), geometry.policy()),
            overflow: FullyAssociativeOverflow::new(geometry.fa_entries(), geometry.fa_policy()),
            stats: CacheStats::new(geometry.sets()),
            geometry,
        }
    }

    /// The validated geometry.
    pub const fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// Current counters.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The set-associative store, for inspection.
    pub const fn set_store(&self) -> &SetAssociativeStore {
        &self.sets
    }

    /// The overflow table, for inspection.
    pub const fn overflow(&self) -> &FullyAssociativeOverflow {
        &self.overflow
    }

    /// Decomposes `addr` with this model's geometry.
    pub const fn decode(&self, addr: u64) -> DecodedAddr {
        decompose(addr, &self.geometry)
    }

    /// Performs a read access. See [`access_typed`](Self::access_typed).
    pub fn access(&mut self, addr: u64) -> Result<Outcome> {
        self.access_typed(addr, AccessType::Read)
    }

    /// Classifies one access as hit or miss, installing the line on a miss.
    ///
    /// Updates the counters exactly once. The access type is recorded but does
    /// not affect classification.
    ///
    /// # Errors
    ///
    /// Only [`CacheError::InvariantViolation`](crate::common::CacheError::InvariantViolation),
    /// which indicates a defect rather than a bad address.
    pub fn access_typed(&mut self, addr: u64, kind: AccessType) -> Result<Outcome> {
        let d = self.decode(addr);
        let outcome = match self.geometry.mode() {
            CacheMode::SetAssociative => self.access_sets(d)?,
            CacheMode::FullyAssociative => self.access_overflow(d),
            CacheMode::Hybrid => self.access_hybrid(d)?,
        };

        self.stats.accesses += 1;
        match outcome {
            Outcome::Hit => self.stats.hits += 1,
            Outcome::Miss => self.stats.misses += 1,
        }
        match kind {
            AccessType::Read => self.stats.reads += 1,
            AccessType::Write => self.stats.writes += 1,
        }
        if let Some(count) = self.stats.set_accesses.get_mut(d.set_index) {
            *count += 1;
        }

        trace!(
            addr,
            set = d.set_index,
            tag = d.tag,
            %kind,
            hit = outcome.is_hit(),
            "access"
        );
        Ok(outcome)
    }

    /// Replays `addrs` as reads and returns the number of misses they caused.
    pub fn access_all(&mut self, addrs: impl IntoIterator<Item = u64>) -> Result<u64> {
        let before = self.stats.misses;
        for addr in addrs {
            let _ = self.access(addr)?;
        }
        Ok(self.stats.misses - before)
    }

    fn access_sets(&mut self, d: DecodedAddr) -> Result<Outcome> {
        if self.sets.lookup(d.set_index, d.tag)?.is_hit() {
            self.stats.set_hits += 1;
            return Ok(Outcome::Hit);
        }
        if self.sets.insert(d.set_index, d.tag)?.is_some() {
            self.stats.set_evictions += 1;
        }
        Ok(Outcome::Miss)
    }

    fn access_overflow(&mut self, d: DecodedAddr) -> Outcome {
        if self.overflow.lookup(d.line).is_hit() {
            self.stats.fa_hits += 1;
            return Outcome::Hit;
        }
        if self.overflow.insert(d.line).is_some() {
            self.stats.overflow_evictions += 1;
        }
        Outcome::Miss
    }

    fn access_hybrid(&mut self, d: DecodedAddr) -> Result<Outcome> {
        if self.sets.lookup(d.set_index, d.tag)?.is_hit() {
            self.stats.set_hits += 1;
            return Ok(Outcome::Hit);
        }

        let from_overflow = self.overflow.remove(d.line);
        if let Some(victim_tag) = self.sets.insert(d.set_index, d.tag)? {
            self.stats.set_evictions += 1;
            let victim = self.geometry.line_of(victim_tag, d.set_index);
            if self.overflow.insert(victim).is_some() {
                self.stats.overflow_evictions += 1;
            }
        }

        if !from_overflow {
            return Ok(Outcome::Miss);
        }
        self.stats.overflow_hits += 1;
        self.stats.fa_hits += 1;
        Ok(if self.geometry.count_overflow_hits_as_hits() {
            Outcome::Hit
        } else {
            Outcome::Miss
        })
    }

    /// Checks whether the line holding `addr` is resident, without side effects.
    pub fn contains(&self, addr: u64) -> bool {
        let d = self.decode(addr);
        let in_sets = || self.sets.contains(d.set_index, d.tag).unwrap_or(false);
        match self.geometry.mode() {
            CacheMode::SetAssociative => in_sets(),
            CacheMode::FullyAssociative => self.overflow.contains(d.line),
            CacheMode::Hybrid => in_sets() || self.overflow.contains(d.line),
        }
    }

    /// Invalidates every line, clears the overflow table, and zeroes the counters.
    ///
    /// Afterwards the model is indistinguishable from a newly constructed one.
    pub fn reset(&mut self) {
        debug!("cache model reset");
        self.sets.invalidate_all();
        self.overflow.clear();
        self.stats.clear();
    }

    /// Zeroes the counters only; cache contents are kept.
    ///
    /// Mirrors clearing a performance-counter register between two loops of
    /// the same program.
    pub fn reset_counters(&mut self) {
        self.stats.clear();
    }
}
