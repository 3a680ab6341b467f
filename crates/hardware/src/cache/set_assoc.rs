//! Set-associative line store.
//!
//! Holds `sets × ways` line slots in one flat vector (`set * ways + way`) and a
//! replacement policy that orders the ways of each set. Misses fill invalid ways
//! (lowest way first) before the policy is ever asked for a victim, so a set
//! evicts only once every one of its ways is valid.

use tracing::trace;

use super::Outcome;
use super::policies::{self, ReplacementPolicy};
use crate::common::{CacheError, Result};
use crate::config::ReplacementPolicy as PolicyType;

/// Cache line entry containing tag and validity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CacheLine {
    tag: u64,
    valid: bool,
}

/// `sets` sets of `ways` lines with per-set replacement.
#[derive(Debug)]
pub struct SetAssociativeStore {
    lines: Vec<CacheLine>,
    sets: usize,
    ways: usize,
    policy: Box<dyn ReplacementPolicy>,
}

impl SetAssociativeStore {
    /// Creates a store with every line invalid.
    ///
    /// # Arguments
    ///
    /// * `sets` - Number of sets.
    /// * `ways` - Lines per set.
    /// * `policy` - Victim selection policy for full sets.
    pub fn new(sets: usize, ways: usize, policy: PolicyType) -> Self {
        Self {
            lines: vec![CacheLine::default(); sets * ways],
            sets,
            ways,
            policy: policies::build(policy, sets, ways),
        }
    }

    /// Number of sets.
    pub const fn sets(&self) -> usize {
        self.sets
    }

    /// Lines per set.
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Index of the first slot of `set`, or an invariant violation when the
    /// set does not exist.
    fn base(&self, set: usize) -> Result<usize> {
        if set >= self.sets {
            return Err(CacheError::invariant(format!(
                "set index {set} out of range for {} sets",
                self.sets
            )));
        }
        Ok(set * self.ways)
    }

    fn find(&self, base: usize, tag: u64) -> Option<usize> {
        self.lines[base..base + self.ways]
            .iter()
            .position(|l| l.valid && l.tag == tag)
    }

    /// Looks up `tag` in `set`. A hit promotes the line in the replacement order.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvariantViolation`] if `set >= sets`.
    pub fn lookup(&mut self, set: usize, tag: u64) -> Result<Outcome> {
        let base = self.base(set)?;
        match self.find(base, tag) {
            Some(way) => {
                self.policy.update(set, way);
                Ok(Outcome::Hit)
            }
            None => Ok(Outcome::Miss),
        }
    }

    /// Checks residency without touching replacement state.
    pub fn contains(&self, set: usize, tag: u64) -> Result<bool> {
        let base = self.base(set)?;
        Ok(self.find(base, tag).is_some())
    }

    /// Installs `tag` into `set`.
    ///
    /// Fills the lowest invalid way if there is one; otherwise evicts the
    /// policy's victim. Installing a tag that is already resident only
    /// refreshes it, so a line never occupies two ways of one set.
    ///
    /// # Returns
    ///
    /// The tag of the evicted line, if a valid line was displaced.
    pub fn insert(&mut self, set: usize, tag: u64) -> Result<Option<u64>> {
        let base = self.base(set)?;
        if let Some(way) = self.find(base, tag) {
            self.policy.update(set, way);
            return Ok(None);
        }

        let slots = &self.lines[base..base + self.ways];
        let (way, evicted) = match slots.iter().position(|l| !l.valid) {
            Some(way) => (way, None),
            None => {
                let way = self.policy.get_victim(set);
                if way >= self.ways {
                    return Err(CacheError::invariant(format!(
                        "replacement policy chose way {way} of {}",
                        self.ways
                    )));
                }
                (way, Some(slots[way].tag))
            }
        };

        if let Some(old) = evicted {
            trace!(set, way, old_tag = old, new_tag = tag, "set eviction");
        }
        self.lines[base + way] = CacheLine { tag, valid: true };
        self.policy.install(set, way);
        Ok(evicted)
    }

    /// Number of valid lines in `set`.
    pub fn valid_lines(&self, set: usize) -> Result<usize> {
        let base = self.base(set)?;
        Ok(self.lines[base..base + self.ways]
            .iter()
            .filter(|l| l.valid)
            .count())
    }

    /// Tags resident in `set`, in way order.
    pub fn resident_tags(&self, set: usize) -> Result<Vec<u64>> {
        let base = self.base(set)?;
        Ok(self.lines[base..base + self.ways]
            .iter()
            .filter(|l| l.valid)
            .map(|l| l.tag)
            .collect())
    }

    /// Invalidates every line and returns the policy to its initial ordering.
    pub fn invalidate_all(&mut self) {
        for line in &mut self.lines {
            *line = CacheLine::default();
        }
        self.policy.reset();
    }
}
