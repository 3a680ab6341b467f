//! Fully-associative overflow table.
//!
//! A small content-addressable table of line addresses. Any entry may hold any
//! line. Each entry carries two sequence numbers drawn from one monotonically
//! increasing counter: when it was installed and when it was last used. The
//! victim is the valid entry with the smallest install number (FIFO) or the
//! smallest use number (LRU). Sequence numbers are unique, so the eviction order
//! is a strict total order.
//!
//! FIFO is the default: it is the policy under which filling `capacity` lines and
//! then touching one more evicts exactly the first line, which is the transition
//! the overflow regression tests look for.

use std::collections::HashMap;

use tracing::trace;

use super::Outcome;
use crate::config::ReplacementPolicy as PolicyType;

/// A single slot in the table.
#[derive(Debug, Clone, Copy, Default)]
struct FaEntry {
    /// Line address (tag and set index together).
    key: u64,
    valid: bool,
    /// Sequence number at install time.
    installed: u64,
    /// Sequence number at the most recent hit or install.
    used: u64,
}

/// Bounded fully-associative table with FIFO or LRU eviction.
#[derive(Debug, Clone)]
pub struct FullyAssociativeOverflow {
    entries: Vec<FaEntry>,
    /// Key to slot, for valid entries only.
    index: HashMap<u64, usize>,
    policy: PolicyType,
    clock: u64,
}

impl FullyAssociativeOverflow {
    /// Creates an empty table with `capacity` slots.
    pub fn new(capacity: usize, policy: PolicyType) -> Self {
        Self {
            entries: vec![FaEntry::default(); capacity],
            index: HashMap::with_capacity(capacity),
            policy,
            clock: 0,
        }
    }

    /// Number of slots.
    pub const fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of valid entries. Never exceeds [`capacity`](Self::capacity).
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` when no entry is valid.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Eviction policy in use.
    pub const fn policy(&self) -> PolicyType {
        self.policy
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Looks up `key`. Under LRU a hit refreshes the entry's use order.
    pub fn lookup(&mut self, key: u64) -> Outcome {
        let Some(&slot) = self.index.get(&key) else {
            return Outcome::Miss;
        };
        if self.policy == PolicyType::Lru {
            let now = self.tick();
            self.entries[slot].used = now;
        }
        Outcome::Hit
    }

    /// Checks residency without touching eviction state.
    pub fn contains(&self, key: u64) -> bool {
        self.index.contains_key(&key)
    }

    /// Installs `key`, evicting the oldest entry (by the table's policy) when
    /// the table is full.
    ///
    /// Installing a key that is already present refreshes it as a hit would.
    ///
    /// # Returns
    ///
    /// The evicted key, if a valid entry was displaced.
    pub fn insert(&mut self, key: u64) -> Option<u64> {
        if self.contains(key) {
            let _ = self.lookup(key);
            return None;
        }

        let (slot, evicted) = match self.entries.iter().position(|e| !e.valid) {
            Some(slot) => (slot, None),
            None => {
                let slot = self.victim()?;
                let old = self.entries[slot].key;
                let _ = self.index.remove(&old);
                trace!(slot, old_key = old, new_key = key, "overflow eviction");
                (slot, Some(old))
            }
        };

        let now = self.tick();
        self.entries[slot] = FaEntry {
            key,
            valid: true,
            installed: now,
            used: now,
        };
        let _ = self.index.insert(key, slot);
        evicted
    }

    /// Invalidates `key` if present. Returns whether it was resident.
    pub fn remove(&mut self, key: u64) -> bool {
        match self.index.remove(&key) {
            Some(slot) => {
                self.entries[slot].valid = false;
                true
            }
            None => false,
        }
    }

    /// Invalidates every entry and restarts the sequence counter.
    pub fn clear(&mut self) {
        for e in &mut self.entries {
            *e = FaEntry::default();
        }
        self.index.clear();
        self.clock = 0;
    }

    /// Valid keys in eviction order: the next victim first.
    pub fn eviction_order(&self) -> Vec<u64> {
        let mut valid: Vec<&FaEntry> = self.entries.iter().filter(|e| e.valid).collect();
        valid.sort_by_key(|e| self.rank(e));
        valid.into_iter().map(|e| e.key).collect()
    }

    const fn rank(&self, e: &FaEntry) -> u64 {
        match self.policy {
            PolicyType::Fifo => e.installed,
            PolicyType::Lru => e.used,
        }
    }

    fn victim(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.valid)
            .min_by_key(|(_, e)| self.rank(e))
            .map(|(slot, _)| slot)
    }
}
