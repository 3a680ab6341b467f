//! Cache Replacement Policies.
//!
//! Implements victim selection for the sets of the set-associative store.
//!
//! # Policies
//!
//! - `Fifo`: First-In, First-Out (install order; hits do not reorder).
//! - `Lru`: Least Recently Used (hits and installs both reorder).
//!
//! Both keep a strict total order over the ways of a set, so victim
//! selection never has to break a tie.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Least Recently Used replacement policy.
pub mod lru;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;

use crate::config::ReplacementPolicy as PolicyType;

/// Trait for set replacement policies.
///
/// Defines the interface for updating usage state and selecting victim lines.
/// Callers fill invalid ways before asking for a victim, so `get_victim` is
/// only consulted for full sets.
pub trait ReplacementPolicy: Send + std::fmt::Debug {
    /// Updates the policy state when a resident line is hit.
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    /// * `way` - The way index within the set that was accessed.
    fn update(&mut self, set: usize, way: usize);

    /// Updates the policy state when a new line is installed into `way`.
    fn install(&mut self, set: usize, way: usize);

    /// Selects a victim line to evict from a full set.
    ///
    /// # Returns
    ///
    /// The index of the way to evict.
    fn get_victim(&self, set: usize) -> usize;

    /// Returns every set to its power-on ordering.
    fn reset(&mut self);
}

/// Builds the boxed policy selected by the configuration.
pub fn build(kind: PolicyType, sets: usize, ways: usize) -> Box<dyn ReplacementPolicy> {
    match kind {
        PolicyType::Lru => Box::new(LruPolicy::new(sets, ways)),
        PolicyType::Fifo => Box::new(FifoPolicy::new(sets, ways)),
    }
}
