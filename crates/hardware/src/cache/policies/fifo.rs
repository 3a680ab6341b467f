//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! This policy evicts the oldest cache line in a set, regardless of how recently
//! it was accessed. Each set keeps its ways in install order; a hit leaves the
//! order untouched and an install moves the way to the back of the queue.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `update()`: O(1)
//!   - `install()`: O(W)
//!   - `get_victim()`: O(1)
//! - **Space Complexity:** O(S × W) where S is the number of sets

use std::collections::VecDeque;

use super::ReplacementPolicy;

/// FIFO Policy state.
#[derive(Debug, Clone)]
pub struct FifoPolicy {
    /// Install order per set; the front is the next victim.
    queues: Vec<VecDeque<usize>>,
    /// Number of ways in the cache.
    ways: usize,
}

impl FifoPolicy {
    /// Creates a new FIFO policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            queues: vec![(0..ways).collect(); sets],
            ways,
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    /// Hits do not change install order.
    fn update(&mut self, _set: usize, _way: usize) {}

    fn install(&mut self, set: usize, way: usize) {
        let queue = &mut self.queues[set];
        if let Some(pos) = queue.iter().position(|&x| x == way) {
            let _ = queue.remove(pos);
        }
        queue.push_back(way);
    }

    /// Returns the way installed longest ago.
    fn get_victim(&self, set: usize) -> usize {
        self.queues[set].front().copied().unwrap_or(0)
    }

    fn reset(&mut self) {
        let ways = self.ways;
        for queue in &mut self.queues {
            queue.clear();
            queue.extend(0..ways);
        }
    }
}
