//! Cache Replacement Policy Tests.
//!
//! Verifies victim selection for LRU and FIFO. Each policy implements
//! `ReplacementPolicy` with `update` (hit), `install` (fill) and `get_victim`.

use hybridsim_core::cache::policies::{FifoPolicy, LruPolicy, ReplacementPolicy, build};
use hybridsim_core::config::ReplacementPolicy as PolicyType;

// ══════════════════════════════════════════════════════════
// 1. LRU Policy
// ══════════════════════════════════════════════════════════

/// Initial stack is [0, 1, 2, 3] with index 0 = MRU, so the victim is way 3.
#[test]
fn lru_initial_victim_is_last_way() {
    let policy = LruPolicy::new(1, 4);
    assert_eq!(policy.get_victim(0), 3);
    assert_eq!(policy.order(0), &[0, 1, 2, 3]);
}

/// Installing ways in order 0,1,2,3 makes 0 the LRU.
#[test]
fn lru_fill_order_sets_victim() {
    let mut policy = LruPolicy::new(1, 4);
    for way in 0..4 {
        policy.install(0, way);
    }
    assert_eq!(policy.order(0), &[3, 2, 1, 0]);
    assert_eq!(policy.get_victim(0), 0);
}

/// A hit promotes the way; the next-oldest becomes the victim.
#[test]
fn lru_hit_promotes() {
    let mut policy = LruPolicy::new(1, 4);
    for way in 0..4 {
        policy.install(0, way);
    }
    policy.update(0, 0);
    assert_eq!(policy.get_victim(0), 1);
    policy.update(0, 1);
    assert_eq!(policy.get_victim(0), 2);
}

/// Sets are tracked independently.
#[test]
fn lru_sets_are_independent() {
    let mut policy = LruPolicy::new(2, 2);
    policy.install(0, 0);
    policy.install(0, 1);
    policy.install(1, 1);
    policy.install(1, 0);
    assert_eq!(policy.get_victim(0), 0);
    assert_eq!(policy.get_victim(1), 1);
}

#[test]
fn lru_reset_restores_initial_order() {
    let mut policy = LruPolicy::new(1, 3);
    policy.install(0, 2);
    policy.update(0, 1);
    policy.reset();
    assert_eq!(policy.order(0), &[0, 1, 2]);
}

// ══════════════════════════════════════════════════════════
// 2. FIFO Policy
// ══════════════════════════════════════════════════════════

#[test]
fn fifo_evicts_in_install_order() {
    let mut policy = FifoPolicy::new(1, 4);
    for way in 0..4 {
        policy.install(0, way);
    }
    assert_eq!(policy.get_victim(0), 0);
    policy.install(0, 0);
    assert_eq!(policy.get_victim(0), 1);
    policy.install(0, 1);
    assert_eq!(policy.get_victim(0), 2);
}

/// Hits never change FIFO order, even on the way about to be evicted.
#[test]
fn fifo_ignores_hits() {
    let mut policy = FifoPolicy::new(1, 4);
    for way in 0..4 {
        policy.install(0, way);
    }
    policy.update(0, 0);
    policy.update(0, 0);
    assert_eq!(policy.get_victim(0), 0);
}

#[test]
fn fifo_reset_restores_initial_order() {
    let mut policy = FifoPolicy::new(1, 2);
    policy.install(0, 0);
    policy.reset();
    assert_eq!(policy.get_victim(0), 0);
}

// ══════════════════════════════════════════════════════════
// 3. Factory
// ══════════════════════════════════════════════════════════

/// After the same fill + hit sequence, LRU and FIFO disagree on the victim.
#[test]
fn build_selects_policy() {
    let run = |kind| {
        let mut p = build(kind, 1, 2);
        p.install(0, 0);
        p.install(0, 1);
        p.update(0, 0);
        p.get_victim(0)
    };
    assert_eq!(run(PolicyType::Lru), 1);
    assert_eq!(run(PolicyType::Fifo), 0);
}
