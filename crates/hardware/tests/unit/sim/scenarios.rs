//! Scenario Trace Tests.
//!
//! Checks the shape of each verification-program trace and the miss counts the
//! default geometry predicts for them.

use hybridsim_core::CacheModel;
use hybridsim_core::common::AccessType;
use hybridsim_core::config::{CacheConfig, CacheMode, ReplacementPolicy, ScenarioConfig};
use hybridsim_core::sim::scenarios::{FA_SUBSET_LINES, SET_STRIDE_BYTES, block_sweep, fa_overflow};
use hybridsim_core::sim::scenarios::{fa_subset, sequential_loop, set_sweep};
use hybridsim_core::sim::{Trace, TraceEntry};
use pretty_assertions::assert_eq;

use crate::common::default_config;

const BASE: u64 = 0x8000_0000;

fn misses(model: &mut CacheModel, trace: &Trace) -> u64 {
    model
        .access_all(trace.iter().map(|e| e.address))
        .unwrap()
}

#[test]
fn default_base_matches_ram_start() {
    assert_eq!(ScenarioConfig::default().base_address, BASE);
}

// ══════════════════════════════════════════════════════════
// 1. Overflow subset
// ══════════════════════════════════════════════════════════

#[test]
fn fa_subset_shape() {
    let s = fa_subset(BASE);
    assert_eq!(s.name, "fa-subset");
    let names: Vec<&str> = s.phases.iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["fill", "overflow"]);
    assert_eq!(SET_STRIDE_BYTES, 64);

    let fill = s.phases[0].trace.entries();
    assert_eq!(fill.len(), FA_SUBSET_LINES as usize);
    assert!(fill.iter().all(|e| e.kind == AccessType::Write));
    assert_eq!(fill[1], TraceEntry::write(BASE + 64));

    // `fa_data[i * SET_STRIDE] += 1`: a read then a write, ascending.
    let overflow = s.phases[1].trace.entries();
    assert_eq!(overflow.len(), 4 * FA_SUBSET_LINES as usize);
    assert_eq!(
        &overflow[..4],
        &[
            TraceEntry::read(BASE),
            TraceEntry::write(BASE),
            TraceEntry::read(BASE + 64),
            TraceEntry::write(BASE + 64),
        ]
    );
    assert_eq!(overflow[31], TraceEntry::write(BASE + 15 * 64));
}

/// The program revisits its 8 resident lines first, so the second phase misses
/// only on the 8 new lines, whether or not the sets take part.
#[test]
fn fa_subset_second_phase_misses_exactly_capacity() {
    for mode in [CacheMode::FullyAssociative, CacheMode::SetAssociative, CacheMode::Hybrid] {
        let s = fa_subset(BASE);
        let mut model = CacheModel::new(&default_config(mode)).unwrap();
        assert_eq!(misses(&mut model, &s.phases[0].trace), 8, "{mode}");
        assert_eq!(misses(&mut model, &s.phases[1].trace), 8, "{mode}");
    }
}

/// Sixteen lines 64 bytes apart fall into sets 0, 4, 8 and 12, four per set.
#[test]
fn fa_subset_stride_shares_sets() {
    let s = fa_subset(BASE);
    let mut model = CacheModel::new(&CacheConfig::default()).unwrap();
    let _ = misses(&mut model, &s.flatten());
    let used: Vec<usize> = model
        .stats()
        .set_accesses
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c > 0)
        .map(|(set, _)| set)
        .collect();
    assert_eq!(used, vec![0, 4, 8, 12]);
    assert_eq!(model.stats().set_evictions, 0);
}

/// New lines first, then the originals: the 8-entry table misses on all 16.
#[test]
fn fa_overflow_exceeds_fully_associative_capacity() {
    let s = fa_overflow(BASE, 16);
    assert_eq!(s.name, "fa-overflow");
    assert_eq!(s.phases[1].trace.entries()[0], TraceEntry::write(BASE + 8 * 16));

    let mut model = CacheModel::new(&default_config(CacheMode::FullyAssociative)).unwrap();
    assert_eq!(misses(&mut model, &s.phases[0].trace), 8);
    let second = misses(&mut model, &s.phases[1].trace);
    assert!(second > 8, "second phase missed only {second} times");
    assert_eq!(second, 16);
}

/// Under LRU the same reordering still evicts every original line.
#[test]
fn fa_overflow_with_lru_table() {
    let s = fa_overflow(BASE, 16);
    let config = CacheConfig {
        fa_policy: ReplacementPolicy::Lru,
        ..default_config(CacheMode::FullyAssociative)
    };
    let mut model = CacheModel::new(&config).unwrap();
    let _ = misses(&mut model, &s.phases[0].trace);
    assert_eq!(misses(&mut model, &s.phases[1].trace), 16);
}

/// Sixteen consecutive lines land in sixteen different sets, so the
/// set-associative store absorbs the whole overflow phase.
#[test]
fn fa_overflow_in_set_mode_only_misses_new_lines() {
    let s = fa_overflow(BASE, 16);
    let mut model = CacheModel::new(&CacheConfig::default()).unwrap();
    assert_eq!(misses(&mut model, &s.phases[0].trace), 8);
    assert_eq!(misses(&mut model, &s.phases[1].trace), 8);
    assert_eq!(model.stats().set_evictions, 0);
}

// ══════════════════════════════════════════════════════════
// 2. Set sweep
// ══════════════════════════════════════════════════════════

#[test]
fn set_sweep_touches_every_set_once() {
    let s = set_sweep(BASE, 16, 16);
    assert_eq!(s.phases.len(), 1);
    let mut model = CacheModel::new(&CacheConfig::default()).unwrap();

    assert_eq!(misses(&mut model, &s.flatten()), 16);
    assert_eq!(model.stats().set_evictions, 0);
    assert_eq!(model.stats().set_accesses, vec![1; 16]);
    assert!(s.flatten().iter().all(|e| e.kind == AccessType::Read));
}

// ══════════════════════════════════════════════════════════
// 3. Block sweep
// ══════════════════════════════════════════════════════════

#[test]
fn block_sweep_shape() {
    let s = block_sweep(BASE);
    let lens: Vec<usize> = s.phases.iter().map(|p| p.trace.len()).collect();
    assert_eq!(lens, vec![32, 24, 32]);
    // Each element is written then read back.
    let first = &s.phases[0].trace.entries()[..2];
    assert_eq!(first, &[TraceEntry::write(BASE), TraceEntry::read(BASE)]);
}

/// Phase one: 16 lines, 4 per set in sets 0/4/8/12. Phase two: the prime
/// stride revisits 4 of them and adds 8 new lines. Phase three: two new lines.
#[test]
fn block_sweep_set_mode_misses() {
    let s = block_sweep(BASE);
    let mut model = CacheModel::new(&CacheConfig::default()).unwrap();
    let per_phase: Vec<u64> = s
        .phases
        .iter()
        .map(|p| misses(&mut model, &p.trace))
        .collect();
    assert_eq!(per_phase, vec![16, 8, 2]);
}

// ══════════════════════════════════════════════════════════
// 4. Sequential loop
// ══════════════════════════════════════════════════════════

#[test]
fn sequential_loop_shape() {
    let s = sequential_loop(BASE, 64, 2);
    assert_eq!(s.phases[0].trace.len(), 64);
    // Per round: 2 * 64 forward, 3 * 4 strided, 2 * 64 backward.
    assert_eq!(s.phases[1].trace.len(), 2 * (128 + 12 + 128));
}

/// Data and result arrays span 32 lines, 2 per set; everything fits, so only
/// the first touch of each line misses.
#[test]
fn sequential_loop_fits_in_default_cache() {
    let s = sequential_loop(BASE, 64, 3);
    let mut model = CacheModel::new(&CacheConfig::default()).unwrap();
    assert_eq!(misses(&mut model, &s.phases[0].trace), 16);
    assert_eq!(misses(&mut model, &s.phases[1].trace), 16);
    assert_eq!(model.stats().set_evictions, 0);
}

#[test]
fn zero_iterations_leaves_loop_empty() {
    let s = sequential_loop(BASE, 16, 0);
    assert!(s.phases[1].trace.is_empty());
}
