//! Trace Harness Tests.
//!
//! Replay, counter comparison, and phase-by-phase scenario runs.

use hybridsim_core::CacheModel;
use hybridsim_core::config::{CacheConfig, CacheMode, Preset};
use hybridsim_core::sim::harness::{comparison_json, render_comparison};
use hybridsim_core::sim::scenarios::fa_overflow;
use hybridsim_core::sim::{ObservedCounters, PresetReport, ReplayReport, Trace, TraceHarness};
use hybridsim_core::sim::{Verdict, compare_presets};
use pretty_assertions::assert_eq;

use crate::common::{default_config, small_config};

fn harness(config: &CacheConfig) -> TraceHarness {
    TraceHarness::new(CacheModel::new(config).unwrap())
}

#[test]
fn replay_reports_deltas() {
    let mut h = harness(&CacheConfig::default());
    let trace = Trace::reads([0x0, 0x0, 0x10]);

    let report = h.replay(&trace).unwrap();
    assert_eq!(
        report,
        ReplayReport {
            accesses: 3,
            hits: 1,
            misses: 2,
            set_hits: 1,
            fa_hits: 0,
            overflow_hits: 0,
            evictions: 0,
        }
    );

    // A second replay reports only its own contribution.
    let again = h.replay(&trace).unwrap();
    assert_eq!((again.accesses, again.hits, again.misses), (3, 3, 0));
    assert_eq!(h.model().stats().accesses, 6);
}

#[test]
fn replay_counts_evictions_from_both_structures() {
    let mut h = harness(&small_config(1, 1, 1, CacheMode::Hybrid));
    let report = h.replay(&Trace::reads([0x00, 0x10, 0x20])).unwrap();
    assert_eq!(report.evictions, 3);
}

#[test]
fn replay_records_access_types() {
    let mut h = harness(&CacheConfig::default());
    let trace = Trace::parse("W 0x40\nR 0x40\nW 0x40").unwrap();
    let _ = h.replay(&trace).unwrap();
    let stats = h.model().stats();
    assert_eq!((stats.reads, stats.writes), (1, 2));
}

#[test]
fn check_passes_on_matching_misses() {
    let mut h = harness(&CacheConfig::default());
    let trace = Trace::reads((0..16).map(|i| 0x8000_0000 + i * 16));
    let verdict = h.check(&trace, ObservedCounters::misses(16)).unwrap();
    assert!(verdict.passed());
    assert_eq!(verdict.to_string(), "PASS");
}

#[test]
fn check_reports_miss_mismatch() {
    let mut h = harness(&CacheConfig::default());
    let verdict = h
        .check(&Trace::reads([0x0, 0x0]), ObservedCounters::misses(2))
        .unwrap();
    assert_eq!(
        verdict,
        Verdict::Mismatch {
            counter: "misses",
            predicted: 1,
            observed: 2,
        }
    );
    assert_eq!(
        verdict.to_string(),
        "MISMATCH misses: predicted 1, observed 2"
    );
}

#[test]
fn check_compares_accesses_when_observed() {
    let report = ReplayReport {
        accesses: 4,
        misses: 1,
        ..ReplayReport::default()
    };
    let ok = ObservedCounters {
        misses: 1,
        accesses: Some(4),
    };
    let off = ObservedCounters {
        misses: 1,
        accesses: Some(5),
    };
    assert!(Verdict::compare(&report, &ok).passed());
    assert!(matches!(
        Verdict::compare(&report, &off),
        Verdict::Mismatch {
            counter: "accesses",
            predicted: 4,
            observed: 5
        }
    ));
}

/// Counters are zeroed between phases; cache contents carry over.
#[test]
fn run_phases_keeps_contents_between_phases() {
    let mut h = harness(&default_config(CacheMode::FullyAssociative));
    let reports = h.run_phases(&fa_overflow(0x8000_0000, 16)).unwrap();

    let summary: Vec<(&str, u64)> = reports
        .iter()
        .map(|r| (r.name, r.report.misses))
        .collect();
    assert_eq!(summary, vec![("fill", 8), ("overflow", 16)]);
    assert_eq!(h.model().stats().accesses, 16, "only the last phase is counted");
}

#[test]
fn run_phases_in_set_mode() {
    let mut h = harness(&CacheConfig::default());
    let reports = h.run_phases(&fa_overflow(0x8000_0000, 16)).unwrap();
    let misses: Vec<u64> = reports.iter().map(|r| r.report.misses).collect();
    assert_eq!(misses, vec![8, 8]);
}

/// An explicit model reset separates independent scenarios.
#[test]
fn model_reset_between_scenarios() {
    let mut h = harness(&CacheConfig::default());
    let trace = Trace::reads([0x100, 0x200]);
    let first = h.replay(&trace).unwrap();
    h.model_mut().reset();
    let second = h.replay(&trace).unwrap();
    assert_eq!(first, second);

    let model = h.into_model();
    assert_eq!(model.stats().misses, 2);
}

#[test]
fn report_hit_ratio() {
    let report = ReplayReport {
        accesses: 8,
        hits: 2,
        ..ReplayReport::default()
    };
    assert!((report.hit_ratio() - 25.0).abs() < 1e-9);
    assert!(ReplayReport::default().hit_ratio().abs() < f64::EPSILON);
}

// ══════════════════════════════════════════════════════════
// Preset comparison
// ══════════════════════════════════════════════════════════

/// Nine tags in set 0 followed by the first tag again.
fn set_conflict_trace() -> Trace {
    Trace::reads((0..=8).chain([0]).map(|tag| tag * 16 * 16))
}

fn column<F: Fn(&PresetReport) -> u64>(rows: &[PresetReport], f: F) -> Vec<u64> {
    rows.iter().map(f).collect()
}

#[test]
fn compare_presets_covers_every_preset_in_order() {
    let rows = compare_presets(&CacheConfig::default(), &Trace::reads([0x0])).unwrap();
    let presets: Vec<Preset> = rows.iter().map(|r| r.preset).collect();
    assert_eq!(presets, Preset::ALL.to_vec());
}

/// Consecutive lines spread over all sets; only the 8-entry table thrashes.
#[test]
fn compare_presets_fa_overflow_misses() {
    let trace = fa_overflow(0x8000_0000, 16).flatten();
    let rows = compare_presets(&CacheConfig::default(), &trace).unwrap();

    assert_eq!(column(&rows, |r| r.report.misses), vec![16, 16, 16, 24]);
    assert_eq!(column(&rows, |r| r.report.set_hits), vec![8, 8, 8, 0]);
    assert_eq!(column(&rows, |r| r.report.fa_hits), vec![0, 0, 0, 0]);
    assert!(rows.iter().all(|r| r.report.accesses == 24));
}

/// Only the hybrid preset recovers the line evicted from set 0.
#[test]
fn compare_presets_set_conflict_misses() {
    let config = CacheConfig {
        count_overflow_hits_as_hits: true,
        ..CacheConfig::default()
    };
    let rows = compare_presets(&config, &set_conflict_trace()).unwrap();

    assert_eq!(column(&rows, |r| r.report.misses), vec![10, 9, 10, 10]);
    assert_eq!(column(&rows, |r| r.report.hits), vec![0, 1, 0, 0]);
    assert_eq!(column(&rows, |r| r.report.fa_hits), vec![0, 1, 0, 0]);
    assert_eq!(column(&rows, |r| r.report.set_hits), vec![0, 0, 0, 0]);
}

/// The base configuration is copied, never altered.
#[test]
fn compare_presets_leaves_base_config() {
    let config = default_config(CacheMode::FullyAssociative);
    let _ = compare_presets(&config, &set_conflict_trace()).unwrap();
    assert_eq!(config.mode, CacheMode::FullyAssociative);
}

#[test]
fn render_comparison_lists_every_preset() {
    let trace = fa_overflow(0x8000_0000, 16).flatten();
    let rows = compare_presets(&CacheConfig::default(), &trace).unwrap();
    let text = render_comparison(&rows);

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("configuration"));
    assert!(lines[0].contains("fa_hits"));
    for (line, preset) in lines[1..].iter().zip(Preset::ALL) {
        assert!(line.starts_with(preset.name()), "{line}");
    }
    assert!(lines[4].contains("0.00%"));
    assert!(lines[1].contains("33.33%"));
}

#[test]
fn comparison_json_uses_preset_names() {
    let trace = fa_overflow(0x8000_0000, 16).flatten();
    let rows = compare_presets(&CacheConfig::default(), &trace).unwrap();
    let json = comparison_json(&rows).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1]["preset"], "WT_HYB");
    assert_eq!(rows[3]["preset"], "WT_HYB_FORCE_FULL_ASS");
    assert_eq!(rows[0]["report"]["misses"], 16);
    assert_eq!(rows[3]["report"]["misses"], 24);
    assert_eq!(rows[0]["report"]["set_hits"], 8);
}
