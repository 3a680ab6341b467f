//! Trace replay and counter comparison.
//!
//! The harness owns one [`CacheModel`], replays traces through it, and compares
//! the predicted counter deltas against values read from hardware performance
//! counters. The comparison is a plain equality check per counter.
//!
//! [`compare_presets`] replays one trace under every regression preset, the
//! way the regression matrix runs each test program once per configuration.

use std::fmt::{self, Write as _};

use serde::Serialize;
use tracing::{debug, info};

use super::scenarios::Scenario;
use super::trace::Trace;
use crate::cache::CacheModel;
use crate::common::Result;
use crate::config::{CacheConfig, Preset};
use crate::stats::CacheStats;

/// Counter deltas produced by replaying one trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Accesses replayed.
    pub accesses: u64,
    /// Accesses classified as hits.
    pub hits: u64,
    /// Accesses classified as misses.
    pub misses: u64,
    /// Lookups served by the set-associative store.
    pub set_hits: u64,
    /// Lookups served by the fully-associative table.
    pub fa_hits: u64,
    /// Hybrid-mode overflow hits.
    pub overflow_hits: u64,
    /// Evictions from sets and overflow table together.
    pub evictions: u64,
}

impl ReplayReport {
    /// Difference between two counter snapshots of the same model.
    pub const fn delta(before: &CacheStats, after: &CacheStats) -> Self {
        Self {
            accesses: after.accesses - before.accesses,
            hits: after.hits - before.hits,
            misses: after.misses - before.misses,
            set_hits: after.set_hits - before.set_hits,
            fa_hits: after.fa_hits - before.fa_hits,
            overflow_hits: after.overflow_hits - before.overflow_hits,
            evictions: after.evictions() - before.evictions(),
        }
    }

    /// Hit ratio as a percentage; 0 for an empty replay.
    pub fn hit_ratio(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64 * 100.0
        }
    }
}

/// Values read from the hardware counters over the same trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservedCounters {
    /// Miss counter delta.
    pub misses: u64,
    /// Total-access counter delta, when the platform exposes one.
    pub accesses: Option<u64>,
}

impl ObservedCounters {
    /// Observation of the miss counter only.
    pub const fn misses(misses: u64) -> Self {
        Self {
            misses,
            accesses: None,
        }
    }
}

/// Result of comparing a prediction with an observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Every observed counter equals the prediction.
    Pass,
    /// A counter differs.
    Mismatch {
        /// Which counter differs (`"misses"` or `"accesses"`).
        counter: &'static str,
        /// Model prediction.
        predicted: u64,
        /// Hardware observation.
        observed: u64,
    },
}

impl Verdict {
    /// Returns `true` for [`Verdict::Pass`].
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Compares a replay report against observed counters.
    pub const fn compare(report: &ReplayReport, observed: &ObservedCounters) -> Self {
        if report.misses != observed.misses {
            return Self::Mismatch {
                counter: "misses",
                predicted: report.misses,
                observed: observed.misses,
            };
        }
        if let Some(accesses) = observed.accesses {
            if accesses != report.accesses {
                return Self::Mismatch {
                    counter: "accesses",
                    predicted: report.accesses,
                    observed: accesses,
                };
            }
        }
        Self::Pass
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Mismatch {
                counter,
                predicted,
                observed,
            } => write!(
                f,
                "MISMATCH {counter}: predicted {predicted}, observed {observed}"
            ),
        }
    }
}

/// Per-phase result of a scenario run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    /// Phase name.
    pub name: &'static str,
    /// Counter values accumulated during the phase.
    pub report: ReplayReport,
}

/// Replays traces through one owned model.
#[derive(Debug)]
pub struct TraceHarness {
    model: CacheModel,
}

impl TraceHarness {
    /// Wraps `model`.
    pub const fn new(model: CacheModel) -> Self {
        Self { model }
    }

    /// The model, for inspection.
    pub const fn model(&self) -> &CacheModel {
        &self.model
    }

    /// The model, for explicit resets between scenarios.
    pub fn model_mut(&mut self) -> &mut CacheModel {
        &mut self.model
    }

    /// Releases the model.
    pub fn into_model(self) -> CacheModel {
        self.model
    }

    /// Replays `trace` in order and returns the counter deltas it caused.
    pub fn replay(&mut self, trace: &Trace) -> Result<ReplayReport> {
        let before = self.model.stats().clone();
        for entry in trace {
            let _ = self.model.access_typed(entry.address, entry.kind)?;
        }
        let report = ReplayReport::delta(&before, self.model.stats());
        debug!(
            accesses = report.accesses,
            misses = report.misses,
            "trace replayed"
        );
        Ok(report)
    }

    /// Replays `trace` and compares the result with `observed`.
    pub fn check(&mut self, trace: &Trace, observed: ObservedCounters) -> Result<Verdict> {
        let report = self.replay(trace)?;
        let verdict = Verdict::compare(&report, &observed);
        info!(%verdict, "counter comparison");
        Ok(verdict)
    }

    /// Runs every phase of `scenario`, zeroing the counters (not the cache)
    /// before each phase.
    pub fn run_phases(&mut self, scenario: &Scenario) -> Result<Vec<PhaseReport>> {
        let mut reports = Vec::with_capacity(scenario.phases.len());
        for phase in &scenario.phases {
            self.model.reset_counters();
            let report = self.replay(&phase.trace)?;
            debug!(
                scenario = scenario.name,
                phase = phase.name,
                misses = report.misses,
                "phase complete"
            );
            reports.push(PhaseReport {
                name: phase.name,
                report,
            });
        }
        Ok(reports)
    }
}

/// One configuration's result in a preset comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresetReport {
    /// Preset applied on top of the base configuration.
    pub preset: Preset,
    /// Counters produced by the replay.
    pub report: ReplayReport,
}

/// Replays `trace` on a fresh model for every entry of [`Preset::ALL`].
///
/// Each preset is applied to a copy of `cache`, so only the composition mode
/// differs between rows.
///
/// # Errors
///
/// [`CacheError::Configuration`](crate::common::CacheError::Configuration)
/// when `cache` describes a malformed geometry.
pub fn compare_presets(cache: &CacheConfig, trace: &Trace) -> Result<Vec<PresetReport>> {
    Preset::ALL
        .into_iter()
        .map(|preset| -> Result<PresetReport> {
            let mut config = cache.clone();
            preset.apply(&mut config);
            let mut harness = TraceHarness::new(CacheModel::new(&config)?);
            let report = harness.replay(trace)?;
            debug!(%preset, misses = report.misses, "preset replayed");
            Ok(PresetReport { preset, report })
        })
        .collect()
}

/// Renders a comparison as a text table, one row per preset.
pub fn render_comparison(rows: &[PresetReport]) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_comparison(&mut out, rows);
    out
}

fn write_comparison(out: &mut String, rows: &[PresetReport]) -> fmt::Result {
    writeln!(
        out,
        "{:<24} {:>9} {:>9} {:>9} {:>10} {:>9} {:>9}",
        "configuration", "accesses", "hits", "misses", "hit_ratio", "set_hits", "fa_hits"
    )?;
    for row in rows {
        let r = &row.report;
        writeln!(
            out,
            "{:<24} {:>9} {:>9} {:>9} {:>9.2}% {:>9} {:>9}",
            row.preset.name(),
            r.accesses,
            r.hits,
            r.misses,
            r.hit_ratio(),
            r.set_hits,
            r.fa_hits
        )?;
    }
    Ok(())
}

/// Serializes a comparison as pretty-printed JSON.
pub fn comparison_json(rows: &[PresetReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}
