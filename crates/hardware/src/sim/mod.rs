//! Trace-driven simulation.
//!
//! Produces address traces (from files or from the verification program
//! patterns) and replays them against a cache model.

/// Trace replay and comparison with observed counters.
pub mod harness;
/// Traces reproducing the verification programs' access patterns.
pub mod scenarios;
/// Trace representation and text format.
pub mod trace;

pub use harness::{
    ObservedCounters, PhaseReport, PresetReport, ReplayReport, TraceHarness, Verdict,
    compare_presets,
};
pub use scenarios::{Phase, Scenario};
pub use trace::{Trace, TraceEntry};
