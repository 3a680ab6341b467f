//! Scenario traces.
//!
//! Deterministic traces reproducing the access patterns of the cache
//! verification programs. Each scenario is split into phases at the points
//! where the program clears its miss counter, so a harness can compare every
//! phase against its own counter reading.
//!
//! Element sizes follow the programs: `int`/`uint32_t` arrays, four bytes per
//! element.

use super::trace::{Trace, TraceEntry};

/// Bytes per array element in the verification programs.
pub const WORD_BYTES: u64 = 4;

/// Number of distinct lines the overflow-subset scenario first installs.
pub const FA_SUBSET_LINES: u64 = 8;

/// One counter window of a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    /// Short name used in reports.
    pub name: &'static str,
    /// Accesses issued during this phase.
    pub trace: Trace,
}

/// A named sequence of phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Scenario name.
    pub name: &'static str,
    /// Phases in program order.
    pub phases: Vec<Phase>,
}

impl Scenario {
    /// All phases concatenated into one trace.
    pub fn flatten(&self) -> Trace {
        let mut all = Trace::new();
        for phase in &self.phases {
            all.extend_from(&phase.trace);
        }
        all
    }
}

/// Distance between the lines the overflow-subset program touches: 16 words.
pub const SET_STRIDE_BYTES: u64 = 16 * WORD_BYTES;

/// The overflow-subset program over a `uint32_t[256]` array at `base`.
///
/// Phase `fill` writes [`FA_SUBSET_LINES`] elements [`SET_STRIDE_BYTES`] apart.
/// Phase `overflow` increments twice as many elements at the same stride in
/// ascending order, a read then a write each. The original lines are revisited
/// first and still resident, so with an 8-entry table the second phase misses
/// exactly 8 times; the program's own check expects more than 8.
pub fn fa_subset(base: u64) -> Scenario {
    let elem = |i: u64| base + i * SET_STRIDE_BYTES;

    let fill: Trace = (0..FA_SUBSET_LINES)
        .map(|i| TraceEntry::write(elem(i)))
        .collect();

    let mut overflow = Trace::new();
    for i in 0..2 * FA_SUBSET_LINES {
        overflow.read(elem(i));
        overflow.write(elem(i));
    }

    Scenario {
        name: "fa-subset",
        phases: vec![
            Phase {
                name: "fill",
                trace: fill,
            },
            Phase {
                name: "overflow",
                trace: overflow,
            },
        ],
    }
}

/// Reordered overflow test that forces more misses than the table holds.
///
/// Phase `fill` writes [`FA_SUBSET_LINES`] consecutive lines. Phase `overflow`
/// writes as many new lines first and then the original ones again. With an
/// 8-entry table the new lines push every original line out before it is
/// revisited, so the second phase misses on all 16 lines.
pub fn fa_overflow(base: u64, line_bytes: u64) -> Scenario {
    let line = |i: u64| base + i * line_bytes;

    let fill: Trace = (0..FA_SUBSET_LINES)
        .map(|i| TraceEntry::write(line(i)))
        .collect();

    let mut overflow = Trace::new();
    for i in (FA_SUBSET_LINES..2 * FA_SUBSET_LINES).chain(0..FA_SUBSET_LINES) {
        overflow.write(line(i));
    }

    Scenario {
        name: "fa-overflow",
        phases: vec![
            Phase {
                name: "fill",
                trace: fill,
            },
            Phase {
                name: "overflow",
                trace: overflow,
            },
        ],
    }
}

/// One read per set: `sets` consecutive lines starting at `base`.
///
/// Consecutive lines map to consecutive sets, so every set receives exactly
/// one line and nothing is evicted.
pub fn set_sweep(base: u64, line_bytes: u64, sets: usize) -> Scenario {
    let trace = Trace::reads((0..sets as u64).map(|i| base + i * line_bytes));
    Scenario {
        name: "set-sweep",
        phases: vec![Phase {
            name: "sweep",
            trace,
        }],
    }
}

/// The three sweeps of the cache block sweep program over a 256-element
/// `int` array at `base`.
///
/// 1. Write then read every 16th element, 64 bytes apart.
/// 2. Write then read 12 elements at a prime stride of 17, overflowing an
///    8-entry table.
/// 3. Interleave low (`i`) and high (`i + 128`) elements for `i < 8`.
pub fn block_sweep(base: u64) -> Scenario {
    let elem = |i: u64| base + i * WORD_BYTES;

    let mut sets = Trace::new();
    for i in 0..16 {
        sets.write(elem(i * 16));
        sets.read(elem(i * 16));
    }

    let mut stride = Trace::new();
    for i in 0..12 {
        let idx = (i * 17) % 256;
        stride.write(elem(idx));
        stride.read(elem(idx));
    }

    let mut mixed = Trace::new();
    for i in 0..8 {
        mixed.write(elem(i));
        mixed.write(elem(i + 128));
        mixed.read(elem(i));
        mixed.read(elem(i + 128));
    }

    Scenario {
        name: "block-sweep",
        phases: vec![
            Phase {
                name: "all-sets",
                trace: sets,
            },
            Phase {
                name: "prime-stride",
                trace: stride,
            },
            Phase {
                name: "mixed",
                trace: mixed,
            },
        ],
    }
}

/// The array loop test program: a `len`-element data array at `base` followed by a
/// result array of the same length.
///
/// Phase `init` writes the data array. Phase `loop` runs `iterations` rounds of
/// a forward copy, a 16-element strided update reading 64 elements ahead, and
/// a backward copy.
pub fn sequential_loop(base: u64, len: u64, iterations: u64) -> Scenario {
    let data = |i: u64| base + i * WORD_BYTES;
    let result = |i: u64| base + (len + i) * WORD_BYTES;

    let mut init = Trace::new();
    for i in 0..len {
        init.write(data(i));
    }

    let mut rounds = Trace::new();
    for _ in 0..iterations {
        for i in 0..len {
            rounds.read(data(i));
            rounds.write(result(i));
        }
        for i in (0..len).step_by(16) {
            rounds.read(result(i));
            rounds.read(data((i + 64) % len));
            rounds.write(result(i));
        }
        for i in (0..len).rev() {
            rounds.read(result(i));
            rounds.write(data(i));
        }
    }

    Scenario {
        name: "sequential-loop",
        phases: vec![
            Phase {
                name: "init",
                trace: init,
            },
            Phase {
                name: "loop",
                trace: rounds,
            },
        ],
    }
}
