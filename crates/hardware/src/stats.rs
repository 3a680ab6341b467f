//! Cache statistics collection and reporting.
//!
//! This module tracks the counters the model exposes in place of hardware
//! performance counters. It provides:
//! 1. **Accounting:** Accesses, hits, misses, and hybrid overflow hits.
//! 2. **Replacement activity:** Evictions from the sets and from the overflow table.
//! 3. **Access mix:** Read and write counts.
//! 4. **Set usage:** Per-set access counts, rendered as a text heatmap.
//!
//! Counters only ever increase; they are zeroed by explicit resets and nothing else.

use std::fmt::{self, Write as _};

use serde::Serialize;

use crate::common::Result;

/// Counter block for one cache model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Total `access` calls.
    pub accesses: u64,
    /// Accesses classified as hits.
    pub hits: u64,
    /// Accesses classified as misses. `hits + misses == accesses`.
    pub misses: u64,
    /// Lookups served by the set-associative store.
    pub set_hits: u64,
    /// Lookups served by the fully-associative table: every hit in
    /// fully-associative mode, and every overflow hit in hybrid mode.
    pub fa_hits: u64,
    /// Hybrid mode: set misses that were found in the overflow table.
    ///
    /// Counted separately; whether they also count towards `hits` or `misses`
    /// depends on the model configuration.
    pub overflow_hits: u64,
    /// Valid lines displaced from a full set.
    pub set_evictions: u64,
    /// Valid entries displaced from a full overflow table.
    pub overflow_evictions: u64,
    /// Read accesses.
    pub reads: u64,
    /// Write accesses.
    pub writes: u64,
    /// Accesses per set index.
    pub set_accesses: Vec<u64>,
}

/// Section names for selective stats output.
///
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "breakdown", "sets"];

impl CacheStats {
    /// Creates a zeroed counter block for a cache with `sets` sets.
    pub fn new(sets: usize) -> Self {
        Self {
            set_accesses: vec![0; sets],
            ..Self::default()
        }
    }

    /// Zeroes every counter, keeping the number of tracked sets.
    pub fn clear(&mut self) {
        *self = Self::new(self.set_accesses.len());
    }

    /// Hit ratio as a percentage of all accesses; 0 when nothing was accessed.
    pub fn hit_ratio(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64 * 100.0
        }
    }

    /// Miss ratio as a percentage of all accesses; 0 when nothing was accessed.
    pub fn miss_ratio(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.misses as f64 / self.accesses as f64 * 100.0
        }
    }

    /// Total evictions from both structures.
    pub const fn evictions(&self) -> u64 {
        self.set_evictions + self.overflow_evictions
    }

    /// Serializes the counters as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Renders the requested sections as text.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]; an empty
    /// slice renders everything.
    pub fn render_sections(&self, sections: &[String]) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_sections(&mut out, sections);
        out
    }

    fn write_sections(&self, out: &mut String, sections: &[String]) -> fmt::Result {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);

        writeln!(out, "==========================================================")?;
        writeln!(out, "CACHE MODEL STATISTICS")?;
        writeln!(out, "==========================================================")?;
        if want("summary") {
            writeln!(out, "cache.accesses           {}", self.accesses)?;
            writeln!(out, "cache.hits               {}", self.hits)?;
            writeln!(out, "cache.misses             {}", self.misses)?;
            writeln!(out, "cache.hit_ratio          {:.2}%", self.hit_ratio())?;
            writeln!(out, "cache.miss_ratio         {:.2}%", self.miss_ratio())?;
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("breakdown") {
            writeln!(out, "BREAKDOWN")?;
            writeln!(out, "  hits.set               {}", self.set_hits)?;
            writeln!(out, "  hits.fa                {}", self.fa_hits)?;
            writeln!(out, "  overflow.hits          {}", self.overflow_hits)?;
            writeln!(out, "  evictions.set          {}", self.set_evictions)?;
            writeln!(out, "  evictions.overflow     {}", self.overflow_evictions)?;
            writeln!(out, "  op.read                {}", self.reads)?;
            writeln!(out, "  op.write               {}", self.writes)?;
            writeln!(out, "----------------------------------------------------------")?;
        }
        if want("sets") {
            const BAR: usize = 40;
            let max = self.set_accesses.iter().copied().max().unwrap_or(0).max(1);
            writeln!(out, "SET USAGE")?;
            for (set, &count) in self.set_accesses.iter().enumerate() {
                let width = (count as f64 / max as f64 * BAR as f64).round() as usize;
                writeln!(out, "  set {set:>3}  {count:>8}  {}", "#".repeat(width))?;
            }
            writeln!(out, "----------------------------------------------------------")?;
        }
        Ok(())
    }

    /// Prints only the requested statistics sections to stdout.
    pub fn print_sections(&self, sections: &[String]) {
        print!("{}", self.render_sections(sections));
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
