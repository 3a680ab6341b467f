//! Address traces.
//!
//! A trace is the ordered list of memory accesses a test program issues. The
//! text format has one access per line:
//!
//! ```text
//! # comment
//! W 0x80000000      # type, then address
//! R 2147483712
//! 0x80000040        # bare address: a read
//! ```
//!
//! Addresses are hexadecimal with a `0x` prefix or decimal. The access type is
//! `R`/`W` (also `L`/`S`, `READ`/`WRITE`), case-insensitive.

use std::fmt;
use std::path::Path;

use crate::common::{AccessType, CacheError, Result};

/// A single access in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    /// Byte address accessed.
    pub address: u64,
    /// Read or write.
    pub kind: AccessType,
}

impl TraceEntry {
    /// A read of `address`.
    pub const fn read(address: u64) -> Self {
        Self {
            address,
            kind: AccessType::Read,
        }
    }

    /// A write of `address`.
    pub const fn write(address: u64) -> Self {
        Self {
            address,
            kind: AccessType::Write,
        }
    }
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:#x}", self.kind.mnemonic(), self.address)
    }
}

/// An ordered sequence of accesses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    /// Creates an empty trace.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// A trace that reads each address in order.
    pub fn reads(addrs: impl IntoIterator<Item = u64>) -> Self {
        addrs.into_iter().map(TraceEntry::read).collect()
    }

    /// Appends one access.
    pub fn push(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    /// Appends a read of `address`.
    pub fn read(&mut self, address: u64) {
        self.push(TraceEntry::read(address));
    }

    /// Appends a write of `address`.
    pub fn write(&mut self, address: u64) {
        self.push(TraceEntry::write(address));
    }

    /// Appends every access of `other`.
    pub fn extend_from(&mut self, other: &Self) {
        self.entries.extend_from_slice(&other.entries);
    }

    /// Number of accesses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the trace has no accesses.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The accesses in order.
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Iterates over the accesses in order.
    pub fn iter(&self) -> std::slice::Iter<'_, TraceEntry> {
        self.entries.iter()
    }

    /// Parses the text trace format.
    ///
    /// # Errors
    ///
    /// [`CacheError::Trace`] with the one-based line number of the first
    /// malformed line.
    pub fn parse(text: &str) -> Result<Self> {
        let mut trace = Self::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let err = |message: String| CacheError::Trace {
                line: idx + 1,
                message,
            };

            let fields: Vec<&str> = line.split_whitespace().collect();
            let (kind, addr) = match fields.as_slice() {
                [addr] => (AccessType::Read, *addr),
                [kind, addr] => (kind.parse().map_err(err)?, *addr),
                _ => {
                    return Err(err(format!(
                        "expected `[R|W] <address>`, found {} fields",
                        fields.len()
                    )));
                }
            };
            let address = parse_address(addr).map_err(err)?;
            trace.push(TraceEntry { address, kind });
        }
        Ok(trace)
    }

    /// Reads and parses a trace file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }
}

fn parse_address(s: &str) -> std::result::Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("bad address `{s}`: {e}"))
}

impl fmt::Display for Trace {
    /// Writes the trace in the format accepted by [`Trace::parse`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl FromIterator<TraceEntry> for Trace {
    fn from_iter<I: IntoIterator<Item = TraceEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TraceEntry;
    type IntoIter = std::slice::Iter<'a, TraceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
