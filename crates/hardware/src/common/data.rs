//! Memory Access Types.
//!
//! This module defines the classification of memory accesses carried by traces.
//! The type is recorded for statistics only: reads and writes look up and install
//! the same line state, since no dirty-bit tracking is modelled.

use std::fmt;
use std::str::FromStr;

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Data read access (load).
    #[default]
    Read,

    /// Data write access (store).
    Write,
}

impl AccessType {
    /// Single-letter mnemonic used in trace files.
    pub const fn mnemonic(self) -> char {
        match self {
            Self::Read => 'R',
            Self::Write => 'W',
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

impl FromStr for AccessType {
    type Err = String;

    /// Accepts `R`/`W`, `L`/`S` (load/store), or the full words, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "R" | "L" | "READ" | "LOAD" => Ok(Self::Read),
            "W" | "S" | "WRITE" | "STORE" => Ok(Self::Write),
            other => Err(format!("unknown access type `{other}`")),
        }
    }
}
