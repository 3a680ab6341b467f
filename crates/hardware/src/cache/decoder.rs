//! Address decomposition.
//!
//! Splits a byte address into the fields the cache structures index by:
//!
//! ```text
//! line_offset = addr % line_bytes
//! set_index   = (addr / line_bytes) % sets
//! tag         = addr / (line_bytes * sets)
//! line        = addr / line_bytes          (tag and set index together)
//! ```
//!
//! Division and remainder are used rather than shifts so that line sizes need
//! not be powers of two. The set index is in range for every `u64` address.

use super::geometry::CacheGeometry;

/// The fields of one decomposed address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecodedAddr {
    /// Line address: the key used by the fully-associative table.
    pub line: u64,
    /// Set the line maps to. Always `< geometry.sets()`.
    pub set_index: usize,
    /// Tag stored in the set.
    pub tag: u64,
    /// Byte offset within the line.
    pub offset: u64,
}

/// Decomposes `addr` for `geometry`.
///
/// Two addresses with equal `tag` and `set_index` alias the same line, so
/// repeated accesses at different offsets within a line behave identically.
///
/// ```
/// use hybridsim_core::cache::{decompose, CacheGeometry};
/// use hybridsim_core::config::CacheConfig;
///
/// let geometry = CacheGeometry::new(&CacheConfig::default())?;
/// // 16-byte lines, 16 sets.
/// let d = decompose(0x1234, &geometry);
/// assert_eq!(d.offset, 0x4);
/// assert_eq!(d.set_index, 0x3);
/// assert_eq!(d.tag, 0x12);
/// assert_eq!(d.line, 0x123);
/// # Ok::<(), hybridsim_core::common::CacheError>(())
/// ```
#[inline]
pub const fn decompose(addr: u64, geometry: &CacheGeometry) -> DecodedAddr {
    let line_bytes = geometry.line_bytes();
    let sets = geometry.sets() as u64;
    let line = addr / line_bytes;
    DecodedAddr {
        line,
        set_index: (line % sets) as usize,
        tag: line / sets,
        offset: addr % line_bytes,
    }
}
