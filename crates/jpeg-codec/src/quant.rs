//! Quantization tables and the zig-zag coefficient ordering.

use crate::errors::DecodeErrors;
use crate::memory::MemoryBudget;

/// Maps a zig-zag scan position `k` to its natural (row-major) position.
///
/// DQT/encoder tables are transmitted in zig-zag order; this table puts a
/// coefficient read in scan order back into natural order (used while
/// parsing DQT and while walking Huffman-decoded AC runs).
#[rustfmt::skip]
pub const ZIGZAG: [usize; 64] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// One of the four quantization table destination slots, resolved to its
/// 64 natural-order divisors/multipliers.
#[derive(Copy, Clone, Debug)]
pub struct QuantTable {
    /// Entries in natural (row-major) order, widened to `i32` regardless
    /// of the wire precision (8- or 16-bit).
    pub values: [i32; 64],
}

impl QuantTable {
    #[must_use]
    pub const fn zero() -> Self {
        QuantTable { values: [0; 64] }
    }

    /// Populate from 64 values given in zig-zag (wire) order, as DQT
    /// transmits them, converting to natural order via [`ZIGZAG`].
    pub fn from_zigzag_order(entries: &[u16; 64]) -> Self {
        let mut values = [0i32; 64];
        for (scan_pos, &entry) in entries.iter().enumerate() {
            values[ZIGZAG[scan_pos]] = i32::from(entry);
        }
        QuantTable { values }
    }

    pub fn request_memory(budget: &mut MemoryBudget) -> Result<(), DecodeErrors> {
        budget.request((64 * core::mem::size_of::<i32>()) as u64)
    }
}

impl Default for QuantTable {
    fn default() -> Self {
        Self::zero()
    }
}
