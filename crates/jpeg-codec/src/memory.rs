//! A running allocation counter checked against a hard ceiling.
//!
//! This lineage's own decoders instead fix a static `max_width`/
//! `max_height` ceiling (see an earlier snapshot's
//! `ZuneJpegOptions::get_max_width`/`get_max_height`) and never track
//! cumulative bytes. `MemoryBudget` generalizes that same
//! limit-and-reject idiom into a counter that accumulates across every
//! allocation made during one decode, so a file with many small,
//! individually-reasonable allocations can still be rejected before it
//! exhausts memory.
use log::{debug, warn};

use crate::errors::DecodeErrors;

/// Tracks cumulative bytes requested during a single decode (or encode)
/// call against a fixed ceiling.
pub struct MemoryBudget {
    used: u64,
    ceiling: u64,
}

impl MemoryBudget {
    /// Construct a budget with the given ceiling, already reset to zero
    /// usage.
    #[must_use]
    pub fn new(ceiling_bytes: u64) -> Self {
        MemoryBudget {
            used: 0,
            ceiling: ceiling_bytes,
        }
    }

    /// Reset the counter to zero and install a new ceiling. Called at the
    /// start of every top-level `decode`/`encode`, so a shared budget
    /// never carries balance across calls.
    pub fn reset(&mut self, ceiling_bytes: u64) {
        debug!("resetting memory budget to {ceiling_bytes} bytes");
        self.used = 0;
        self.ceiling = ceiling_bytes;
    }

    #[must_use]
    pub const fn used(&self) -> u64 {
        self.used
    }

    #[must_use]
    pub const fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Request `delta_bytes` more of the budget. On success, the counter
    /// increases by `delta_bytes`; the counter never moves on failure.
    pub fn request(&mut self, delta_bytes: u64) -> Result<(), DecodeErrors> {
        let projected = self.used.saturating_add(delta_bytes);
        if projected > self.ceiling {
            let excess_mb = (projected - self.ceiling) as f64 / (1024.0 * 1024.0);
            warn!(
                "memory budget exceeded: requested {delta_bytes} bytes, {projected} would be in \
                 use against a ceiling of {}",
                self.ceiling
            );
            return Err(DecodeErrors::MemoryLimitExceeded { excess_mb });
        }
        self.used = projected;
        Ok(())
    }
}
