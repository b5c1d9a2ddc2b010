/*!
 * Timeline Window
 * Inclusive tick range viewed by the reconstructor
 */

use crate::core::errors::TimelineError;
use crate::core::types::Tick;
use serde::{Deserialize, Serialize};

/// Inclusive tick range `[lo, hi]`
///
/// Deserialization goes through `Window::new`, so `lo <= hi` holds for
/// every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct Window {
    lo: Tick,
    hi: Tick,
}

#[derive(Deserialize)]
struct RawWindow {
    lo: Tick,
    hi: Tick,
}

impl TryFrom<RawWindow> for Window {
    type Error = TimelineError;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Window::new(raw.lo, raw.hi)
    }
}

impl Window {
    pub fn new(lo: Tick, hi: Tick) -> Result<Self, TimelineError> {
        if lo > hi {
            return Err(TimelineError::InvalidWindow { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    /// Window of at most `size` ticks ending at the last recorded tick
    ///
    /// Only ticks below `elapsed` exist in the ledger, so the view is
    /// `[max(elapsed - size, 0), elapsed - 1]`. Returns `None` before the
    /// first tick, or for a zero-sized window.
    pub fn sliding(elapsed: Tick, size: Tick) -> Option<Self> {
        if elapsed == 0 || size == 0 {
            return None;
        }
        Some(Self {
            lo: elapsed.saturating_sub(size),
            hi: elapsed - 1,
        })
    }

    pub fn lo(&self) -> Tick {
        self.lo
    }

    pub fn hi(&self) -> Tick {
        self.hi
    }

    /// Number of ticks covered
    pub fn len(&self) -> Tick {
        self.hi - self.lo + 1
    }

    /// Absolute tick for a window-relative index
    pub fn tick_at(&self, index: Tick) -> Option<Tick> {
        (index < self.len()).then(|| self.lo + index)
    }

    pub fn contains(&self, tick: Tick) -> bool {
        (self.lo..=self.hi).contains(&tick)
    }
}
