/*!
 * Processor Record
 * Append-only occupancy history of a single processor
 */

use crate::core::errors::LedgerError;
use crate::core::types::{ProcessorId, Tick};
use crate::process::Process;
use log::trace;
use parking_lot::RwLock;
use std::sync::Arc;

/// Per-tick occupant, `None` when the processor idled
pub type Occupant = Option<Arc<Process>>;

/// Occupancy history of one processor, indexed by tick
///
/// The write lock is held only for the push, so readers of already
/// recorded ticks never observe a half-written entry.
#[derive(Debug)]
pub struct ProcessorRecord {
    processor: ProcessorId,
    entries: RwLock<Vec<Occupant>>,
}

impl ProcessorRecord {
    pub fn new(processor: ProcessorId) -> Self {
        Self {
            processor,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn processor(&self) -> ProcessorId {
        self.processor
    }

    /// Append the occupant for `tick`, which must be the next unrecorded tick
    pub fn record(&self, tick: Tick, occupant: Occupant) -> Result<(), LedgerError> {
        let mut entries = self.entries.write();
        let expected = entries.len() as Tick;

        if tick < expected {
            return Err(LedgerError::DuplicateRecord {
                processor: self.processor,
                tick,
            });
        }
        if tick > expected {
            return Err(LedgerError::OutOfOrder {
                processor: self.processor,
                expected,
                tick,
            });
        }

        trace!(
            "Processor {} tick {}: {:?}",
            self.processor,
            tick,
            occupant.as_ref().map(|p| p.pid())
        );
        entries.push(occupant);
        Ok(())
    }

    /// Occupant recorded at `tick`
    pub fn process_at(&self, tick: Tick) -> Result<Occupant, LedgerError> {
        let entries = self.entries.read();
        entries
            .get(tick as usize)
            .cloned()
            .ok_or(LedgerError::OutOfRange {
                processor: self.processor,
                tick,
                recorded: entries.len() as Tick,
            })
    }

    /// Occupants for the inclusive range `[lo, hi]` under one read lock
    ///
    /// Empty when `lo > hi`.
    pub fn range(&self, lo: Tick, hi: Tick) -> Result<Vec<Occupant>, LedgerError> {
        let entries = self.entries.read();
        let recorded = entries.len() as Tick;
        if hi >= recorded {
            return Err(LedgerError::OutOfRange {
                processor: self.processor,
                tick: hi,
                recorded,
            });
        }
        if lo > hi {
            return Ok(Vec::new());
        }
        Ok(entries[lo as usize..=hi as usize].to_vec())
    }

    /// Number of recorded ticks
    pub fn len(&self) -> Tick {
        self.entries.read().len() as Tick
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
