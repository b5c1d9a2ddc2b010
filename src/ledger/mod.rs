/*!
 * Execution Ledger
 * Per-processor, append-only record of which process ran at each tick
 */

mod record;

pub use record::{Occupant, ProcessorRecord};

use crate::core::errors::LedgerError;
use crate::core::types::{ProcessorId, Tick};

/// Execution history for every processor of one simulation run
///
/// Entries are immutable once written. There is exactly one writer (the
/// tick driver), and history queries stay stable while the window slides.
#[derive(Debug)]
pub struct ExecutionLedger {
    records: Vec<ProcessorRecord>,
}

impl ExecutionLedger {
    /// Create an empty ledger for processors `0..processors`
    pub fn new(processors: usize) -> Self {
        Self {
            records: (0..processors).map(ProcessorRecord::new).collect(),
        }
    }

    /// Record the occupant of `processor` during `tick`
    ///
    /// Must be called exactly once per (processor, tick) in increasing tick
    /// order; anything else is a driver bug and is rejected.
    pub fn record(
        &self,
        processor: ProcessorId,
        tick: Tick,
        occupant: Occupant,
    ) -> Result<(), LedgerError> {
        self.processor_record(processor)?.record(tick, occupant)
    }

    /// Occupant of `processor` during `tick`
    pub fn process_at(&self, processor: ProcessorId, tick: Tick) -> Result<Occupant, LedgerError> {
        self.processor_record(processor)?.process_at(tick)
    }

    /// History of a single processor
    pub fn processor_record(&self, processor: ProcessorId) -> Result<&ProcessorRecord, LedgerError> {
        self.records
            .get(processor)
            .ok_or(LedgerError::UnknownProcessor(processor))
    }

    /// Number of ticks recorded for `processor`
    pub fn recorded(&self, processor: ProcessorId) -> Result<Tick, LedgerError> {
        Ok(self.processor_record(processor)?.len())
    }

    pub fn processor_count(&self) -> usize {
        self.records.len()
    }
}
