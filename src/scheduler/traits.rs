/*!
 * Scheduler Traits
 * Interface the placement policy implements
 */

use super::types::Placement;
use crate::core::types::Tick;
use crate::process::Process;
use crate::processor::Processor;
use std::sync::Arc;

/// Decides which eligible process runs on which processor each tick
///
/// Called once per tick by the driver. `processors` still report the
/// occupant of the previous tick through `Processor::current`. Any subset of
/// `eligible` may be placed; each process and each processor at most once.
pub trait PlacementPolicy: Send {
    fn place(
        &mut self,
        eligible: &[Arc<Process>],
        processors: &[Arc<Processor>],
        tick: Tick,
    ) -> Placement;
}

// Closures make ad-hoc and scripted policies trivial
impl<F> PlacementPolicy for F
where
    F: FnMut(&[Arc<Process>], &[Arc<Processor>], Tick) -> Placement + Send,
{
    fn place(
        &mut self,
        eligible: &[Arc<Process>],
        processors: &[Arc<Processor>],
        tick: Tick,
    ) -> Placement {
        self(eligible, processors, tick)
    }
}
