/*!
 * Processor Module
 * Simulated execution units tagged with a core class
 */

mod types;

pub use types::Core;

use crate::config::CoreProfile;
use crate::core::types::{Pid, ProcessorId, Tick, Work};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy)]
struct ProcessorState {
    current: Option<Pid>,
    active_ticks: Tick,
    startups: u64,
    power_consumed: f64,
}

/// Serializable processor snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessorStats {
    pub id: ProcessorId,
    pub core: Core,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub current: Option<Pid>,
    pub active_ticks: Tick,
    pub startups: u64,
    pub power_consumed: f64,
}

/// Simulated processor
///
/// The activity state describes the current tick only; history lives in
/// the execution ledger.
pub struct Processor {
    id: ProcessorId,
    core: Core,
    profile: CoreProfile,
    state: RwLock<ProcessorState>,
}

impl Processor {
    pub fn new(id: ProcessorId, core: Core, profile: CoreProfile) -> Self {
        Self {
            id,
            core,
            profile,
            state: RwLock::new(ProcessorState::default()),
        }
    }

    pub fn id(&self) -> ProcessorId {
        self.id
    }

    pub fn core(&self) -> Core {
        self.core
    }

    /// Work applied per tick on this processor
    pub fn throughput(&self) -> Work {
        self.profile.throughput
    }

    /// Bound to a running process in the current tick
    pub fn is_active(&self) -> bool {
        self.state.read().current.is_some()
    }

    /// Process bound to this processor in the current tick
    pub fn current(&self) -> Option<Pid> {
        self.state.read().current
    }

    /// Total power consumed so far (watts summed over ticks)
    pub fn power_consumed(&self) -> f64 {
        self.state.read().power_consumed
    }

    pub fn stats(&self) -> ProcessorStats {
        let state = *self.state.read();
        ProcessorStats {
            id: self.id,
            core: self.core,
            current: state.current,
            active_ticks: state.active_ticks,
            startups: state.startups,
            power_consumed: state.power_consumed,
        }
    }

    /// Bind (or unbind) this processor for the current tick
    pub(crate) fn occupy(&self, occupant: Option<Pid>) {
        let mut state = self.state.write();
        if occupant.is_some() {
            if state.current.is_none() {
                state.startups += 1;
                state.power_consumed += self.profile.startup_power;
            }
            state.active_ticks += 1;
            state.power_consumed += self.profile.active_power;
        }
        state.current = occupant;
    }

    /// Return to idle without accounting a tick
    pub(crate) fn release(&self) {
        self.state.write().current = None;
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("id", &self.id)
            .field("core", &self.core)
            .field("current", &self.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_names() {
        assert_eq!(Core::Performance.name(), "P-Core");
        assert_eq!(Core::Efficiency.to_string(), "E-Core");
    }

    #[test]
    fn test_activity_tracks_current_tick() {
        let processor = Processor::new(0, Core::Efficiency, CoreProfile::EFFICIENCY);
        assert!(!processor.is_active());

        processor.occupy(Some(3));
        assert!(processor.is_active());
        assert_eq!(processor.current(), Some(3));

        processor.occupy(None);
        assert!(!processor.is_active());
    }

    #[test]
    fn test_power_charges_startup_once_per_activation() {
        let processor = Processor::new(1, Core::Performance, CoreProfile::PERFORMANCE);

        processor.occupy(Some(0));
        processor.occupy(Some(1));
        processor.occupy(None);
        processor.occupy(Some(0));

        let stats = processor.stats();
        assert_eq!(stats.active_ticks, 3);
        assert_eq!(stats.startups, 2);
        assert!((stats.power_consumed - (3.0 * 3.0 + 0.5 * 2.0)).abs() < 1e-9);
    }
}
