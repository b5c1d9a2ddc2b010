/*!
 * Scheduler Types
 * Placements, run state, per-tick reports and run summaries
 */

use crate::core::types::{Pid, ProcessorId, Tick};
use crate::process::ProcessStats;
use crate::processor::ProcessorStats;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Partial mapping of eligible processes to processors for one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    assignments: Vec<(Pid, ProcessorId)>,
}

impl Placement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `pid` on `processor` this tick
    pub fn assign(&mut self, pid: Pid, processor: ProcessorId) -> &mut Self {
        self.assignments.push((pid, processor));
        self
    }

    /// Builder-style `assign`
    pub fn with(mut self, pid: Pid, processor: ProcessorId) -> Self {
        self.assignments.push((pid, processor));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Pid, ProcessorId)> + '_ {
        self.assignments.iter().copied()
    }

    pub fn processor_of(&self, pid: Pid) -> Option<ProcessorId> {
        self.iter().find(|(p, _)| *p == pid).map(|(_, cpu)| cpu)
    }

    pub fn is_assigned(&self, processor: ProcessorId) -> bool {
        self.iter().any(|(_, cpu)| cpu == processor)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl FromIterator<(Pid, ProcessorId)> for Placement {
    fn from_iter<I: IntoIterator<Item = (Pid, ProcessorId)>>(iter: I) -> Self {
        Self {
            assignments: iter.into_iter().collect(),
        }
    }
}

/// Lifecycle of a simulation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Constructed, start event not yet fired
    Pending,
    /// Start event fired, ticks advancing
    Running,
    /// Finish event fired, no more ticks
    Finished,
    /// Stopped by a contract violation
    Aborted,
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TickReport {
    pub tick: Tick,
    pub placed: Vec<(Pid, ProcessorId)>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub waiting: Vec<Pid>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub preempted: Vec<Pid>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub completed: Vec<Pid>,
    pub finished: bool,
}

/// End-of-run (or in-progress) metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunSummary {
    pub run_id: Uuid,
    pub elapsed: Tick,
    pub processes: Vec<ProcessStats>,
    pub processors: Vec<ProcessorStats>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub average_waiting_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub average_turnaround_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub average_normalized_turnaround_time: Option<f64>,
    pub total_power: f64,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.processes.iter().filter(|p| p.complete).count()
    }
}
