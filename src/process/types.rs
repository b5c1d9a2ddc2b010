/*!
 * Process Types
 * Serializable snapshots of process metrics
 */

use crate::core::types::{Pid, Tick, Work};
use serde::{Deserialize, Serialize};

/// Point-in-time view of a process and its metrics
///
/// Taken under a single lock, so `waiting_time + burst_time` always matches
/// `turnaround_time` when the process is complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessStats {
    pub pid: Pid,
    pub arrival: Tick,
    pub workload: Work,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub mission: bool,
    pub progress: Work,
    pub burst_time: Tick,
    pub waiting_time: Tick,
    pub continuous_burst_time: Tick,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub turnaround_time: Option<Tick>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub normalized_turnaround_time: Option<f64>,
}

impl ProcessStats {
    /// Work still required, saturating at zero
    pub fn remaining_workload(&self) -> Work {
        self.workload.saturating_sub(self.progress)
    }
}
