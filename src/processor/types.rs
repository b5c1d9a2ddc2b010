/*!
 * Processor Types
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Core class of a simulated processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Core {
    /// High throughput, high power
    Performance,
    /// Low throughput, low power
    Efficiency,
}

impl Core {
    /// Short display name used on timeline rows
    pub fn name(&self) -> &'static str {
        match self {
            Core::Performance => "P-Core",
            Core::Efficiency => "E-Core",
        }
    }
}

impl fmt::Display for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
