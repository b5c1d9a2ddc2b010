/*!
 * Toast Scheduling Simulator Library
 *
 * Process scheduling substrate for a heterogeneous (performance/efficiency
 * core) machine: process lifecycle and metrics, a per-processor execution
 * ledger, and sliding-window timeline reconstruction.
 */

pub mod config;
pub mod core;
pub mod ledger;
pub mod monitoring;
pub mod process;
pub mod processor;
pub mod render;
pub mod scheduler;
pub mod timeline;

// Re-exports
pub use config::{CoreProfile, SimConfig};
pub use crate::core::*;
pub use ledger::{ExecutionLedger, Occupant, ProcessorRecord};
pub use monitoring::init_tracing;
pub use process::{ListenerId, Process, ProcessStats};
pub use processor::{Core, Processor, ProcessorStats};
pub use render::{Frame, RenderTask, Row};
pub use scheduler::{
    EventKind, FifoPolicy, Placement, PlacementPolicy, RunContext, RunState, RunSummary,
    Scheduler, SchedulerEvent, TickReport,
};
pub use timeline::{reconstruct, Segment, SegmentView, Window};
