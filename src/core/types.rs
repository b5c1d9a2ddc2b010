/*!
 * Core Types
 * Common types used across the simulator
 */

/// Process ID type
pub type Pid = u32;

/// Processor ID type (also the timeline row index)
pub type ProcessorId = usize;

/// One discrete simulated time unit
pub type Tick = u64;

/// Amount of work (workload, progress, per-tick throughput)
pub type Work = u64;

/// Common result type for simulator operations
pub type SimResult<T> = Result<T, super::errors::SimError>;
