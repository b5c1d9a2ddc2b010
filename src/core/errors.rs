/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{Pid, ProcessorId, Tick, Work};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process lifecycle errors (invalid-state)
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ProcessError {
    #[error("Process {pid} is not complete")]
    #[diagnostic(
        code(process::not_complete),
        help("Turnaround time is only defined once progress reaches the workload.")
    )]
    NotComplete { pid: Pid },

    #[error("Process {pid} is already complete")]
    #[diagnostic(
        code(process::already_complete),
        help("The driver must never advance a completed process.")
    )]
    AlreadyComplete { pid: Pid },

    #[error("Invalid workload: {workload}")]
    #[diagnostic(
        code(process::invalid_workload),
        help("A process needs a workload of at least 1 unit.")
    )]
    InvalidWorkload { workload: Work },
}

/// Execution ledger errors (out-of-range and contract violations)
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum LedgerError {
    #[error("Processor {0} not found in ledger")]
    #[diagnostic(
        code(ledger::unknown_processor),
        help("The ledger only tracks processors registered with the run.")
    )]
    UnknownProcessor(ProcessorId),

    #[error("Tick {tick} not yet recorded for processor {processor} ({recorded} ticks recorded)")]
    #[diagnostic(
        code(ledger::out_of_range),
        help("Clamp the requested tick or window to [0, elapsed) before querying.")
    )]
    OutOfRange {
        processor: ProcessorId,
        tick: Tick,
        recorded: Tick,
    },

    #[error("Duplicate record for processor {processor} at tick {tick}")]
    #[diagnostic(
        code(ledger::duplicate_record),
        help("Each (processor, tick) pair must be recorded exactly once. This is a driver bug.")
    )]
    DuplicateRecord { processor: ProcessorId, tick: Tick },

    #[error("Out-of-order record for processor {processor}: expected tick {expected}, got {tick}")]
    #[diagnostic(
        code(ledger::out_of_order),
        help("Ticks must be recorded in increasing order without gaps. This is a driver bug.")
    )]
    OutOfOrder {
        processor: ProcessorId,
        expected: Tick,
        tick: Tick,
    },
}

/// Timeline reconstruction errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum TimelineError {
    #[error("Invalid window [{lo}, {hi}]")]
    #[diagnostic(code(timeline::invalid_window), help("A window needs lo <= hi."))]
    InvalidWindow { lo: Tick, hi: Tick },

    #[error("Ledger error: {0}")]
    #[diagnostic(transparent)]
    Ledger(#[from] LedgerError),
}

/// Scheduler loop errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SchedulerError {
    #[error("Invalid placement at tick {tick}: {reason}")]
    #[diagnostic(
        code(scheduler::invalid_placement),
        help("A placement maps eligible processes to distinct, existing processors.")
    )]
    InvalidPlacement { tick: Tick, reason: String },

    #[error("Simulation already finished at tick {0}")]
    #[diagnostic(
        code(scheduler::finished),
        help("No ticks may be recorded after the finish event.")
    )]
    Finished(Tick),

    #[error("Simulation aborted at tick {0}")]
    #[diagnostic(
        code(scheduler::aborted),
        help("An earlier contract violation stopped the run; its history is no longer trustworthy.")
    )]
    Aborted(Tick),

    #[error("Tick limit of {0} reached before every process completed")]
    #[diagnostic(
        code(scheduler::tick_limit),
        help("The placement policy may be starving processes. Raise max_ticks or fix the policy.")
    )]
    TickLimit(Tick),

    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),

    #[error("Ledger error: {0}")]
    #[diagnostic(transparent)]
    Ledger(#[from] LedgerError),
}

/// Configuration errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    #[diagnostic(
        code(config::invalid_value),
        help("Check the TOAST_* environment variables or the configuration file.")
    )]
    InvalidValue { key: String, value: String },

    #[error("Failed to load configuration: {0}")]
    #[diagnostic(
        code(config::load_failed),
        help("The configuration file must be readable JSON.")
    )]
    LoadFailed(String),
}

/// Unified simulator error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum SimError {
    #[error("Process error: {0}")]
    #[diagnostic(transparent)]
    Process(#[from] ProcessError),

    #[error("Ledger error: {0}")]
    #[diagnostic(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Timeline error: {0}")]
    #[diagnostic(transparent)]
    Timeline(#[from] TimelineError),

    #[error("Scheduler error: {0}")]
    #[diagnostic(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}
