/*!
 * Run Context
 *
 * Everything one simulation run owns: processes, processors, the execution
 * ledger, the elapsed-tick clock and the lifecycle event bus. Constructed
 * explicitly and shared by `Arc`, so concurrent runs never share state.
 *
 * # Visibility
 * The driver records every processor for tick `t` before publishing
 * `elapsed = t + 1` (release). Readers load `elapsed` (acquire) and only
 * query ticks below it, so no reader sees tick `t` before tick `t - 1`.
 */

use super::events::EventBus;
use super::types::RunSummary;
use crate::config::SimConfig;
use crate::core::errors::{ConfigError, LedgerError, ProcessError, TimelineError};
use crate::core::id::PidAllocator;
use crate::core::types::{ProcessorId, Tick, Work};
use crate::ledger::{ExecutionLedger, Occupant};
use crate::process::Process;
use crate::processor::{Core, Processor};
use crate::timeline::{self, Segment, Window};
use log::info;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Shared state of one simulation run
#[derive(Debug)]
pub struct RunContext {
    run_id: Uuid,
    config: SimConfig,
    pids: PidAllocator,
    processes: RwLock<Vec<Arc<Process>>>,
    processors: Vec<Arc<Processor>>,
    ledger: ExecutionLedger,
    elapsed: AtomicU64,
    events: EventBus,
}

impl RunContext {
    /// Create a run with `config.performance_cores` performance cores
    /// (ids first) followed by `config.efficiency_cores` efficiency cores
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let cores = std::iter::repeat(Core::Performance)
            .take(config.performance_cores)
            .chain(std::iter::repeat(Core::Efficiency).take(config.efficiency_cores));
        let processors: Vec<Arc<Processor>> = cores
            .enumerate()
            .map(|(id, core)| Arc::new(Processor::new(id, core, *config.profile(core))))
            .collect();

        let run_id = Uuid::new_v4();
        info!(
            "Run {} created with {} P-core(s) and {} E-core(s)",
            run_id, config.performance_cores, config.efficiency_cores
        );

        Ok(Self {
            run_id,
            ledger: ExecutionLedger::new(processors.len()),
            processors,
            config,
            pids: PidAllocator::new(),
            processes: RwLock::new(Vec::new()),
            elapsed: AtomicU64::new(0),
            events: EventBus::new(),
        })
    }

    /// Create a process with the next PID of this run
    pub fn create_process(&self, arrival: Tick, workload: Work) -> Result<Arc<Process>, ProcessError> {
        self.spawn(arrival, workload, false)
    }

    /// Create a mission process (prefers performance cores)
    pub fn create_mission_process(
        &self,
        arrival: Tick,
        workload: Work,
    ) -> Result<Arc<Process>, ProcessError> {
        self.spawn(arrival, workload, true)
    }

    fn spawn(&self, arrival: Tick, workload: Work, mission: bool) -> Result<Arc<Process>, ProcessError> {
        if workload == 0 {
            return Err(ProcessError::InvalidWorkload { workload });
        }

        // Hold the list lock across allocation so list order == PID order
        let mut processes = self.processes.write();
        let pid = self.pids.next();
        let process = Arc::new(Process::new(pid, arrival, workload)?.with_mission(mission));
        processes.push(Arc::clone(&process));

        info!(
            "Process {} created (arrival: {}, workload: {}, mission: {})",
            pid, arrival, workload, mission
        );
        Ok(process)
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// All processes, in creation order
    pub fn process_list(&self) -> Vec<Arc<Process>> {
        self.processes.read().clone()
    }

    pub fn process_count(&self) -> usize {
        self.processes.read().len()
    }

    /// All processors, in id order
    pub fn processor_list(&self) -> &[Arc<Processor>] {
        &self.processors
    }

    /// Number of ticks fully recorded
    pub fn elapsed_time(&self) -> Tick {
        self.elapsed.load(Ordering::Acquire)
    }

    pub(crate) fn publish_elapsed(&self, elapsed: Tick) {
        self.elapsed.store(elapsed, Ordering::Release);
    }

    pub fn ledger(&self) -> &ExecutionLedger {
        &self.ledger
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Process that occupied `processor` during `tick`
    ///
    /// Only ticks below `elapsed_time()` are visible.
    pub fn process_at(&self, processor: ProcessorId, tick: Tick) -> Result<Occupant, LedgerError> {
        let elapsed = self.elapsed_time();
        if tick >= elapsed {
            // Distinguish unknown processors from future ticks
            self.ledger.processor_record(processor)?;
            return Err(LedgerError::OutOfRange {
                processor,
                tick,
                recorded: elapsed,
            });
        }
        self.ledger.process_at(processor, tick)
    }

    /// Sliding window ending at the last published tick
    pub fn sliding_window(&self) -> Option<Window> {
        Window::sliding(self.elapsed_time(), self.config.window_size)
    }

    /// Segments of `processor` inside `window`
    pub fn timeline(&self, processor: ProcessorId, window: Window) -> Result<Vec<Segment>, TimelineError> {
        let elapsed = self.elapsed_time();
        if window.hi() >= elapsed {
            self.ledger.processor_record(processor)?;
            return Err(LedgerError::OutOfRange {
                processor,
                tick: window.hi(),
                recorded: elapsed,
            }
            .into());
        }
        timeline::reconstruct(&self.ledger, processor, window)
    }

    pub fn all_complete(&self) -> bool {
        self.processes.read().iter().all(|p| p.is_complete())
    }

    /// Per-process and per-processor metrics with run averages
    pub fn summary(&self) -> RunSummary {
        let processes: Vec<_> = self.processes.read().iter().map(|p| p.stats()).collect();
        let processors: Vec<_> = self.processors.iter().map(|p| p.stats()).collect();

        let complete: Vec<_> = processes.iter().filter(|p| p.complete).collect();

        RunSummary {
            run_id: self.run_id,
            elapsed: self.elapsed_time(),
            average_waiting_time: mean(complete.iter().map(|p| p.waiting_time as f64)),
            average_turnaround_time: mean(
                complete
                    .iter()
                    .filter_map(|p| p.turnaround_time)
                    .map(|t| t as f64),
            ),
            average_normalized_turnaround_time: mean(
                complete.iter().filter_map(|p| p.normalized_turnaround_time),
            ),
            total_power: processors.iter().map(|p| p.power_consumed).sum(),
            processes,
            processors,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}
