/*!
 * Scheduler Loop
 *
 * Advances simulated time one tick at a time. Each tick:
 * 1. collect eligible processes (arrived, not complete)
 * 2. ask the placement policy for a partial process -> processor mapping
 * 3. `standby()` every eligible process left unplaced
 * 4. `halt()` every process that ran last tick and is not placed now
 * 5. `work()` every placed process and record every processor's occupant
 * 6. publish the new elapsed tick
 *
 * The start event fires once before tick 0, the finish event once after
 * the last process completes. Contract violations abort the run.
 */

use super::context::RunContext;
use super::events::SchedulerEvent;
use super::traits::PlacementPolicy;
use super::types::{Placement, RunState, RunSummary, TickReport};
use crate::core::errors::SchedulerError;
use crate::core::types::{Pid, ProcessorId, Tick};
use crate::process::Process;
use ahash::RandomState;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};

/// Tick driver for one run
pub struct Scheduler<P: PlacementPolicy> {
    ctx: Arc<RunContext>,
    policy: P,
    // Processes that executed last tick and have not completed
    running: HashMap<Pid, ProcessorId, RandomState>,
    state: RunState,
}

impl<P: PlacementPolicy> Scheduler<P> {
    pub fn new(ctx: Arc<RunContext>, policy: P) -> Self {
        Self {
            ctx,
            policy,
            running: HashMap::default(),
            state: RunState::Pending,
        }
    }

    pub fn context(&self) -> &Arc<RunContext> {
        &self.ctx
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == RunState::Finished
    }

    /// Fire the start event; finishes at once if there is nothing to run
    ///
    /// Idempotent: only the first call has an effect.
    pub fn start(&mut self) {
        if self.state != RunState::Pending {
            return;
        }

        self.state = RunState::Running;
        let event = SchedulerEvent::Started {
            run_id: self.ctx.run_id(),
            processes: self.ctx.process_count(),
            processors: self.ctx.processor_list().len(),
        };
        info!(run_id = %self.ctx.run_id(), "simulation started");
        self.ctx.events().emit(&event);

        if self.ctx.all_complete() {
            self.finish();
        }
    }

    /// Advance one tick
    pub fn step(&mut self) -> Result<TickReport, SchedulerError> {
        self.start();

        let tick = self.ctx.elapsed_time();
        match self.state {
            RunState::Finished => return Err(SchedulerError::Finished(tick)),
            RunState::Aborted => return Err(SchedulerError::Aborted(tick)),
            RunState::Pending | RunState::Running => {}
        }

        let span = info_span!("tick", run_id = %self.ctx.run_id(), tick);
        let _entered = span.enter();

        match self.advance(tick) {
            Ok(report) => Ok(report),
            Err(e) => {
                error!(error = %e, "contract violation, aborting run");
                self.state = RunState::Aborted;
                Err(e)
            }
        }
    }

    /// Drive ticks until the finish event fires
    pub fn run(&mut self) -> Result<RunSummary, SchedulerError> {
        self.start();
        let pacing = self.ctx.config().tick_interval();
        let limit = self.ctx.config().max_ticks;

        while !self.is_finished() {
            if let Some(limit) = limit {
                if self.ctx.elapsed_time() >= limit {
                    warn!(limit, "tick limit reached");
                    return Err(SchedulerError::TickLimit(limit));
                }
            }

            self.step()?;

            if !pacing.is_zero() && !self.is_finished() {
                std::thread::sleep(pacing);
            }
        }

        Ok(self.ctx.summary())
    }

    fn advance(&mut self, tick: Tick) -> Result<TickReport, SchedulerError> {
        let eligible: Vec<Arc<Process>> = self
            .ctx
            .process_list()
            .into_iter()
            .filter(|p| p.is_eligible(tick))
            .collect();

        let placement = self
            .policy
            .place(&eligible, self.ctx.processor_list(), tick);
        self.validate(&placement, &eligible, tick)?;

        let processors = self.ctx.processor_list();
        let mut occupants: Vec<Option<Arc<Process>>> = vec![None; processors.len()];
        let mut placed: HashSet<Pid, RandomState> = HashSet::default();
        for (pid, cpu) in placement.iter() {
            occupants[cpu] = eligible.iter().find(|p| p.pid() == pid).cloned();
            placed.insert(pid);
        }

        let mut report = TickReport {
            tick,
            placed: placement.iter().collect(),
            ..TickReport::default()
        };

        for process in eligible.iter().filter(|p| !placed.contains(&p.pid())) {
            process.standby();
            report.waiting.push(process.pid());
        }

        for (pid, cpu) in &self.running {
            if placed.contains(pid) {
                continue;
            }
            if let Some(process) = eligible.iter().find(|p| p.pid() == *pid) {
                process.halt();
                report.preempted.push(*pid);
                debug!(pid, processor = cpu, "preempted");
            }
        }

        let mut running = HashMap::default();
        for (cpu, processor) in processors.iter().enumerate() {
            let occupant = occupants[cpu].take();
            if let Some(process) = &occupant {
                process.work(processor.throughput())?;
                if process.is_complete() {
                    report.completed.push(process.pid());
                    info!(pid = process.pid(), processor = cpu, "process complete");
                } else {
                    running.insert(process.pid(), cpu);
                }
            }
            processor.occupy(occupant.as_ref().map(|p| p.pid()));
            self.ctx.ledger().record(cpu, tick, occupant)?;
        }
        self.running = running;

        self.ctx.publish_elapsed(tick + 1);
        debug!(
            placed = report.placed.len(),
            waiting = report.waiting.len(),
            preempted = report.preempted.len(),
            "tick recorded"
        );

        if self.ctx.all_complete() {
            self.finish();
            report.finished = true;
        }

        Ok(report)
    }

    fn validate(
        &self,
        placement: &Placement,
        eligible: &[Arc<Process>],
        tick: Tick,
    ) -> Result<(), SchedulerError> {
        let processor_count = self.ctx.processor_list().len();
        let mut pids: HashSet<Pid, RandomState> = HashSet::default();
        let mut cpus: HashSet<ProcessorId, RandomState> = HashSet::default();
        let invalid = |reason: String| SchedulerError::InvalidPlacement { tick, reason };

        for (pid, cpu) in placement.iter() {
            if cpu >= processor_count {
                return Err(invalid(format!("processor {} does not exist", cpu)));
            }
            if !eligible.iter().any(|p| p.pid() == pid) {
                return Err(invalid(format!("process {} is not eligible", pid)));
            }
            if !pids.insert(pid) {
                return Err(invalid(format!("process {} placed twice", pid)));
            }
            if !cpus.insert(cpu) {
                return Err(invalid(format!("processor {} assigned twice", cpu)));
            }
        }
        Ok(())
    }

    fn finish(&mut self) {
        self.state = RunState::Finished;
        self.running.clear();
        for processor in self.ctx.processor_list() {
            processor.release();
        }

        let elapsed = self.ctx.elapsed_time();
        info!(run_id = %self.ctx.run_id(), elapsed, "simulation finished");
        self.ctx.events().emit(&SchedulerEvent::Finished {
            run_id: self.ctx.run_id(),
            elapsed,
        });
    }
}
