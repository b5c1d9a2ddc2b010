/*!
 * Process
 * Unit of simulated work with lifecycle mutators and accumulated metrics
 */

use super::listeners::{CompletionListeners, ListenerId};
use super::types::ProcessStats;
use crate::core::errors::ProcessError;
use crate::core::types::{Pid, Tick, Work};
use log::{debug, trace};
use parking_lot::RwLock;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

#[derive(Debug, Default, Clone, Copy)]
struct Metrics {
    progress: Work,
    burst_time: Tick,
    waiting_time: Tick,
    continuous_burst_time: Tick,
}

/// Simulated process
///
/// Mutators take `&self`: the tick driver is the only writer, while the
/// render cycle reads metrics concurrently through `Arc<Process>`.
pub struct Process {
    pid: Pid,
    arrival: Tick,
    workload: Work,
    mission: bool,
    metrics: RwLock<Metrics>,
    listeners: CompletionListeners,
}

impl Process {
    /// Create a process with an already allocated PID
    ///
    /// Use `RunContext::create_process` to get a PID from the run.
    pub fn new(pid: Pid, arrival: Tick, workload: Work) -> ProcessResult<Self> {
        if workload == 0 {
            return Err(ProcessError::InvalidWorkload { workload });
        }

        Ok(Self {
            pid,
            arrival,
            workload,
            mission: false,
            metrics: RwLock::new(Metrics::default()),
            listeners: CompletionListeners::new(),
        })
    }

    /// Mark the process as a mission process
    pub fn with_mission(mut self, mission: bool) -> Self {
        self.mission = mission;
        self
    }

    /// Account one tick of eligible-but-not-running time
    pub fn standby(&self) {
        self.metrics.write().waiting_time += 1;
    }

    /// Execute one tick, advancing progress by `amount`
    ///
    /// Fires every completion listener, in registration order, before
    /// returning if this call completes the process.
    pub fn work(&self, amount: Work) -> ProcessResult<()> {
        let completed = {
            let mut metrics = self.metrics.write();
            if metrics.progress >= self.workload {
                return Err(ProcessError::AlreadyComplete { pid: self.pid });
            }

            metrics.progress = metrics.progress.saturating_add(amount);
            metrics.burst_time += 1;
            metrics.continuous_burst_time += 1;
            trace!(
                "Process {} worked {} (progress {}/{})",
                self.pid,
                amount,
                metrics.progress,
                self.workload
            );

            metrics.progress >= self.workload
        };

        // Listeners run with the lock released so they can read our metrics
        if completed {
            let fired = self.listeners.fire();
            debug!(
                "Process {} complete, notified {} listener(s)",
                self.pid, fired
            );
        }

        Ok(())
    }

    /// Interrupt execution without losing progress
    pub fn halt(&self) {
        self.metrics.write().continuous_burst_time = 0;
    }

    /// Register a completion listener
    ///
    /// A listener registered after completion never runs.
    pub fn add_completion_listener<F>(&self, listener: F) -> ListenerId
    where
        F: FnOnce() + Send + 'static,
    {
        self.listeners.register(listener)
    }

    /// Deregister a completion listener; unknown or fired slots are ignored
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners.unregister(id)
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn arrival(&self) -> Tick {
        self.arrival
    }

    pub fn workload(&self) -> Work {
        self.workload
    }

    pub fn is_mission(&self) -> bool {
        self.mission
    }

    pub fn progress(&self) -> Work {
        self.metrics.read().progress
    }

    pub fn remaining_workload(&self) -> Work {
        self.workload.saturating_sub(self.progress())
    }

    pub fn burst_time(&self) -> Tick {
        self.metrics.read().burst_time
    }

    pub fn waiting_time(&self) -> Tick {
        self.metrics.read().waiting_time
    }

    pub fn continuous_burst_time(&self) -> Tick {
        self.metrics.read().continuous_burst_time
    }

    pub fn is_complete(&self) -> bool {
        self.metrics.read().progress >= self.workload
    }

    /// Eligible to run at `tick`: arrived and not complete
    pub fn is_eligible(&self, tick: Tick) -> bool {
        self.arrival <= tick && !self.is_complete()
    }

    /// Waiting time plus burst time, defined only once complete
    pub fn turnaround_time(&self) -> ProcessResult<Tick> {
        let metrics = self.metrics.read();
        if metrics.progress < self.workload {
            return Err(ProcessError::NotComplete { pid: self.pid });
        }
        Ok(metrics.waiting_time + metrics.burst_time)
    }

    /// Turnaround time divided by burst time
    pub fn normalized_turnaround_time(&self) -> ProcessResult<f64> {
        let turnaround = self.turnaround_time()?;
        Ok(turnaround as f64 / self.burst_time() as f64)
    }

    /// Consistent snapshot of every metric
    pub fn stats(&self) -> ProcessStats {
        let metrics = *self.metrics.read();
        let complete = metrics.progress >= self.workload;
        let turnaround = complete.then(|| metrics.waiting_time + metrics.burst_time);

        ProcessStats {
            pid: self.pid,
            arrival: self.arrival,
            workload: self.workload,
            mission: self.mission,
            progress: metrics.progress,
            burst_time: metrics.burst_time,
            waiting_time: metrics.waiting_time,
            continuous_burst_time: metrics.continuous_burst_time,
            complete,
            turnaround_time: turnaround,
            normalized_turnaround_time: turnaround
                .map(|t| t as f64 / metrics.burst_time as f64),
        }
    }
}

impl std::fmt::Debug for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let metrics = *self.metrics.read();
        f.debug_struct("Process")
            .field("pid", &self.pid)
            .field("arrival", &self.arrival)
            .field("workload", &self.workload)
            .field("mission", &self.mission)
            .field("metrics", &metrics)
            .field("listeners", &self.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_standby_then_work_to_completion() {
        let process = Process::new(0, 0, 5).unwrap();

        process.standby();
        process.standby();
        process.work(2).unwrap();
        assert!(!process.is_complete());
        process.work(3).unwrap();

        assert!(process.is_complete());
        assert_eq!(process.burst_time(), 2);
        assert_eq!(process.waiting_time(), 2);
        assert_eq!(process.progress(), 5);
        assert_eq!(process.turnaround_time().unwrap(), 4);
        assert_eq!(process.normalized_turnaround_time().unwrap(), 2.0);
    }

    #[test]
    fn test_turnaround_before_completion_fails() {
        let process = Process::new(4, 0, 3).unwrap();
        process.work(1).unwrap();

        assert_eq!(
            process.turnaround_time(),
            Err(ProcessError::NotComplete { pid: 4 })
        );
        assert!(process.normalized_turnaround_time().is_err());
    }

    #[test]
    fn test_work_after_completion_fails() {
        let process = Process::new(1, 0, 1).unwrap();
        process.work(1).unwrap();
        assert_eq!(
            process.work(1),
            Err(ProcessError::AlreadyComplete { pid: 1 })
        );
        assert_eq!(process.burst_time(), 1);
    }

    #[test]
    fn test_zero_workload_rejected() {
        assert_eq!(
            Process::new(0, 0, 0).unwrap_err(),
            ProcessError::InvalidWorkload { workload: 0 }
        );
    }

    #[test]
    fn test_continuous_burst_reset() {
        let process = Process::new(0, 0, 100).unwrap();
        process.work(1).unwrap();
        process.work(2).unwrap();
        process.work(3).unwrap();
        assert_eq!(process.continuous_burst_time(), 3);

        process.halt();
        process.work(4).unwrap();

        assert_eq!(process.continuous_burst_time(), 1);
        assert_eq!(process.burst_time(), 4);
        assert_eq!(process.progress(), 10);
    }

    #[test]
    fn test_listener_sees_complete_metrics() {
        let process = Arc::new(Process::new(2, 0, 2).unwrap());
        let seen = Arc::new(Mutex::new(None));

        let observer = Arc::clone(&process);
        let slot = Arc::clone(&seen);
        process.add_completion_listener(move || {
            *slot.lock() = observer.turnaround_time().ok();
        });

        process.standby();
        process.work(2).unwrap();

        assert_eq!(*seen.lock(), Some(2));
    }

    #[test]
    fn test_listener_fires_exactly_once() {
        let process = Process::new(0, 0, 1).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        process.add_completion_listener(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        process.work(5).unwrap();
        let _ = process.work(5);

        // Registered after completion: never invoked
        let late = Arc::clone(&hits);
        process.add_completion_listener(move || {
            late.fetch_add(100, Ordering::SeqCst);
        });

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_listener_is_idempotent() {
        let process = Process::new(0, 0, 1).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let removed = process.add_completion_listener(|| {});
        let counter = Arc::clone(&hits);
        process.add_completion_listener(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(process.remove_listener(removed));
        assert!(!process.remove_listener(removed));
        assert!(!process.remove_listener(999));

        process.work(1).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stats_snapshot() {
        let process = Process::new(3, 1, 4).unwrap().with_mission(true);
        process.standby();
        process.work(4).unwrap();

        let stats = process.stats();
        assert!(stats.mission);
        assert!(stats.complete);
        assert_eq!(stats.turnaround_time, Some(2));
        assert_eq!(stats.normalized_turnaround_time, Some(2.0));
        assert_eq!(stats.remaining_workload(), 0);
    }

    #[test]
    fn test_overshoot_saturates_remaining() {
        let process = Process::new(0, 0, 3).unwrap();
        process.work(2).unwrap();
        process.work(2).unwrap();
        assert_eq!(process.progress(), 4);
        assert_eq!(process.remaining_workload(), 0);
    }
}
