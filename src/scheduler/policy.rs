/*!
 * Reference Placement Policy
 *
 * A minimal, deterministic policy for the demo binary and tests. Real
 * placement and preemption policies live outside this crate and plug in
 * through `PlacementPolicy`.
 */

use super::traits::PlacementPolicy;
use super::types::Placement;
use crate::core::types::{Pid, ProcessorId, Tick};
use crate::process::Process;
use crate::processor::{Core, Processor};
use ahash::RandomState;
use std::collections::HashSet;
use std::sync::Arc;

/// Run-to-completion FIFO placement
///
/// - A process keeps the processor it ran on last tick
/// - Free processors are filled in (arrival, pid) order
/// - Mission processes take performance cores first, others take
///   efficiency cores first; either falls back to any free processor
#[derive(Debug, Default, Clone)]
pub struct FifoPolicy;

impl FifoPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl PlacementPolicy for FifoPolicy {
    fn place(
        &mut self,
        eligible: &[Arc<Process>],
        processors: &[Arc<Processor>],
        _tick: Tick,
    ) -> Placement {
        let mut placement = Placement::new();
        let mut taken: HashSet<ProcessorId, RandomState> = HashSet::default();
        let mut kept: HashSet<Pid, RandomState> = HashSet::default();

        // Running processes stay put
        for processor in processors {
            if let Some(pid) = processor.current() {
                if eligible.iter().any(|p| p.pid() == pid) {
                    placement.assign(pid, processor.id());
                    taken.insert(processor.id());
                    kept.insert(pid);
                }
            }
        }

        let mut waiting: Vec<&Arc<Process>> =
            eligible.iter().filter(|p| !kept.contains(&p.pid())).collect();
        waiting.sort_by_key(|p| (p.arrival(), p.pid()));

        for process in waiting {
            let preferred = if process.is_mission() {
                Core::Performance
            } else {
                Core::Efficiency
            };

            let free = |core: Option<Core>| {
                processors
                    .iter()
                    .find(|cpu| !taken.contains(&cpu.id()) && core.map_or(true, |c| cpu.core() == c))
                    .map(|cpu| cpu.id())
            };

            let chosen = free(Some(preferred)).or_else(|| free(None));
            match chosen {
                Some(cpu) => {
                    placement.assign(process.pid(), cpu);
                    taken.insert(cpu);
                }
                None => break,
            }
        }

        placement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreProfile;

    fn processors() -> Vec<Arc<Processor>> {
        vec![
            Arc::new(Processor::new(0, Core::Performance, CoreProfile::PERFORMANCE)),
            Arc::new(Processor::new(1, Core::Efficiency, CoreProfile::EFFICIENCY)),
        ]
    }

    #[test]
    fn test_mission_prefers_performance() {
        let cpus = processors();
        let regular = Arc::new(Process::new(0, 0, 5).unwrap());
        let mission = Arc::new(Process::new(1, 0, 5).unwrap().with_mission(true));

        let placement = FifoPolicy.place(&[regular, mission], &cpus, 0);
        assert_eq!(placement.processor_of(0), Some(1));
        assert_eq!(placement.processor_of(1), Some(0));
    }

    #[test]
    fn test_running_process_keeps_processor() {
        let cpus = processors();
        let a = Arc::new(Process::new(0, 0, 5).unwrap());
        let b = Arc::new(Process::new(1, 0, 5).unwrap());
        let c = Arc::new(Process::new(2, 0, 5).unwrap());
        cpus[0].occupy(Some(2));

        let placement = FifoPolicy.place(&[a, b, c], &cpus, 1);
        assert_eq!(placement.processor_of(2), Some(0));
        assert_eq!(placement.processor_of(0), Some(1));
        assert_eq!(placement.processor_of(1), None);
    }

    #[test]
    fn test_arrival_order() {
        let cpus = vec![Arc::new(Processor::new(
            0,
            Core::Efficiency,
            CoreProfile::EFFICIENCY,
        ))];
        let late = Arc::new(Process::new(0, 3, 5).unwrap());
        let early = Arc::new(Process::new(1, 1, 5).unwrap());

        let placement = FifoPolicy.place(&[late, early], &cpus, 3);
        assert_eq!(placement.processor_of(1), Some(0));
        assert_eq!(placement.len(), 1);
    }
}
