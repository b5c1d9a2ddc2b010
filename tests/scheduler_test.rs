/*!
 * Scheduler Loop Tests
 * Tick ordering, preemption accounting, lifecycle events and full runs
 */

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::Arc;
use toast_sim::{
    Core, EventKind, FifoPolicy, Placement, Process, Processor, RunContext, RunState, Scheduler,
    SchedulerError, SchedulerEvent, SimConfig, Tick, Window,
};

fn context(performance_cores: usize, efficiency_cores: usize) -> Arc<RunContext> {
    let config = SimConfig {
        performance_cores,
        efficiency_cores,
        max_ticks: Some(1_000),
        ..SimConfig::default()
    };
    Arc::new(RunContext::new(config).unwrap())
}

/// Policy running `script[tick]` on processor 0, nothing past the end
fn scripted(
    script: Vec<Option<u32>>,
) -> impl FnMut(&[Arc<Process>], &[Arc<Processor>], Tick) -> Placement + Send {
    move |_: &[Arc<Process>], _: &[Arc<Processor>], tick: Tick| {
        match script.get(tick as usize).copied().flatten() {
            Some(pid) => Placement::new().with(pid, 0),
            None => Placement::new(),
        }
    }
}

#[test]
fn test_preemption_accounting() {
    let ctx = context(0, 1);
    let p0 = ctx.create_process(0, 3).unwrap();
    let p1 = ctx.create_process(0, 2).unwrap();

    let script = vec![Some(0), Some(0), Some(1), Some(1), Some(0)];
    let mut scheduler = Scheduler::new(Arc::clone(&ctx), scripted(script));

    let mut reports = Vec::new();
    while !scheduler.is_finished() {
        reports.push(scheduler.step().unwrap());
    }

    assert_eq!(ctx.elapsed_time(), 5);
    assert_eq!(reports[2].preempted, vec![0]);
    assert_eq!(reports[2].waiting, vec![0]);
    assert_eq!(reports[3].completed, vec![1]);
    assert!(reports[4].finished);

    assert_eq!(p0.burst_time(), 3);
    assert_eq!(p0.waiting_time(), 2);
    assert_eq!(p0.continuous_burst_time(), 1);
    assert_eq!(p0.turnaround_time().unwrap(), 5);

    assert_eq!(p1.waiting_time(), 2);
    assert_eq!(p1.burst_time(), 2);
    assert_eq!(p1.turnaround_time().unwrap(), 4);
    assert_eq!(p1.normalized_turnaround_time().unwrap(), 2.0);

    let segments: Vec<_> = ctx
        .timeline(0, Window::new(0, 4).unwrap())
        .unwrap()
        .iter()
        .map(|s| (s.pid(), s.start, s.length))
        .collect();
    assert_eq!(segments, vec![(0, 0, 2), (1, 2, 2), (0, 4, 1)]);
}

#[test]
fn test_waiting_starts_at_arrival() {
    let ctx = context(0, 1);
    let p0 = ctx.create_process(0, 5).unwrap();
    let p1 = ctx.create_process(3, 1).unwrap();

    let script = vec![Some(0), Some(0), Some(0), Some(0), Some(0), Some(1)];
    let summary = Scheduler::new(Arc::clone(&ctx), scripted(script))
        .run()
        .unwrap();

    assert_eq!(summary.elapsed, 6);
    assert_eq!(p0.waiting_time(), 0);
    assert_eq!(p1.waiting_time(), 2);
    assert_eq!(p1.turnaround_time().unwrap(), 3);
}

#[test]
fn test_idle_ticks_before_first_arrival() {
    let ctx = context(0, 1);
    let process = ctx.create_process(2, 1).unwrap();

    let script = vec![None, None, Some(0)];
    let summary = Scheduler::new(Arc::clone(&ctx), scripted(script))
        .run()
        .unwrap();

    assert_eq!(summary.elapsed, 3);
    assert!(ctx.process_at(0, 0).unwrap().is_none());
    assert!(ctx.process_at(0, 1).unwrap().is_none());
    assert_eq!(ctx.process_at(0, 2).unwrap().map(|p| p.pid()), Some(0));
    assert_eq!(process.turnaround_time().unwrap(), 1);
}

#[test]
fn test_performance_core_throughput() {
    let ctx = context(1, 0);
    let process = ctx.create_process(0, 4).unwrap();

    let summary = Scheduler::new(Arc::clone(&ctx), scripted(vec![Some(0); 4]))
        .run()
        .unwrap();

    assert_eq!(summary.elapsed, 2);
    assert_eq!(process.burst_time(), 2);
    assert_eq!(summary.processors[0].core, Core::Performance);
    assert_eq!(summary.processors[0].active_ticks, 2);
    assert_eq!(summary.processors[0].startups, 1);
    assert!((summary.total_power - 6.5).abs() < 1e-9);
}

#[test]
fn test_lifecycle_events_fire_once_in_order() {
    let ctx = context(0, 1);
    ctx.create_process(0, 2).unwrap();

    let log = Arc::new(Mutex::new(Vec::new()));
    for kind in [EventKind::Started, EventKind::Finished] {
        let log = Arc::clone(&log);
        ctx.events().subscribe(kind, move |event| log.lock().push(event.clone()));
    }

    let mut scheduler = Scheduler::new(Arc::clone(&ctx), scripted(vec![Some(0); 2]));
    scheduler.start();
    scheduler.start();
    assert_eq!(log.lock().len(), 1);

    scheduler.run().unwrap();
    assert!(scheduler.step().is_err());

    let log = log.lock();
    assert_eq!(
        *log,
        vec![
            SchedulerEvent::Started {
                run_id: ctx.run_id(),
                processes: 1,
                processors: 1,
            },
            SchedulerEvent::Finished {
                run_id: ctx.run_id(),
                elapsed: 2,
            },
        ]
    );
}

#[test]
fn test_placing_completed_process_aborts() {
    let ctx = context(0, 1);
    ctx.create_process(0, 1).unwrap();
    ctx.create_process(0, 3).unwrap();

    // Places pid 0 again after it completed at tick 0
    let mut scheduler = Scheduler::new(Arc::clone(&ctx), scripted(vec![Some(0), Some(0)]));
    scheduler.step().unwrap();

    assert!(matches!(
        scheduler.step(),
        Err(SchedulerError::InvalidPlacement { tick: 1, .. })
    ));
    assert_eq!(scheduler.state(), RunState::Aborted);
    assert_eq!(ctx.elapsed_time(), 1);
}

#[test]
fn test_double_booked_processor_aborts() {
    let ctx = context(0, 2);
    ctx.create_process(0, 2).unwrap();
    ctx.create_process(0, 2).unwrap();

    let mut scheduler = Scheduler::new(
        Arc::clone(&ctx),
        |_: &[Arc<Process>], _: &[Arc<Processor>], _: Tick| Placement::new().with(0, 1).with(1, 1),
    );

    assert!(matches!(
        scheduler.step(),
        Err(SchedulerError::InvalidPlacement { tick: 0, .. })
    ));
    assert_eq!(ctx.ledger().recorded(0).unwrap(), 0);
    assert_eq!(ctx.ledger().recorded(1).unwrap(), 0);
}

#[test]
fn test_starving_policy_hits_tick_limit() {
    let config = SimConfig {
        performance_cores: 0,
        efficiency_cores: 1,
        max_ticks: Some(10),
        ..SimConfig::default()
    };
    let ctx = Arc::new(RunContext::new(config).unwrap());
    let process = ctx.create_process(0, 1).unwrap();

    let result = Scheduler::new(Arc::clone(&ctx), scripted(Vec::new())).run();

    assert_eq!(result, Err(SchedulerError::TickLimit(10)));
    assert_eq!(process.waiting_time(), 10);
    assert!(!process.is_complete());
}

#[test]
fn test_fifo_full_run_invariants() {
    let ctx = context(2, 2);
    let workload = [(0, 6, false), (1, 4, true), (2, 8, false), (3, 3, false), (5, 10, true), (6, 5, false), (9, 7, false)];
    for (arrival, work, mission) in workload {
        if mission {
            ctx.create_mission_process(arrival, work).unwrap();
        } else {
            ctx.create_process(arrival, work).unwrap();
        }
    }

    let mut scheduler = Scheduler::new(Arc::clone(&ctx), FifoPolicy::new());
    let summary = scheduler.run().unwrap();

    assert_eq!(summary.completed(), workload.len());
    for stats in &summary.processes {
        assert_eq!(
            stats.turnaround_time,
            Some(stats.waiting_time + stats.burst_time)
        );
        assert_eq!(stats.remaining_workload(), 0);
    }
    for processor in 0..4 {
        assert_eq!(ctx.ledger().recorded(processor).unwrap(), summary.elapsed);
    }

    for tick in 0..summary.elapsed {
        let mut seen = HashSet::new();
        for processor in 0..4 {
            if let Some(process) = ctx.process_at(processor, tick).unwrap() {
                assert!(seen.insert(process.pid()), "pid on two processors at {}", tick);
                assert!(process.arrival() <= tick);
            }
        }
    }

    // Mission work lands on a performance core
    let first_mission_tick = ctx.process_at(0, 1).unwrap().map(|p| p.pid());
    assert_eq!(first_mission_tick, Some(1));

    assert_eq!(scheduler.step(), Err(SchedulerError::Finished(summary.elapsed)));
    assert_eq!(ctx.ledger().recorded(0).unwrap(), summary.elapsed);
    assert!(summary.average_turnaround_time.is_some());
}
