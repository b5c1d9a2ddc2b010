/*!
 * Toast Scheduling Simulator - Demo Entry Point
 *
 * Runs a fixed workload under the reference FIFO placement policy while a
 * render task polls the timeline, then prints the run summary as JSON.
 *
 * Usage: toast-sim [config.json]
 */

use std::sync::Arc;
use tracing::info;

use toast_sim::{init_tracing, FifoPolicy, RenderTask, RunContext, Scheduler, SimConfig};

/// (arrival, workload, mission)
const DEMO_WORKLOAD: &[(u64, u64, bool)] = &[
    (0, 6, false),
    (1, 4, true),
    (2, 8, false),
    (3, 3, false),
    (5, 10, true),
    (6, 5, false),
    (9, 7, false),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "Loading configuration file");
            SimConfig::from_file(path)?.with_env_overrides()?
        }
        None => SimConfig::from_env()?,
    };
    info!(?config, "Configuration loaded");

    let ctx = Arc::new(RunContext::new(config)?);
    for &(arrival, workload, mission) in DEMO_WORKLOAD {
        if mission {
            ctx.create_mission_process(arrival, workload)?;
        } else {
            ctx.create_process(arrival, workload)?;
        }
    }

    let render = RenderTask::spawn(Arc::clone(&ctx))
        .start_on_start()
        .stop_on_finish();
    let mut frames = render.frames();
    let printer = tokio::spawn(async move {
        while frames.changed().await.is_ok() {
            let frame = frames.borrow_and_update().clone();
            info!("\n{}", frame.to_ascii());
        }
    });

    let sim_ctx = Arc::clone(&ctx);
    let summary = tokio::task::spawn_blocking(move || {
        let mut scheduler = Scheduler::new(sim_ctx, FifoPolicy::new());
        scheduler.run()
    })
    .await??;

    let last = render.shutdown().await;
    let _ = printer.await;

    println!("{}", last.to_ascii());
    println!("{}", serde_json::to_string_pretty(&summary)?);

    info!(
        elapsed = summary.elapsed,
        completed = summary.completed(),
        "Simulation complete"
    );
    Ok(())
}
