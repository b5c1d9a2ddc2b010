/*!
 * Render Task
 *
 * Periodic, read-only polling of the run's timeline. Every interval tick
 * captures a `Frame` and publishes it on a watch channel; the simulation
 * clock is never touched.
 *
 * # Lifecycle binding
 * `start_on_start` holds capture until the run's start event and
 * `stop_on_finish` takes a last frame and stops on the finish event. Both
 * must be attached before the scheduler starts.
 *
 * # Shutdown
 * - Preferred: `shutdown().await` sends a shutdown command and awaits the
 *   task. Consumes self.
 * - Fallback: dropping the handle aborts the task. The task holds nothing
 *   but a timer, so aborting between polls leaves no partial state.
 */

use super::frame::Frame;
use crate::core::errors::ConfigError;
use crate::scheduler::{EventKind, RunContext, SubscriptionId};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Control messages for the render task
#[derive(Debug, Clone)]
pub enum RenderCommand {
    /// Change the polling interval
    UpdateInterval(Duration),
    /// Stop capturing frames
    Pause,
    /// Resume capturing frames
    Resume,
    /// Capture a frame immediately
    Trigger,
    /// Stop the task
    Shutdown,
}

/// Handle to the render background task
pub struct RenderTask {
    ctx: Arc<RunContext>,
    command_tx: mpsc::UnboundedSender<RenderCommand>,
    frames: watch::Receiver<Frame>,
    handle: Option<tokio::task::JoinHandle<()>>,
    subscriptions: Vec<SubscriptionId>,
    shutdown_initiated: Arc<AtomicBool>,
}

impl RenderTask {
    /// Spawn a render task polling at the run's configured interval
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(ctx: Arc<RunContext>) -> Self {
        // Non-zero: SimConfig::validate ran in RunContext::new
        let interval = ctx.config().render_interval();
        Self::launch(ctx, interval)
    }

    /// Spawn a render task with an explicit polling interval
    ///
    /// A zero interval is rejected, as it is in `SimConfig`.
    pub fn spawn_with_interval(ctx: Arc<RunContext>, interval: Duration) -> Result<Self, ConfigError> {
        check_interval(interval)?;
        Ok(Self::launch(ctx, interval))
    }

    fn launch(ctx: Arc<RunContext>, interval: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (frame_tx, frames) = watch::channel(Frame::default());

        let task_ctx = Arc::clone(&ctx);
        let handle = tokio::spawn(async move {
            run_render_loop(task_ctx, interval, frame_tx, command_rx).await;
        });

        info!("Render task spawned (interval {:?})", interval);

        Self {
            ctx,
            command_tx,
            frames,
            handle: Some(handle),
            subscriptions: Vec::new(),
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Capture a final frame and stop when the run finishes
    pub fn stop_on_finish(mut self) -> Self {
        let tx = self.command_tx.clone();
        let id = self.ctx.events().subscribe(EventKind::Finished, move |_| {
            let _ = tx.send(RenderCommand::Trigger);
            let _ = tx.send(RenderCommand::Shutdown);
        });
        self.subscriptions.push(id);
        self
    }

    /// Hold frame capture until the run's start event
    pub fn start_on_start(mut self) -> Self {
        let _ = self.command_tx.send(RenderCommand::Pause);
        let tx = self.command_tx.clone();
        let id = self.ctx.events().subscribe(EventKind::Started, move |_| {
            let _ = tx.send(RenderCommand::Resume);
        });
        self.subscriptions.push(id);
        self
    }

    /// Receiver of the latest frame
    pub fn frames(&self) -> watch::Receiver<Frame> {
        self.frames.clone()
    }

    /// Most recently published frame
    pub fn latest(&self) -> Frame {
        self.frames.borrow().clone()
    }

    /// Change the polling interval; zero is rejected
    pub fn update_interval(&self, interval: Duration) -> Result<(), ConfigError> {
        check_interval(interval)?;
        let _ = self.command_tx.send(RenderCommand::UpdateInterval(interval));
        Ok(())
    }

    pub fn pause(&self) {
        let _ = self.command_tx.send(RenderCommand::Pause);
    }

    pub fn resume(&self) {
        let _ = self.command_tx.send(RenderCommand::Resume);
    }

    pub fn trigger(&self) {
        let _ = self.command_tx.send(RenderCommand::Trigger);
    }

    /// Whether the background task has exited
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Stop the task and wait for it; returns the last frame
    pub async fn shutdown(mut self) -> Frame {
        self.shutdown_initiated.store(true, Ordering::SeqCst);
        self.unsubscribe();

        let _ = self.command_tx.send(RenderCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Render task shutdown error: {}", e);
            } else {
                info!("Render task shutdown complete");
            }
        }

        self.latest()
    }

    fn unsubscribe(&mut self) {
        for id in self.subscriptions.drain(..) {
            self.ctx.events().unsubscribe(id);
        }
    }
}

fn check_interval(interval: Duration) -> Result<(), ConfigError> {
    if interval.is_zero() {
        return Err(ConfigError::InvalidValue {
            key: "render_interval".to_string(),
            value: format!("{:?}", interval),
        });
    }
    Ok(())
}

async fn run_render_loop(
    ctx: Arc<RunContext>,
    period: Duration,
    frames: watch::Sender<Frame>,
    mut command_rx: mpsc::UnboundedReceiver<RenderCommand>,
) {
    let mut active = true;
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let publish = |frames: &watch::Sender<Frame>| match Frame::capture(&ctx) {
        Ok(frame) => {
            log::trace!("Frame captured at t={}", frame.elapsed);
            frames.send_replace(frame);
        }
        Err(e) => warn!("Frame capture failed: {}", e),
    };

    loop {
        tokio::select! {
            // Pending commands apply before the next capture
            biased;

            command = command_rx.recv() => {
                match command {
                    Some(RenderCommand::UpdateInterval(new_period)) => {
                        info!("Render interval updated: {:?}", new_period);
                        interval = tokio::time::interval(new_period);
                        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                    }
                    Some(RenderCommand::Pause) => {
                        info!("Render task paused");
                        active = false;
                    }
                    Some(RenderCommand::Resume) => {
                        info!("Render task resumed");
                        active = true;
                    }
                    Some(RenderCommand::Trigger) => publish(&frames),
                    Some(RenderCommand::Shutdown) | None => {
                        info!("Render task shutting down");
                        break;
                    }
                }
            }

            _ = interval.tick() => {
                if active {
                    publish(&frames);
                }
            }
        }
    }
}

impl Drop for RenderTask {
    fn drop(&mut self) {
        self.unsubscribe();

        if self.shutdown_initiated.load(Ordering::SeqCst) {
            return;
        }

        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                warn!("RenderTask dropped without shutdown() - aborting task");
            }
            handle.abort();
        }
    }
}
