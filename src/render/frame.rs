/*!
 * Timeline Frames
 * One read-only snapshot of every processor's sliding window
 */

use crate::core::errors::TimelineError;
use crate::core::types::{ProcessorId, Tick};
use crate::processor::Core;
use crate::scheduler::RunContext;
use crate::timeline::{SegmentView, Window};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// One processor row of a frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Row {
    pub processor: ProcessorId,
    pub core: Core,
    pub active: bool,
    pub segments: Vec<SegmentView>,
}

/// Snapshot handed to the renderer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Frame {
    pub elapsed: Tick,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub window: Option<Window>,
    pub rows: Vec<Row>,
}

impl Frame {
    /// Capture the sliding window of every processor
    ///
    /// Reads `elapsed` once, so every row covers the same ticks even while
    /// the driver keeps appending.
    pub fn capture(ctx: &RunContext) -> Result<Self, TimelineError> {
        let elapsed = ctx.elapsed_time();
        let window = Window::sliding(elapsed, ctx.config().window_size);

        let rows = ctx
            .processor_list()
            .iter()
            .map(|processor| {
                let segments = match window {
                    Some(window) => ctx
                        .timeline(processor.id(), window)?
                        .iter()
                        .map(|s| s.view())
                        .collect(),
                    None => Vec::new(),
                };
                Ok(Row {
                    processor: processor.id(),
                    core: processor.core(),
                    active: processor.is_active(),
                    segments,
                })
            })
            .collect::<Result<Vec<_>, TimelineError>>()?;

        Ok(Self {
            elapsed,
            window,
            rows,
        })
    }

    /// Plain-text gantt view, one line per processor
    ///
    /// Each tick cell shows the pid (mod 36) of its occupant, `.` when idle.
    pub fn to_ascii(&self) -> String {
        let width = self.window.map_or(0, |w| w.len()) as usize;
        let mut out = String::new();

        let (lo, hi) = self.window.map_or((0, 0), |w| (w.lo(), w.hi()));
        let _ = writeln!(out, "t={} window=[{}, {}]", self.elapsed, lo, hi);

        for row in &self.rows {
            let mut cells = vec!['.'; width];
            for segment in &row.segments {
                let glyph = std::char::from_digit(segment.pid % 36, 36).unwrap_or('?');
                for index in segment.start..segment.start + segment.length {
                    if let Some(cell) = cells.get_mut(index as usize) {
                        *cell = glyph;
                    }
                }
            }

            let state = if row.active { row.core.name() } else { "OFF" };
            let _ = writeln!(
                out,
                "{:>2} {:<6} |{}|",
                row.processor,
                state,
                cells.into_iter().collect::<String>()
            );
        }
        out
    }
}
