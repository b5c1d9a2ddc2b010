/*!
 * Timeline Reconstructor
 *
 * Turns per-tick ledger history into contiguous execution segments for a
 * bounded window. Pure and query-only: every call reads the ledger afresh,
 * so it is safe to call repeatedly while the window slides.
 *
 * A run that started before the window is reported from index 0 with only
 * its visible length; the reconstructor never looks outside `[lo, hi]`.
 */

mod window;

pub use window::Window;

use crate::core::errors::TimelineError;
use crate::core::types::{Pid, ProcessorId, Tick};
use crate::ledger::{ExecutionLedger, Occupant};
use crate::process::Process;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maximal run of ticks with the same occupant
#[derive(Debug, Clone)]
pub struct Segment {
    pub process: Arc<Process>,
    /// Index relative to the window start
    pub start: Tick,
    pub length: Tick,
}

impl Segment {
    pub fn pid(&self) -> Pid {
        self.process.pid()
    }

    /// One past the last window-relative index covered
    pub fn end(&self) -> Tick {
        self.start + self.length
    }

    pub fn view(&self) -> SegmentView {
        SegmentView {
            pid: self.pid(),
            mission: self.process.is_mission(),
            start: self.start,
            length: self.length,
        }
    }
}

/// Serializable segment without the process handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SegmentView {
    pub pid: Pid,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub mission: bool,
    pub start: Tick,
    pub length: Tick,
}

/// Reconstruct the segments of `processor` inside `window`
///
/// Fails with an out-of-range ledger error if the window reaches past the
/// recorded history; callers clamp to `[0, elapsed)` first.
pub fn reconstruct(
    ledger: &ExecutionLedger,
    processor: ProcessorId,
    window: Window,
) -> Result<Vec<Segment>, TimelineError> {
    let occupants = ledger
        .processor_record(processor)?
        .range(window.lo(), window.hi())?;
    Ok(coalesce(&occupants))
}

/// Merge consecutive identical occupants into segments
///
/// Occupants are identical when they are the same `Process` handle; two
/// processes that happen to share a pid never merge.
///
/// Idle ticks close the open segment and produce none of their own. The run
/// still open after the last index is flushed.
pub fn coalesce(occupants: &[Occupant]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut open: Option<Segment> = None;

    for (index, occupant) in occupants.iter().enumerate() {
        let extends = matches!(
            (&open, occupant),
            (Some(segment), Some(process)) if Arc::ptr_eq(&segment.process, process)
        );

        if extends {
            if let Some(segment) = open.as_mut() {
                segment.length += 1;
            }
            continue;
        }

        if let Some(segment) = open.take() {
            segments.push(segment);
        }

        open = occupant.as_ref().map(|process| Segment {
            process: Arc::clone(process),
            start: index as Tick,
            length: 1,
        });
    }

    if let Some(segment) = open {
        segments.push(segment);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn process(pid: Pid) -> Arc<Process> {
        Arc::new(Process::new(pid, 0, 100).unwrap())
    }

    fn spans(segments: &[Segment]) -> Vec<(Pid, Tick, Tick)> {
        segments
            .iter()
            .map(|s| (s.pid(), s.start, s.length))
            .collect()
    }

    fn ledger_of(occupants: &[Occupant]) -> ExecutionLedger {
        let ledger = ExecutionLedger::new(1);
        for (tick, occupant) in occupants.iter().enumerate() {
            ledger.record(0, tick as Tick, occupant.clone()).unwrap();
        }
        ledger
    }

    #[test]
    fn test_coalesce_skips_idle() {
        let (a, b) = (process(0), process(1));
        let history = vec![
            Some(a.clone()),
            Some(a.clone()),
            Some(b.clone()),
            Some(b.clone()),
            Some(b.clone()),
            None,
            Some(a.clone()),
        ];

        let ledger = ledger_of(&history);
        let segments = reconstruct(&ledger, 0, Window::new(0, 6).unwrap()).unwrap();

        assert_eq!(spans(&segments), vec![(0, 0, 2), (1, 2, 3), (0, 6, 1)]);
    }

    #[test]
    fn test_trailing_run_flushed() {
        let (a, b) = (process(0), process(1));
        let history = vec![Some(a.clone()), Some(b.clone()), Some(b.clone()), Some(b)];

        assert_eq!(spans(&coalesce(&history)), vec![(0, 0, 1), (1, 1, 3)]);
    }

    #[test]
    fn test_run_before_window_truncated() {
        let a = process(0);
        let history = vec![Some(a.clone()); 5];
        let ledger = ledger_of(&history);

        let segments = reconstruct(&ledger, 0, Window::new(3, 4).unwrap()).unwrap();
        assert_eq!(spans(&segments), vec![(0, 0, 2)]);
    }

    #[test]
    fn test_same_process_split_by_idle() {
        let a = process(0);
        let history = vec![Some(a.clone()), None, Some(a)];
        assert_eq!(spans(&coalesce(&history)), vec![(0, 0, 1), (0, 2, 1)]);
    }

    #[test]
    fn test_distinct_processes_sharing_pid_not_merged() {
        let (a, b) = (process(7), process(7));
        let history = vec![Some(a.clone()), Some(a), Some(b)];

        let segments = coalesce(&history);
        assert_eq!(spans(&segments), vec![(7, 0, 2), (7, 2, 1)]);
        assert!(!Arc::ptr_eq(&segments[0].process, &segments[1].process));
    }

    #[test]
    fn test_all_idle() {
        assert!(coalesce(&[None, None, None]).is_empty());
        assert!(coalesce(&[]).is_empty());
    }

    #[test]
    fn test_window_past_history_out_of_range() {
        let ledger = ledger_of(&[None, None]);
        let err = reconstruct(&ledger, 0, Window::new(0, 2).unwrap()).unwrap_err();
        assert!(matches!(err, TimelineError::Ledger(_)));
    }

    #[test]
    fn test_unknown_processor() {
        let ledger = ledger_of(&[None]);
        assert!(reconstruct(&ledger, 5, Window::new(0, 0).unwrap()).is_err());
    }
}
