use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sequencer::{HaltReason, RefusalReason, SequencerState, StatusProjection};

/// Every sequencer transition produces an Event.
/// The CLI streams them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ProcedureStarted {
        step_count: usize,
        duration_secs: u64,
        intensity: u8,
        at: DateTime<Utc>,
    },
    /// Submit did not start a run; the sequencer is idle.
    SubmitRefused {
        reason: RefusalReason,
        at: DateTime<Utc>,
    },
    StepAdvanced {
        step_index: usize,
        duration_secs: u64,
        intensity: u8,
        at: DateTime<Utc>,
    },
    /// Last step ran out.
    ProcedureCompleted {
        step_count: usize,
        at: DateTime<Utc>,
    },
    /// The next step was a stop marker; `step_index` is that step.
    ProcedureHalted {
        step_index: usize,
        reason: HaltReason,
        at: DateTime<Utc>,
    },
    /// Operator cancelled mid-step.
    ProcedureStopped {
        step_index: usize,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: SequencerState,
        step_index: Option<usize>,
        remaining_secs: u64,
        status: StatusProjection,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// True for events after which the sequencer is idle.
    pub fn ends_run(&self) -> bool {
        matches!(
            self,
            Event::SubmitRefused { .. }
                | Event::ProcedureCompleted { .. }
                | Event::ProcedureHalted { .. }
                | Event::ProcedureStopped { .. }
        )
    }
}
