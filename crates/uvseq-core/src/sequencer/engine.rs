//! Procedure sequencer.
//!
//! A countdown state machine over a submitted [`Procedure`]. Like a
//! wall-clock timer it owns no thread: something must call [`Sequencer::tick`]
//! once per second while it is running (see [`SequencerHandle`]).
//!
//! ## State Transitions
//!
//! ```text
//! Idle --submit--> Active(0) --tick*--> Active(1) ... --> Idle
//!                      \---------- stop / halt ------------/
//! ```
//!
//! A step with zero duration or zero intensity is a stop marker: reaching it
//! ends the run instead of executing an empty step.
//!
//! [`SequencerHandle`]: super::SequencerHandle

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::status::StatusProjection;
use crate::events::Event;
use crate::procedure::{Procedure, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequencerState {
    Idle,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalReason {
    EmptyProcedure,
    /// First step is `00:00:00`.
    FirstStepZeroDuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltReason {
    ZeroDuration,
    ZeroIntensity,
}

#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    procedure: Procedure,
    active_index: Option<usize>,
    remaining_secs: u64,
    running: bool,
    /// Bumped on every entry into a step and on every return to idle.
    /// A tick carrying an older epoch belongs to a finished step.
    epoch: u64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Why `procedure` would be refused by [`submit`](Self::submit), if at all.
    pub fn refusal_reason(procedure: &Procedure) -> Option<RefusalReason> {
        Self::first_step(procedure).err()
    }

    fn first_step(procedure: &Procedure) -> Result<Step, RefusalReason> {
        match procedure.get(0) {
            None => Err(RefusalReason::EmptyProcedure),
            Some(first) if first.duration_secs() == 0 => Err(RefusalReason::FirstStepZeroDuration),
            Some(first) => Ok(*first),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> SequencerState {
        if self.running {
            SequencerState::Active
        } else {
            SequencerState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The last submitted procedure. Kept read-only after the run ends.
    pub fn procedure(&self) -> &Procedure {
        &self.procedure
    }

    pub fn active_step(&self) -> Option<&Step> {
        self.active_index.and_then(|i| self.procedure.get(i))
    }

    pub fn status(&self) -> StatusProjection {
        StatusProjection::project(self)
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            step_index: self.active_index,
            remaining_secs: self.remaining_secs,
            status: self.status(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace whatever is running with `procedure` and start at step 0.
    pub fn submit(&mut self, procedure: Procedure) -> Event {
        self.procedure = procedure;

        let first = match Self::first_step(&self.procedure) {
            Ok(first) => first,
            Err(reason) => {
                warn!(?reason, "procedure refused, sequencer stays idle");
                self.go_idle();
                return Event::SubmitRefused {
                    reason,
                    at: Utc::now(),
                };
            }
        };

        let (duration_secs, intensity) = self.enter(0, first);
        info!(
            steps = self.procedure.len(),
            duration_secs, intensity, "procedure started"
        );
        Event::ProcedureStarted {
            step_count: self.procedure.len(),
            duration_secs,
            intensity,
            at: Utc::now(),
        }
    }

    /// One second elapsed. Returns an event when the active step ended.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        if self.remaining_secs > 1 {
            self.remaining_secs -= 1;
            debug!(remaining_secs = self.remaining_secs, "tick");
            return None;
        }
        self.remaining_secs = 0;
        Some(self.advance())
    }

    /// Tick on behalf of a schedule created at `epoch`; stale ticks are dropped.
    pub fn tick_for(&mut self, epoch: u64) -> Option<Event> {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "dropping stale tick");
            return None;
        }
        self.tick()
    }

    /// Operator cancellation. No-op when already idle.
    pub fn stop(&mut self) -> Option<Event> {
        let step_index = self.active_index.filter(|_| self.running)?;
        let remaining_secs = self.remaining_secs;
        self.go_idle();
        info!(step = step_index + 1, remaining_secs, "procedure stopped by operator");
        Some(Event::ProcedureStopped {
            step_index,
            remaining_secs,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self) -> Event {
        let next = self.active_index.map_or(0, |i| i + 1);

        let Some(step) = self.procedure.get(next).copied() else {
            self.go_idle();
            info!(steps = self.procedure.len(), "procedure complete");
            return Event::ProcedureCompleted {
                step_count: self.procedure.len(),
                at: Utc::now(),
            };
        };

        let halt = if step.duration_secs() == 0 {
            Some(HaltReason::ZeroDuration)
        } else if step.intensity() == 0 {
            Some(HaltReason::ZeroIntensity)
        } else {
            None
        };
        if let Some(reason) = halt {
            self.go_idle();
            warn!(step = next + 1, ?reason, "procedure halted");
            return Event::ProcedureHalted {
                step_index: next,
                reason,
                at: Utc::now(),
            };
        }

        let (duration_secs, intensity) = self.enter(next, step);
        info!(step = next + 1, duration_secs, intensity, "advanced to next step");
        Event::StepAdvanced {
            step_index: next,
            duration_secs,
            intensity,
            at: Utc::now(),
        }
    }

    fn enter(&mut self, index: usize, step: Step) -> (u64, u8) {
        self.active_index = Some(index);
        self.remaining_secs = step.duration_secs();
        self.running = true;
        self.epoch += 1;
        (step.duration_secs(), step.intensity())
    }

    fn go_idle(&mut self) {
        self.active_index = None;
        self.remaining_secs = 0;
        self.running = false;
        self.epoch += 1;
    }
}
