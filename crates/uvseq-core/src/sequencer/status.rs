use serde::{Deserialize, Serialize};

use super::engine::Sequencer;
use crate::duration::format_duration;

/// What the operator sees: time left, active intensity, 1-based step.
///
/// Derived from the sequencer on every observation; an idle sequencer
/// shows `("00:00:00", 0, 0)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusProjection {
    pub time: String,
    pub intensity: u8,
    pub step: usize,
}

impl StatusProjection {
    pub fn project(sequencer: &Sequencer) -> Self {
        let intensity = sequencer.active_step().map_or(0, |s| s.intensity());
        Self {
            time: format_duration(sequencer.remaining_secs()),
            intensity,
            step: sequencer.active_index().map_or(0, |i| i + 1),
        }
    }

    pub fn idle() -> Self {
        Self {
            time: format_duration(0),
            intensity: 0,
            step: 0,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.step == 0
    }
}

impl Default for StatusProjection {
    fn default() -> Self {
        Self::idle()
    }
}
