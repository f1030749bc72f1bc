//! Keystroke-level input model for procedure steps.
//!
//! Malformed input is never an error here; every edit lands on a value the
//! form can display and the sequencer can run.

mod duration;
mod intensity;

pub use duration::{shift_duration, DurationInput};
pub use intensity::{edit_intensity, IntensityInput, MAX_INTENSITY};

use serde::{Deserialize, Serialize};

use crate::duration::FixedDuration;

/// Both input fields for one procedure step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInput {
    pub duration: DurationInput,
    pub intensity: IntensityInput,
}

impl StepInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite both fields, bypassing the edit rules.
    pub fn load(&mut self, duration: FixedDuration, intensity: u8) {
        self.duration.set(duration);
        self.intensity.set(intensity);
    }

    pub fn clear(&mut self) {
        self.duration.clear();
        self.intensity.clear();
    }
}
