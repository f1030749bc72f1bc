use serde::{Deserialize, Serialize};

use crate::duration::FixedDuration;
use crate::error::StepError;
use crate::input::MAX_INTENSITY;

/// One duration + intensity unit of a procedure.
///
/// Serializes to the backend wire shape `{ "time": "HH:MM:SS", "intensity": n }`.
/// Intensity is always within `0..=100`, including when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireStep")]
pub struct Step {
    #[serde(rename = "time")]
    duration: FixedDuration,
    intensity: u8,
}

#[derive(Deserialize)]
struct WireStep {
    time: FixedDuration,
    intensity: u8,
}

impl TryFrom<WireStep> for Step {
    type Error = StepError;

    fn try_from(wire: WireStep) -> Result<Self, Self::Error> {
        Self::new(wire.time, wire.intensity)
    }
}

impl Step {
    pub fn new(duration: FixedDuration, intensity: u8) -> Result<Self, StepError> {
        if intensity > MAX_INTENSITY {
            return Err(StepError::IntensityOutOfRange(intensity));
        }
        Ok(Self {
            duration,
            intensity,
        })
    }

    /// Build from input fields, saturating intensity at 100.
    pub(crate) fn saturating(duration: FixedDuration, intensity: u8) -> Self {
        Self {
            duration,
            intensity: intensity.min(MAX_INTENSITY),
        }
    }

    pub fn duration(&self) -> FixedDuration {
        self.duration
    }

    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration.total_seconds()
    }
}

/// Ordered, immutable list of steps handed to the sequencer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Procedure {
    steps: Vec<Step>,
}

impl Procedure {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl FromIterator<Step> for Procedure {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
