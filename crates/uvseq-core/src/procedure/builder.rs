//! The operator form: one [`StepInput`] per procedure slot.

use tracing::debug;

use super::preset::Preset;
use super::step::{Procedure, Step};
use crate::error::PresetError;
use crate::input::StepInput;

/// Default number of step slots on the form.
pub const DEFAULT_STEP_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureForm {
    inputs: Vec<StepInput>,
}

impl Default for ProcedureForm {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_COUNT)
    }
}

impl ProcedureForm {
    /// Create a blank form. A count of zero is raised to one slot.
    pub fn new(step_count: usize) -> Self {
        Self {
            inputs: vec![StepInput::new(); step_count.max(1)],
        }
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&StepInput> {
        self.inputs.get(index)
    }

    pub fn step_mut(&mut self, index: usize) -> Option<&mut StepInput> {
        self.inputs.get_mut(index)
    }

    pub fn inputs(&self) -> &[StepInput] {
        &self.inputs
    }

    /// Snapshot the form as a procedure, one step per slot, in slot order.
    pub fn build(&self) -> Procedure {
        self.inputs
            .iter()
            .map(|input| Step::saturating(input.duration.value(), input.intensity.value()))
            .collect()
    }

    /// Overwrite every slot from a preset, bypassing the edit rules.
    ///
    /// Nothing is changed if the preset cannot be decoded.
    pub fn load_preset(&mut self, key: &str, preset: &Preset) -> Result<(), PresetError> {
        let steps = preset.steps(key, self.inputs.len())?;
        for (input, (duration, intensity)) in self.inputs.iter_mut().zip(steps) {
            input.load(duration, intensity);
        }
        debug!(preset = key, name = %preset.procedure, "loaded preset into form");
        Ok(())
    }

    /// Reset every slot to `00:00:00` and intensity 0.
    pub fn clear(&mut self) {
        self.inputs.iter_mut().for_each(StepInput::clear);
    }
}
