mod builder;
mod preset;
mod step;

pub use builder::{ProcedureForm, DEFAULT_STEP_COUNT};
pub use preset::{builtin_presets, Preset, PresetField};
pub use step::{Procedure, Step};
