mod engine;
mod runtime;
mod status;

pub use engine::{HaltReason, RefusalReason, Sequencer, SequencerState};
pub use runtime::{SequencerHandle, DEFAULT_TICK_PERIOD};
pub use status::StatusProjection;
