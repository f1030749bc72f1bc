//! # uvseq Core Library
//!
//! Core logic for a multi-step UV exposure controller. Every operation is
//! reachable from the standalone `uvseq` CLI; a front end only edits the
//! step form and renders the status projection.
//!
//! ## Architecture
//!
//! - **Duration codec**: `HH:MM:SS` text to seconds and back
//! - **Input**: digit-shift buffers for step durations and intensities
//! - **Procedure**: the editable step form, built-in and configured presets
//! - **Sequencer**: a caller-ticked state machine, plus a tokio task that
//!   owns it and drives the one-second countdown
//! - **Backend**: the device contract (`start_procedure` / `stop_procedure`)
//!   over HTTP, or a dry-run stand-in
//! - **Storage**: TOML configuration under `~/.config/uvseq`
//!
//! ## Key Components
//!
//! - [`Sequencer`]: procedure state machine
//! - [`SequencerHandle`]: timer-driven runtime around a [`Sequencer`]
//! - [`Controller`]: form, channels, backend and sequencer wired together
//! - [`DeviceBackend`]: trait for device backends
//! - [`Config`]: application configuration management

pub mod backend;
pub mod channels;
pub mod controller;
pub mod duration;
pub mod error;
pub mod events;
pub mod input;
pub mod procedure;
pub mod sequencer;
pub mod storage;

pub use backend::{BackendAck, DeviceBackend, DryRunBackend, HttpBackend, StartRequest};
pub use channels::ChannelSelection;
pub use controller::{Controller, StopReport};
pub use duration::{format_duration, parse_duration, FixedDuration};
pub use error::{BackendError, ConfigError, CoreError, DurationError, PresetError, StepError};
pub use events::Event;
pub use input::{DurationInput, IntensityInput, StepInput};
pub use procedure::{builtin_presets, Preset, Procedure, ProcedureForm, Step};
pub use sequencer::{
    HaltReason, RefusalReason, Sequencer, SequencerHandle, SequencerState, StatusProjection,
};
pub use storage::Config;
