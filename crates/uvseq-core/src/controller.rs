//! Operator-facing controller.
//!
//! Owns the step form, channel selection, device backend and sequencer. A
//! submission reaches the device before the local countdown starts; a stop
//! takes effect locally before the device is told.

use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::backend::{DeviceBackend, StartRequest};
use crate::channels::ChannelSelection;
use crate::error::{BackendError, Result};
use crate::events::Event;
use crate::procedure::{ProcedureForm, Procedure};
use crate::sequencer::{Sequencer, SequencerHandle, StatusProjection};
use crate::storage::Config;

/// Outcome of [`Controller::stop`].
///
/// The local stop always happens; `remote` carries the device's answer.
#[derive(Debug)]
pub struct StopReport {
    /// `None` if nothing was running locally.
    pub event: Option<Event>,
    pub remote: std::result::Result<(), BackendError>,
}

pub struct Controller<B> {
    form: ProcedureForm,
    channels: ChannelSelection,
    backend: B,
    sequencer: SequencerHandle,
}

impl<B: DeviceBackend> Controller<B> {
    /// Build a controller sized from `config`. Spawns the sequencer task,
    /// so this must run inside a tokio runtime.
    pub fn new(backend: B, config: &Config) -> Self {
        Self::with_parts(
            backend,
            ProcedureForm::new(config.procedure.step_count),
            ChannelSelection::new(config.channels.available.clone()),
            SequencerHandle::spawn(config.tick_period()),
        )
    }

    pub fn with_parts(
        backend: B,
        form: ProcedureForm,
        channels: ChannelSelection,
        sequencer: SequencerHandle,
    ) -> Self {
        Self {
            form,
            channels,
            backend,
            sequencer,
        }
    }

    pub fn form(&self) -> &ProcedureForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProcedureForm {
        &mut self.form
    }

    pub fn channels(&self) -> &ChannelSelection {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut ChannelSelection {
        &mut self.channels
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn sequencer(&self) -> &SequencerHandle {
        &self.sequencer
    }

    /// Replace the form contents with preset `key` from `config`.
    pub fn load_preset(&mut self, config: &Config, key: &str) -> Result<()> {
        let preset = config.preset(key)?;
        self.form.load_preset(key, preset)?;
        Ok(())
    }

    /// Build the procedure from the form and run it.
    ///
    /// A procedure the sequencer would refuse never reaches the device. A
    /// backend failure is returned and the local sequencer is left as it was.
    ///
    /// A refusal while a run is active still idles the sequencer and tells
    /// the device to stop. If that stop request fails, its error is returned
    /// instead of the refusal event; the sequencer is idle either way.
    pub async fn submit(&mut self) -> Result<Event> {
        let procedure = self.form.build();

        if let Some(reason) = Sequencer::refusal_reason(&procedure) {
            warn!(?reason, "not sending procedure to device");
            let was_running = !self.sequencer.status().is_idle();
            let event = self.sequencer.submit(procedure).await?;
            if was_running {
                self.notify_stop().await?;
            }
            return Ok(event);
        }

        self.start_remote(&procedure).await?;
        self.sequencer.submit(procedure).await
    }

    /// Stop locally, then tell the device. A device failure does not undo
    /// the local stop.
    pub async fn stop(&mut self) -> Result<StopReport> {
        let event = self.sequencer.stop().await?;
        let remote = self.notify_stop().await;
        Ok(StopReport { event, remote })
    }

    pub fn status(&self) -> StatusProjection {
        self.sequencer.status()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusProjection> {
        self.sequencer.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.sequencer.events()
    }

    pub async fn wait_idle(&self) -> Result<()> {
        self.sequencer.wait_idle().await
    }

    async fn start_remote(&self, procedure: &Procedure) -> Result<()> {
        let request = StartRequest::new(procedure, self.channels.selected());
        match self.backend.start_procedure(&request).await {
            Ok(ack) => {
                info!(
                    backend = self.backend.name(),
                    message = ack.message.as_deref().unwrap_or(""),
                    "device accepted procedure"
                );
                Ok(())
            }
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "device did not accept procedure");
                Err(e.into())
            }
        }
    }

    async fn notify_stop(&self) -> std::result::Result<(), BackendError> {
        let result = self.backend.stop_procedure().await;
        if let Err(e) = &result {
            warn!(backend = self.backend.name(), error = %e, "device stop request failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendAck;
    use crate::error::CoreError;
    use crate::sequencer::DEFAULT_TICK_PERIOD;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct FakeBackend {
        fail_start: bool,
        fail_stop: bool,
        starts: Arc<Mutex<Vec<StartRequest>>>,
        stops: Arc<Mutex<usize>>,
    }

    impl DeviceBackend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }

        async fn start_procedure(
            &self,
            request: &StartRequest,
        ) -> std::result::Result<BackendAck, BackendError> {
            self.starts.lock().unwrap().push(request.clone());
            if self.fail_start {
                return Err(BackendError::Rejected {
                    message: "SAFE MODE".into(),
                });
            }
            Ok(BackendAck::default())
        }

        async fn stop_procedure(&self) -> std::result::Result<(), BackendError> {
            *self.stops.lock().unwrap() += 1;
            if self.fail_stop {
                return Err(BackendError::Status {
                    status: 500,
                    body: String::new(),
                });
            }
            Ok(())
        }
    }

    fn controller(backend: FakeBackend) -> Controller<FakeBackend> {
        Controller::with_parts(
            backend,
            ProcedureForm::new(3),
            ChannelSelection::default(),
            SequencerHandle::spawn(DEFAULT_TICK_PERIOD),
        )
    }

    fn fill(form: &mut ProcedureForm, steps: &[(&str, u8)]) {
        for (i, (digits, intensity)) in steps.iter().enumerate() {
            let slot = form.step_mut(i).unwrap();
            for d in digits.bytes() {
                slot.duration.type_digit(d - b'0');
            }
            slot.intensity.set(*intensity);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn submit_reaches_device_then_counts_down() {
        let backend = FakeBackend::default();
        let mut ctl = controller(backend.clone());
        fill(ctl.form_mut(), &[("10", 50), ("5", 20)]);
        ctl.channels_mut().toggle(2);

        let event = ctl.submit().await.unwrap();
        assert!(matches!(event, Event::ProcedureStarted { .. }));
        assert_eq!(ctl.status().time, "00:00:10");

        let starts = backend.starts.lock().unwrap().clone();
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[0].steps.len(), 3);
        assert_eq!(starts[0].selected_channels, vec![2]);

        ctl.wait_idle().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn backend_failure_leaves_sequencer_idle() {
        let backend = FakeBackend {
            fail_start: true,
            ..Default::default()
        };
        let mut ctl = controller(backend);
        fill(ctl.form_mut(), &[("10", 50)]);

        let err = ctl.submit().await.unwrap_err();
        assert!(matches!(err, CoreError::Backend(BackendError::Rejected { .. })));
        assert_eq!(ctl.status(), StatusProjection::idle());
    }

    #[tokio::test(start_paused = true)]
    async fn refused_procedure_never_reaches_device() {
        let backend = FakeBackend::default();
        let mut ctl = controller(backend.clone());

        let event = ctl.submit().await.unwrap();
        assert!(matches!(event, Event::SubmitRefused { .. }));
        assert!(backend.starts.lock().unwrap().is_empty());
        assert_eq!(*backend.stops.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn refused_resubmit_stops_running_device() {
        let backend = FakeBackend::default();
        let mut ctl = controller(backend.clone());
        fill(ctl.form_mut(), &[("10", 50)]);
        ctl.submit().await.unwrap();

        ctl.form_mut().clear();
        let event = ctl.submit().await.unwrap();
        assert!(matches!(event, Event::SubmitRefused { .. }));
        assert!(ctl.status().is_idle());
        assert_eq!(*backend.stops.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refused_resubmit_reports_failed_device_stop() {
        let backend = FakeBackend {
            fail_stop: true,
            ..Default::default()
        };
        let mut ctl = controller(backend.clone());
        fill(ctl.form_mut(), &[("10", 50)]);
        ctl.submit().await.unwrap();

        ctl.form_mut().clear();
        let err = ctl.submit().await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Backend(BackendError::Status { status: 500, .. })
        ));
        assert!(ctl.status().is_idle());
        assert_eq!(*backend.stops.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_local_first_even_if_device_fails() {
        let backend = FakeBackend {
            fail_stop: true,
            ..Default::default()
        };
        let mut ctl = controller(backend.clone());
        fill(ctl.form_mut(), &[("10", 50)]);
        ctl.submit().await.unwrap();

        let report = ctl.stop().await.unwrap();
        assert!(matches!(report.event, Some(Event::ProcedureStopped { .. })));
        assert!(report.remote.is_err());
        assert!(ctl.status().is_idle());

        let again = ctl.stop().await.unwrap();
        assert!(again.event.is_none());
        assert_eq!(*backend.stops.lock().unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn preset_loads_into_form() {
        let mut ctl = controller(FakeBackend::default());
        let mut config = Config::default();
        config.procedure.step_count = 3;
        ctl.load_preset(&config, "standard_cure").unwrap();
        assert_eq!(ctl.form().build().get(0).unwrap().duration_secs(), 60);

        let err = ctl.load_preset(&config, "missing").unwrap_err();
        assert!(matches!(err, CoreError::Preset(_)));
    }
}
