//! Tokio driver for the [`Sequencer`].
//!
//! One task owns the sequencer and the only tick interval. Commands arrive
//! over a channel and are applied between ticks, so a tick never observes a
//! half-applied submit or stop. Whenever the sequencer's epoch moves (a step
//! was entered or the run ended) the interval is reset, which drops any tick
//! that was pending for the previous step.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

use super::engine::Sequencer;
use super::status::StatusProjection;
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::procedure::Procedure;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

const COMMAND_CAPACITY: usize = 16;
const EVENT_CAPACITY: usize = 64;

enum Command {
    Submit {
        procedure: Procedure,
        reply: oneshot::Sender<Event>,
    },
    Stop {
        reply: oneshot::Sender<Option<Event>>,
    },
    Snapshot {
        reply: oneshot::Sender<Event>,
    },
}

/// Cloneable handle to a running sequencer task.
///
/// The task exits once every handle is dropped.
#[derive(Clone)]
pub struct SequencerHandle {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<StatusProjection>,
    events: broadcast::Sender<Event>,
}

impl SequencerHandle {
    /// Spawn the sequencer task on the current tokio runtime.
    pub fn spawn(tick_period: Duration) -> Self {
        let (commands, command_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (status_tx, status) = watch::channel(StatusProjection::idle());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let runner = Runner {
            sequencer: Sequencer::new(),
            commands: command_rx,
            status: status_tx,
            events: events.clone(),
            tick_period,
        };
        tokio::spawn(runner.run());

        Self {
            commands,
            status,
            events,
        }
    }

    pub async fn submit(&self, procedure: Procedure) -> Result<Event> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit { procedure, reply }).await?;
        rx.await.map_err(|_| CoreError::SequencerGone)
    }

    /// Returns `None` if nothing was running.
    pub async fn stop(&self) -> Result<Option<Event>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Stop { reply }).await?;
        rx.await.map_err(|_| CoreError::SequencerGone)
    }

    pub async fn snapshot(&self) -> Result<Event> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| CoreError::SequencerGone)
    }

    /// Latest published status.
    pub fn status(&self) -> StatusProjection {
        self.status.borrow().clone()
    }

    /// Observe status changes; one change per tick while running.
    pub fn subscribe(&self) -> watch::Receiver<StatusProjection> {
        self.status.clone()
    }

    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Resolve once the published status is idle.
    pub async fn wait_idle(&self) -> Result<()> {
        let mut status = self.status.clone();
        status
            .wait_for(StatusProjection::is_idle)
            .await
            .map(|_| ())
            .map_err(|_| CoreError::SequencerGone)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| CoreError::SequencerGone)
    }
}

struct Runner {
    sequencer: Sequencer,
    commands: mpsc::Receiver<Command>,
    status: watch::Sender<StatusProjection>,
    events: broadcast::Sender<Event>,
    tick_period: Duration,
}

impl Runner {
    async fn run(mut self) {
        let mut ticks = time::interval_at(Instant::now() + self.tick_period, self.tick_period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut scheduled_epoch = self.sequencer.epoch();

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    self.handle(command);
                }
                _ = ticks.tick(), if self.sequencer.is_running() => {
                    let event = self.sequencer.tick_for(scheduled_epoch);
                    self.publish();
                    if let Some(event) = event {
                        self.emit(event);
                    }
                }
            }

            if self.sequencer.epoch() != scheduled_epoch {
                scheduled_epoch = self.sequencer.epoch();
                ticks.reset();
            }
        }
        debug!("sequencer task exiting, all handles dropped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Submit { procedure, reply } => {
                let event = self.sequencer.submit(procedure);
                self.publish();
                self.emit(event.clone());
                let _ = reply.send(event);
            }
            Command::Stop { reply } => {
                let event = self.sequencer.stop();
                self.publish();
                if let Some(event) = &event {
                    self.emit(event.clone());
                }
                let _ = reply.send(event);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.sequencer.snapshot());
            }
        }
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn publish(&self) {
        let next = self.sequencer.status();
        self.status.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}
