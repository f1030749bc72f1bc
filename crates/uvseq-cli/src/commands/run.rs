use clap::Args;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use uvseq_core::{
    ChannelSelection, Config, Controller, DeviceBackend, DryRunBackend, Event, FixedDuration,
    HttpBackend, ProcedureForm, SequencerHandle,
};

#[derive(Args)]
pub struct RunArgs {
    /// Load the steps from a configured preset
    #[arg(long, conflicts_with = "step", required_unless_present = "step")]
    preset: Option<String>,
    /// One step as HH:MM:SS@INTENSITY; repeat in execution order
    #[arg(long, value_name = "HH:MM:SS@N", value_parser = parse_step)]
    step: Vec<(FixedDuration, u8)>,
    /// Channel to energize; repeat for several
    #[arg(long, value_name = "N")]
    channel: Vec<u8>,
    /// Log device requests instead of sending them
    #[arg(long)]
    dry_run: bool,
}

fn parse_step(text: &str) -> Result<(FixedDuration, u8), String> {
    let (time, intensity) = text
        .split_once('@')
        .ok_or_else(|| format!("expected HH:MM:SS@INTENSITY, got '{text}'"))?;
    let duration: FixedDuration = time.parse().map_err(|e| format!("{e}"))?;
    let intensity: u8 = intensity
        .parse()
        .ok()
        .filter(|v| *v <= uvseq_core::input::MAX_INTENSITY)
        .ok_or_else(|| format!("intensity must be 0-100, got '{intensity}'"))?;
    Ok((duration, intensity))
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        if args.dry_run {
            drive(DryRunBackend, &config, &args).await
        } else {
            let backend = HttpBackend::from_config(&config.backend)?;
            drive(backend, &config, &args).await
        }
    })
}

async fn drive<B: DeviceBackend>(
    backend: B,
    config: &Config,
    args: &RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let slots = config.procedure.step_count.max(args.step.len());
    let mut controller = Controller::with_parts(
        backend,
        ProcedureForm::new(slots),
        ChannelSelection::new(config.channels.available.clone()),
        SequencerHandle::spawn(config.tick_period()),
    );

    if let Some(key) = &args.preset {
        controller.load_preset(config, key)?;
    }
    for (slot, (duration, intensity)) in args.step.iter().enumerate() {
        if let Some(input) = controller.form_mut().step_mut(slot) {
            input.load(*duration, *intensity);
        }
    }
    for &channel in &args.channel {
        let channels = controller.channels_mut();
        if !channels.available().contains(&channel) {
            return Err(format!(
                "channel {channel} is not one of {:?}",
                channels.available()
            )
            .into());
        }
        if !channels.is_selected(channel) {
            channels.toggle(channel);
        }
    }

    let mut events = controller.events();
    let mut status = controller.subscribe();

    info!(
        backend = controller.backend().name(),
        channels = ?controller.channels().selected(),
        "submitting procedure"
    );
    let started = controller.submit().await?;
    if let Event::SubmitRefused { reason, .. } = &started {
        print_json(&started)?;
        return Err(format!("procedure refused: {reason:?}").into());
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                print_json(&current)?;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    print_json(&event)?;
                    if event.ends_run() {
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            _ = &mut ctrl_c => {
                let report = controller.stop().await?;
                if let Some(event) = &report.event {
                    print_json(event)?;
                }
                report
                    .remote
                    .map_err(|e| format!("device stop failed: {e}"))?;
                break;
            }
        }
    }

    if status.has_changed().unwrap_or(false) {
        let current = status.borrow_and_update().clone();
        print_json(&current)?;
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
