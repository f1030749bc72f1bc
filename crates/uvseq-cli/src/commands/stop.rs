use clap::Args;
use serde_json::json;
use uvseq_core::{Config, DeviceBackend, DryRunBackend, HttpBackend};

#[derive(Args)]
pub struct StopArgs {
    /// Log the request instead of contacting the device
    #[arg(long)]
    dry_run: bool,
}

pub fn run(args: StopArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        if args.dry_run {
            send_stop(&DryRunBackend).await
        } else {
            send_stop(&HttpBackend::from_config(&config.backend)?).await
        }
    })
}

async fn send_stop<B: DeviceBackend>(backend: &B) -> Result<(), Box<dyn std::error::Error>> {
    backend.stop_procedure().await?;
    println!("{}", json!({ "type": "StopSent", "backend": backend.name() }));
    Ok(())
}
