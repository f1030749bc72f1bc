//! Backend stand-in for running without hardware: logs and acknowledges.

use tracing::info;

use super::{BackendAck, DeviceBackend, StartRequest};
use crate::error::BackendError;

#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunBackend;

impl DeviceBackend for DryRunBackend {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn start_procedure(&self, request: &StartRequest) -> Result<BackendAck, BackendError> {
        for (i, step) in request.steps.iter().enumerate() {
            info!(
                step = i + 1,
                time = %step.duration(),
                intensity = step.intensity(),
                "dry run: would program step"
            );
        }
        info!(channels = ?request.selected_channels, "dry run: would start procedure");
        Ok(BackendAck {
            status: Some("success".into()),
            message: Some("dry run".into()),
        })
    }

    async fn stop_procedure(&self) -> Result<(), BackendError> {
        info!("dry run: would switch all channels off");
        Ok(())
    }
}
