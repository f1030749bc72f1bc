//! Device backend contract.
//!
//! The backend service energizes the hardware. The controller only needs
//! two calls from it: start a procedure and stop whatever is running.

mod dry_run;
mod http;

pub use dry_run::DryRunBackend;
pub use http::HttpBackend;

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::procedure::{Procedure, Step};

/// Body of `POST /start_procedure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRequest {
    /// Steps in procedure order.
    pub steps: Vec<Step>,
    pub selected_channels: Vec<u8>,
}

impl StartRequest {
    pub fn new(procedure: &Procedure, selected_channels: Vec<u8>) -> Self {
        Self {
            steps: procedure.steps().to_vec(),
            selected_channels,
        }
    }
}

/// Body the backend answers with.
///
/// Both fields are optional; any JSON object is an acknowledgement unless
/// `status` is `"error"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl BackendAck {
    pub fn is_rejection(&self) -> bool {
        self.status.as_deref() == Some("error")
    }
}

/// Every device backend implements this trait.
pub trait DeviceBackend: Send + Sync {
    /// Short identifier for logs (e.g. "http", "dry-run").
    fn name(&self) -> &str;

    /// Ask the device to run `request`. Must resolve before the local
    /// countdown begins.
    fn start_procedure(
        &self,
        request: &StartRequest,
    ) -> impl Future<Output = Result<BackendAck, BackendError>> + Send;

    /// Ask the device to switch everything off.
    fn stop_procedure(&self) -> impl Future<Output = Result<(), BackendError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::FixedDuration;

    #[test]
    fn start_request_wire_shape() {
        let procedure = Procedure::new(vec![
            Step::new(FixedDuration::new(0, 0, 10).unwrap(), 50).unwrap(),
            Step::new(FixedDuration::ZERO, 0).unwrap(),
        ]);
        let json = serde_json::to_value(StartRequest::new(&procedure, vec![1, 3])).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "steps": [
                    { "time": "00:00:10", "intensity": 50 },
                    { "time": "00:00:00", "intensity": 0 }
                ],
                "selected_channels": [1, 3]
            })
        );
    }

    #[test]
    fn ack_rejection() {
        let ack: BackendAck =
            serde_json::from_str(r#"{"status":"error","message":"SAFE MODE"}"#).unwrap();
        assert!(ack.is_rejection());
        let ack: BackendAck = serde_json::from_str("{}").unwrap();
        assert!(!ack.is_rejection());
    }
}
