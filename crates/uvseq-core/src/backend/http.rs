//! HTTP client for the device backend service.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{BackendAck, DeviceBackend, StartRequest};
use crate::error::BackendError;
use crate::storage::BackendConfig;

const START_PATH: &str = "start_procedure";
const STOP_PATH: &str = "stop_procedure";

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// `base_url` must be an `http` or `https` URL; endpoints are resolved
    /// relative to it.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let invalid = |message: String| BackendError::InvalidUrl {
            url: base_url.to_string(),
            message,
        };
        let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: url,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::InvalidUrl {
                url: self.base_url.to_string(),
                message: e.to_string(),
            })
    }
}

impl DeviceBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn start_procedure(&self, request: &StartRequest) -> Result<BackendAck, BackendError> {
        let url = self.endpoint(START_PATH)?;
        debug!(%url, steps = request.steps.len(), "submitting procedure to backend");

        let resp = self.client.post(url).json(request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let ack: BackendAck =
            serde_json::from_str(&body).map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        if ack.is_rejection() {
            return Err(BackendError::Rejected {
                message: ack.message.unwrap_or_else(|| "no reason given".into()),
            });
        }
        Ok(ack)
    }

    async fn stop_procedure(&self) -> Result<(), BackendError> {
        let url = self.endpoint(STOP_PATH)?;
        debug!(%url, "asking backend to stop");

        let resp = self.client.post(url).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(BackendError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
