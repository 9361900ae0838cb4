//! Ways for the client to reach a relay.

use crate::analysis::AnalysisResult;
use crate::error::ClientError;
use crate::relay::{Relay, RelayEnvelope, RelayRequest};
use async_trait::async_trait;

/// Something that turns (chart, credential) into an analysis.
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn analyze(&self, image: &str, api_key: &str) -> Result<AnalysisResult, ClientError>;
}

/// Talks to a relay over HTTP.
pub struct HttpRelayClient {
    url: String,
    client: reqwest::Client,
}

impl HttpRelayClient {
    /// `url` is the full analyze route, e.g. `http://127.0.0.1:3000/api/analyze`.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn analyze(&self, image: &str, api_key: &str) -> Result<AnalysisResult, ClientError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&RelayRequest::new(image, api_key))
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("Relay request failed: {e}")))?;

        let status = resp.status().as_u16();
        let envelope: RelayEnvelope = resp.json().await.map_err(|e| {
            tracing::debug!("Relay answered {status} with a non-envelope body: {e}");
            ClientError::InvalidResponse
        })?;

        match envelope {
            RelayEnvelope {
                error: Some(message),
                ..
            } => Err(ClientError::Relay { status, message }),
            RelayEnvelope {
                data: Some(data), ..
            } => Ok(data),
            _ => Err(ClientError::InvalidResponse),
        }
    }
}

/// Runs the relay in-process.
pub struct LocalRelay {
    relay: Relay,
}

impl LocalRelay {
    pub fn new(relay: Relay) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl RelayClient for LocalRelay {
    async fn analyze(&self, image: &str, api_key: &str) -> Result<AnalysisResult, ClientError> {
        Ok(self
            .relay
            .analyze(RelayRequest::new(image, api_key))
            .await?)
    }
}
