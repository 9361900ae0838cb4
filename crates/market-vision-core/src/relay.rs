//! The relay: one chart + one credential in, one [`AnalysisResult`] out.
//!
//! ```text
//! RelayRequest → validate → strip data-URI prefix → VisionModel → parse → validate schema
//! ```
//!
//! Stateless across calls; the only side effect is the outbound model call.

use crate::analysis::AnalysisResult;
use crate::error::RelayError;
use crate::llm::VisionModel;
use crate::prompt::AnalysisRequest;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Inbound relay request. Both fields are optional on the wire so that a
/// missing field is reported as [`RelayError::MissingInput`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayRequest {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl RelayRequest {
    pub fn new(image: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            api_key: Some(api_key.into()),
        }
    }
}

/// Relay response body: `{"data": …}` on success, `{"error": "…"}` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<AnalysisResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RelayEnvelope {
    pub fn success(data: AnalysisResult) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Forwards charts to a vision model and normalizes the answer.
#[derive(Clone)]
pub struct Relay {
    model: Arc<dyn VisionModel>,
}

impl Relay {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self { model }
    }

    /// Name of the backing model provider.
    pub fn provider(&self) -> &str {
        self.model.name()
    }

    /// Run one analysis.
    pub async fn analyze(&self, request: RelayRequest) -> Result<AnalysisResult, RelayError> {
        let (image, api_key) = match (request.image, request.api_key) {
            (Some(image), Some(key)) if !image.is_empty() && !key.is_empty() => (image, key),
            _ => return Err(RelayError::MissingInput),
        };

        let request = AnalysisRequest::for_chart(&image);
        tracing::info!(
            "Relaying chart to {} ({} base64 bytes)",
            self.model.name(),
            request.image_base64.len()
        );

        let start = Instant::now();
        let text = self.model.generate(&api_key, &request).await?;
        tracing::debug!(
            "{} produced {} chars in {}ms",
            self.model.name(),
            text.len(),
            start.elapsed().as_millis()
        );

        let analysis = crate::parse::parse_analysis(&text)?;
        tracing::info!(
            "Analysis complete: {} ({}% confidence)",
            analysis.signal,
            analysis.confidence
        );
        Ok(analysis)
    }
}
