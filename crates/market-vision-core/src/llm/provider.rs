//! Vision model trait.
//!
//! The relay talks to the external model only through this trait, so tests
//! and alternative backends can stand in for Gemini.

use crate::error::RelayError;
use crate::prompt::AnalysisRequest;
use async_trait::async_trait;

/// A multimodal model that answers an [`AnalysisRequest`] with text.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the relay holds an `Arc<dyn VisionModel>`).
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Provider name for logging (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send the request authenticated with `api_key` and return the model's
    /// text output.
    ///
    /// Errors: [`RelayError::Upstream`] for non-success statuses,
    /// [`RelayError::Transport`] for network failures and
    /// [`RelayError::NoContent`] when the answer carries no text.
    async fn generate(&self, api_key: &str, request: &AnalysisRequest)
        -> Result<String, RelayError>;
}
