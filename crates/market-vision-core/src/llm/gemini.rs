//! Gemini provider using the `generateContent` API.
//!
//! The API key goes in the `key` query parameter; the chart is sent as an
//! `inline_data` part next to the instruction text.

use super::provider::VisionModel;
use crate::config::GeminiConfig;
use crate::error::RelayError;
use crate::prompt::AnalysisRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Gemini provider.
pub struct GeminiClient {
    endpoint: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(endpoint: &str, model: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &GeminiConfig) -> Self {
        Self::new(
            &config.endpoint,
            &config.model,
            Duration::from_millis(config.timeout_ms),
        )
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

// --- Request types ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

// --- Response types ---

#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].text`, if present and non-empty.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|t| !t.is_empty())
    }
}

#[async_trait]
impl VisionModel for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(
        &self,
        api_key: &str,
        request: &AnalysisRequest,
    ) -> Result<String, RelayError> {
        let start = Instant::now();

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: &request.prompt,
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: &request.mime_type,
                            data: &request.image_base64,
                        },
                    },
                ],
            }],
        };

        let resp = self
            .client
            .post(self.url())
            .query(&[("key", api_key)])
            .header("content-type", "application/json")
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        tracing::debug!(
            "Gemini {} answered {} in {}ms",
            self.model,
            status,
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_else(|e| {
                tracing::debug!("Could not read Gemini error body: {}", e.without_url());
                String::new()
            });
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body: text,
            });
        }

        let generated: GenerateResponse = resp.json().await.map_err(|e| {
            RelayError::Transport(format!(
                "Failed to parse Gemini response: {}",
                e.without_url()
            ))
        })?;

        generated.into_text().ok_or(RelayError::NoContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let request = AnalysisRequest::for_chart("data:image/jpeg;base64,AAAA");
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: "hello" },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: &request.mime_type,
                            data: &request.image_base64,
                        },
                    },
                ],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "contents": [{
                    "parts": [
                        {"text": "hello"},
                        {"inline_data": {"mime_type": "image/jpeg", "data": "AAAA"}}
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_extracts_first_part_text() {
        let resp: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "{}"}, {"text": "ignored"}]}}],
            "usageMetadata": {"promptTokenCount": 10}
        }))
        .unwrap();
        assert_eq!(resp.into_text().as_deref(), Some("{}"));
    }

    #[test]
    fn test_missing_text_is_none() {
        for value in [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{"finishReason": "SAFETY"}]}),
            json!({"candidates": [{"content": {"parts": []}}]}),
            json!({"candidates": [{"content": {"parts": [{"text": ""}]}}]}),
        ] {
            let resp: GenerateResponse = serde_json::from_value(value).unwrap();
            assert!(resp.into_text().is_none());
        }
    }

    const KEY: &str = "AIza-secret-test-key";

    fn chart() -> AnalysisRequest {
        AnalysisRequest::for_chart("data:image/jpeg;base64,AAAA")
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_without_key() {
        let client = GeminiClient::new(
            "http://127.0.0.1:9/v1beta",
            "gemini-2.5-flash",
            Duration::from_secs(5),
        );

        let err = client.generate(KEY, &chart()).await.unwrap_err();
        assert!(matches!(err, RelayError::Transport(_)), "got {err:?}");
        assert_eq!(err.status_code(), 500);
        let message = err.to_string();
        assert!(message.starts_with("Gemini request failed"), "{message}");
        assert!(!message.contains(KEY));
        assert!(!message.contains("key="));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let app = axum::Router::new().route(
            "/v1beta/models/:call",
            axum::routing::post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "{}"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = GeminiClient::new(
            &format!("http://{addr}/v1beta"),
            "gemini-2.5-flash",
            Duration::from_millis(100),
        );
        let err = client.generate(KEY, &chart()).await.unwrap_err();
        assert!(matches!(err, RelayError::Transport(_)), "got {err:?}");
        let message = err.to_string();
        assert!(message.starts_with("Gemini request timed out"), "{message}");
        assert!(!message.contains(KEY));
    }

    #[test]
    fn test_url_uses_model_and_trims_endpoint() {
        let client = GeminiClient::new(
            "http://localhost:9999/v1beta/",
            "gemini-2.5-flash",
            Duration::from_secs(1),
        );
        assert_eq!(
            client.url(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(client.name(), "gemini");
    }
}
