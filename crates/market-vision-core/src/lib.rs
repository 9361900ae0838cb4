//! Market Vision Core - forex chart analysis relay and client orchestration.
//!
//! Market Vision sends a chart image to a multimodal model (Gemini) with a
//! fixed analytical prompt and turns the answer into a typed
//! [`AnalysisResult`]. It has two halves:
//!
//! ```text
//! Orchestrator → RelayClient → Relay → VisionModel (Gemini) → parse → AnalysisResult
//! ```
//!
//! - [`Relay`] is stateless: validate input, strip the data-URI prefix, call
//!   the model, parse and validate its JSON. [`server`] exposes it over HTTP.
//! - [`Orchestrator`] holds the credential and the selected chart and tracks
//!   the request lifecycle.
//!
//! # Usage
//!
//! ```rust,ignore
//! use market_vision_core::{Config, GeminiClient, LocalRelay, Orchestrator, Relay};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let relay = Relay::new(Arc::new(GeminiClient::from_config(&config.gemini)));
//!     let mut client = Orchestrator::new(Arc::new(LocalRelay::new(relay)), store, None);
//!
//!     client.select_image("chart.png".as_ref()).await?;
//!     client.analyze().await;
//!     println!("{:?}", client.analysis());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod analysis;
pub mod chart;
pub mod client;
pub mod config;
pub mod error;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod relay;
pub mod server;

// Re-exports for convenient access
pub use analysis::{AnalysisResult, MethodAnalysis, Signal};
pub use chart::ChartImage;
pub use client::{
    ClientState, CredentialStore, HttpRelayClient, LocalRelay, Orchestrator, RelayClient,
};
pub use config::Config;
pub use error::{
    ClientError, ConfigError, ImageError, PersistError, RelayError,
};
pub use llm::{GeminiClient, VisionModel};
pub use relay::{Relay, RelayEnvelope, RelayRequest};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
