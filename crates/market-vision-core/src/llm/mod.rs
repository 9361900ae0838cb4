//! Vision model integration.
//!
//! Provides the [`VisionModel`] abstraction the relay calls through and the
//! Gemini implementation used in production.

pub(crate) mod gemini;
pub(crate) mod provider;

pub use gemini::GeminiClient;
pub use provider::VisionModel;
