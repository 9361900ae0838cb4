//! Error types for Market Vision.
//!
//! Relay failures carry enough context to be reported to the end user as a
//! single message and to pick the HTTP status the relay endpoint answers with.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Failures of a single analysis relay, from input validation through parsing
/// the model's answer.
#[derive(Error, Debug)]
pub enum RelayError {
    /// `image` or `apiKey` absent or empty.
    #[error("Missing image or API key")]
    MissingInput,

    /// Request body was not the expected JSON object.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Request body exceeded the configured limit.
    #[error("Request body too large")]
    TooLarge,

    /// Gemini answered with a non-success status.
    #[error("Gemini API Error: {status_text} - {body}")]
    Upstream {
        status: u16,
        status_text: String,
        body: String,
    },

    /// Success envelope without `candidates[0].content.parts[0].text`.
    #[error("No analysis generated from AI")]
    NoContent,

    /// Model text was not a valid analysis, even after stripping code fences.
    #[error("Failed to parse analysis: {0}")]
    MalformedResult(String),

    /// Network-level failure talking to Gemini (connect, timeout, body read).
    #[error("{0}")]
    Transport(String),
}

impl RelayError {
    /// HTTP status code the relay endpoint reports this failure with.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::MissingInput | RelayError::InvalidBody(_) => 400,
            RelayError::TooLarge => 413,
            RelayError::Upstream { status, .. } => *status,
            RelayError::NoContent | RelayError::MalformedResult(_) | RelayError::Transport(_) => {
                500
            }
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        // The request URL carries the API key as a query parameter.
        let e = e.without_url();
        if e.is_timeout() {
            RelayError::Transport(format!("Gemini request timed out: {e}"))
        } else {
            RelayError::Transport(format!("Gemini request failed: {e}"))
        }
    }
}

/// Errors while acquiring a chart image.
#[derive(Error, Debug)]
pub enum ImageError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Reading the file failed
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Not an image type we can send
    #[error("Unsupported image format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Zero-length file
    #[error("Image is empty: {0}")]
    Empty(PathBuf),
}

/// Failures seen by the client when asking a relay for an analysis.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The relay answered with an error envelope.
    #[error("{message}")]
    Relay { status: u16, message: String },

    /// The relay could not be reached.
    #[error("{0}")]
    Transport(String),

    /// The relay's answer was neither a result nor an error.
    #[error("Failed to analyze image")]
    InvalidResponse,
}

impl From<RelayError> for ClientError {
    fn from(e: RelayError) -> Self {
        ClientError::Relay {
            status: e.status_code(),
            message: e.to_string(),
        }
    }
}

/// Failure persisting the credential.
#[derive(Error, Debug)]
#[error("Failed to persist credential: {0}")]
pub struct PersistError(pub String);
