//! Chart images as data URIs.
//!
//! A chart travels from the client to the relay as
//! `data:<media-type>;base64,<payload>`; the relay strips the prefix again
//! before handing the payload to Gemini.

use crate::error::ImageError;
use base64::Engine;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static DATA_URI_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/\w+;base64,").expect("data URI prefix pattern is valid")
});

/// A chart image encoded as a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    data_uri: String,
}

impl ChartImage {
    /// Encode raw bytes with the given image format ("png", "jpeg", ...).
    ///
    /// Returns `None` for formats that aren't images we can send.
    pub fn from_bytes(bytes: &[u8], format: &str) -> Option<Self> {
        let media_type = media_type_for(format)?;
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        Some(Self {
            data_uri: format!("data:{media_type};base64,{payload}"),
        })
    }

    /// Read a file and encode it. The media type comes from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, ImageError> {
        if !path.exists() {
            return Err(ImageError::FileNotFound(path.to_path_buf()));
        }

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if media_type_for(&format).is_none() {
            return Err(ImageError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: if format.is_empty() {
                    "<none>".to_string()
                } else {
                    format
                },
            });
        }

        let bytes = tokio::fs::read(path).await.map_err(|e| ImageError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if bytes.is_empty() {
            return Err(ImageError::Empty(path.to_path_buf()));
        }

        tracing::debug!("Read chart {:?} ({} bytes)", path, bytes.len());

        Self::from_bytes(&bytes, &format).ok_or_else(|| ImageError::UnsupportedFormat {
            path: path.to_path_buf(),
            format,
        })
    }

    /// The full data URI.
    pub fn as_data_uri(&self) -> &str {
        &self.data_uri
    }

    /// Size of the data URI in bytes.
    pub fn len(&self) -> usize {
        self.data_uri.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_uri.is_empty()
    }
}

/// Strip a `data:image/<type>;base64,` prefix, leaving the raw base64 payload.
///
/// Strings without that prefix are returned unchanged.
pub fn strip_data_uri_prefix(image: &str) -> &str {
    match DATA_URI_PREFIX.find(image) {
        Some(m) => &image[m.end()..],
        None => image,
    }
}

/// MIME type for an image format identifier, `None` if it isn't an image.
pub fn media_type_for(format: &str) -> Option<&'static str> {
    match format {
        "jpeg" | "jpg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}
