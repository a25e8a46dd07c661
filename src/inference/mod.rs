//! Vision inference seam.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use thiserror::Error;

pub mod openai;

pub use openai::OpenAiVisionClient;

/// Instruction sent alongside every image.
pub const SUMMARY_PROMPT: &str = "Summarize this image.";

const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    Authentication,
    RateLimited,
    BadRequest,
    NotFound,
    Server,
    Other,
}

impl ApiErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Authentication,
            429 => Self::RateLimited,
            400 | 413 | 422 => Self::BadRequest,
            404 => Self::NotFound,
            500..=599 => Self::Server,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Authentication => "authentication failed",
            Self::RateLimited => "rate limit exceeded",
            Self::BadRequest => "invalid request",
            Self::NotFound => "not found",
            Self::Server => "server error",
            Self::Other => "request failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("{kind}: {message}")]
    Api {
        status: u16,
        kind: ApiErrorKind,
        message: String,
    },

    #[error("connection error: {0}")]
    Transport(String),

    /// The API answered, but without a usable summary.
    #[error("{0}")]
    MalformedResponse(String),
}

/// Image bytes ready to inline into a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub base64: String,
    pub media_type: &'static str,
}

impl EncodedImage {
    /// Encode `bytes`, labelling them by sniffed content, then by `extension`.
    pub fn new(bytes: &[u8], extension: Option<&str>) -> Self {
        Self {
            base64: general_purpose::STANDARD.encode(bytes),
            media_type: media_type_for(bytes, extension),
        }
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.base64)
    }
}

pub fn media_type_for(bytes: &[u8], extension: Option<&str>) -> &'static str {
    let sniffed = match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Some("image/png"),
        Ok(ImageFormat::Jpeg) => Some("image/jpeg"),
        Ok(ImageFormat::Gif) => Some("image/gif"),
        Ok(ImageFormat::WebP) => Some("image/webp"),
        _ => None,
    };

    sniffed
        .or_else(|| match extension {
            Some("png") => Some("image/png"),
            Some("jpg") | Some("jpeg") => Some("image/jpeg"),
            Some("gif") => Some("image/gif"),
            Some("webp") => Some("image/webp"),
            _ => None,
        })
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}

/// Multimodal completion backend that turns one image into a summary.
#[async_trait]
pub trait VisionClient: Send + Sync {
    async fn summarize(&self, image: &EncodedImage) -> Result<String, InferenceError>;

    fn model_name(&self) -> &str;
}
