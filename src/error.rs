//! Request-level failures and their JSON rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::inference::InferenceError;

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("OpenAI API key not configured. Please set the OPENAI_API_KEY environment variable.")]
    Configuration,

    #[error("No image file provided")]
    NoImage,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("File type not allowed")]
    FileTypeNotAllowed,

    #[error("Invalid multipart request: {0}")]
    InvalidMultipart(String),

    /// The inference API rejected or failed the call.
    #[error("OpenAI API error: {0}")]
    Upstream(String),

    #[error("Error processing image: {0}")]
    Processing(String),
}

impl SummarizeError {
    pub fn status(&self) -> StatusCode {
        match self {
            SummarizeError::NoImage
            | SummarizeError::NoSelectedFile
            | SummarizeError::FileTypeNotAllowed
            | SummarizeError::InvalidMultipart(_) => StatusCode::BAD_REQUEST,
            SummarizeError::Configuration
            | SummarizeError::Upstream(_)
            | SummarizeError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InferenceError> for SummarizeError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::MalformedResponse(detail) => SummarizeError::Processing(detail),
            other => SummarizeError::Upstream(other.to_string()),
        }
    }
}

impl From<std::io::Error> for SummarizeError {
    fn from(err: std::io::Error) -> Self {
        SummarizeError::Processing(err.to_string())
    }
}

impl IntoResponse for SummarizeError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}
