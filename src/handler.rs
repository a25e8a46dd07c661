//! `POST /summarize-image`: validate, stage, encode, summarize, clean up.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Json,
};
use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::SummarizeError;
use crate::inference::{EncodedImage, VisionClient};
use crate::staging::StagedFile;
use crate::upload::{allowed_file, read_image_field, UploadedImage};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

pub async fn summarize_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SummaryResponse>, SummarizeError> {
    let span = info_span!("summarize_image", request_id = %Uuid::new_v4());
    handle(state, multipart).instrument(span).await
}

async fn handle(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SummaryResponse>, SummarizeError> {
    let start = Instant::now();

    let client = state.vision.clone().ok_or_else(|| {
        error!("Rejecting request: OpenAI API key is not configured");
        SummarizeError::Configuration
    })?;

    // A body that isn't multipart carries no `image` field.
    let multipart = multipart.map_err(|e| {
        warn!(error = %e, "Request body is not a multipart form");
        SummarizeError::NoImage
    })?;

    let upload = read_image_field(multipart)
        .await?
        .ok_or(SummarizeError::NoImage)?;

    if upload.filename.is_empty() {
        return Err(SummarizeError::NoSelectedFile);
    }
    if !allowed_file(&upload.filename) {
        warn!(filename = %upload.filename, "Rejected upload with disallowed file type");
        return Err(SummarizeError::FileTypeNotAllowed);
    }

    info!(filename = %upload.filename, size = upload.bytes.len(), "Received image");

    let staged = state.staging.stage(&upload).map_err(|e| {
        error!(error = %e, "Failed to stage upload");
        SummarizeError::Processing(e.to_string())
    })?;

    let result = summarize_staged(&staged, &upload, client).await;
    staged.release();

    match result {
        Ok(summary) => {
            info!(
                duration_ms = start.elapsed().as_millis() as u64,
                summary_len = summary.len(),
                "Image summarized"
            );
            Ok(Json(SummaryResponse { summary }))
        }
        Err(e) => {
            error!(
                duration_ms = start.elapsed().as_millis() as u64,
                error = %e,
                "Image summarization failed"
            );
            Err(e)
        }
    }
}

async fn summarize_staged(
    staged: &StagedFile,
    upload: &UploadedImage,
    client: Arc<dyn VisionClient>,
) -> Result<String, SummarizeError> {
    let bytes = staged.read().await?;
    let encoded = EncodedImage::new(&bytes, upload.extension().as_deref());
    let summary = client.summarize(&encoded).await?;
    Ok(summary)
}
