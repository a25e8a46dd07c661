#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use image_summarizer::inference::{ApiErrorKind, EncodedImage, InferenceError, VisionClient};
use image_summarizer::staging::StagingArea;
use image_summarizer::{app, AppState};
use tower::ServiceExt;

pub const BOUNDARY: &str = "----summarizer-test-boundary";
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

#[derive(Clone)]
pub enum FakeReply {
    Summary(&'static str),
    AuthError,
    NoChoices,
}

/// Records every call and the number of staged files present at call time.
pub struct FakeVisionClient {
    reply: FakeReply,
    staging_dir: std::path::PathBuf,
    pub calls: Mutex<Vec<(EncodedImage, usize)>>,
}

impl FakeVisionClient {
    pub fn new(reply: FakeReply, staging_dir: &Path) -> Arc<Self> {
        Arc::new(Self {
            reply,
            staging_dir: staging_dir.to_path_buf(),
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl VisionClient for FakeVisionClient {
    async fn summarize(&self, image: &EncodedImage) -> Result<String, InferenceError> {
        let staged = count_files(&self.staging_dir);
        self.calls.lock().unwrap().push((image.clone(), staged));

        match &self.reply {
            FakeReply::Summary(text) => Ok(text.to_string()),
            FakeReply::AuthError => Err(InferenceError::Api {
                status: 401,
                kind: ApiErrorKind::Authentication,
                message: "Incorrect API key provided".to_string(),
            }),
            FakeReply::NoChoices => Err(InferenceError::MalformedResponse(
                "response contained no choices".to_string(),
            )),
        }
    }

    fn model_name(&self) -> &str {
        "fake-vision"
    }
}

pub fn router(vision: Option<Arc<dyn VisionClient>>, staging_dir: &Path) -> Router {
    app(
        AppState::new(vision, StagingArea::new(staging_dir)),
        16 * 1024 * 1024,
    )
}

pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// Multipart body with one part per `(field, filename, bytes)`.
pub fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/summarize-image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response: Response<Body> = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}
