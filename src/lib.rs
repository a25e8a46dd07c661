//! Image summarization service: accepts an uploaded image, asks a vision
//! model to summarize it, and returns the text.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handler;
pub mod inference;
pub mod staging;
pub mod upload;

use config::AppConfig;
use inference::{OpenAiVisionClient, VisionClient};
use staging::StagingArea;

#[derive(Clone)]
pub struct AppState {
    /// `None` when no API key is configured.
    pub vision: Option<Arc<dyn VisionClient>>,
    pub staging: StagingArea,
}

impl AppState {
    pub fn new(vision: Option<Arc<dyn VisionClient>>, staging: StagingArea) -> Self {
        Self { vision, staging }
    }

    /// Wire up the OpenAI client (if a key is present) and staging area.
    pub fn from_config(config: &AppConfig) -> Self {
        let vision = config.openai_api_key.as_ref().map(|key| {
            Arc::new(OpenAiVisionClient::new(
                config.openai_base_url.clone(),
                key.clone(),
                config.openai_model.clone(),
                config.max_tokens,
            )) as Arc<dyn VisionClient>
        });

        Self::new(vision, StagingArea::new(&config.upload_folder))
    }
}

pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/summarize-image", post(handler::summarize_image))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "configured": state.vision.is_some(),
        "model": state.vision.as_ref().map(|v| v.model_name()),
    }))
}
