// Image summarization HTTP service backed by an OpenAI vision model.

use image_summarizer::{app, config::AppConfig, AppState};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "image_summarizer=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::from_env()?;
    if !config.is_configured() {
        warn!("OPENAI_API_KEY is not set; /summarize-image will answer with a configuration error");
    }

    let state = AppState::from_config(&config);
    state.staging.ensure_exists().await?;

    let router = app(state, config.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    info!(
        addr = %config.bind_addr,
        model = %config.openai_model,
        upload_folder = %config.upload_folder.display(),
        "Server running"
    );

    axum::serve(listener, router).await?;
    Ok(())
}
