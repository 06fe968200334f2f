mod config;
mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

use crate::config::{Config, Provider};
use intervia_core::{
    GeminiGenerator, Generator, InMemorySessionStore, OpenAiGenerator, ResumeAnalyzer,
    ResumeCache, SessionManager,
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    info!("Configuration loaded successfully. Starting Intervia API...");

    // --- 3. Wire up the generation collaborator ---
    let generator: Arc<dyn Generator> = match config.provider {
        Provider::OpenAi => {
            let api_key = config
                .openai_api_key
                .clone()
                .context("OPENAI_API_KEY validated at config load")?;
            Arc::new(
                OpenAiGenerator::new(api_key, config.chat_model.clone(), config.generation_timeout)
                    .context("Failed to build OpenAI client")?,
            )
        }
        Provider::Gemini => {
            let api_key = config
                .gemini_api_key
                .clone()
                .context("GEMINI_API_KEY validated at config load")?;
            Arc::new(
                GeminiGenerator::new(api_key, config.chat_model.clone(), config.generation_timeout)
                    .context("Failed to build Gemini client")?,
            )
        }
    };

    // --- 4. Build the session manager ---
    let manager = Arc::new(SessionManager::new(
        Arc::new(InMemorySessionStore::new()),
        generator,
        ResumeAnalyzer::pdf(),
        Arc::new(ResumeCache::new()),
    ));

    // --- 5. Routes ---
    // A permissive CORS policy so a separate frontend can call the API.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/interview/start", post(handlers::start_interview))
        .route("/interview/answer", post(handlers::submit_answer))
        .route("/interview/end", post(handlers::end_interview))
        .layer(cors)
        .with_state(manager);

    // --- 6. Serve ---
    info!("Listening on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
