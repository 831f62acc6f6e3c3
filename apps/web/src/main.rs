mod config;
mod errors;
mod generation;
mod llm_client;
mod pages;
mod pptx;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::render::HttpImageFetcher;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on a malformed PORT)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Deckforge v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::from_config(&config)?;
    if llm.has_api_key() {
        info!("LLM client initialized (model: {})", llm.model());
    } else {
        warn!("OPENROUTER_KEY is not set; every deck will be the error deck");
    }

    // Initialize image fetcher
    let images = HttpImageFetcher::new(config.image_endpoint.clone())?;
    info!("Image fetcher initialized ({})", config.image_endpoint);

    if let Some(logo) = &config.logo_path {
        info!("Logo path: {}", logo.display());
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        outlines: Arc::new(llm),
        images: Arc::new(images),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
