mod config;
mod enhancement;
mod errors;
mod generation;
mod llm_client;
mod models;
mod routes;
mod sessions;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::client::HttpGenerationClient;
use crate::generation::presentation::DisplayPolicy;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::sessions::SessionStore;
use crate::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    let generator = HttpGenerationClient::new(&config.generation_api_url)?;
    info!("Generation backend: {}", generator.endpoint());

    let llm = LlmClient::new(
        &config.llm_base_url,
        config.llm_api_key.clone(),
        config.llm_model.clone(),
    )?;
    if config.llm_api_key.is_none() {
        info!("LLM_API_KEY not set; section enhancement is disabled");
    } else {
        info!("LLM client initialized (model: {})", llm.model());
    }

    let sessions = SessionStore::new();
    sessions.spawn_idle_sweeper(config.session_idle_ttl, SESSION_SWEEP_INTERVAL);
    info!(
        "Idle sessions expire after {}s",
        config.session_idle_ttl.as_secs()
    );

    let state = AppState {
        sessions,
        generator: Arc::new(generator),
        llm,
        display: DisplayPolicy {
            min_success_display: config.success_min_display,
        },
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the editor has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
