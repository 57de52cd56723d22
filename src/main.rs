mod api;
mod config;
mod db;
mod engine;
mod error;
mod llm;
mod normalizer;
mod types;

use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::db::FightStore;
use crate::error::Result;
use crate::llm::LlmClient;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let pool = sqlx::SqlitePool::connect(&cfg.database_url).await?;
    let store = FightStore::new(pool);
    store.migrate().await?;
    info!("Database ready at {}", cfg.database_url);

    // --- Inference client ---
    let llm = LlmClient::new(cfg.llm.clone())?;
    info!(
        endpoint = %llm.endpoint(),
        model = %cfg.llm.model,
        attempts = cfg.llm.max_attempts,
        timeout_s = cfg.llm.request_timeout.as_secs(),
        deadline_s = cfg.llm.deadline.as_secs(),
        "LLM client configured"
    );

    // --- HTTP API server ---
    let api_state = ApiState {
        store,
        llm: Arc::new(llm),
        health: Arc::new(HealthState::new()),
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");
    info!("Routes: GET / | GET /health | GET /api/test | POST /api/predict | POST /api/generate-parlay | GET /api/analyzed-fights | POST /api/save-analysis | GET /api/parlays");

    axum::serve(listener, app).await?;

    Ok(())
}
