use std::time::Duration;

use crate::error::{AppError, Result};

pub const DEFAULT_PORT: u16 = 8080;
pub const OLLAMA_URL: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "llama2:7b-chat-q4_0";
pub const DATABASE_URL: &str = "sqlite:fight_analyzer.db?mode=rwc";

/// Sampling options sent with every generate request.
pub const LLM_TEMPERATURE: f64 = 0.7;
pub const LLM_TOP_P: f64 = 0.9;

/// Attempts against the inference endpoint before falling back.
pub const LLM_MAX_ATTEMPTS: u32 = 3;

/// Fixed delay between attempts (milliseconds).
pub const LLM_RETRY_DELAY_MS: u64 = 5_000;

/// Per-attempt HTTP timeout (seconds).
pub const LLM_TIMEOUT_SECS: u64 = 20;

/// Hard ceiling on the whole analysis call, retries included (seconds).
/// The predict response is never held longer than this.
pub const LLM_DEADLINE_SECS: u64 = 60;

/// Default row limit for list endpoints.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// How many stored analyses are considered when building a parlay from the DB.
pub const PARLAY_CANDIDATE_POOL: i64 = 100;

/// Parlay size bounds (inclusive).
pub const MIN_PARLAY_SIZE: usize = 2;
pub const MAX_PARLAY_SIZE: usize = 4;

/// Thresholds for the finish-rate heuristic, all in percent.
pub mod heuristic_thresholds {
    /// combined finish rate at or above this means the fight likely ends early.
    pub const DISTANCE_CUTOFF: f64 = 65.0;
    pub const CONFIDENCE_FLOOR: f64 = 60.0;
    pub const CONFIDENCE_CEIL: f64 = 90.0;
    pub const DECISION_LEAN: f64 = 65.0;
    pub const KO_LEAN: f64 = 60.0;
    pub const SUB_LEAN: f64 = 60.0;
    pub const FINISH_LEAN: f64 = 70.0;
}

/// Average-confidence bands for parlay risk.
pub mod parlay_risk {
    pub const LOW_ABOVE: f64 = 80.0;
    pub const MEDIUM_ABOVE: f64 = 65.0;
    /// Recommended stake never exceeds this percent of bankroll.
    pub const MAX_STAKE_PCT: f64 = 5.0;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub database_url: String,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of the Ollama-compatible server (OLLAMA_URL)
    pub base_url: String,
    /// Model tag passed through to the generate call (OLLAMA_MODEL)
    pub model: String,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    pub deadline: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: OLLAMA_URL.to_string(),
            model: OLLAMA_MODEL.to_string(),
            max_attempts: LLM_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(LLM_RETRY_DELAY_MS),
            request_timeout: Duration::from_secs(LLM_TIMEOUT_SECS),
            deadline: Duration::from_secs(LLM_DEADLINE_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("PORT must be a valid port number".to_string()))?,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DATABASE_URL.to_string()),
            llm: LlmConfig {
                base_url: std::env::var("OLLAMA_URL")
                    .unwrap_or_else(|_| OLLAMA_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| OLLAMA_MODEL.to_string()),
                max_attempts: std::env::var("LLM_MAX_ATTEMPTS")
                    .ok()
                    .and_then(|v| v.parse::<u32>().ok())
                    .filter(|n| *n > 0)
                    .unwrap_or(LLM_MAX_ATTEMPTS),
                retry_delay: Duration::from_millis(
                    std::env::var("LLM_RETRY_DELAY_MS")
                        .ok()
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(LLM_RETRY_DELAY_MS),
                ),
                request_timeout: Duration::from_secs(
                    std::env::var("LLM_TIMEOUT_SECS")
                        .ok()
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(LLM_TIMEOUT_SECS),
                ),
                deadline: Duration::from_secs(
                    std::env::var("LLM_DEADLINE_SECS")
                        .ok()
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(LLM_DEADLINE_SECS),
                ),
            },
        })
    }
}
