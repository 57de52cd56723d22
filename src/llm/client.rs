use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{LlmConfig, LLM_TEMPERATURE, LLM_TOP_P};
use crate::error::Result;
use crate::llm::prompt::build_prompt;
use crate::types::Fighter;

const UNAVAILABLE: &str = "AI analysis unavailable";

/// Outcome of an analysis call. `generated` is false whenever `text` is a
/// fallback message rather than model output.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmAnalysis {
    pub text: String,
    pub generated: bool,
}

impl LlmAnalysis {
    fn unavailable(reason: impl std::fmt::Display) -> Self {
        Self {
            text: format!("{UNAVAILABLE} - {reason}"),
            generated: false,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f64,
    top_p: f64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Client for an Ollama-style `/api/generate` endpoint. The endpoint is slow
/// and unreliable: every call is bounded by the configured deadline and
/// degrades to fallback text instead of failing.
pub struct LlmClient {
    http: reqwest::Client,
    cfg: LlmConfig,
}

impl LlmClient {
    pub fn new(cfg: LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()?;
        Ok(Self { http, cfg })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/generate", self.cfg.base_url)
    }

    /// Ask the model for a prose read of the matchup. Never fails.
    pub async fn analyze(&self, f1: &Fighter, f2: &Fighter) -> LlmAnalysis {
        let prompt = build_prompt(f1, f2);
        match tokio::time::timeout(self.cfg.deadline, self.generate_with_retry(&prompt)).await {
            Ok(analysis) => analysis,
            Err(_) => {
                warn!(
                    deadline_ms = self.cfg.deadline.as_millis() as u64,
                    "LLM analysis deadline exceeded"
                );
                LlmAnalysis::unavailable(format!(
                    "timed out after {}ms",
                    self.cfg.deadline.as_millis()
                ))
            }
        }
    }

    async fn generate_with_retry(&self, prompt: &str) -> LlmAnalysis {
        let attempts = self.cfg.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.generate(prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!(attempt, chars = text.len(), "LLM analysis received");
                    return LlmAnalysis {
                        text,
                        generated: true,
                    };
                }
                Ok(_) => {
                    warn!(attempt, "LLM returned an empty response");
                    return LlmAnalysis {
                        text: UNAVAILABLE.to_string(),
                        generated: false,
                    };
                }
                Err(e) => {
                    warn!(attempt, max_attempts = attempts, "LLM attempt failed: {e}");
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(self.cfg.retry_delay).await;
                    }
                }
            }
        }

        LlmAnalysis::unavailable(last_error)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            model: &self.cfg.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: LLM_TEMPERATURE,
                top_p: LLM_TOP_P,
            },
        };
        debug!(endpoint = %self.endpoint(), model = %self.cfg.model, "POST generate");

        let resp: GenerateResponse = self
            .http
            .post(self.endpoint())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp.response.unwrap_or_default())
    }
}
