use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, Request, State,
    },
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::health::HealthState;
use crate::config::{DEFAULT_LIST_LIMIT, PARLAY_CANDIDATE_POOL};
use crate::db::{FightStore, NewAnalysis};
use crate::engine::parlay::validate_size;
use crate::engine::{betting_advice, build_parlay, format_report, predict};
use crate::error::AppError;
use crate::llm::LlmClient;
use crate::normalizer::{parse_number, parse_odds, require_fighter, require_name};
use crate::types::{
    AnalyzedFight, BettingAdvice, Corner, FightPrediction, FinishMethod, Parlay, ParlayCandidate,
    RawFighter, StoredParlay,
};

#[derive(Clone)]
pub struct ApiState {
    pub store: FightStore,
    pub llm: Arc<LlmClient>,
    pub health: Arc<HealthState>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/test", get(api_test))
        .route("/api/predict", post(predict_fight))
        .route("/api/generate-parlay", post(generate_parlay))
        .route("/api/analyzed-fights", get(get_analyzed_fights))
        .route("/api/save-analysis", post(save_analysis))
        .route("/api/parlays", get(get_parlays))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = Instant::now();
    let resp = next.run(req).await;
    info!(
        %method,
        %uri,
        status = resp.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    resp
}

fn bad_json(rejection: JsonRejection) -> AppError {
    AppError::Validation(rejection.body_text())
}

fn bad_query(rejection: QueryRejection) -> AppError {
    AppError::Validation(rejection.body_text())
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct PredictRequest {
    pub fighter1: Option<RawFighter>,
    pub fighter2: Option<RawFighter>,
}

#[derive(Deserialize)]
pub struct SaveAnalysisRequest {
    pub fighter1: Option<RawFighter>,
    pub fighter2: Option<RawFighter>,
    /// Narrative to store alongside the numbers; `message` is accepted so a
    /// predict response can be posted back as-is.
    #[serde(alias = "message")]
    pub analysis: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParlayRequest {
    pub size: usize,
    /// Omit to build from stored analyses.
    pub analyzed_fights: Option<Vec<ParlayFightInput>>,
}

/// One previously analyzed fight as the UI sends it back: the two fighters
/// plus the fields of a predict response.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParlayFightInput {
    pub id: Option<i64>,
    #[serde(default)]
    pub fighter1: RawFighter,
    #[serde(default)]
    pub fighter2: RawFighter,
    pub fighter1_probability: Option<Value>,
    pub fighter2_probability: Option<Value>,
    pub simulation_confidence: Option<Value>,
    pub suggested_bet: Option<String>,
    pub fight_outcome: Option<FightOutcomeInput>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FightOutcomeInput {
    pub likely_method: Option<String>,
    pub confidence: Option<Value>,
}

impl ParlayFightInput {
    fn to_candidate(&self, index: usize) -> Result<ParlayCandidate, AppError> {
        let corner = |raw: &RawFighter, label: &str| -> Result<Corner, AppError> {
            Ok(Corner {
                name: require_name(raw, &format!("analyzedFights[{index}].{label}"))?,
                odds: parse_odds(raw.american_odds.as_ref()),
            })
        };
        let outcome = self.fight_outcome.as_ref();
        Ok(ParlayCandidate {
            analyzed_fight_id: self.id,
            fighter1: corner(&self.fighter1, "fighter1")?,
            fighter2: corner(&self.fighter2, "fighter2")?,
            fighter1_probability: self.fighter1_probability.as_ref().and_then(parse_number),
            fighter2_probability: self.fighter2_probability.as_ref().and_then(parse_number),
            confidence: self
                .simulation_confidence
                .as_ref()
                .or_else(|| outcome.and_then(|o| o.confidence.as_ref()))
                .and_then(parse_number),
            recommended_bet: self.suggested_bet.clone().unwrap_or_default(),
            likely_method: outcome
                .and_then(|o| o.likely_method.as_deref())
                .and_then(FinishMethod::parse),
        })
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

impl ListQuery {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 500)
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub message: String,
    pub ai_analysis: bool,
    pub fighter1_probability: f64,
    pub fighter2_probability: f64,
    pub simulation_confidence: Option<f64>,
    pub suggested_bet: String,
    pub fight_outcome: FightPrediction,
    pub betting_advice: BettingAdvice,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParlayResponse {
    pub parlay_size: usize,
    pub recommendation: Parlay,
    pub message: String,
    pub timestamp: String,
    /// Set when the parlay was built from stored analyses and persisted.
    pub parlay_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn root() -> Json<Value> {
    Json(json!({ "message": "Server is running" }))
}

async fn api_test() -> Json<Value> {
    Json(json!({ "message": "API is working!" }))
}

async fn health(State(state): State<ApiState>) -> Json<Value> {
    let database = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("Health check DB ping failed: {e}");
            false
        }
    };
    let status = if database { "ok" } else { "degraded" };
    Json(json!({
        "status": status,
        "database": database,
        "predictionsServed": state.health.predictions_served(),
        "llmFallbacks": state.health.llm_fallbacks(),
        "parlaysBuilt": state.health.parlays_built(),
    }))
}

async fn predict_fight(
    State(state): State<ApiState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let Json(req) = payload.map_err(bad_json)?;
    let f1 = require_fighter(req.fighter1.as_ref(), "fighter1")?;
    let f2 = require_fighter(req.fighter2.as_ref(), "fighter2")?;

    let prediction = predict(&f1, &f2);
    let advice = betting_advice(&f1, &f2, &prediction)?;
    let report = format_report(&f1, &f2, &prediction, &advice);

    // disjoint work: narrative from the model, fighter rows in the store
    let corners = [&f1, &f2];
    let (analysis, upserted) = tokio::join!(
        state.llm.analyze(&f1, &f2),
        state.store.upsert_fighters(&corners),
    );
    upserted?;
    state.health.record_prediction(analysis.generated);

    info!(
        fighter1 = %f1.name,
        fighter2 = %f2.name,
        p1 = prediction.win_probability.fighter1,
        p2 = prediction.win_probability.fighter2,
        bet = %prediction.recommended_bet,
        ai = analysis.generated,
        "Prediction served"
    );

    Ok(Json(PredictResponse {
        message: format!("{report}\n\nAI Analysis:\n{}", analysis.text),
        ai_analysis: analysis.generated,
        fighter1_probability: prediction.win_probability.fighter1,
        fighter2_probability: prediction.win_probability.fighter2,
        simulation_confidence: prediction.confidence,
        suggested_bet: prediction.recommended_bet.clone(),
        fight_outcome: prediction,
        betting_advice: advice,
    }))
}

async fn generate_parlay(
    State(state): State<ApiState>,
    payload: Result<Json<ParlayRequest>, JsonRejection>,
) -> Result<Json<ParlayResponse>, AppError> {
    let Json(req) = payload.map_err(bad_json)?;
    validate_size(req.size)?;

    let (recommendation, parlay_id) = match &req.analyzed_fights {
        Some(fights) => {
            let candidates = fights
                .iter()
                .enumerate()
                .map(|(i, f)| f.to_candidate(i))
                .collect::<Result<Vec<_>, _>>()?;
            (build_parlay(candidates, req.size)?, None)
        }
        None => {
            let stored = state.store.parlay_candidates(PARLAY_CANDIDATE_POOL).await?;
            let candidates = stored.iter().map(ParlayCandidate::from).collect();
            let parlay = build_parlay(candidates, req.size)?;
            let saved = state.store.save_parlay(&parlay).await?;
            (saved.parlay, Some(saved.id))
        }
    };
    state.health.record_parlay();

    Ok(Json(ParlayResponse {
        parlay_size: req.size,
        message: format!("{}-Fight Parlay Generated", req.size),
        timestamp: chrono::Utc::now().to_rfc3339(),
        parlay_id,
        recommendation,
    }))
}

async fn get_analyzed_fights(
    State(state): State<ApiState>,
    params: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<AnalyzedFight>>, AppError> {
    let Query(params) = params.map_err(bad_query)?;
    Ok(Json(state.store.list_analyzed_fights(params.limit()).await?))
}

async fn save_analysis(
    State(state): State<ApiState>,
    payload: Result<Json<SaveAnalysisRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AnalyzedFight>), AppError> {
    let Json(req) = payload.map_err(bad_json)?;
    let f1 = require_fighter(req.fighter1.as_ref(), "fighter1")?;
    let f2 = require_fighter(req.fighter2.as_ref(), "fighter2")?;

    // numbers are recomputed so stored rows always match the heuristic
    let prediction = predict(&f1, &f2);
    let advice = betting_advice(&f1, &f2, &prediction)?;
    let saved = state
        .store
        .save_analysis(&NewAnalysis {
            fighter1: &f1,
            fighter2: &f2,
            prediction: &prediction,
            advice: &advice,
            analysis: req.analysis.as_deref().unwrap_or_default(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(saved)))
}

async fn get_parlays(
    State(state): State<ApiState>,
    params: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<StoredParlay>>, AppError> {
    let Query(params) = params.map_err(bad_query)?;
    Ok(Json(state.store.list_parlays(params.limit()).await?))
}
