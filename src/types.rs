use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Fighter
// ---------------------------------------------------------------------------

/// Fighter record as it arrives over the wire. Any stat may be missing,
/// null, a string, or a number; the normalizer sorts that out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFighter {
    pub name: Option<Value>,
    pub age: Option<Value>,
    pub height: Option<Value>,
    pub reach: Option<Value>,
    pub wins: Option<Value>,
    pub losses: Option<Value>,
    pub ko_wins: Option<Value>,
    pub sub_wins: Option<Value>,
    pub decision_wins: Option<Value>,
    pub strike_accuracy: Option<Value>,
    pub takedown_accuracy: Option<Value>,
    pub takedown_defense: Option<Value>,
    #[serde(alias = "odds")]
    pub american_odds: Option<Value>,
}

/// Fully populated fighter. Every count and percentage has a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fighter {
    pub name: String,
    pub age: f64,
    pub height: f64,
    pub reach: f64,
    pub wins: u32,
    pub losses: u32,
    pub ko_wins: u32,
    pub sub_wins: u32,
    pub decision_wins: u32,
    /// 0–100
    pub strike_accuracy: f64,
    /// 0–100
    pub takedown_accuracy: f64,
    /// 0–100
    pub takedown_defense: f64,
    /// Signed American odds, e.g. +150 or -200.
    pub american_odds: Option<i64>,
}

impl Fighter {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age: 0.0,
            height: 0.0,
            reach: 0.0,
            wins: 0,
            losses: 0,
            ko_wins: 0,
            sub_wins: 0,
            decision_wins: 0,
            strike_accuracy: 0.0,
            takedown_accuracy: 0.0,
            takedown_defense: 0.0,
            american_odds: None,
        }
    }

    pub fn record(&self) -> String {
        format!("{}-{}", self.wins, self.losses)
    }
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoesToDistance {
    High,
    Low,
    Unknown,
}

impl GoesToDistance {
    pub fn parse(s: &str) -> Self {
        match s {
            "High" => GoesToDistance::High,
            "Low" => GoesToDistance::Low,
            _ => GoesToDistance::Unknown,
        }
    }
}

impl std::fmt::Display for GoesToDistance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GoesToDistance::High => "High",
            GoesToDistance::Low => "Low",
            GoesToDistance::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishMethod {
    #[serde(rename = "KO/TKO")]
    KoTko,
    Submission,
}

impl FinishMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "KO/TKO" => Some(FinishMethod::KoTko),
            "Submission" => Some(FinishMethod::Submission),
            _ => None,
        }
    }
}

impl std::fmt::Display for FinishMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishMethod::KoTko => write!(f, "KO/TKO"),
            FinishMethod::Submission => write!(f, "Submission"),
        }
    }
}

/// Percent split between the two corners; sums to 100 within rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinProbability {
    pub fighter1: f64,
    pub fighter2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FightPrediction {
    pub win_probability: WinProbability,
    pub finish_probability: f64,
    pub goes_to_distance: GoesToDistance,
    pub likely_method: Option<FinishMethod>,
    pub confidence: Option<f64>,
    pub recommended_bet: String,
}

impl FightPrediction {
    /// Neutral prediction used whenever the heuristic cannot produce numbers.
    pub fn fallback() -> Self {
        Self {
            win_probability: WinProbability {
                fighter1: 50.0,
                fighter2: 50.0,
            },
            finish_probability: 0.0,
            goes_to_distance: GoesToDistance::Unknown,
            likely_method: None,
            confidence: None,
            recommended_bet: "Insufficient data".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Betting advice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetSizing {
    /// Percent of bankroll, floored at 0.
    pub kelly_bet: f64,
    /// Profit per unit staked.
    pub expected_value: f64,
}

/// Per-corner sizing; `None` when that fighter came without odds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BettingAdvice {
    pub fighter1: Option<BetSizing>,
    pub fighter2: Option<BetSizing>,
}

// ---------------------------------------------------------------------------
// Analyzed fights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corner {
    pub name: String,
    pub odds: Option<i64>,
}

/// A persisted analysis. Created once per save, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedFight {
    pub id: i64,
    pub fighter1: Corner,
    pub fighter2: Corner,
    pub prediction: FightPrediction,
    pub betting_advice: BettingAdvice,
    pub analysis: String,
    pub created_at: String,
}

// ---------------------------------------------------------------------------
// Parlays
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn parse(s: &str) -> Self {
        match s {
            "Low" => RiskLevel::Low,
            "Medium" => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        write!(f, "{s}")
    }
}

/// One fight as the parlay aggregator sees it, regardless of whether it
/// came from the request body or the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ParlayCandidate {
    pub analyzed_fight_id: Option<i64>,
    pub fighter1: Corner,
    pub fighter2: Corner,
    pub fighter1_probability: Option<f64>,
    pub fighter2_probability: Option<f64>,
    pub confidence: Option<f64>,
    pub recommended_bet: String,
    pub likely_method: Option<FinishMethod>,
}

impl From<&AnalyzedFight> for ParlayCandidate {
    fn from(fight: &AnalyzedFight) -> Self {
        Self {
            analyzed_fight_id: Some(fight.id),
            fighter1: fight.fighter1.clone(),
            fighter2: fight.fighter2.clone(),
            fighter1_probability: Some(fight.prediction.win_probability.fighter1),
            fighter2_probability: Some(fight.prediction.win_probability.fighter2),
            confidence: fight.prediction.confidence,
            recommended_bet: fight.prediction.recommended_bet.clone(),
            likely_method: fight.prediction.likely_method,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParlayLeg {
    pub analyzed_fight_id: Option<i64>,
    pub fighters: String,
    pub pick: String,
    pub recommended_bet: String,
    pub confidence: f64,
    pub method: String,
    pub odds: Option<i64>,
    pub decimal_odds: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parlay {
    pub size: usize,
    pub legs: Vec<ParlayLeg>,
    /// Product of leg confidences, in percent.
    pub total_confidence: f64,
    /// `None` when any leg is missing odds.
    pub total_decimal_odds: Option<f64>,
    pub total_american_odds: Option<i64>,
    pub expected_value: Option<f64>,
    pub risk_level: RiskLevel,
    /// Percent of bankroll.
    pub recommended_stake: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredParlay {
    pub id: i64,
    pub created_at: String,
    #[serde(flatten)]
    pub parlay: Parlay,
}
