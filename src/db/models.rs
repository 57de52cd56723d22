//! Database row types matching `migrations/0001_init.sql`.
//! Used by sqlx for typed queries.

use crate::types::{
    AnalyzedFight, BetSizing, BettingAdvice, Corner, FightPrediction, FinishMethod,
    GoesToDistance, Parlay, ParlayLeg, RiskLevel, StoredParlay, WinProbability,
};

#[derive(Debug, sqlx::FromRow)]
pub struct AnalyzedFightRow {
    pub id: i64,
    pub fighter1_name: String,
    pub fighter2_name: String,
    pub fighter1_odds: Option<i64>,
    pub fighter2_odds: Option<i64>,
    pub fighter1_probability: f64,
    pub fighter2_probability: f64,
    pub finish_probability: f64,
    pub goes_to_distance: String,
    pub likely_method: Option<String>,
    pub confidence: Option<f64>,
    pub recommended_bet: String,
    pub fighter1_kelly: Option<f64>,
    pub fighter1_ev: Option<f64>,
    pub fighter2_kelly: Option<f64>,
    pub fighter2_ev: Option<f64>,
    pub analysis: String,
    pub created_at: String,
}

fn sizing(kelly: Option<f64>, ev: Option<f64>) -> Option<BetSizing> {
    Some(BetSizing {
        kelly_bet: kelly?,
        expected_value: ev?,
    })
}

impl From<AnalyzedFightRow> for AnalyzedFight {
    fn from(r: AnalyzedFightRow) -> Self {
        Self {
            id: r.id,
            fighter1: Corner {
                name: r.fighter1_name,
                odds: r.fighter1_odds,
            },
            fighter2: Corner {
                name: r.fighter2_name,
                odds: r.fighter2_odds,
            },
            prediction: FightPrediction {
                win_probability: WinProbability {
                    fighter1: r.fighter1_probability,
                    fighter2: r.fighter2_probability,
                },
                finish_probability: r.finish_probability,
                goes_to_distance: GoesToDistance::parse(&r.goes_to_distance),
                likely_method: r.likely_method.as_deref().and_then(FinishMethod::parse),
                confidence: r.confidence,
                recommended_bet: r.recommended_bet,
            },
            betting_advice: BettingAdvice {
                fighter1: sizing(r.fighter1_kelly, r.fighter1_ev),
                fighter2: sizing(r.fighter2_kelly, r.fighter2_ev),
            },
            analysis: r.analysis,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ParlayRow {
    pub id: i64,
    pub size: i64,
    pub total_confidence: f64,
    pub total_decimal_odds: Option<f64>,
    pub total_american_odds: Option<i64>,
    pub expected_value: Option<f64>,
    pub risk_level: String,
    pub recommended_stake: f64,
    pub created_at: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ParlayLegRow {
    pub analyzed_fight_id: Option<i64>,
    pub fighters: String,
    pub pick: String,
    pub recommended_bet: String,
    pub confidence: f64,
    pub method: String,
    pub odds: Option<i64>,
    pub decimal_odds: Option<f64>,
}

impl From<ParlayLegRow> for ParlayLeg {
    fn from(r: ParlayLegRow) -> Self {
        Self {
            analyzed_fight_id: r.analyzed_fight_id,
            fighters: r.fighters,
            pick: r.pick,
            recommended_bet: r.recommended_bet,
            confidence: r.confidence,
            method: r.method,
            odds: r.odds,
            decimal_odds: r.decimal_odds,
        }
    }
}

impl ParlayRow {
    pub fn into_stored(self, legs: Vec<ParlayLeg>) -> StoredParlay {
        StoredParlay {
            id: self.id,
            created_at: self.created_at,
            parlay: Parlay {
                size: self.size.max(0) as usize,
                legs,
                total_confidence: self.total_confidence,
                total_decimal_odds: self.total_decimal_odds,
                total_american_odds: self.total_american_odds,
                expected_value: self.expected_value,
                risk_level: RiskLevel::parse(&self.risk_level),
                recommended_stake: self.recommended_stake,
            },
        }
    }
}
