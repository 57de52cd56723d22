//! Kelly criterion sizing against American odds.

use crate::engine::round_to;
use crate::error::{AppError, Result};
use crate::types::{BetSizing, BettingAdvice, FightPrediction, Fighter};

/// Decimal payout multiplier (stake included) for American odds.
/// `+150` → 2.5, `-200` → 1.5. Zero has no payout and is rejected.
pub fn american_to_decimal(odds: i64) -> Result<f64> {
    match odds {
        0 => Err(AppError::InvalidOdds(odds)),
        o if o > 0 => Ok(o as f64 / 100.0 + 1.0),
        o => Ok(100.0 / o.unsigned_abs() as f64 + 1.0),
    }
}

/// Inverse of [`american_to_decimal`]. `None` for multipliers that pay nothing.
pub fn decimal_to_american(decimal: f64) -> Option<i64> {
    if !decimal.is_finite() || decimal <= 1.0 {
        return None;
    }
    let american = if decimal >= 2.0 {
        (decimal - 1.0) * 100.0
    } else {
        -100.0 / (decimal - 1.0)
    };
    Some(american.round() as i64)
}

/// Full-Kelly stake and per-unit expected value.
///
/// - `probability`: true win probability in [0, 1]; clamped if outside
/// - `odds`: American odds for that side
///
/// Stake is a percent of bankroll, one decimal, never negative.
/// EV is profit per unit staked, three decimals.
pub fn kelly_bet(probability: f64, odds: i64) -> Result<BetSizing> {
    let p = if probability.is_finite() {
        probability.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let q = 1.0 - p;
    // net odds: profit per unit staked
    let b = american_to_decimal(odds)? - 1.0;

    let f_star = (b * p - q) / b;
    let ev = p * b - q;

    Ok(BetSizing {
        kelly_bet: round_to((f_star * 100.0).max(0.0), 1),
        expected_value: round_to(ev, 3),
    })
}

/// Size both corners from the predicted win split. A corner without odds
/// gets no advice.
pub fn betting_advice(
    f1: &Fighter,
    f2: &Fighter,
    prediction: &FightPrediction,
) -> Result<BettingAdvice> {
    let side = |fighter: &Fighter, pct: f64| {
        fighter
            .american_odds
            .map(|odds| kelly_bet(pct / 100.0, odds))
            .transpose()
    };
    Ok(BettingAdvice {
        fighter1: side(f1, prediction.win_probability.fighter1)?,
        fighter2: side(f2, prediction.win_probability.fighter2)?,
    })
}
