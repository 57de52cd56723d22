//! Combines the most confident analyzed fights into a parlay.

use std::cmp::Ordering;

use crate::config::parlay_risk::{LOW_ABOVE, MAX_STAKE_PCT, MEDIUM_ABOVE};
use crate::config::{MAX_PARLAY_SIZE, MIN_PARLAY_SIZE};
use crate::engine::kelly::{american_to_decimal, decimal_to_american};
use crate::engine::round_to;
use crate::error::{AppError, Result};
use crate::types::{Corner, Parlay, ParlayCandidate, ParlayLeg, RiskLevel};

pub fn validate_size(size: usize) -> Result<()> {
    if (MIN_PARLAY_SIZE..=MAX_PARLAY_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "parlay size must be between {MIN_PARLAY_SIZE} and {MAX_PARLAY_SIZE}, got {size}"
        )))
    }
}

/// Leg confidence in percent; missing counts as zero.
fn confidence(c: &ParlayCandidate) -> f64 {
    c.confidence
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0))
        .unwrap_or(0.0)
}

/// Take the `size` most confident candidates and aggregate them.
///
/// Ties keep their input order. Fails with `InsufficientFights` when fewer
/// than `size` candidates are available.
pub fn build_parlay(mut candidates: Vec<ParlayCandidate>, size: usize) -> Result<Parlay> {
    validate_size(size)?;
    if candidates.len() < size {
        return Err(AppError::InsufficientFights {
            required: size,
            available: candidates.len(),
        });
    }

    candidates.sort_by(|a, b| {
        confidence(b)
            .partial_cmp(&confidence(a))
            .unwrap_or(Ordering::Equal)
    });
    candidates.truncate(size);

    let legs = candidates
        .iter()
        .map(build_leg)
        .collect::<Result<Vec<_>>>()?;

    let confidence_product: f64 = legs.iter().map(|l| l.confidence / 100.0).product();
    let avg_confidence = legs.iter().map(|l| l.confidence).sum::<f64>() / legs.len() as f64;
    let total_decimal = legs
        .iter()
        .map(|l| l.decimal_odds)
        .product::<Option<f64>>();
    let total_confidence = round_to(confidence_product * 100.0, 2);

    Ok(Parlay {
        size,
        total_confidence,
        total_decimal_odds: total_decimal.map(|d| round_to(d, 3)),
        total_american_odds: total_decimal.and_then(decimal_to_american),
        expected_value: total_decimal.map(|d| round_to(d - 1.0, 2)),
        risk_level: risk_level(avg_confidence),
        recommended_stake: round_to((total_confidence / 100.0 * 2.0).min(MAX_STAKE_PCT), 1),
        legs,
    })
}

pub fn risk_level(avg_confidence: f64) -> RiskLevel {
    if avg_confidence > LOW_ABOVE {
        RiskLevel::Low
    } else if avg_confidence > MEDIUM_ABOVE {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

fn build_leg(c: &ParlayCandidate) -> Result<ParlayLeg> {
    let picked = pick(c);
    let decimal_odds = picked.odds.map(american_to_decimal).transpose()?;
    Ok(ParlayLeg {
        analyzed_fight_id: c.analyzed_fight_id,
        fighters: format!("{} vs {}", c.fighter1.name, c.fighter2.name),
        pick: picked.name.clone(),
        recommended_bet: c.recommended_bet.clone(),
        confidence: confidence(c),
        method: c
            .likely_method
            .map(|m| m.to_string())
            .unwrap_or_else(|| "Decision".to_string()),
        odds: picked.odds,
        decimal_odds,
    })
}

/// The corner named in the recommended bet, else the favourite, else fighter 1.
/// When both names appear (one contains the other), the longer match wins.
fn pick(c: &ParlayCandidate) -> &Corner {
    let bet = c.recommended_bet.to_lowercase();
    match (mentions(&bet, &c.fighter1.name), mentions(&bet, &c.fighter2.name)) {
        (Some(l1), Some(l2)) if l2 > l1 => return &c.fighter2,
        (Some(_), _) => return &c.fighter1,
        (None, Some(_)) => return &c.fighter2,
        (None, None) => {}
    }
    match (c.fighter1_probability, c.fighter2_probability) {
        (Some(p1), Some(p2)) if p2 > p1 => &c.fighter2,
        _ => &c.fighter1,
    }
}

/// Length of `name` if it occurs in `bet` as whole words.
fn mentions(bet: &str, name: &str) -> Option<usize> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }
    let boundary = |ch: Option<char>| ch.map_or(true, |ch| !ch.is_alphanumeric());
    bet.match_indices(&name)
        .any(|(at, m)| boundary(bet[..at].chars().next_back()) && boundary(bet[at + m.len()..].chars().next()))
        .then_some(name.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FinishMethod;

    fn candidate(id: i64, confidence: Option<f64>, odds1: i64, odds2: i64) -> ParlayCandidate {
        ParlayCandidate {
            analyzed_fight_id: Some(id),
            fighter1: Corner {
                name: format!("Red {id}"),
                odds: Some(odds1),
            },
            fighter2: Corner {
                name: format!("Blue {id}"),
                odds: Some(odds2),
            },
            fighter1_probability: Some(60.0),
            fighter2_probability: Some(40.0),
            confidence,
            recommended_bet: "KO/TKO (high confidence)".to_string(),
            likely_method: Some(FinishMethod::KoTko),
        }
    }

    #[test]
    fn insufficient_fights_is_reported() {
        let pool = vec![candidate(1, Some(80.0), 150, -200), candidate(2, Some(70.0), 150, -200)];
        match build_parlay(pool, 3) {
            Err(AppError::InsufficientFights { required, available }) => {
                assert_eq!(required, 3);
                assert_eq!(available, 2);
            }
            other => panic!("expected InsufficientFights, got {other:?}"),
        }
    }

    #[test]
    fn size_bounds_are_enforced() {
        let pool: Vec<_> = (0..6).map(|i| candidate(i, Some(70.0), 100, -110)).collect();
        assert!(matches!(build_parlay(pool.clone(), 1), Err(AppError::Validation(_))));
        assert!(matches!(build_parlay(pool, 5), Err(AppError::Validation(_))));
    }

    #[test]
    fn selects_most_confident_and_aggregates() {
        let pool = vec![
            candidate(1, Some(62.0), 150, -200),
            candidate(2, Some(90.0), 150, -200),
            candidate(3, None, 150, -200),
            candidate(4, Some(80.0), -200, 150),
        ];
        let parlay = build_parlay(pool, 2).unwrap();
        let ids: Vec<_> = parlay.legs.iter().map(|l| l.analyzed_fight_id).collect();
        assert_eq!(ids, vec![Some(2), Some(4)]);
        // picks are the favourites (fighter1) at +150 and -200
        assert_eq!(parlay.total_decimal_odds, Some(3.75));
        assert_eq!(parlay.total_american_odds, Some(275));
        assert_eq!(parlay.expected_value, Some(2.75));
        assert_eq!(parlay.total_confidence, 72.0);
        assert_eq!(parlay.risk_level, RiskLevel::Low);
        assert_eq!(parlay.recommended_stake, 1.4);
        assert_eq!(parlay.legs[0].method, "KO/TKO");
    }

    #[test]
    fn confidence_never_rises_with_size() {
        let pool: Vec<_> = [88.0, 75.0, 91.0, 64.0, 70.0]
            .iter()
            .enumerate()
            .map(|(i, c)| candidate(i as i64, Some(*c), 120, -130))
            .collect();
        let mut prev = f64::INFINITY;
        for size in MIN_PARLAY_SIZE..=MAX_PARLAY_SIZE {
            let parlay = build_parlay(pool.clone(), size).unwrap();
            assert!(parlay.total_confidence <= prev);
            prev = parlay.total_confidence;
        }
    }

    #[test]
    fn missing_odds_leave_totals_empty() {
        let mut c = candidate(1, Some(70.0), 150, -200);
        c.fighter1.odds = None;
        let parlay = build_parlay(vec![c, candidate(2, Some(70.0), 150, -200)], 2).unwrap();
        assert_eq!(parlay.total_decimal_odds, None);
        assert_eq!(parlay.expected_value, None);
        assert_eq!(parlay.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn pick_prefers_named_corner_then_favourite() {
        let mut c = candidate(1, Some(70.0), 150, -200);
        c.recommended_bet = "blue 1 by decision".to_string();
        assert_eq!(pick(&c).name, "Blue 1");

        c.recommended_bet = "no strong lean".to_string();
        c.fighter1_probability = Some(35.0);
        c.fighter2_probability = Some(65.0);
        assert_eq!(pick(&c).name, "Blue 1");

        c.likely_method = None;
        let leg = build_leg(&c).unwrap();
        assert_eq!(leg.method, "Decision");
    }

    #[test]
    fn pick_takes_the_longest_whole_name() {
        let mut c = candidate(1, Some(70.0), 150, -200);
        c.fighter1.name = "Silva".to_string();
        c.fighter2.name = "Anderson Silva".to_string();
        c.recommended_bet = "Anderson Silva by KO/TKO".to_string();
        assert_eq!(pick(&c).name, "Anderson Silva");

        c.recommended_bet = "Silva by decision".to_string();
        assert_eq!(pick(&c).name, "Silva");

        // "Red 1" is not mentioned by "Red 10"
        let mut c = candidate(1, Some(70.0), 150, -200);
        c.fighter2.name = "Red 10".to_string();
        c.recommended_bet = "Red 10 by submission".to_string();
        assert_eq!(pick(&c).name, "Red 10");
    }

    #[test]
    fn risk_bands() {
        assert_eq!(risk_level(85.0), RiskLevel::Low);
        assert_eq!(risk_level(80.0), RiskLevel::Medium);
        assert_eq!(risk_level(65.0), RiskLevel::High);
    }
}
