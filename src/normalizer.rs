//! Coerces loosely typed fighter input into a fully populated `Fighter`.
//!
//! Missing, null, or unparsable fields fall back to zero. Strings are read
//! with leading-number semantics, so `"10 wins"` is 10 and `"5'11\""` is 5.

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::types::{Fighter, RawFighter};

/// Normalize every stat. Never fails; an absent name becomes an empty string,
/// callers that need a name check it with [`require_name`] first.
pub fn normalize(raw: &RawFighter) -> Fighter {
    Fighter {
        name: fighter_name(raw).unwrap_or_default(),
        age: measure(raw.age.as_ref()),
        height: measure(raw.height.as_ref()),
        reach: measure(raw.reach.as_ref()),
        wins: count(raw.wins.as_ref()),
        losses: count(raw.losses.as_ref()),
        ko_wins: count(raw.ko_wins.as_ref()),
        sub_wins: count(raw.sub_wins.as_ref()),
        decision_wins: count(raw.decision_wins.as_ref()),
        strike_accuracy: percent(raw.strike_accuracy.as_ref()),
        takedown_accuracy: percent(raw.takedown_accuracy.as_ref()),
        takedown_defense: percent(raw.takedown_defense.as_ref()),
        american_odds: parse_odds(raw.american_odds.as_ref()),
    }
}

/// Trimmed, non-empty fighter name.
pub fn fighter_name(raw: &RawFighter) -> Option<String> {
    let name = match raw.name.as_ref()? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!name.is_empty()).then_some(name)
}

/// Validate and normalize one corner of a request.
pub fn require_fighter(raw: Option<&RawFighter>, corner: &str) -> Result<Fighter> {
    let raw = raw.ok_or_else(|| AppError::Validation(format!("{corner} is required")))?;
    require_name(raw, corner)?;
    Ok(normalize(raw))
}

pub fn require_name(raw: &RawFighter, corner: &str) -> Result<String> {
    fighter_name(raw).ok_or_else(|| AppError::Validation(format!("{corner}.name is required")))
}

/// Read any JSON scalar as a number. Booleans, arrays and objects are not numbers.
pub fn parse_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => leading_number(s)?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub fn parse_odds(v: Option<&Value>) -> Option<i64> {
    v.and_then(parse_number).map(|n| n.round() as i64)
}

fn count(v: Option<&Value>) -> u32 {
    v.and_then(parse_number)
        .map(|n| n.trunc().clamp(0.0, u32::MAX as f64) as u32)
        .unwrap_or(0)
}

fn percent(v: Option<&Value>) -> f64 {
    v.and_then(parse_number)
        .map(|n| n.clamp(0.0, 100.0))
        .unwrap_or(0.0)
}

fn measure(v: Option<&Value>) -> f64 {
    v.and_then(parse_number).map(|n| n.max(0.0)).unwrap_or(0.0)
}

/// Longest prefix of the form `[+-]?digits[.digits]`, after leading whitespace.
fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut digits = 0;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => digits += 1,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if digits == 0 {
        return None;
    }
    s[..end].trim_end_matches('.').parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> RawFighter {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let f = normalize(&raw(json!({ "name": "Jones" })));
        assert_eq!(f, Fighter::named("Jones"));
    }

    #[test]
    fn strings_and_numbers_are_coerced() {
        let f = normalize(&raw(json!({
            "name": "  Adesanya ",
            "wins": "24",
            "losses": 3,
            "koWins": "16 ",
            "subWins": "",
            "decisionWins": null,
            "height": "6'4\"",
            "reach": 80.5,
            "strikeAccuracy": "49.5%",
            "americanOdds": "+150",
        })));
        assert_eq!(f.name, "Adesanya");
        assert_eq!(f.wins, 24);
        assert_eq!(f.losses, 3);
        assert_eq!(f.ko_wins, 16);
        assert_eq!(f.sub_wins, 0);
        assert_eq!(f.decision_wins, 0);
        assert_eq!(f.height, 6.0);
        assert_eq!(f.reach, 80.5);
        assert_eq!(f.strike_accuracy, 49.5);
        assert_eq!(f.american_odds, Some(150));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let f = normalize(&raw(json!({
            "name": "X",
            "wins": -4,
            "losses": 2.9,
            "takedownDefense": 140,
            "takedownAccuracy": "-3",
            "age": true,
        })));
        assert_eq!(f.wins, 0);
        assert_eq!(f.losses, 2);
        assert_eq!(f.takedown_defense, 100.0);
        assert_eq!(f.takedown_accuracy, 0.0);
        assert_eq!(f.age, 0.0);
    }

    #[test]
    fn odds_accept_legacy_key_and_ignore_placeholders() {
        assert_eq!(normalize(&raw(json!({ "odds": -200 }))).american_odds, Some(-200));
        assert_eq!(normalize(&raw(json!({ "odds": "N/A" }))).american_odds, None);
    }

    #[test]
    fn name_is_required() {
        assert!(require_name(&raw(json!({ "name": "   " })), "fighter1").is_err());
        assert!(require_name(&raw(json!({})), "fighter1").is_err());
        assert!(require_fighter(None, "fighter2").is_err());
        let f = require_fighter(Some(&raw(json!({ "name": "Poirier", "wins": 30 }))), "fighter1").unwrap();
        assert_eq!(f.wins, 30);
    }

    #[test]
    fn leading_number_parses_prefixes() {
        assert_eq!(leading_number("12abc"), Some(12.0));
        assert_eq!(leading_number(" -7.5 "), Some(-7.5));
        assert_eq!(leading_number("3."), Some(3.0));
        assert_eq!(leading_number("abc"), None);
        assert_eq!(leading_number("+"), None);
        assert_eq!(leading_number("."), None);
    }
}
