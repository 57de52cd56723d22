use std::fmt;

use crate::engine::heuristic::win_rate;
use crate::engine::round_to;
use crate::types::{BetSizing, BettingAdvice, FightPrediction, Fighter};

/// Multi-line plain-text report of both fighters, the prediction, and the
/// betting advice.
pub fn format_report(
    f1: &Fighter,
    f2: &Fighter,
    prediction: &FightPrediction,
    advice: &BettingAdvice,
) -> String {
    let report = Report {
        f1,
        f2,
        prediction,
        advice,
    };
    report.to_string().trim_end().to_string()
}

struct Report<'a> {
    f1: &'a Fighter,
    f2: &'a Fighter,
    prediction: &'a FightPrediction,
    advice: &'a BettingAdvice,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Report {
            f1,
            f2,
            prediction,
            advice,
        } = self;

        writeln!(out, "Fight Analysis:")?;
        writeln!(out)?;
        writeln!(out, "{} vs {}", f1.name, f2.name)?;
        writeln!(out)?;
        write_fighter(out, "Fighter 1", f1)?;
        writeln!(out)?;
        write_fighter(out, "Fighter 2", f2)?;
        writeln!(out)?;

        writeln!(out, "Prediction:")?;
        writeln!(
            out,
            "Win Probability: {} {:.1}% | {} {:.1}%",
            f1.name, prediction.win_probability.fighter1, f2.name, prediction.win_probability.fighter2,
        )?;
        writeln!(out, "Finish Probability: {:.1}%", prediction.finish_probability)?;
        writeln!(out, "Goes to Distance: {}", prediction.goes_to_distance)?;
        match prediction.likely_method {
            Some(m) => writeln!(out, "Likely Method: {m}")?,
            None => writeln!(out, "Likely Method: n/a")?,
        }
        match prediction.confidence {
            Some(c) => writeln!(out, "Confidence: {c:.1}%")?,
            None => writeln!(out, "Confidence: n/a")?,
        }
        writeln!(out, "Recommended Bet: {}", prediction.recommended_bet)?;
        writeln!(out)?;

        writeln!(out, "Betting Advice:")?;
        write_advice(out, f1, advice.fighter1.as_ref())?;
        write_advice(out, f2, advice.fighter2.as_ref())
    }
}

fn write_fighter(out: &mut fmt::Formatter<'_>, label: &str, f: &Fighter) -> fmt::Result {
    writeln!(out, "{label}: {}", f.name)?;
    writeln!(out, "Record: {}", f.record())?;
    writeln!(out, "KO Wins: {}", f.ko_wins)?;
    writeln!(out, "Submission Wins: {}", f.sub_wins)?;
    writeln!(out, "Decision Wins: {}", f.decision_wins)?;
    writeln!(out, "Height: {}", measure(f.height))?;
    writeln!(out, "Reach: {}", measure(f.reach))?;
    writeln!(out, "Strike Accuracy: {:.1}%", f.strike_accuracy)?;
    writeln!(out, "Takedown Accuracy: {:.1}%", f.takedown_accuracy)?;
    writeln!(out, "Takedown Defense: {:.1}%", f.takedown_defense)?;
    writeln!(out, "Win Rate: {:.1}%", round_to(win_rate(f), 1))
}

fn write_advice(out: &mut fmt::Formatter<'_>, f: &Fighter, sizing: Option<&BetSizing>) -> fmt::Result {
    match (f.american_odds, sizing) {
        (Some(odds), Some(s)) => writeln!(
            out,
            "{} ({odds:+}): Kelly {:.1}% of bankroll, EV {:+.3}",
            f.name, s.kelly_bet, s.expected_value,
        ),
        _ => writeln!(out, "{}: no odds supplied", f.name),
    }
}

fn measure(v: f64) -> String {
    if v > 0.0 {
        format!("{v}")
    } else {
        "n/a".to_string()
    }
}
