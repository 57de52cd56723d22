//! Finish-rate heuristic over two normalized fighters.
//!
//! Win probability comes from the raw win rates alone; finish probability,
//! likely method and the recommended bet come from the averaged KO,
//! submission and decision rates. The two halves are independent.

use tracing::warn;

use crate::config::heuristic_thresholds::*;
use crate::engine::round_to;
use crate::types::{FightPrediction, Fighter, FinishMethod, GoesToDistance, WinProbability};

/// wins / (wins + losses) in percent, 0 for a fighter with no recorded fights.
pub fn win_rate(f: &Fighter) -> f64 {
    let total = f.wins as u64 + f.losses as u64;
    if total == 0 {
        return 0.0;
    }
    f.wins as f64 * 100.0 / total as f64
}

pub fn ko_rate(f: &Fighter) -> f64 {
    share_of_wins(f.ko_wins, f.wins)
}

pub fn sub_rate(f: &Fighter) -> f64 {
    share_of_wins(f.sub_wins, f.wins)
}

pub fn decision_rate(f: &Fighter) -> f64 {
    share_of_wins(f.decision_wins, f.wins)
}

fn share_of_wins(part: u32, wins: u32) -> f64 {
    if wins == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / wins as f64
}

/// Method rates averaged across both corners, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinishProfile {
    pub combined_ko: f64,
    pub combined_sub: f64,
    pub combined_decision: f64,
    /// KO + submission, capped at 100.
    pub combined_finish: f64,
}

pub fn finish_profile(f1: &Fighter, f2: &Fighter) -> FinishProfile {
    let combined_ko = (ko_rate(f1) + ko_rate(f2)) / 2.0;
    let combined_sub = (sub_rate(f1) + sub_rate(f2)) / 2.0;
    let combined_decision = (decision_rate(f1) + decision_rate(f2)) / 2.0;
    FinishProfile {
        combined_ko,
        combined_sub,
        combined_decision,
        combined_finish: (combined_ko + combined_sub).min(100.0),
    }
}

/// Normalized win-rate split. Falls back to 50/50 when neither fighter has
/// a single win on record.
pub fn win_probability(f1: &Fighter, f2: &Fighter) -> WinProbability {
    let r1 = win_rate(f1);
    let r2 = win_rate(f2);
    if r1 + r2 <= 0.0 {
        return WinProbability {
            fighter1: 50.0,
            fighter2: 50.0,
        };
    }
    let p1 = r1 / (r1 + r2) * 100.0;
    WinProbability {
        fighter1: round_to(p1, 1),
        fighter2: round_to(100.0 - p1, 1),
    }
}

/// First matching lean wins.
pub fn recommended_bet(p: &FinishProfile) -> &'static str {
    if p.combined_decision > DECISION_LEAN {
        "goes to decision (confident)"
    } else if p.combined_ko > KO_LEAN {
        "KO/TKO (high confidence)"
    } else if p.combined_sub > SUB_LEAN {
        "submission (high confidence)"
    } else if p.combined_ko + p.combined_sub > FINISH_LEAN {
        "doesn't go to decision (moderate confidence)"
    } else {
        "no strong lean"
    }
}

/// Run the heuristic. Never fails: anything non-finite yields the neutral
/// fallback prediction.
pub fn predict(f1: &Fighter, f2: &Fighter) -> FightPrediction {
    sanitize(compute(f1, f2))
}

fn compute(f1: &Fighter, f2: &Fighter) -> FightPrediction {
    let profile = finish_profile(f1, f2);
    let finish = profile.combined_finish;

    let goes_to_distance = if finish < DISTANCE_CUTOFF {
        GoesToDistance::High
    } else {
        GoesToDistance::Low
    };

    let (likely_method, confidence) = if finish > DISTANCE_CUTOFF {
        let method = if profile.combined_ko > profile.combined_sub {
            FinishMethod::KoTko
        } else {
            FinishMethod::Submission
        };
        let confidence = round_to(finish.clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEIL), 1);
        (Some(method), Some(confidence))
    } else {
        (None, None)
    };

    FightPrediction {
        win_probability: win_probability(f1, f2),
        finish_probability: round_to(finish, 1),
        goes_to_distance,
        likely_method,
        confidence,
        recommended_bet: recommended_bet(&profile).to_string(),
    }
}

fn sanitize(p: FightPrediction) -> FightPrediction {
    let finite = p.win_probability.fighter1.is_finite()
        && p.win_probability.fighter2.is_finite()
        && p.finish_probability.is_finite()
        && p.confidence.map_or(true, f64::is_finite);
    if finite {
        p
    } else {
        warn!(?p, "Heuristic produced non-finite output, using fallback prediction");
        FightPrediction::fallback()
    }
}
