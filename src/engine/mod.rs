pub mod heuristic;
pub mod kelly;
pub mod parlay;
pub mod report;

pub use heuristic::predict;
pub use kelly::betting_advice;
pub use parlay::build_parlay;
pub use report::format_report;

/// Round half away from zero to `places` decimals.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
