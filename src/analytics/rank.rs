//! IV Rank and IV Percentile against a trailing history of ATM IV

use crate::core::round_to;

/// Below this many history values both measures default to 50
pub const MIN_HISTORY: usize = 20;
/// Ranges narrower than this (vol points) give a neutral rank
const MIN_RANGE: f64 = 0.1;

/// `(iv_rank, iv_percentile)`, both on 0-100
///
/// Rank is the position of `current` within the history's min/max range.
/// Percentile is the share of history values strictly below `current`.
/// History order does not matter.
pub fn rank(current: f64, historical: &[f64]) -> (f64, f64) {
    if historical.len() < MIN_HISTORY {
        return (50.0, 50.0);
    }

    let (lo, hi) = historical
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let range = hi - lo;

    let iv_rank = if range < MIN_RANGE {
        50.0
    } else {
        (current - lo) / range * 100.0
    };

    let below = historical.iter().filter(|v| **v < current).count();
    let percentile = below as f64 / historical.len() as f64 * 100.0;

    (round_to(iv_rank.clamp(0.0, 100.0), 1), round_to(percentile, 1))
}
