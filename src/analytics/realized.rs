//! Realized volatility from daily bars
//!
//! Close-to-close log returns, sample standard deviation, annualized with
//! 252 trading days and expressed in vol points.

use statrs::statistics::Statistics;

use crate::core::{is_strictly_ascending, log_returns, round_to, DailyBar, EngineError, EngineResult, RealizedVol};

const TRADING_DAYS: f64 = 252.0;

/// Bars needed for the shortest (10 return) window
pub const MIN_BARS: usize = 11;
/// Bars needed for the standalone RV30 helper
pub const RV30_BARS: usize = 31;
/// Bars needed for ATR(14)
pub const ATR_BARS: usize = 15;

fn annualized(returns: &[f64]) -> f64 {
    returns.std_dev() * TRADING_DAYS.sqrt() * 100.0
}

fn trailing(returns: &[f64], n: usize) -> Option<&[f64]> {
    (returns.len() >= n).then(|| &returns[returns.len() - n..])
}

/// RV10/20/30/60 and acceleration
///
/// A window longer than the available history takes the value of the next
/// shorter window.
pub fn compute(bars: &[DailyBar]) -> EngineResult<RealizedVol> {
    if bars.len() < MIN_BARS {
        return Err(EngineError::insufficient("realized vol bars", MIN_BARS, bars.len()));
    }
    if !is_strictly_ascending(bars) {
        return Err(EngineError::invalid_input("bars must be date-ascending without duplicates"));
    }

    let returns = log_returns(bars);

    let rv10 = annualized(&returns[returns.len() - 10..]);
    let rv20 = trailing(&returns, 20).map_or(rv10, annualized);
    let rv30 = trailing(&returns, 30).map_or(rv20, annualized);
    let rv60 = trailing(&returns, 60).map_or(rv30, annualized);

    let accel = if rv30 > 0.0 { rv10 / rv30 } else { 1.0 };

    Ok(RealizedVol {
        rv10: round_to(rv10, 2),
        rv20: round_to(rv20, 2),
        rv30: round_to(rv30, 2),
        rv60: round_to(rv60, 2),
        rv_acceleration: round_to(accel, 3),
    })
}

/// RV30 from the last 31 bars; `None` with fewer
pub fn rv30_from_bars(bars: &[DailyBar]) -> Option<f64> {
    if bars.len() < RV30_BARS {
        return None;
    }
    let returns = log_returns(&bars[bars.len() - RV30_BARS..]);
    Some(round_to(annualized(&returns), 2))
}

/// 14-session average true range; `None` with fewer than 15 bars
pub fn atr14(bars: &[DailyBar]) -> Option<f64> {
    if bars.len() < ATR_BARS {
        return None;
    }
    let tail = &bars[bars.len() - ATR_BARS..];
    let sum: f64 = tail.windows(2).map(|w| w[1].true_range(w[0].close)).sum();
    Some(round_to(sum / 14.0, 2))
}
