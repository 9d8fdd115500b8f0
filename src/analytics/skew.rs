//! Volatility skew for the expiry nearest the target tenor
//!
//! Points are indexed by unsigned delta (0-100). When the chain carries no
//! deltas at all, moneyness is mapped onto a pseudo-delta instead.

use chrono::NaiveDate;
use statrs::statistics::Statistics;

use super::chain::ExpiryChains;
use super::term_structure::AtmTarget;
use crate::core::{round_to, OptionContract, OptionType, SkewPoint, VolSkew};

/// Delta window (exclusive) for the ~25 delta put bucket
const PUT_25D_BUCKET: (f64, f64) = (20.0, 30.0);
/// Delta window (exclusive) for the ~50 delta bucket
const ATM_BUCKET: (f64, f64) = (40.0, 60.0);

fn in_open(x: f64, (lo, hi): (f64, f64)) -> bool {
    x > lo && x < hi
}

/// Delta-space point, if the contract's delta lies inside its wing
fn delta_point(c: &OptionContract, iv: f64) -> Option<SkewPoint> {
    let d = c.delta?;
    let in_wing = match c.option_type {
        OptionType::Put => in_open(d, (-0.9, -0.05)),
        OptionType::Call => in_open(d, (0.05, 0.9)),
    };
    in_wing.then(|| SkewPoint {
        delta: round_to(d.abs() * 100.0, 1),
        iv: round_to(iv * 100.0, 2),
        option_type: c.option_type,
    })
}

/// Moneyness-proxied point for chains without greeks
fn moneyness_point(c: &OptionContract, spot: f64, iv: f64) -> Option<SkewPoint> {
    let m = c.moneyness(spot);
    let pseudo = match c.option_type {
        OptionType::Put if in_open(m, (0.8, 1.0)) => (1.0 - m) * 100.0 * 2.0,
        OptionType::Call if in_open(m, (1.0, 1.2)) => (1.0 - (m - 1.0) * 2.0) * 50.0,
        _ => return None,
    };
    Some(SkewPoint {
        delta: round_to(pseudo, 1).clamp(5.0, 50.0),
        iv: round_to(iv * 100.0, 2),
        option_type: c.option_type,
    })
}

/// Least-squares slope of iv on delta; 0 with fewer than two points or no
/// spread in delta
fn ols_slope(points: &[&SkewPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mean_x = points.iter().map(|p| p.delta).mean();
    let mean_y = points.iter().map(|p| p.iv).mean();

    let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), p| {
        let dx = p.delta - mean_x;
        (sxy + dx * (p.iv - mean_y), sxx + dx * dx)
    });

    if sxx <= f64::EPSILON {
        return 0.0;
    }
    round_to(sxy / sxx, 4)
}

fn bucket_mean<'a>(points: impl Iterator<Item = &'a SkewPoint>, bucket: (f64, f64)) -> Option<f64> {
    let ivs: Vec<f64> = points.filter(|p| in_open(p.delta, bucket)).map(|p| p.iv).collect();
    if ivs.is_empty() {
        None
    } else {
        Some(ivs.iter().mean())
    }
}

/// Skew of the expiry whose DTE is closest to `target.target_dte`
pub fn build(contracts: &[OptionContract], spot: f64, as_of: NaiveDate, target: AtmTarget) -> VolSkew {
    let chains = ExpiryChains::group(contracts);
    let Some((expiry, dte)) = chains
        .live_expiries(as_of)
        .into_iter()
        .min_by_key(|(_, dte)| (dte - target.target_dte).abs())
    else {
        return VolSkew::empty();
    };

    if (dte - target.target_dte).abs() > target.tolerance {
        tracing::debug!(
            "Skew expiry {} is {} DTE, outside {}±{}",
            expiry,
            dte,
            target.target_dte,
            target.tolerance
        );
    }

    let chain: Vec<(&OptionContract, f64)> = chains
        .chain(expiry)
        .unwrap_or_default()
        .iter()
        .filter_map(|c| c.valid_iv().map(|iv| (*c, iv)))
        .collect();

    let has_greeks = chain.iter().any(|(c, _)| c.delta.is_some());

    let mut points: Vec<SkewPoint> = chain
        .iter()
        .filter_map(|(c, iv)| {
            if has_greeks {
                delta_point(c, *iv)
            } else {
                moneyness_point(c, spot, *iv)
            }
        })
        .collect();
    points.sort_by(|a, b| a.delta.total_cmp(&b.delta));

    let puts: Vec<&SkewPoint> = points.iter().filter(|p| p.option_type == OptionType::Put).collect();
    let calls: Vec<&SkewPoint> = points.iter().filter(|p| p.option_type == OptionType::Call).collect();

    let skew_25d = match (
        bucket_mean(puts.iter().copied(), PUT_25D_BUCKET),
        bucket_mean(points.iter(), ATM_BUCKET),
    ) {
        (Some(put_25d), Some(atm)) => round_to(put_25d - atm, 2),
        _ => 0.0,
    };

    VolSkew {
        put_skew_slope: ols_slope(&puts),
        call_skew_slope: ols_slope(&calls),
        skew_25d,
        points,
    }
}
