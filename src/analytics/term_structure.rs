//! ATM term structure
//!
//! Works from the per-expiry ATM IVs produced by the chain aggregator:
//! - Current ~30 DTE ATM IV (closest expiry, optionally blended with the next)
//! - Interpolation onto a fixed tenor grid with front/back slope
//! - Slope-only and ATM-only variants for point-in-time (backfill) dates
//!
//! DTE is always measured from an explicit `as_of` date. Output IVs are in
//! vol points.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{round_to, TermStructure, TermStructurePoint};

/// Tenor grid for the term-structure view
pub const TENOR_GRID: [(i64, &str); 8] = [
    (7, "1W"),
    (14, "2W"),
    (30, "1M"),
    (60, "2M"),
    (90, "3M"),
    (120, "4M"),
    (180, "6M"),
    (365, "1Y"),
];

/// Grid tenors more than this many days below the shortest observed expiry
/// are skipped
const GRID_MARGIN_BELOW: i64 = 5;
/// Grid tenors more than this many days beyond the longest observed expiry
/// are skipped
const GRID_MARGIN_ABOVE: i64 = 30;

/// Target tenor and acceptable distance for "the" ATM IV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtmTarget {
    pub target_dte: i64,
    pub tolerance: i64,
}

impl Default for AtmTarget {
    fn default() -> Self {
        Self {
            target_dte: 30,
            tolerance: 10,
        }
    }
}

/// One usable expiry: (dte, iv in vol points)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpiryIv {
    pub expiry: NaiveDate,
    pub dte: i64,
    pub iv: f64,
}

/// Usable expiries sorted by DTE; drops expired/same-day and absent IVs
pub fn expiry_ivs(per_expiry: &BTreeMap<NaiveDate, Option<f64>>, as_of: NaiveDate) -> Vec<ExpiryIv> {
    let mut out: Vec<ExpiryIv> = per_expiry
        .iter()
        .filter_map(|(expiry, iv)| {
            let dte = (*expiry - as_of).num_days();
            match iv {
                Some(iv) if dte > 0 => Some(ExpiryIv {
                    expiry: *expiry,
                    dte,
                    iv: iv * 100.0,
                }),
                _ => None,
            }
        })
        .collect();
    out.sort_by_key(|e| e.dte);
    out
}

/// Current ATM IV near the target tenor, in vol points
///
/// The closest expiry wins when it is within tolerance; if the next-closest
/// expiry also has an IV, the two are blended linearly by DTE. Otherwise the
/// three nearest expiries are tried in order and the first usable IV is
/// returned.
pub fn atm_iv(
    per_expiry: &BTreeMap<NaiveDate, Option<f64>>,
    as_of: NaiveDate,
    target: AtmTarget,
) -> Option<f64> {
    let mut candidates: Vec<(i64, Option<f64>)> = per_expiry
        .iter()
        .map(|(expiry, iv)| ((*expiry - as_of).num_days(), iv.map(|v| v * 100.0)))
        .filter(|(dte, _)| *dte > 0)
        .collect();

    if candidates.is_empty() {
        return None;
    }

    candidates.sort_by_key(|(dte, _)| (dte - target.target_dte).abs());

    let (best_dte, best_iv) = candidates[0];
    if (best_dte - target.target_dte).abs() <= target.tolerance {
        if let Some(iv) = best_iv {
            let blended = match candidates.get(1) {
                Some(&(next_dte, Some(next_iv))) if next_dte != best_dte => {
                    let w = ((target.target_dte - best_dte) as f64 / (next_dte - best_dte) as f64)
                        .clamp(0.0, 1.0);
                    iv * (1.0 - w) + next_iv * w
                }
                _ => iv,
            };
            return Some(round_to(blended, 2));
        }
    }

    let fallback = candidates
        .iter()
        .take(3)
        .find_map(|(_, iv)| *iv)
        .map(|iv| round_to(iv, 2));

    if fallback.is_some() {
        tracing::debug!(
            "No ATM IV within {} days of {} DTE; using nearest usable expiry",
            target.tolerance,
            target.target_dte
        );
    }
    fallback
}

/// Linear interpolation over sorted (x, y) pairs, flat beyond the ends
fn interp(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }
    let i = xs.partition_point(|v| *v <= x);
    let (x0, x1) = (xs[i - 1], xs[i]);
    let (y0, y1) = (ys[i - 1], ys[i]);
    if x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Full term structure on the fixed tenor grid
pub fn build(per_expiry: &BTreeMap<NaiveDate, Option<f64>>, as_of: NaiveDate) -> TermStructure {
    let observed = expiry_ivs(per_expiry, as_of);

    if observed.len() < 2 {
        return TermStructure::degenerate(Vec::new(), observed.first().map_or(0.0, |e| round_to(e.iv, 2)));
    }

    let dtes: Vec<f64> = observed.iter().map(|e| e.dte as f64).collect();
    let ivs: Vec<f64> = observed.iter().map(|e| e.iv).collect();
    let min_dte = observed[0].dte;
    let max_dte = observed[observed.len() - 1].dte;

    let points: Vec<TermStructurePoint> = TENOR_GRID
        .iter()
        .filter(|(tenor, _)| {
            *tenor >= min_dte - GRID_MARGIN_BELOW && *tenor <= max_dte + GRID_MARGIN_ABOVE
        })
        .map(|(tenor, label)| TermStructurePoint {
            tenor_days: *tenor,
            tenor_label: (*label).to_string(),
            iv: round_to(interp(*tenor as f64, &dtes, &ivs), 2),
        })
        .collect();

    if points.len() < 2 {
        let iv = points.first().map_or(0.0, |p| p.iv);
        return TermStructure::degenerate(points, iv);
    }

    let front_iv = points[0].iv;
    let back_iv = points[points.len() - 1].iv;
    let slope = if back_iv > 0.0 { front_iv / back_iv } else { 1.0 };

    TermStructure {
        points,
        slope: round_to(slope, 3),
        is_contango: slope < 1.0,
        front_iv: round_to(front_iv, 2),
        back_iv: round_to(back_iv, 2),
    }
}

/// Front/back ratio from the earliest and latest usable expiry, without
/// the tenor grid
pub fn historical_slope(
    per_expiry: &BTreeMap<NaiveDate, Option<f64>>,
    as_of: NaiveDate,
) -> Option<f64> {
    let observed = expiry_ivs(per_expiry, as_of);
    if observed.len() < 2 {
        return None;
    }

    let front = observed[0].iv;
    let back = observed[observed.len() - 1].iv;
    let slope = if back > 0.0 { front / back } else { 1.0 };
    Some(round_to(slope, 3))
}

/// Point-in-time ATM IV: the two expiries nearest the target blended by DTE
/// (no tolerance window), in vol points
pub fn historical_atm_iv(
    per_expiry: &BTreeMap<NaiveDate, Option<f64>>,
    as_of: NaiveDate,
    target_dte: i64,
) -> Option<f64> {
    let mut observed = expiry_ivs(per_expiry, as_of);
    match observed.len() {
        0 => None,
        1 => Some(round_to(observed[0].iv, 2)),
        _ => {
            observed.sort_by_key(|e| (e.dte - target_dte).abs());
            let (a, b) = (observed[0], observed[1]);
            if a.dte == b.dte {
                return Some(round_to((a.iv + b.iv) / 2.0, 2));
            }
            let w = ((target_dte - a.dte) as f64 / (b.dte - a.dte) as f64).clamp(0.0, 1.0);
            Some(round_to(a.iv * (1.0 - w) + b.iv * w, 2))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::chain::atm_iv_per_expiry;
    use crate::core::{OptionContract, OptionType};
    use chrono::Duration;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    fn curve(points: &[(i64, Option<f64>)]) -> BTreeMap<NaiveDate, Option<f64>> {
        points
            .iter()
            .map(|(dte, iv)| (as_of() + Duration::days(*dte), *iv))
            .collect()
    }

    #[test]
    fn test_expiry_ivs_filters_and_scales() {
        let m = curve(&[(-3, Some(0.5)), (0, Some(0.4)), (30, Some(0.2)), (60, None), (10, Some(0.25))]);
        let e = expiry_ivs(&m, as_of());
        assert_eq!(e.len(), 2);
        assert_eq!(e[0].dte, 10);
        assert!((e[0].iv - 25.0).abs() < 1e-9);
        assert_eq!(e[1].dte, 30);
    }

    #[test]
    fn test_atm_iv_exact_target() {
        let m = curve(&[(30, Some(0.20)), (60, Some(0.25))]);
        // Weight 0 toward the second expiry
        assert_eq!(atm_iv(&m, as_of(), AtmTarget::default()), Some(20.0));
    }

    #[test]
    fn test_atm_iv_blends_toward_second() {
        // Closest is 28 (dist 2), next 35 (dist 5): w = 2/7
        let m = curve(&[(28, Some(0.20)), (35, Some(0.27))]);
        let iv = atm_iv(&m, as_of(), AtmTarget::default()).unwrap();
        assert!((iv - 22.0).abs() < 0.01);
    }

    #[test]
    fn test_atm_iv_weight_clamped() {
        // Both expiries below target: weight would exceed 1 on the far side
        let m = curve(&[(25, Some(0.20)), (14, Some(0.30))]);
        let iv = atm_iv(&m, as_of(), AtmTarget::default()).unwrap();
        // w = (30-25)/(14-25) < 0 -> clamped to 0
        assert_eq!(iv, 20.0);
    }

    #[test]
    fn test_atm_iv_falls_back_outside_tolerance() {
        let m = curve(&[(90, Some(0.30)), (120, Some(0.32))]);
        assert_eq!(atm_iv(&m, as_of(), AtmTarget::default()), Some(30.0));
    }

    #[test]
    fn test_atm_iv_skips_absent_closest() {
        let m = curve(&[(30, None), (45, None), (7, Some(0.18)), (200, Some(0.3))]);
        // Nearest three: 30, 45, 7 -> 7 is the first usable
        assert_eq!(atm_iv(&m, as_of(), AtmTarget::default()), Some(18.0));

        let m = curve(&[(30, None), (45, None), (7, None), (200, Some(0.3))]);
        assert_eq!(atm_iv(&m, as_of(), AtmTarget::default()), None);
    }

    #[test]
    fn test_atm_iv_from_chain_between_brackets() {
        let spot = 500.0;
        let mut contracts = Vec::new();
        for dte in [30, 60] {
            let expiry = as_of() + Duration::days(dte);
            for i in 0..=8 {
                let strike = 480.0 + 5.0 * i as f64;
                let iv = 0.20 + (strike - spot).abs() / spot * 0.5;
                for t in [OptionType::Call, OptionType::Put] {
                    contracts.push(OptionContract::new("SPY", strike, expiry, t).with_iv(iv));
                }
            }
        }

        let per_expiry = atm_iv_per_expiry(&contracts, 501.0);
        let iv = atm_iv(&per_expiry, as_of(), AtmTarget::default()).unwrap();
        let lo = 20.0;
        let hi = (0.20 + 5.0 / spot * 0.5) * 100.0;
        assert!(iv > lo && iv < hi);
        assert!(iv > 15.0 && iv < 30.0);
    }

    #[test]
    fn test_build_grid() {
        let m = curve(&[(10, Some(0.30)), (40, Some(0.25)), (100, Some(0.22))]);
        let ts = build(&m, as_of());

        let tenors: Vec<i64> = ts.points.iter().map(|p| p.tenor_days).collect();
        // 7 is within 5 days of 10; 180 and 365 are beyond 100 + 30
        assert_eq!(tenors, vec![7, 14, 30, 60, 90, 120]);

        // Flat before first observation
        assert_eq!(ts.points[0].iv, 30.0);
        // 30 DTE: 2/3 of the way from 30 to 25
        assert!((ts.points[2].iv - 26.67).abs() < 1e-9);
        // Flat beyond the last observation
        assert_eq!(ts.points[5].iv, 22.0);

        assert!((ts.slope - 1.364).abs() < 1e-9);
        assert!(!ts.is_contango);
        assert_eq!(ts.front_iv, 30.0);
        assert_eq!(ts.back_iv, 22.0);
    }

    #[test]
    fn test_build_contango() {
        let m = curve(&[(14, Some(0.18)), (60, Some(0.21)), (180, Some(0.24))]);
        let ts = build(&m, as_of());
        assert!(ts.slope < 1.0);
        assert!(ts.is_contango);
        assert_eq!(ts.points.first().unwrap().tenor_label, "2W");
    }

    #[test]
    fn test_build_degenerate() {
        let ts = build(&curve(&[(30, Some(0.2))]), as_of());
        assert!(ts.points.is_empty());
        assert_eq!(ts.slope, 1.0);
        assert_eq!(ts.front_iv, 20.0);
        assert_eq!(ts.back_iv, 20.0);

        let ts = build(&BTreeMap::new(), as_of());
        assert_eq!(ts.slope, 1.0);
        assert_eq!(ts.front_iv, 0.0);
    }

    #[test]
    fn test_build_single_grid_point() {
        // Two expiries but only the 365 tenor survives the range filter
        let m = curve(&[(362, Some(0.2)), (370, Some(0.22))]);
        let ts = build(&m, as_of());
        assert_eq!(ts.points.len(), 1);
        assert_eq!(ts.slope, 1.0);
        assert_eq!(ts.front_iv, ts.back_iv);
    }

    #[test]
    fn test_historical_slope() {
        let m = curve(&[(9, Some(0.33)), (45, Some(0.3)), (400, Some(0.3))]);
        assert_eq!(historical_slope(&m, as_of()), Some(1.1));
        assert_eq!(historical_slope(&curve(&[(9, Some(0.3))]), as_of()), None);
    }

    #[test]
    fn test_historical_atm_iv() {
        assert_eq!(historical_atm_iv(&BTreeMap::new(), as_of(), 30), None);
        assert_eq!(historical_atm_iv(&curve(&[(90, Some(0.25))]), as_of(), 30), Some(25.0));

        let m = curve(&[(20, Some(0.20)), (40, Some(0.30)), (200, Some(0.5))]);
        assert_eq!(historical_atm_iv(&m, as_of(), 30), Some(25.0));
    }
}
