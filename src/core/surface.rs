//! Volatility Surface
//!
//! Value records produced by one scan of one underlying:
//! - Realized vol over several windows
//! - Current ATM implied vol with rank/percentile
//! - ATM term structure on a fixed tenor grid
//! - Delta-indexed skew for the ~30 DTE expiry
//!
//! Vol figures are in vol points (20.0 = 20%) unless noted otherwise.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::option::OptionType;

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Annualized close-to-close realized volatility
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealizedVol {
    pub rv10: f64,
    pub rv20: f64,
    pub rv30: f64,
    pub rv60: f64,
    /// rv10 / rv30; above 1 means realized vol is rising
    pub rv_acceleration: f64,
}

/// Current implied vol and where it sits in its own history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpliedVolMetrics {
    /// ATM ~30 DTE implied vol
    pub iv_current: f64,
    /// 0-100, position within trailing min/max
    pub iv_rank: f64,
    /// 0-100, share of trailing days below current
    pub iv_percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStructurePoint {
    pub tenor_days: i64,
    pub tenor_label: String,
    pub iv: f64,
}

/// ATM implied vol across tenors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStructure {
    pub points: Vec<TermStructurePoint>,
    /// front / back (< 1 contango, > 1 backwardation)
    pub slope: f64,
    pub is_contango: bool,
    pub front_iv: f64,
    pub back_iv: f64,
}

impl TermStructure {
    /// Structure used when fewer than two tenors are available
    pub fn degenerate(points: Vec<TermStructurePoint>, iv: f64) -> Self {
        Self {
            points,
            slope: 1.0,
            is_contango: true,
            front_iv: iv,
            back_iv: iv,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkewPoint {
    /// Unsigned delta on a 0-100 scale
    pub delta: f64,
    pub iv: f64,
    #[serde(rename = "type")]
    pub option_type: OptionType,
}

/// Implied vol skew at a single expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolSkew {
    pub points: Vec<SkewPoint>,
    /// 25-delta put IV minus ~50-delta IV
    pub skew_25d: f64,
    pub put_skew_slope: f64,
    pub call_skew_slope: f64,
}

impl VolSkew {
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            skew_25d: 0.0,
            put_skew_slope: 0.0,
            call_skew_slope: 0.0,
        }
    }
}

/// Everything the scorer needs about one underlying on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolSurface {
    pub ticker: String,
    pub price: f64,
    pub as_of: NaiveDate,
    pub rv: RealizedVol,
    pub iv: ImpliedVolMetrics,
    pub term_structure: TermStructure,
    pub skew: VolSkew,
    /// iv_current - rv30
    pub vrp: f64,
    /// iv_current / rv30
    pub vrp_ratio: f64,
}

/// Point-in-time row for the IV history table, keyed by (ticker, date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyIvRecord {
    pub ticker: String,
    pub date: NaiveDate,
    pub atm_iv: f64,
    pub rv30: Option<f64>,
    pub vrp: Option<f64>,
    pub term_slope: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(0.85714, 3), 0.857);
        assert_eq!(round_to(-0.04449, 1), -0.0);
    }

    #[test]
    fn test_degenerate_term_structure() {
        let ts = TermStructure::degenerate(Vec::new(), 0.0);
        assert_eq!(ts.slope, 1.0);
        assert!(ts.is_contango);
    }

    #[test]
    fn test_skew_point_serializes_type() {
        let p = SkewPoint {
            delta: 25.0,
            iv: 22.5,
            option_type: OptionType::Put,
        };
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains(r#""type":"put""#));
    }
}
