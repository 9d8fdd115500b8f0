//! Scoring thresholds

use serde::{Deserialize, Serialize};

/// Thresholds that add flags and penalties on top of the base score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringParams {
    /// IV Rank below this is penalized
    /// Default: 60
    pub min_iv_rank: f64,

    /// VRP (vol points) below this is penalized
    /// Default: 3.0
    pub min_vrp: f64,

    /// RV acceleration above this is flagged
    /// Default: 1.15
    pub max_rv_accel: f64,

    /// |25 delta skew| above this is flagged
    /// Default: 15.0
    pub max_skew: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            min_iv_rank: 60.0,
            min_vrp: 3.0,
            max_rv_accel: 1.15,
            max_skew: 15.0,
        }
    }
}

impl ScoringParams {
    /// Every threshold disabled: rank and flag the whole universe
    pub fn permissive() -> Self {
        Self {
            min_iv_rank: 0.0,
            min_vrp: -999.0,
            max_rv_accel: 999.0,
            max_skew: 999.0,
        }
    }
}
