//! Market-wide regime across all scored tickers

use serde::{Deserialize, Serialize};

use super::regime::Regime;
use super::scorer::ScoredOpportunity;
use crate::core::round_to;

/// Ticker whose term slope stands in for the VIX term structure
pub const VIX_PROXY_TICKER: &str = "SPY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketRegime {
    #[serde(rename = "ELEVATED RISK")]
    ElevatedRisk,
    #[serde(rename = "CAUTION")]
    Caution,
    #[serde(rename = "OPPORTUNITY")]
    Opportunity,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "NO DATA")]
    NoData,
}

impl MarketRegime {
    pub fn color(&self) -> &'static str {
        match self {
            MarketRegime::ElevatedRisk => "#C45A5A",
            MarketRegime::Caution => "#C49A5A",
            MarketRegime::Opportunity => "#C47B5A",
            MarketRegime::Normal => "#6B8C5A",
            MarketRegime::NoData => "#9A8E82",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            MarketRegime::ElevatedRisk => {
                "Multiple backwardation signals — reduce exposure, widen spreads, hedge tails"
            }
            MarketRegime::Caution => {
                "Rising realized vol — tighten position sizing, favor defined-risk structures"
            }
            MarketRegime::Opportunity => {
                "Elevated IV with contained RV — favorable premium selling environment"
            }
            MarketRegime::Normal => "Contango, moderate IV — standard premium selling conditions",
            MarketRegime::NoData => "No tickers produced a score.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRegimeSummary {
    pub overall_regime: MarketRegime,
    pub regime_color: String,
    pub description: String,
    pub avg_iv_rank: f64,
    pub avg_rv_accel: f64,
    pub danger_count: usize,
    pub caution_count: usize,
    pub total_tickers: usize,
    pub vix_term_slope: Option<f64>,
}

impl MarketRegimeSummary {
    fn new(overall: MarketRegime) -> Self {
        Self {
            overall_regime: overall,
            regime_color: overall.color().to_string(),
            description: overall.description().to_string(),
            avg_iv_rank: 0.0,
            avg_rv_accel: 0.0,
            danger_count: 0,
            caution_count: 0,
            total_tickers: 0,
            vix_term_slope: None,
        }
    }
}

/// Roll per-ticker results up into one market regime
pub fn summarize(results: &[ScoredOpportunity]) -> MarketRegimeSummary {
    if results.is_empty() {
        return MarketRegimeSummary::new(MarketRegime::NoData);
    }

    let n = results.len() as f64;
    let avg_iv_rank = results.iter().map(|r| r.iv_rank).sum::<f64>() / n;
    let avg_rv_accel = results.iter().map(|r| r.rv_acceleration).sum::<f64>() / n;
    let danger_count = results.iter().filter(|r| r.regime == Regime::Danger).count();
    let caution_count = results.iter().filter(|r| r.regime == Regime::Caution).count();
    let vix_term_slope = results
        .iter()
        .find(|r| r.ticker == VIX_PROXY_TICKER)
        .map(|r| r.term_slope);

    let overall = if danger_count >= 2 || vix_term_slope.is_some_and(|s| s > Regime::DANGER_SLOPE) {
        MarketRegime::ElevatedRisk
    } else if caution_count >= 3 || avg_rv_accel > 1.1 {
        MarketRegime::Caution
    } else if avg_iv_rank > 80.0 {
        MarketRegime::Opportunity
    } else {
        MarketRegime::Normal
    };

    MarketRegimeSummary {
        avg_iv_rank: round_to(avg_iv_rank, 1),
        avg_rv_accel: round_to(avg_rv_accel, 3),
        danger_count,
        caution_count,
        total_tickers: results.len(),
        vix_term_slope,
        ..MarketRegimeSummary::new(overall)
    }
}
