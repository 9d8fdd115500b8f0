//! Premium-selling score
//!
//! Composite 0-100 score from five components, followed by a regime
//! override driven by term-structure backwardation:
//!
//! | Component        | Range            |
//! |------------------|------------------|
//! | VRP ratio        | 0 to 25          |
//! | IV Rank          | 0 to 25          |
//! | Term structure   | -5 to 18         |
//! | RV acceleration  | -15 to 0         |
//! | Skew             | 3 to 8           |
//!
//! Threshold misses (VRP, IV Rank) cost 10 points each. CAUTION costs 20,
//! DANGER costs 35.

use serde::{Deserialize, Serialize};

use super::construction::TradeSuggestion;
use super::params::ScoringParams;
use super::regime::{Recommendation, Regime};
use crate::analytics::AtmGreeks;
use crate::core::{round_to, SkewPoint, TermStructurePoint, VolSurface};

const THRESHOLD_PENALTY: f64 = 10.0;
const CAUTION_PENALTY: f64 = 20.0;
const DANGER_PENALTY: f64 = 35.0;

/// Flat, serializable result for one underlying
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredOpportunity {
    pub ticker: String,
    pub price: f64,
    pub iv_current: f64,
    pub iv_rank: f64,
    pub iv_percentile: f64,
    pub rv10: f64,
    pub rv20: f64,
    pub rv30: f64,
    pub rv60: f64,
    pub vrp: f64,
    pub vrp_ratio: f64,
    pub rv_acceleration: f64,
    pub term_slope: f64,
    pub is_contango: bool,
    pub front_iv: f64,
    pub back_iv: f64,
    pub skew_25d: f64,
    pub put_skew_slope: f64,
    pub call_skew_slope: f64,
    pub signal_score: u8,
    pub regime: Regime,
    pub recommendation: Recommendation,
    pub flags: Vec<String>,
    pub suggested_delta: String,
    pub suggested_structure: String,
    pub suggested_dte: String,
    pub suggested_max_notional: String,
    pub term_structure_points: Vec<TermStructurePoint>,
    pub skew_points: Vec<SkewPoint>,
    #[serde(default)]
    pub atr14: Option<f64>,
    #[serde(default)]
    pub atm_theta: Option<f64>,
    #[serde(default)]
    pub atm_vega: Option<f64>,
}

impl ScoredOpportunity {
    /// Attach display-only figures that do not affect the score
    pub fn with_enrichment(mut self, atr14: Option<f64>, greeks: Option<AtmGreeks>) -> Self {
        self.atr14 = atr14;
        if let Some(g) = greeks {
            self.atm_theta = g.theta;
            self.atm_vega = g.vega;
        }
        self
    }
}

/// Running total plus the flags raised along the way
struct Tally {
    score: f64,
    flags: Vec<String>,
}

impl Tally {
    fn add(&mut self, points: f64) {
        self.score += points;
    }

    fn flag(&mut self, msg: impl Into<String>) {
        self.flags.push(msg.into());
    }

    fn flag_first(&mut self, msg: impl Into<String>) {
        self.flags.insert(0, msg.into());
    }
}

fn score_vrp(t: &mut Tally, s: &VolSurface, params: &ScoringParams) {
    t.add(((s.vrp_ratio - 1.0) * 30.0).clamp(0.0, 25.0));

    if s.vrp < 0.0 {
        t.flag("Negative VRP — implied vol is BELOW realized. No premium edge.");
        t.add(-THRESHOLD_PENALTY);
    } else if s.vrp < params.min_vrp {
        t.flag(format!(
            "VRP {:.1} below minimum threshold {:.1}",
            s.vrp, params.min_vrp
        ));
        t.add(-THRESHOLD_PENALTY);
    }
}

fn score_iv_rank(t: &mut Tally, s: &VolSurface, params: &ScoringParams) {
    let rank = s.iv.iv_rank;
    t.add((rank * 0.3).clamp(0.0, 25.0));

    if rank < params.min_iv_rank {
        t.flag(format!("IV Rank {:.0} below minimum {}", rank, params.min_iv_rank));
        t.add(-THRESHOLD_PENALTY);
    }
}

fn score_term(t: &mut Tally, s: &VolSurface) {
    let slope = s.term_structure.slope;
    if slope < 0.85 {
        t.add(18.0);
    } else if slope < 0.95 {
        t.add(12.0);
    } else if slope < 1.0 {
        t.add(6.0);
    } else {
        t.add(-5.0);
        t.flag("⚠ Term structure in backwardation — acute stress signal");
    }
}

fn score_rv_accel(t: &mut Tally, s: &VolSurface, params: &ScoringParams) {
    let accel = s.rv.rv_acceleration;
    if accel > 1.15 {
        t.add(-15.0);
        t.flag("RV accelerating — realized vol rising faster than implied");
    } else if accel > 1.05 {
        t.add(-8.0);
        t.flag("RV slightly elevated vs 30-day average");
    }

    if accel > params.max_rv_accel {
        t.flag(format!(
            "RV acceleration {:.2} exceeds threshold {}",
            accel, params.max_rv_accel
        ));
    }
}

fn score_skew(t: &mut Tally, s: &VolSurface, params: &ScoringParams) {
    let skew = s.skew.skew_25d.abs();
    if skew > 10.0 {
        t.add(5.0);
        t.flag("Steep skew — tail premium is rich, but may reflect informed protection buying");
    } else if skew > 7.0 {
        t.add(8.0);
    } else if skew > 4.0 {
        t.add(6.0);
    } else {
        t.add(3.0);
    }

    if skew > params.max_skew {
        t.flag(format!(
            "Skew {:.1} exceeds threshold {:.1} — extreme fear pricing",
            skew, params.max_skew
        ));
    }
}

/// Regime from term slope, with the extreme-IV escalation applied on top
fn classify(t: &mut Tally, s: &VolSurface) -> Regime {
    let mut regime = Regime::from_slope(s.term_structure.slope);
    match regime {
        Regime::Danger => {
            t.flag_first("🚫 Deep backwardation — regime change likely. Do NOT sell premium.");
            t.add(-DANGER_PENALTY);
        }
        Regime::Caution => {
            t.flag_first("⚠ Backwardation detected — reduce size, use defined-risk only");
            t.add(-CAUTION_PENALTY);
        }
        Regime::Normal => {}
    }

    if s.iv.iv_rank > 90.0 && s.rv.rv_acceleration > 1.1 {
        regime = regime.escalate();
        t.flag("⚠ Extreme IV + rising RV — potential regime shift, not just fear");
    }
    regime
}

/// Score one surface. Never fails; every input maps to a result.
pub fn score(surface: &VolSurface, params: &ScoringParams) -> ScoredOpportunity {
    let mut t = Tally {
        score: 0.0,
        flags: Vec::new(),
    };

    score_vrp(&mut t, surface, params);
    score_iv_rank(&mut t, surface, params);
    score_term(&mut t, surface);
    score_rv_accel(&mut t, surface, params);
    score_skew(&mut t, surface, params);
    let regime = classify(&mut t, surface);

    let signal_score = t.score.clamp(0.0, 100.0).trunc() as u8;
    let recommendation = Recommendation::from_score(signal_score, regime);
    let trade = TradeSuggestion::for_conditions(regime, surface.iv.iv_rank, surface.vrp);

    let ts = &surface.term_structure;
    let sk = &surface.skew;

    ScoredOpportunity {
        ticker: surface.ticker.clone(),
        price: round_to(surface.price, 2),
        iv_current: surface.iv.iv_current,
        iv_rank: surface.iv.iv_rank,
        iv_percentile: surface.iv.iv_percentile,
        rv10: surface.rv.rv10,
        rv20: surface.rv.rv20,
        rv30: surface.rv.rv30,
        rv60: surface.rv.rv60,
        vrp: surface.vrp,
        vrp_ratio: surface.vrp_ratio,
        rv_acceleration: surface.rv.rv_acceleration,
        term_slope: ts.slope,
        is_contango: ts.is_contango,
        front_iv: ts.front_iv,
        back_iv: ts.back_iv,
        skew_25d: sk.skew_25d,
        put_skew_slope: sk.put_skew_slope,
        call_skew_slope: sk.call_skew_slope,
        signal_score,
        regime,
        recommendation,
        flags: t.flags,
        suggested_delta: trade.delta.to_string(),
        suggested_structure: trade.structure.to_string(),
        suggested_dte: trade.dte.to_string(),
        suggested_max_notional: trade.max_notional.to_string(),
        term_structure_points: ts.points.clone(),
        skew_points: sk.points.clone(),
        atr14: None,
        atm_theta: None,
        atm_vega: None,
    }
}
