//! Position construction hints attached to each scored ticker

use serde::Serialize;

use super::regime::Regime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TradeSuggestion {
    pub delta: &'static str,
    pub structure: &'static str,
    pub dte: &'static str,
    pub max_notional: &'static str,
}

impl TradeSuggestion {
    /// Suggested structure for a regime, IV Rank and VRP (vol points)
    pub fn for_conditions(regime: Regime, iv_rank: f64, vrp: f64) -> Self {
        match regime {
            Regime::Danger => Self {
                delta: "N/A",
                structure: "No position recommended",
                dte: "N/A",
                max_notional: "0%",
            },
            Regime::Caution => Self {
                delta: "10–15Δ",
                structure: "Iron condor or wide put spread (defined risk only)",
                dte: "21–30 DTE",
                max_notional: "1–2% portfolio",
            },
            Regime::Normal if iv_rank >= 80.0 => Self {
                delta: "16–20Δ",
                structure: if vrp > 8.0 {
                    "Short strangle or jade lizard if directional"
                } else if vrp > 4.0 {
                    "Iron condor or put credit spread"
                } else {
                    "Put credit spread with strict width limits"
                },
                dte: "30–45 DTE",
                max_notional: "2–5% portfolio",
            },
            Regime::Normal => Self {
                delta: "20–30Δ",
                structure: "Put credit spread, narrow width",
                dte: "45–60 DTE",
                max_notional: "2–3% portfolio",
            },
        }
    }
}
