//! Regime and recommendation labels

use std::fmt;

use serde::{Deserialize, Serialize};

/// Market state for one underlying, driven by term-structure shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "CAUTION")]
    Caution,
    #[serde(rename = "DANGER")]
    Danger,
}

impl Regime {
    /// Term slope above this is deep backwardation
    pub const DANGER_SLOPE: f64 = 1.05;
    /// Term slope above this is backwardation
    pub const CAUTION_SLOPE: f64 = 1.0;

    /// Regime implied by the term slope alone
    pub fn from_slope(slope: f64) -> Self {
        if slope > Self::DANGER_SLOPE {
            Regime::Danger
        } else if slope > Self::CAUTION_SLOPE {
            Regime::Caution
        } else {
            Regime::Normal
        }
    }

    /// Raise to at least CAUTION; DANGER stays DANGER
    pub fn escalate(self) -> Self {
        match self {
            Regime::Normal => Regime::Caution,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Normal => "NORMAL",
            Regime::Caution => "CAUTION",
            Regime::Danger => "DANGER",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "SELL PREMIUM")]
    SellPremium,
    #[serde(rename = "CONDITIONAL")]
    Conditional,
    #[serde(rename = "REDUCE SIZE")]
    ReduceSize,
    #[serde(rename = "AVOID")]
    Avoid,
    #[serde(rename = "NO EDGE")]
    NoEdge,
}

impl Recommendation {
    pub const SELL_SCORE: u8 = 70;
    pub const CONDITIONAL_SCORE: u8 = 55;

    pub fn from_score(score: u8, regime: Regime) -> Self {
        match regime {
            Regime::Danger => Recommendation::Avoid,
            Regime::Caution => Recommendation::ReduceSize,
            Regime::Normal if score >= Self::SELL_SCORE => Recommendation::SellPremium,
            Regime::Normal if score >= Self::CONDITIONAL_SCORE => Recommendation::Conditional,
            Regime::Normal => Recommendation::NoEdge,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::SellPremium => "SELL PREMIUM",
            Recommendation::Conditional => "CONDITIONAL",
            Recommendation::ReduceSize => "REDUCE SIZE",
            Recommendation::Avoid => "AVOID",
            Recommendation::NoEdge => "NO EDGE",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slope() {
        assert_eq!(Regime::from_slope(0.8), Regime::Normal);
        assert_eq!(Regime::from_slope(1.0), Regime::Normal);
        assert_eq!(Regime::from_slope(1.03), Regime::Caution);
        assert_eq!(Regime::from_slope(1.05), Regime::Caution);
        assert_eq!(Regime::from_slope(1.06), Regime::Danger);
    }

    #[test]
    fn test_escalate_never_downgrades() {
        assert_eq!(Regime::Normal.escalate(), Regime::Caution);
        assert_eq!(Regime::Caution.escalate(), Regime::Caution);
        assert_eq!(Regime::Danger.escalate(), Regime::Danger);
    }

    #[test]
    fn test_recommendation() {
        assert_eq!(Recommendation::from_score(100, Regime::Danger), Recommendation::Avoid);
        assert_eq!(Recommendation::from_score(90, Regime::Caution), Recommendation::ReduceSize);
        assert_eq!(Recommendation::from_score(70, Regime::Normal), Recommendation::SellPremium);
        assert_eq!(Recommendation::from_score(69, Regime::Normal), Recommendation::Conditional);
        assert_eq!(Recommendation::from_score(55, Regime::Normal), Recommendation::Conditional);
        assert_eq!(Recommendation::from_score(54, Regime::Normal), Recommendation::NoEdge);
    }

    #[test]
    fn test_serialized_labels() {
        assert_eq!(serde_json::to_string(&Regime::Danger).unwrap(), r#""DANGER""#);
        assert_eq!(
            serde_json::to_string(&Recommendation::SellPremium).unwrap(),
            r#""SELL PREMIUM""#
        );
        let r: Recommendation = serde_json::from_str(r#""NO EDGE""#).unwrap();
        assert_eq!(r, Recommendation::NoEdge);
        assert_eq!(Recommendation::ReduceSize.to_string(), "REDUCE SIZE");
    }
}
