//! Option contract definitions
//!
//! Raw option-chain quotes as delivered by the market-data collaborator.
//! Implied volatility is a decimal (0.20 = 20%); Greeks are optional because
//! historical chains usually arrive without them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Payoff direction: +1 for call, -1 for put
    pub fn phi(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }
}

/// A single quoted option contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    /// Underlying symbol (e.g., "SPY")
    pub underlying: String,
    /// Strike price
    pub strike: f64,
    /// Expiration date
    pub expiration: NaiveDate,
    /// Call or put
    #[serde(rename = "type")]
    pub option_type: OptionType,
    /// Implied volatility (decimal), if the provider supplied one
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
    #[serde(default)]
    pub theta: Option<f64>,
    #[serde(default)]
    pub vega: Option<f64>,
    #[serde(default)]
    pub open_interest: u64,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub last: Option<f64>,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
}

impl OptionContract {
    /// Create a bare contract with no quote data
    pub fn new(
        underlying: impl Into<String>,
        strike: f64,
        expiration: NaiveDate,
        option_type: OptionType,
    ) -> Self {
        Self {
            underlying: underlying.into(),
            strike,
            expiration,
            option_type,
            implied_volatility: None,
            delta: None,
            gamma: None,
            theta: None,
            vega: None,
            open_interest: 0,
            volume: 0,
            last: None,
            bid: None,
            ask: None,
        }
    }

    /// Builder-style IV setter
    pub fn with_iv(mut self, iv: f64) -> Self {
        self.implied_volatility = Some(iv);
        self
    }

    /// Builder-style delta setter
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }

    /// Builder-style bid/ask setter
    pub fn with_quote(mut self, bid: f64, ask: f64) -> Self {
        self.bid = Some(bid);
        self.ask = Some(ask);
        self
    }

    /// Calendar days to expiry as of `as_of` (negative once expired)
    pub fn dte(&self, as_of: NaiveDate) -> i64 {
        (self.expiration - as_of).num_days()
    }

    /// Implied volatility when present and strictly positive
    pub fn valid_iv(&self) -> Option<f64> {
        self.implied_volatility.filter(|iv| *iv > 0.0)
    }

    /// Mid price from bid/ask (both must be positive)
    pub fn mid(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(b), Some(a)) if b > 0.0 && a > 0.0 => Some((b + a) / 2.0),
            _ => None,
        }
    }

    /// Best available market price (mid > last)
    pub fn market_price(&self) -> Option<f64> {
        self.mid().or(self.last.filter(|p| *p > 0.0))
    }

    /// Strike / spot
    pub fn moneyness(&self, spot: f64) -> f64 {
        self.strike / spot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expiry() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
    }

    #[test]
    fn test_option_type() {
        assert_eq!(OptionType::Call.phi(), 1.0);
        assert_eq!(OptionType::Put.phi(), -1.0);
        assert_eq!(serde_json::to_string(&OptionType::Put).unwrap(), r#""put""#);
    }

    #[test]
    fn test_dte() {
        let opt = OptionContract::new("SPY", 500.0, expiry(), OptionType::Call);
        let as_of = NaiveDate::from_ymd_opt(2025, 5, 21).unwrap();
        assert_eq!(opt.dte(as_of), 30);
        assert_eq!(opt.dte(expiry()), 0);
    }

    #[test]
    fn test_valid_iv_filters_non_positive() {
        let opt = OptionContract::new("SPY", 500.0, expiry(), OptionType::Put);
        assert_eq!(opt.valid_iv(), None);
        assert_eq!(opt.clone().with_iv(0.0).valid_iv(), None);
        assert_eq!(opt.with_iv(0.21).valid_iv(), Some(0.21));
    }

    #[test]
    fn test_market_price_prefers_mid() {
        let mut opt = OptionContract::new("SPY", 500.0, expiry(), OptionType::Call)
            .with_quote(4.5, 4.7);
        opt.last = Some(4.9);
        assert!((opt.market_price().unwrap() - 4.6).abs() < 1e-12);

        opt.bid = None;
        assert_eq!(opt.market_price(), Some(4.9));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{"underlying":"QQQ","strike":480.0,"expiration":"2025-06-20","type":"put","implied_volatility":0.24}"#;
        let opt: OptionContract = serde_json::from_str(json).unwrap();
        assert_eq!(opt.option_type, OptionType::Put);
        assert_eq!(opt.valid_iv(), Some(0.24));
        assert_eq!(opt.open_interest, 0);
        assert!(opt.delta.is_none());
    }
}
