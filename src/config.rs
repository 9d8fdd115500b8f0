//! Engine configuration
//!
//! Everything the engine would otherwise take from the environment is
//! carried here and passed down explicitly.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analytics::{rank, AtmTarget};
use crate::core::{EngineError, EngineResult};
use crate::scoring::ScoringParams;

/// Top-level configuration for a scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Continuously compounded annual rate used by the IV solver
    /// Default: 0.043
    pub risk_free_rate: f64,

    /// Tenor for the headline ATM IV
    pub atm: AtmTarget,

    /// Tenor for the skew expiry
    pub skew: AtmTarget,

    /// Trailing ATM IV values used for rank/percentile
    /// Default: 252 (one year of sessions)
    pub history_lookback: usize,

    pub scoring: ScoringParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.043,
            atm: AtmTarget::default(),
            skew: AtmTarget::default(),
            history_lookback: 252,
            scoring: ScoringParams::default(),
        }
    }
}

impl EngineConfig {
    /// Daily scanner settings: no threshold penalties, everything ranked
    pub fn scanner() -> Self {
        Self {
            scoring: ScoringParams::permissive(),
            ..Default::default()
        }
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_path(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        tracing::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !self.risk_free_rate.is_finite() || self.risk_free_rate.abs() > 1.0 {
            return Err(EngineError::config(format!(
                "risk_free_rate {} out of range",
                self.risk_free_rate
            )));
        }
        for (name, t) in [("atm", self.atm), ("skew", self.skew)] {
            if t.target_dte <= 0 || t.tolerance < 0 {
                return Err(EngineError::config(format!(
                    "{name}: target_dte must be positive and tolerance non-negative"
                )));
            }
        }
        if self.history_lookback < rank::MIN_HISTORY {
            return Err(EngineError::config(format!(
                "history_lookback must be at least {}",
                rank::MIN_HISTORY
            )));
        }
        Ok(())
    }
}
