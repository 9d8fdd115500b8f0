//! ATM theta/vega lookup for display alongside the score

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::chain::ExpiryChains;
use super::term_structure::AtmTarget;
use crate::core::OptionContract;

/// Extra DTE slack beyond the ATM tolerance before giving up on an expiry
const EXPIRY_SLACK: i64 = 15;
/// Strikes within this fraction of spot count as at-the-money
const ATM_BAND: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmGreeks {
    pub theta: Option<f64>,
    pub vega: Option<f64>,
}

/// Greeks of the contract nearest spot at the expiry nearest the target
///
/// Returns `None` when no expiry is close enough or no near-ATM contract
/// carries a usable IV.
pub fn atm_greeks(
    contracts: &[OptionContract],
    spot: f64,
    as_of: NaiveDate,
    target: AtmTarget,
) -> Option<AtmGreeks> {
    let chains = ExpiryChains::group(contracts);
    let (expiry, dte) = chains
        .live_expiries(as_of)
        .into_iter()
        .min_by_key(|(_, dte)| (dte - target.target_dte).abs())?;

    if (dte - target.target_dte).abs() > target.tolerance + EXPIRY_SLACK {
        return None;
    }

    let band = spot * ATM_BAND;
    let nearest = chains
        .chain(expiry)?
        .iter()
        .filter(|c| (c.strike - spot).abs() <= band && c.valid_iv().is_some())
        .min_by(|a, b| (a.strike - spot).abs().total_cmp(&(b.strike - spot).abs()))?;

    Some(AtmGreeks {
        theta: nearest.theta,
        vega: nearest.vega,
    })
}
