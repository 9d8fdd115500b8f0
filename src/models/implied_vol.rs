//! Implied volatility solver
//!
//! Bounded bisection on the Black-Scholes price. The search always stays
//! inside [min_vol, max_vol] and stops after `max_iterations`.
//!
//! "No solution" is an ordinary outcome for illiquid strikes and stale
//! prints; every entry point returns `Option`.

use chrono::NaiveDate;

use super::black_scholes::{discounted_intrinsic, price};
use crate::core::{OptionContract, OptionType};

/// Bisection solver settings
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Lower bound of the search interval (decimal vol)
    pub min_vol: f64,
    /// Upper bound of the search interval (decimal vol)
    pub max_vol: f64,
    /// Maximum bisection steps
    pub max_iterations: u32,
    /// Absolute price error that counts as converged
    pub price_tolerance: f64,
    /// Relative price error accepted after the iteration budget runs out
    pub fallback_relative_error: f64,
    /// Market price may sit this far below discounted intrinsic (as a fraction)
    pub intrinsic_floor: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            min_vol: 0.01,
            max_vol: 5.0,
            max_iterations: 100,
            price_tolerance: 0.001,
            fallback_relative_error: 0.05,
            intrinsic_floor: 0.95,
        }
    }
}

/// Solve for implied volatility with the default solver settings
///
/// `days_to_expiry` is in calendar days; time is `days / 365`. Returns a
/// decimal annualized vol (0.20 = 20%).
pub fn solve_iv(
    option_price: f64,
    spot: f64,
    strike: f64,
    days_to_expiry: f64,
    option_type: OptionType,
    risk_free_rate: f64,
) -> Option<f64> {
    solve_iv_with(
        &SolverConfig::default(),
        option_price,
        spot,
        strike,
        days_to_expiry,
        option_type,
        risk_free_rate,
    )
}

/// Solve for implied volatility with explicit solver settings
pub fn solve_iv_with(
    config: &SolverConfig,
    option_price: f64,
    spot: f64,
    strike: f64,
    days_to_expiry: f64,
    option_type: OptionType,
    risk_free_rate: f64,
) -> Option<f64> {
    if option_price <= 0.0 || spot <= 0.0 || strike <= 0.0 || days_to_expiry <= 0.0 {
        return None;
    }

    let time = days_to_expiry / 365.0;

    let intrinsic = discounted_intrinsic(spot, strike, risk_free_rate, time, option_type);
    if option_price < intrinsic * config.intrinsic_floor {
        return None;
    }

    let mut low = config.min_vol;
    let mut high = config.max_vol;

    for _ in 0..config.max_iterations {
        let mid = (low + high) / 2.0;
        let model = price(spot, strike, risk_free_rate, mid, time, option_type);

        if (model - option_price).abs() < config.price_tolerance {
            return Some(mid);
        }

        if model > option_price {
            high = mid;
        } else {
            low = mid;
        }
    }

    let result = (low + high) / 2.0;
    let model = price(spot, strike, risk_free_rate, result, time, option_type);
    if (model - option_price).abs() / option_price < config.fallback_relative_error {
        Some(result)
    } else {
        None
    }
}

/// Implied volatility of a quoted contract from its market price
///
/// Uses the mid when both sides are quoted, otherwise the last trade. DTE is
/// measured from `as_of`, never from the wall clock.
pub fn implied_vol_from_quote(
    contract: &OptionContract,
    spot: f64,
    as_of: NaiveDate,
    risk_free_rate: f64,
) -> Option<f64> {
    let market_price = contract.market_price()?;
    let dte = contract.dte(as_of);
    solve_iv(
        market_price,
        spot,
        contract.strike,
        dte as f64,
        contract.option_type,
        risk_free_rate,
    )
}

/// Copy of `contracts` where every contract without a usable IV gets one
/// solved from its quote (when a solution exists)
///
/// Historical chains come back from providers without IV; this is how the
/// backfill path recovers it.
pub fn fill_missing_ivs(
    contracts: &[OptionContract],
    spot: f64,
    as_of: NaiveDate,
    risk_free_rate: f64,
) -> Vec<OptionContract> {
    let mut solved = 0usize;
    let filled: Vec<OptionContract> = contracts
        .iter()
        .map(|c| {
            if c.valid_iv().is_some() {
                return c.clone();
            }
            let mut out = c.clone();
            if let Some(iv) = implied_vol_from_quote(c, spot, as_of, risk_free_rate) {
                out.implied_volatility = Some(iv);
                solved += 1;
            }
            out
        })
        .collect();

    tracing::debug!(
        "Solved IV for {} of {} contracts as of {}",
        solved,
        contracts.len(),
        as_of
    );
    filled
}
