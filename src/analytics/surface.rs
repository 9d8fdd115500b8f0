//! Surface assembly
//!
//! Ties the analytics together for one underlying on one date:
//! - `build_vol_surface`: the live view fed to the scorer
//! - `daily_iv_record`: the point-in-time row stored in IV history

use chrono::NaiveDate;

use super::{chain, rank, realized, skew, term_structure};
use crate::config::EngineConfig;
use crate::core::{
    round_to, DailyBar, DailyIvRecord, EngineError, EngineResult, ImpliedVolMetrics, OptionContract,
    VolSurface,
};
use crate::models::fill_missing_ivs;

/// VRP and VRP ratio from ATM IV and RV30 (both in vol points)
pub fn variance_premium(iv_current: f64, rv30: f64) -> (f64, f64) {
    let vrp = round_to(iv_current - rv30, 2);
    let ratio = if rv30 > 0.0 {
        round_to(iv_current / rv30, 3)
    } else {
        1.0
    };
    (vrp, ratio)
}

/// Complete volatility picture for one underlying
///
/// `historical_ivs` is the trailing ATM IV series (vol points, any order).
/// Fails only when realized vol cannot be computed.
pub fn build_vol_surface(
    ticker: &str,
    spot: f64,
    as_of: NaiveDate,
    bars: &[DailyBar],
    contracts: &[OptionContract],
    historical_ivs: &[f64],
    config: &EngineConfig,
) -> EngineResult<VolSurface> {
    if spot.is_nan() || spot <= 0.0 {
        return Err(EngineError::invalid_input(format!(
            "{ticker}: spot must be positive, got {spot}"
        )));
    }

    let rv = realized::compute(bars)?;

    let per_expiry = chain::atm_iv_per_expiry(contracts, spot);

    let iv_current = match term_structure::atm_iv(&per_expiry, as_of, config.atm) {
        Some(iv) => iv,
        None => {
            tracing::warn!("{}: no usable ATM IV, falling back to RV30 {:.2}", ticker, rv.rv30);
            rv.rv30
        }
    };

    let (iv_rank, iv_percentile) = rank::rank(iv_current, historical_ivs);

    let term_structure = term_structure::build(&per_expiry, as_of);
    let skew = skew::build(contracts, spot, as_of, config.skew);

    let (vrp, vrp_ratio) = variance_premium(iv_current, rv.rv30);

    tracing::debug!(
        "{}: IV {:.2} RV30 {:.2} VRP {:.2} slope {:.3}",
        ticker,
        iv_current,
        rv.rv30,
        vrp,
        term_structure.slope
    );

    Ok(VolSurface {
        ticker: ticker.to_string(),
        price: spot,
        as_of,
        rv,
        iv: ImpliedVolMetrics {
            iv_current,
            iv_rank,
            iv_percentile,
        },
        term_structure,
        skew,
        vrp,
        vrp_ratio,
    })
}

/// Point-in-time IV history row
///
/// Historical chains usually lack vendor IV, so missing IVs are solved from
/// quotes first. Only bars dated on or before `as_of` are used. Returns
/// `None` when no ATM IV can be recovered for the date.
pub fn daily_iv_record(
    ticker: &str,
    spot: f64,
    as_of: NaiveDate,
    bars: &[DailyBar],
    contracts: &[OptionContract],
    config: &EngineConfig,
) -> Option<DailyIvRecord> {
    let filled = fill_missing_ivs(contracts, spot, as_of, config.risk_free_rate);
    let per_expiry = chain::atm_iv_per_expiry(&filled, spot);

    let atm_iv = term_structure::historical_atm_iv(&per_expiry, as_of, config.atm.target_dte)?;

    let cutoff = bars.partition_point(|b| b.date <= as_of);
    let rv30 = realized::rv30_from_bars(&bars[..cutoff]);
    let vrp = rv30.map(|rv| round_to(atm_iv - rv, 2));
    let term_slope = term_structure::historical_slope(&per_expiry, as_of);

    Some(DailyIvRecord {
        ticker: ticker.to_string(),
        date: as_of,
        atm_iv,
        rv30,
        vrp,
        term_slope,
    })
}
