//! Chain aggregation
//!
//! Groups a flat option chain by expiry, collapses each expiry to one IV per
//! strike (call and put averaged) and reads the ATM IV off that curve by
//! interpolating between the two strikes that bracket spot.
//!
//! IVs here stay in decimal form, as delivered by the provider.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ordered_float::OrderedFloat;

use crate::core::OptionContract;

/// Expiry -> contracts multimap, built once per aggregation call
#[derive(Debug, Clone, Default)]
pub struct ExpiryChains<'a> {
    by_expiry: BTreeMap<NaiveDate, Vec<&'a OptionContract>>,
}

impl<'a> ExpiryChains<'a> {
    /// Group contracts by expiration, keeping input order within each expiry
    pub fn group(contracts: &'a [OptionContract]) -> Self {
        let mut by_expiry: BTreeMap<NaiveDate, Vec<&'a OptionContract>> = BTreeMap::new();
        for c in contracts {
            by_expiry.entry(c.expiration).or_default().push(c);
        }
        Self { by_expiry }
    }

    pub fn chain(&self, expiry: NaiveDate) -> Option<&[&'a OptionContract]> {
        self.by_expiry.get(&expiry).map(|v| v.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[&'a OptionContract])> + '_ {
        self.by_expiry.iter().map(|(e, v)| (*e, v.as_slice()))
    }

    /// Expiries with positive DTE relative to `as_of`, as (expiry, dte)
    pub fn live_expiries(&self, as_of: NaiveDate) -> Vec<(NaiveDate, i64)> {
        self.by_expiry
            .keys()
            .map(|e| (*e, (*e - as_of).num_days()))
            .filter(|(_, dte)| *dte > 0)
            .collect()
    }
}

/// One averaged IV per strike, sorted by strike
#[derive(Debug, Clone, PartialEq)]
pub struct StrikeIvCurve {
    points: Vec<(f64, f64)>,
}

impl StrikeIvCurve {
    /// Average call and put IV at each strike, skipping missing or
    /// non-positive IVs
    pub fn from_chain(chain: &[&OptionContract]) -> Self {
        let mut by_strike: BTreeMap<OrderedFloat<f64>, (f64, usize)> = BTreeMap::new();
        for (strike, iv) in chain.iter().filter_map(|c| c.valid_iv().map(|iv| (c.strike, iv))) {
            let entry = by_strike.entry(OrderedFloat(strike)).or_insert((0.0, 0));
            entry.0 += iv;
            entry.1 += 1;
        }

        let points = by_strike
            .into_iter()
            .map(|(k, (sum, n))| (k.into_inner(), sum / n as f64))
            .collect();

        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// IV at spot
    ///
    /// Interpolates linearly between the largest strike <= spot and the
    /// smallest strike > spot. With only one side available, returns the IV
    /// of the strike nearest spot.
    pub fn atm_iv(&self, spot: f64) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }

        let split = self.points.partition_point(|(k, _)| *k <= spot);
        let below = split.checked_sub(1).map(|i| self.points[i]);
        let above = self.points.get(split).copied();

        match (below, above) {
            (Some((k_lo, iv_lo)), Some((k_hi, iv_hi))) => {
                let w = if k_hi != k_lo {
                    (spot - k_lo) / (k_hi - k_lo)
                } else {
                    0.5
                };
                Some(iv_lo * (1.0 - w) + iv_hi * w)
            }
            _ => self
                .points
                .iter()
                .min_by(|a, b| {
                    (a.0 - spot)
                        .abs()
                        .partial_cmp(&(b.0 - spot).abs())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(_, iv)| *iv),
        }
    }
}

/// ATM IV (decimal) for every expiry in the chain; `None` where no strike
/// carries a usable IV
pub fn atm_iv_per_expiry(
    contracts: &[OptionContract],
    spot: f64,
) -> BTreeMap<NaiveDate, Option<f64>> {
    let chains = ExpiryChains::group(contracts);
    atm_iv_per_grouped_expiry(&chains, spot)
}

/// Same as [`atm_iv_per_expiry`] over an already grouped chain
pub fn atm_iv_per_grouped_expiry(
    chains: &ExpiryChains<'_>,
    spot: f64,
) -> BTreeMap<NaiveDate, Option<f64>> {
    chains
        .iter()
        .map(|(expiry, chain)| (expiry, StrikeIvCurve::from_chain(chain).atm_iv(spot)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OptionType;

    fn exp(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn pair(strike: f64, expiry: NaiveDate, call_iv: f64, put_iv: f64) -> Vec<OptionContract> {
        vec![
            OptionContract::new("SPY", strike, expiry, OptionType::Call).with_iv(call_iv),
            OptionContract::new("SPY", strike, expiry, OptionType::Put).with_iv(put_iv),
        ]
    }

    #[test]
    fn test_grouping_by_expiry() {
        let mut contracts = pair(500.0, exp(2, 21), 0.2, 0.2);
        contracts.extend(pair(500.0, exp(3, 21), 0.2, 0.2));
        contracts.extend(pair(505.0, exp(2, 21), 0.2, 0.2));

        let chains = ExpiryChains::group(&contracts);
        assert_eq!(chains.iter().count(), 2);
        assert_eq!(chains.chain(exp(2, 21)).unwrap().len(), 4);
        assert_eq!(chains.chain(exp(3, 21)).unwrap().len(), 2);

        let live = chains.live_expiries(exp(3, 1));
        assert_eq!(live, vec![(exp(3, 21), 20)]);
    }

    #[test]
    fn test_strike_curve_averages_and_skips_invalid() {
        let e = exp(2, 21);
        let mut contracts = pair(500.0, e, 0.20, 0.24);
        contracts.push(OptionContract::new("SPY", 505.0, e, OptionType::Call).with_iv(0.0));
        contracts.push(OptionContract::new("SPY", 505.0, e, OptionType::Put));
        contracts.push(OptionContract::new("SPY", 495.0, e, OptionType::Put).with_iv(0.25));

        let chains = ExpiryChains::group(&contracts);
        let curve = StrikeIvCurve::from_chain(chains.chain(e).unwrap());
        assert_eq!(curve.points().len(), 2);
        assert_eq!(curve.points()[0], (495.0, 0.25));
        assert!((curve.points()[1].1 - 0.22).abs() < 1e-12);
    }

    #[test]
    fn test_bracketing_interpolation() {
        // Strikes 480..520 with IV rising away from 500
        let e = exp(2, 21);
        let contracts: Vec<OptionContract> = (0..=8)
            .flat_map(|i| {
                let strike = 480.0 + 5.0 * i as f64;
                let iv = 0.18 + 0.002 * (strike - 500.0).abs();
                pair(strike, e, iv, iv)
            })
            .collect();

        let ivs = atm_iv_per_expiry(&contracts, 502.0);
        let atm = ivs[&e].unwrap();

        let iv_500 = 0.18;
        let iv_505 = 0.18 + 0.002 * 5.0;
        assert!(atm > iv_500 && atm < iv_505);
        // 40% of the way from 500 to 505
        assert!((atm - (iv_500 * 0.6 + iv_505 * 0.4)).abs() < 1e-12);
    }

    #[test]
    fn test_one_sided_uses_nearest() {
        let e = exp(2, 21);
        let mut contracts = pair(480.0, e, 0.30, 0.30);
        contracts.extend(pair(490.0, e, 0.26, 0.26));

        let ivs = atm_iv_per_expiry(&contracts, 500.0);
        assert_eq!(ivs[&e], Some(0.26));

        let ivs = atm_iv_per_expiry(&contracts, 470.0);
        assert_eq!(ivs[&e], Some(0.30));
    }

    #[test]
    fn test_expiry_without_iv_is_absent() {
        let e = exp(2, 21);
        let contracts = vec![
            OptionContract::new("SPY", 500.0, e, OptionType::Call),
            OptionContract::new("SPY", 500.0, e, OptionType::Put).with_iv(-0.1),
        ];
        let ivs = atm_iv_per_expiry(&contracts, 500.0);
        assert_eq!(ivs.len(), 1);
        assert_eq!(ivs[&e], None);
    }

    #[test]
    fn test_spot_on_strike() {
        let e = exp(2, 21);
        let mut contracts = pair(495.0, e, 0.22, 0.22);
        contracts.extend(pair(500.0, e, 0.20, 0.20));
        contracts.extend(pair(505.0, e, 0.21, 0.21));

        // 500 <= spot, so it's the lower bracket with weight 0
        let ivs = atm_iv_per_expiry(&contracts, 500.0);
        assert!((ivs[&e].unwrap() - 0.20).abs() < 1e-12);
    }
}
