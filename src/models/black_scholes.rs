//! Black-Scholes Model
//!
//! European pricing with a constant, explicitly supplied risk-free rate and
//! no dividends. Serves both the live and the historical (as-of) paths:
//! - Converting market prices to implied volatilities
//! - Pricing synthetic quotes in tests and demos

use statrs::function::erf::erf;

use crate::core::OptionType;

/// Standard normal CDF, Φ(x) = ½(1 + erf(x/√2))
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Black-Scholes d1 parameter
pub fn d1(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> f64 {
    ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / (vol * time.sqrt())
}

/// Black-Scholes d2 parameter
pub fn d2(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> f64 {
    d1(spot, strike, rate, vol, time) - vol * time.sqrt()
}

/// Intrinsic value against the discounted strike
pub fn discounted_intrinsic(
    spot: f64,
    strike: f64,
    rate: f64,
    time: f64,
    option_type: OptionType,
) -> f64 {
    let pv_strike = strike * (-rate * time).exp();
    (option_type.phi() * (spot - pv_strike)).max(0.0)
}

/// Black-Scholes European option price
///
/// Expired or zero-vol options are worth nothing here; the solver never
/// evaluates them because its search interval starts above zero.
pub fn price(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
) -> f64 {
    if time <= 0.0 || vol <= 0.0 {
        return 0.0;
    }

    let d1 = d1(spot, strike, rate, vol, time);
    let d2 = d1 - vol * time.sqrt();
    let df = (-rate * time).exp();

    match option_type {
        OptionType::Call => spot * norm_cdf(d1) - strike * df * norm_cdf(d2),
        OptionType::Put => strike * df * norm_cdf(-d2) - spot * norm_cdf(-d1),
    }
}

/// Black-Scholes delta
pub fn delta(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
) -> f64 {
    if time <= 0.0 || vol <= 0.0 {
        return match option_type {
            OptionType::Call => if spot > strike { 1.0 } else { 0.0 },
            OptionType::Put => if spot < strike { -1.0 } else { 0.0 },
        };
    }

    let d1 = d1(spot, strike, rate, vol, time);
    match option_type {
        OptionType::Call => norm_cdf(d1),
        OptionType::Put => norm_cdf(d1) - 1.0,
    }
}
