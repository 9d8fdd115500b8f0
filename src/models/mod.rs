//! Pricing Models
//!
//! Implements:
//! - Black-Scholes (European pricing, delta)
//! - Implied volatility extraction by bounded bisection

pub mod black_scholes;
pub mod implied_vol;

pub use black_scholes::{delta as bs_delta, discounted_intrinsic, norm_cdf, price as bs_price};
pub use implied_vol::*;
