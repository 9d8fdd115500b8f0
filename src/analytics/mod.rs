//! Volatility analytics
//!
//! Pipeline per underlying:
//! 1. Chain aggregation: ATM IV per expiry from the raw chain
//! 2. Term structure: headline ATM IV and the tenor-grid curve
//! 3. Skew: delta-indexed IV at the target expiry
//! 4. Realized vol and IV rank
//! 5. Surface assembly

pub mod chain;
pub mod greeks;
pub mod rank;
pub mod realized;
pub mod skew;
pub mod surface;
pub mod term_structure;

pub use chain::{atm_iv_per_expiry, ExpiryChains, StrikeIvCurve};
pub use greeks::{atm_greeks, AtmGreeks};
pub use surface::{build_vol_surface, daily_iv_record, variance_premium};
pub use term_structure::{AtmTarget, ExpiryIv, TENOR_GRID};
