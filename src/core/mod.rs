//! Core data types for the volatility engine
//!
//! Defines fundamental types:
//! - DailyBar: Underlying price history
//! - OptionContract: Strike, expiry, type, quote and optional Greeks
//! - VolSurface: Realized/implied vol, term structure and skew aggregate
//! - EngineError: Crate-wide error type

pub mod bar;
pub mod error;
pub mod option;
pub mod surface;

pub use bar::*;
pub use error::*;
pub use option::*;
pub use surface::*;
