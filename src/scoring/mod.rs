//! Opportunity scoring for premium selling
//!
//! Turns a `VolSurface` into a 0-100 signal score, a regime, a
//! recommendation and a trade-construction hint, then rolls all tickers up
//! into a market-wide regime summary.

pub mod construction;
pub mod params;
pub mod regime;
pub mod scorer;
pub mod summary;

pub use construction::TradeSuggestion;
pub use params::ScoringParams;
pub use regime::{Recommendation, Regime};
pub use scorer::{score, ScoredOpportunity};
pub use summary::{summarize, MarketRegime, MarketRegimeSummary};
