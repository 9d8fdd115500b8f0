//! # Theta Harvest - Volatility Analytics for Premium Selling
//!
//! Turns daily bars and option chains into a per-ticker volatility picture
//! and a premium-selling score.
//!
//! ## Overview
//!
//! For each underlying the engine computes:
//! - **Realized vol**: RV10/20/30/60 and acceleration from daily closes
//! - **Implied vol**: ~30 DTE ATM IV with IV Rank and IV Percentile
//! - **Term structure**: ATM IV on a fixed tenor grid, front/back slope
//! - **Skew**: delta-indexed IV curve, 25 delta skew, wing slopes
//! - **Score**: 0-100 signal, regime, recommendation, trade construction
//!
//! ## Key Components
//!
//! - **Black-Scholes + IV solver**: bounded bisection from market prices
//! - **Analytics**: chain aggregation, term structure, skew, RV, rank
//! - **Scoring**: composite score and market-wide regime summary
//! - **Scanner**: parallel per-ticker evaluation
//! - **Data**: JSON IV history and scan cache
//!
//! ## Usage
//!
//! ```rust,no_run
//! use theta_harvest::prelude::*;
//!
//! # fn snapshots() -> Vec<TickerSnapshot> { Vec::new() }
//! let scanner = Scanner::new(EngineConfig::scanner());
//! let report = scanner.scan_all(&snapshots());
//!
//! for t in &report.tickers {
//!     println!("{} {} {}", t.ticker, t.signal_score, t.recommendation);
//! }
//! ```
//!
//! ## What This Engine Does NOT Do
//!
//! - Fetch market data (bars and chains are inputs)
//! - Price exotics or American exercise
//! - Place or manage orders

pub mod analytics;
pub mod config;
pub mod core;
pub mod data;
pub mod models;
pub mod scan;
pub mod scoring;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        DailyBar, DailyIvRecord, EngineError, EngineResult, ImpliedVolMetrics, OptionContract,
        OptionType, RealizedVol, SkewPoint, TermStructure, TermStructurePoint, VolSkew, VolSurface,
    };

    // Models
    pub use crate::models::{bs_price, fill_missing_ivs, implied_vol_from_quote, solve_iv, SolverConfig};

    // Analytics
    pub use crate::analytics::{
        atm_greeks, atm_iv_per_expiry, build_vol_surface, daily_iv_record, AtmGreeks, AtmTarget,
    };

    // Scoring
    pub use crate::scoring::{
        score, summarize, MarketRegime, MarketRegimeSummary, Recommendation, Regime,
        ScoredOpportunity, ScoringParams,
    };

    // Scan, storage and config
    pub use crate::config::EngineConfig;
    pub use crate::data::{CacheConfig, IvHistoryStore, ScanCache};
    pub use crate::scan::{ScanReport, Scanner, TickerSnapshot};
}

// Re-export main types at crate root
pub use crate::config::EngineConfig;
pub use crate::core::{EngineError, EngineResult};
pub use crate::scan::{ScanReport, Scanner};
