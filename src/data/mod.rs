//! Local storage
//!
//! Handles:
//! - Daily ATM IV history per ticker
//! - Latest scan report cache

pub mod cache;
pub mod history;

pub use cache::*;
pub use history::*;
