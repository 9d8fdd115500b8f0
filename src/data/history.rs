//! Daily ATM IV history
//!
//! One JSON file per ticker holding `DailyIvRecord`s in date order. Feeds
//! IV Rank/Percentile and receives one row per ticker per scan or backfill
//! date.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::core::{DailyIvRecord, EngineError, EngineResult};

/// File-backed IV history keyed by (ticker, date)
pub struct IvHistoryStore {
    dir: PathBuf,
}

impl IvHistoryStore {
    pub fn open(dir: impl AsRef<Path>) -> EngineResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { dir })
    }

    /// History file for a ticker. Symbols are restricted to ASCII
    /// alphanumerics plus `.`, `-`, `^` and must not start with `.`, so the
    /// file always lands inside the store directory.
    fn path(&self, ticker: &str) -> EngineResult<PathBuf> {
        let valid = !ticker.is_empty()
            && !ticker.starts_with('.')
            && ticker
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^'));
        if !valid {
            return Err(EngineError::invalid_input(format!(
                "invalid ticker symbol {ticker:?}"
            )));
        }
        Ok(self.dir.join(format!("{}_iv_history.json", ticker.to_uppercase())))
    }

    /// All rows for a ticker, ascending by date; empty if none stored
    pub fn records(&self, ticker: &str) -> EngineResult<Vec<DailyIvRecord>> {
        let path = self.path(ticker)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Insert a row, replacing any existing row for the same date
    pub fn upsert(&self, record: DailyIvRecord) -> EngineResult<()> {
        if !record.atm_iv.is_finite() || record.atm_iv <= 0.0 {
            return Err(EngineError::invalid_input(format!(
                "{} {}: atm_iv must be positive, got {}",
                record.ticker, record.date, record.atm_iv
            )));
        }

        let ticker = record.ticker.clone();
        let mut rows = self.records(&ticker)?;
        match rows.binary_search_by_key(&record.date, |r| r.date) {
            Ok(i) => rows[i] = record,
            Err(i) => rows.insert(i, record),
        }

        // Write beside the target and rename so readers never see a partial file
        let path = self.path(&ticker)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&rows)?)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!("Stored IV history for {} ({} rows)", ticker, rows.len());
        Ok(())
    }

    /// Most recent `lookback` ATM IVs, most recent first
    pub fn historical_ivs(&self, ticker: &str, lookback: usize) -> EngineResult<Vec<f64>> {
        Ok(self
            .records(ticker)?
            .iter()
            .rev()
            .take(lookback)
            .map(|r| r.atm_iv)
            .collect())
    }

    /// Dates already stored, for skipping work in a backfill
    pub fn existing_dates(&self, ticker: &str) -> EngineResult<BTreeSet<NaiveDate>> {
        Ok(self.records(ticker)?.into_iter().map(|r| r.date).collect())
    }
}
