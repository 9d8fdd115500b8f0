//! Multi-ticker scan
//!
//! Runs the full engine for every ticker snapshot in parallel and collects
//! the scored results, per-ticker failures and the market regime summary.

use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analytics::{atm_greeks, build_vol_surface, daily_iv_record, realized};
use crate::config::EngineConfig;
use crate::core::{DailyBar, EngineResult, OptionContract};
use crate::data::IvHistoryStore;
use crate::scoring::{score, summarize, MarketRegimeSummary, ScoredOpportunity};

/// Everything needed to evaluate one underlying on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub ticker: String,
    pub spot: f64,
    pub as_of: NaiveDate,
    pub bars: Vec<DailyBar>,
    pub contracts: Vec<OptionContract>,
    /// Trailing ATM IVs in vol points, most recent first
    #[serde(default)]
    pub historical_ivs: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerError {
    pub ticker: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub scanned_at: DateTime<Utc>,
    /// Sorted by signal score, highest first
    pub tickers: Vec<ScoredOpportunity>,
    pub errors: Vec<TickerError>,
    pub regime: MarketRegimeSummary,
}

pub struct Scanner {
    config: EngineConfig,
}

impl Scanner {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score a single snapshot
    pub fn scan_one(&self, snap: &TickerSnapshot) -> EngineResult<ScoredOpportunity> {
        let lookback = snap.historical_ivs.len().min(self.config.history_lookback);
        let surface = build_vol_surface(
            &snap.ticker,
            snap.spot,
            snap.as_of,
            &snap.bars,
            &snap.contracts,
            &snap.historical_ivs[..lookback],
            &self.config,
        )?;

        let scored = score(&surface, &self.config.scoring);
        let greeks = atm_greeks(&snap.contracts, snap.spot, snap.as_of, self.config.atm);
        Ok(scored.with_enrichment(realized::atr14(&snap.bars), greeks))
    }

    /// Score all snapshots in parallel; failures are reported, not fatal
    pub fn scan_all(&self, snapshots: &[TickerSnapshot]) -> ScanReport {
        tracing::info!("Scanning {} tickers", snapshots.len());

        let outcomes: Vec<Result<ScoredOpportunity, TickerError>> = snapshots
            .par_iter()
            .map(|snap| {
                self.scan_one(snap).map_err(|e| {
                    tracing::warn!("{}: skipped ({})", snap.ticker, e);
                    TickerError {
                        ticker: snap.ticker.clone(),
                        message: e.to_string(),
                    }
                })
            })
            .collect();

        let (mut tickers, mut errors) = (Vec::new(), Vec::new());
        for outcome in outcomes {
            match outcome {
                Ok(scored) => tickers.push(scored),
                Err(err) => errors.push(err),
            }
        }

        tickers.sort_by(|a, b| b.signal_score.cmp(&a.signal_score));
        let regime = summarize(&tickers);

        tracing::info!(
            "Scan complete: {} scored, {} failed, regime {:?}",
            tickers.len(),
            errors.len(),
            regime.overall_regime
        );

        ScanReport {
            scanned_at: Utc::now(),
            tickers,
            errors,
            regime,
        }
    }

    /// Write one point-in-time IV row per snapshot into the history store,
    /// skipping dates already stored. Returns the number of rows written.
    pub fn record_history(
        &self,
        snapshots: &[TickerSnapshot],
        store: &IvHistoryStore,
    ) -> EngineResult<usize> {
        let mut written = 0;
        for snap in snapshots {
            if store.existing_dates(&snap.ticker)?.contains(&snap.as_of) {
                tracing::debug!("{} {}: already stored", snap.ticker, snap.as_of);
                continue;
            }

            match daily_iv_record(&snap.ticker, snap.spot, snap.as_of, &snap.bars, &snap.contracts, &self.config) {
                Some(record) => {
                    store.upsert(record)?;
                    written += 1;
                }
                None => tracing::warn!("{} {}: no ATM IV recovered", snap.ticker, snap.as_of),
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OptionType;
    use crate::scoring::{MarketRegime, Regime};
    use chrono::Duration;
    use tempfile::tempdir;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    fn bars(n: i64, step: f64) -> Vec<DailyBar> {
        let mut price = 100.0;
        (0..n)
            .map(|i| {
                price *= if i % 2 == 0 { 1.0 + step } else { 1.0 - step };
                DailyBar::new(
                    as_of() - Duration::days(n - 1 - i),
                    price,
                    price * 1.01,
                    price * 0.99,
                    price,
                    1_000,
                )
            })
            .collect()
    }

    /// Flat-smile chain with one IV per expiry
    fn chain(ticker: &str, spot: f64, ivs: &[(i64, f64)]) -> Vec<OptionContract> {
        let mut out = Vec::new();
        for (dte, iv) in ivs {
            let expiry = as_of() + Duration::days(*dte);
            for k in [0.97, 0.99, 1.0, 1.01, 1.03] {
                let strike = spot * k;
                for t in [OptionType::Call, OptionType::Put] {
                    let mut c = OptionContract::new(ticker, strike, expiry, t).with_iv(*iv);
                    c.theta = Some(-0.05);
                    c.vega = Some(0.12);
                    out.push(c);
                }
            }
        }
        out
    }

    fn snapshot(ticker: &str, ivs: &[(i64, f64)]) -> TickerSnapshot {
        TickerSnapshot {
            ticker: ticker.to_string(),
            spot: 100.0,
            as_of: as_of(),
            bars: bars(70, 0.005),
            contracts: chain(ticker, 100.0, ivs),
            historical_ivs: (0..252).map(|i| 8.0 + (i % 10) as f64).collect(),
        }
    }

    #[test]
    fn test_scan_all_sorts_and_collects_errors() {
        let contango = snapshot("SPY", &[(14, 0.16), (30, 0.18), (90, 0.22)]);
        let inverted = snapshot("QQQ", &[(14, 0.30), (30, 0.27), (90, 0.20)]);
        let mut broken = snapshot("IWM", &[(30, 0.2)]);
        broken.bars.truncate(5);

        let report = Scanner::new(EngineConfig::scanner()).scan_all(&[inverted, broken, contango]);

        assert_eq!(report.tickers.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].ticker, "IWM");
        assert!(report
            .tickers
            .windows(2)
            .all(|w| w[0].signal_score >= w[1].signal_score));

        let spy = report.tickers.iter().find(|t| t.ticker == "SPY").unwrap();
        assert!(spy.is_contango);
        assert_eq!(spy.atm_vega, Some(0.12));
        assert!(spy.atr14.is_some());

        let qqq = report.tickers.iter().find(|t| t.ticker == "QQQ").unwrap();
        assert_eq!(qqq.regime, Regime::Danger);
        assert_eq!(report.regime.total_tickers, 2);
        assert_eq!(report.regime.danger_count, 1);
        assert_ne!(report.regime.overall_regime, MarketRegime::NoData);
    }

    #[test]
    fn test_lookback_truncates_history() {
        let snap = snapshot("SPY", &[(30, 0.18), (60, 0.2)]);
        let config = EngineConfig {
            history_lookback: 30,
            ..EngineConfig::default()
        };
        let full = Scanner::new(EngineConfig::default()).scan_one(&snap).unwrap();
        let short = Scanner::new(config).scan_one(&snap).unwrap();
        // The first thirty values already cover the full 8..=17 range
        assert_eq!(full.iv_rank, short.iv_rank);
        assert_eq!(full.iv_percentile, short.iv_percentile);

        let mut tiny = snap.clone();
        tiny.historical_ivs.truncate(5);
        let neutral = Scanner::new(EngineConfig::default()).scan_one(&tiny).unwrap();
        assert_eq!((neutral.iv_rank, neutral.iv_percentile), (50.0, 50.0));
    }

    #[test]
    fn test_empty_scan() {
        let report = Scanner::new(EngineConfig::default()).scan_all(&[]);
        assert!(report.tickers.is_empty());
        assert_eq!(report.regime.overall_regime, MarketRegime::NoData);
    }

    #[test]
    fn test_record_history() {
        let dir = tempdir().unwrap();
        let store = IvHistoryStore::open(dir.path()).unwrap();
        let scanner = Scanner::new(EngineConfig::default());

        let snaps = vec![
            snapshot("SPY", &[(20, 0.18), (40, 0.2)]),
            snapshot("QQQ", &[]),
        ];
        assert_eq!(scanner.record_history(&snaps, &store).unwrap(), 1);
        // Same date again is skipped
        assert_eq!(scanner.record_history(&snaps, &store).unwrap(), 0);

        let rows = store.records("SPY").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].atm_iv, 19.0);
        assert!(rows[0].rv30.is_some());
    }

    #[test]
    fn test_snapshot_json_defaults_history() {
        let json = r#"{"ticker":"SPY","spot":500.0,"as_of":"2025-01-02","bars":[],"contracts":[]}"#;
        let snap: TickerSnapshot = serde_json::from_str(json).unwrap();
        assert!(snap.historical_ivs.is_empty());
    }
}
