//! Scan result caching
//!
//! Keeps the most recent scan report on disk so the previous results can be
//! served without rerunning the engine.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};

use crate::core::EngineResult;
use crate::scan::ScanReport;

const LATEST_FILE: &str = "latest_scan.json";

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache directory
    pub cache_dir: PathBuf,
    /// Maximum age before the report counts as stale (in hours)
    pub max_age_hours: i64,
    /// Whether to use cache
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./data/cache"),
            max_age_hours: 24,
            enabled: true,
        }
    }
}

/// Latest-scan cache
pub struct ScanCache {
    config: CacheConfig,
}

impl ScanCache {
    pub fn new(config: CacheConfig) -> EngineResult<Self> {
        if config.enabled && !config.cache_dir.exists() {
            fs::create_dir_all(&config.cache_dir)?;
        }

        Ok(Self { config })
    }

    fn latest_path(&self) -> PathBuf {
        self.config.cache_dir.join(LATEST_FILE)
    }

    /// True if a report exists and its file is younger than the max age
    pub fn is_valid(&self) -> bool {
        if !self.config.enabled {
            return false;
        }

        let path = self.latest_path();
        let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) else {
            return false;
        };

        let modified: DateTime<Utc> = modified.into();
        Utc::now() - modified < Duration::hours(self.config.max_age_hours)
    }

    pub fn save(&self, report: &ScanReport) -> EngineResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let path = self.latest_path();
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json)?;

        tracing::info!("Cached scan of {} tickers at {:?}", report.tickers.len(), path);
        Ok(())
    }

    /// Latest report, or `None` when disabled, missing or stale
    pub fn load_latest(&self) -> EngineResult<Option<ScanReport>> {
        if !self.is_valid() {
            tracing::debug!("No fresh cached scan");
            return Ok(None);
        }

        let json = fs::read_to_string(self.latest_path())?;
        let report: ScanReport = serde_json::from_str(&json)?;

        tracing::info!("Loaded cached scan from {}", report.scanned_at);
        Ok(Some(report))
    }

    pub fn clear(&self) -> EngineResult<()> {
        let path = self.latest_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
