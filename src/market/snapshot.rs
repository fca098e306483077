//! Market data read from a JSON snapshot on disk

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::provider::{MacroDataProvider, MarketDataError, SectorBenchmarks, ValuationMultiples};
use crate::assumptions::{MacroScenario, Sector};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorSnapshot {
    pub benchmarks: Option<SectorBenchmarks>,
    pub multiples: Option<ValuationMultiples>,
}

/// File layout: `{"macro": {...}, "sectors": {"industrial": {...}}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    #[serde(rename = "macro")]
    pub macro_indicators: Option<MacroScenario>,
    #[serde(default)]
    pub sectors: HashMap<Sector, SectorSnapshot>,
}

/// Reads the snapshot file on every request so that edits are picked up
#[derive(Debug, Clone)]
pub struct SnapshotFileProvider {
    path: PathBuf,
}

impl SnapshotFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<MarketSnapshot, MarketDataError> {
        let bytes = tokio::fs::read(&self.path).await?;
        serde_json::from_slice(&bytes).map_err(|e| MarketDataError::ParsingError(e.to_string()))
    }

    async fn sector(&self, sector: Sector) -> Result<SectorSnapshot, MarketDataError> {
        self.load()
            .await?
            .sectors
            .remove(&sector)
            .ok_or_else(|| MarketDataError::NotFound(format!("sector {sector} in {}", self.path.display())))
    }
}

#[async_trait]
impl MacroDataProvider for SnapshotFileProvider {
    async fn macro_indicators(&self) -> Result<MacroScenario, MarketDataError> {
        self.load()
            .await?
            .macro_indicators
            .ok_or_else(|| MarketDataError::NotFound("macro indicators".to_string()))
    }

    async fn sector_benchmarks(&self, sector: Sector) -> Result<SectorBenchmarks, MarketDataError> {
        self.sector(sector)
            .await?
            .benchmarks
            .ok_or_else(|| MarketDataError::NotFound(format!("benchmarks for {sector}")))
    }

    async fn valuation_multiples(&self, sector: Sector) -> Result<ValuationMultiples, MarketDataError> {
        self.sector(sector)
            .await?
            .multiples
            .ok_or_else(|| MarketDataError::NotFound(format!("multiples for {sector}")))
    }

    fn name(&self) -> &str {
        "snapshot file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn snapshot_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data/market_snapshot.json")
    }

    #[tokio::test]
    async fn test_reads_macro_and_sector_entries() {
        let provider = SnapshotFileProvider::new(snapshot_path());
        let macro_ = provider.macro_indicators().await.unwrap();
        assert_eq!(macro_.gdp_growth_pct, 2.0);

        let multiples = provider.valuation_multiples(Sector::Industrial).await.unwrap();
        assert_eq!(multiples.ev_ebitda, 7.0);
    }

    #[tokio::test]
    async fn test_missing_sector_is_not_found() {
        let provider = SnapshotFileProvider::new(snapshot_path());
        let err = provider.sector_benchmarks(Sector::Pharmaceutical).await.unwrap_err();
        assert!(matches!(err, MarketDataError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let provider = SnapshotFileProvider::new("data/no_such_snapshot.json");
        assert!(matches!(provider.macro_indicators().await, Err(MarketDataError::Io(_))));
    }
}
