//! Interface to external macroeconomic and sector data

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assumptions::{MacroScenario, Sector};

/// Failures of a data source. Always absorbed by the resolver.
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("Provider error: {0}")]
    ProviderError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Parsing error: {0}")]
    ParsingError(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Timed out after {0} ms")]
    Timeout(u128),
}

/// Sector growth and profitability averages, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorBenchmarks {
    pub growth_pct: f64,
    pub ebitda_margin_pct: f64,
}

/// Trading multiples observed for a sector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationMultiples {
    pub ev_ebitda: f64,
    pub ev_revenue: f64,
    pub per: f64,
}

#[async_trait]
pub trait MacroDataProvider: Send + Sync {
    async fn macro_indicators(&self) -> Result<MacroScenario, MarketDataError>;
    async fn sector_benchmarks(&self, sector: Sector) -> Result<SectorBenchmarks, MarketDataError>;
    async fn valuation_multiples(&self, sector: Sector) -> Result<ValuationMultiples, MarketDataError>;

    /// Short label used in diagnostics
    fn name(&self) -> &str;
}
