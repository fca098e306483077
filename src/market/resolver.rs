//! Timeout-bounded market data resolution with default fallback
//!
//! The resolver never fails: every provider error or timeout is logged,
//! recorded in `MarketData::diagnostics` and replaced with the documented
//! default for that figure.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::defaults::{default_benchmarks, default_macro, default_multiples, StaticMarketData};
use super::provider::{MacroDataProvider, MarketDataError, SectorBenchmarks, ValuationMultiples};
use crate::assumptions::{MacroScenario, Sector};

/// Where the macro indicators of a run came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroSource {
    Supplied,
    Provider,
    Default,
}

/// External inputs of one valuation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    pub macro_scenario: MacroScenario,
    pub macro_source: MacroSource,
    pub benchmarks: SectorBenchmarks,
    pub multiples: ValuationMultiples,
    /// One entry per substituted figure
    pub diagnostics: Vec<String>,
}

impl MarketData {
    /// Defaults throughout, with a supplied scenario taking precedence
    pub fn defaults(sector: Sector, supplied: Option<MacroScenario>) -> Self {
        Self {
            macro_scenario: supplied.unwrap_or_else(default_macro),
            macro_source: if supplied.is_some() { MacroSource::Supplied } else { MacroSource::Default },
            benchmarks: default_benchmarks(sector),
            multiples: default_multiples(sector),
            diagnostics: Vec::new(),
        }
    }

    pub fn used_fallback(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

#[derive(Clone)]
pub struct MarketDataResolver {
    provider: Arc<dyn MacroDataProvider>,
    timeout: Duration,
}

impl MarketDataResolver {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(provider: Arc<dyn MacroDataProvider>) -> Self {
        Self {
            provider,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Resolver backed only by the default tables
    pub fn offline() -> Self {
        Self::new(Arc::new(StaticMarketData))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn bounded<T, F>(&self, what: &str, request: F, diagnostics: &mut Vec<String>) -> Option<T>
    where
        F: Future<Output = Result<T, MarketDataError>>,
    {
        let error = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(e)) => e,
            Err(_) => MarketDataError::Timeout(self.timeout.as_millis()),
        };
        warn!("{} unavailable from {}: {}; using defaults", what, self.provider.name(), error);
        diagnostics.push(format!("{what}: {error}"));
        None
    }

    /// Fetch macro indicators, sector benchmarks and multiples for `sector`
    pub async fn resolve(&self, sector: Sector, supplied: Option<MacroScenario>) -> MarketData {
        let mut data = MarketData::defaults(sector, supplied);
        let mut diagnostics = Vec::new();

        if supplied.is_none() {
            let fetched = self
                .bounded("macro indicators", self.provider.macro_indicators(), &mut diagnostics)
                .await;
            match fetched {
                Some(indicators) if indicators.validate().is_ok() => {
                    data.macro_scenario = indicators;
                    data.macro_source = MacroSource::Provider;
                }
                Some(_) => {
                    warn!("Discarding out-of-range macro indicators from {}", self.provider.name());
                    diagnostics.push("macro indicators: out of range".to_string());
                }
                None => {}
            }
        }

        if let Some(benchmarks) = self
            .bounded("sector benchmarks", self.provider.sector_benchmarks(sector), &mut diagnostics)
            .await
        {
            if benchmarks.ebitda_margin_pct.is_finite() && benchmarks.growth_pct.is_finite() {
                data.benchmarks = benchmarks;
            } else {
                diagnostics.push("sector benchmarks: non-finite values".to_string());
            }
        }

        if let Some(multiples) = self
            .bounded("valuation multiples", self.provider.valuation_multiples(sector), &mut diagnostics)
            .await
        {
            let usable = [multiples.ev_ebitda, multiples.ev_revenue, multiples.per]
                .iter()
                .all(|m| m.is_finite() && *m > 0.0);
            if usable {
                data.multiples = multiples;
            } else {
                diagnostics.push("valuation multiples: non-positive values".to_string());
            }
        }

        debug!(
            "Market data for {}: macro from {:?}, {} fallbacks",
            sector,
            data.macro_source,
            diagnostics.len()
        );
        data.diagnostics = diagnostics;
        data
    }

    /// Synchronous wrapper for callers outside an async runtime.
    /// Must not be called from within a tokio runtime.
    pub fn resolve_blocking(&self, sector: Sector, supplied: Option<MacroScenario>) -> MarketData {
        match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime.block_on(self.resolve(sector, supplied)),
            Err(e) => {
                warn!("Could not start market data runtime: {}; using defaults", e);
                let mut data = MarketData::defaults(sector, supplied);
                data.diagnostics.push(format!("runtime: {e}"));
                data
            }
        }
    }
}

impl Default for MarketDataResolver {
    fn default() -> Self {
        Self::offline()
    }
}
