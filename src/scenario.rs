//! End-to-end valuation runs
//!
//! A runner holds only configuration and the market-data resolver, so one
//! instance can value many companies, sequentially or in parallel.

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::assumptions::AssumptionSet;
use crate::error::Result;
use crate::market::{MarketData, MarketDataResolver};
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
use crate::ratios::{RatioAnalyzer, RatioRow};
use crate::valuation::{
    DcfValuator, MultiplesValuator, TransactionValuator, ValuationAggregator, ValuationConfig, ValuationResult,
    WaccBreakdown, WaccCalculator,
};

/// Everything produced by one run
#[derive(Debug, Clone, Serialize)]
pub struct ValuationOutcome {
    pub projection: ProjectionResult,
    pub ratios: Vec<RatioRow>,
    pub market: MarketData,
    pub wacc: WaccBreakdown,
    pub valuation: ValuationResult,
}

/// Runs projection and valuation with fixed configuration
///
/// # Example
/// ```ignore
/// let runner = ValuationRunner::new();
/// let outcome = runner.run(&AssumptionSet::sample())?;
/// println!("{:.0}", outcome.valuation.equity_value);
/// ```
#[derive(Clone)]
pub struct ValuationRunner {
    projection_config: ProjectionConfig,
    valuation_config: ValuationConfig,
    resolver: MarketDataResolver,
}

impl ValuationRunner {
    /// Default configuration with offline market data
    pub fn new() -> Self {
        Self {
            projection_config: ProjectionConfig::default(),
            valuation_config: ValuationConfig::default(),
            resolver: MarketDataResolver::offline(),
        }
    }

    pub fn with_projection_config(mut self, config: ProjectionConfig) -> Self {
        self.projection_config = config;
        self
    }

    pub fn with_valuation_config(mut self, config: ValuationConfig) -> Self {
        self.valuation_config = config;
        self
    }

    pub fn with_resolver(mut self, resolver: MarketDataResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn valuation_config(&self) -> &ValuationConfig {
        &self.valuation_config
    }

    /// Value one company with already-resolved market data
    pub fn run_with_market(&self, assumptions: &AssumptionSet, market: MarketData) -> Result<ValuationOutcome> {
        let config = &self.valuation_config;

        let projection = ProjectionEngine::new(assumptions, self.projection_config.clone()).project(&market)?;
        let ratios = RatioAnalyzer::analyze(&projection);
        let wacc = WaccCalculator::new(config).calculate(assumptions, &projection, &market)?;

        // The three approaches only read their inputs
        let (dcf, (multiples, transactions)) = rayon::join(
            || DcfValuator::new(config).value(assumptions, &projection, &wacc, &market.macro_scenario),
            || {
                rayon::join(
                    || MultiplesValuator::new(config).value(assumptions, &market),
                    || TransactionValuator::new(config).value(assumptions),
                )
            },
        );

        let valuation =
            ValuationAggregator::new(config).aggregate(assumptions, &projection, dcf?, multiples?, transactions?)?;

        Ok(ValuationOutcome {
            projection,
            ratios,
            market,
            wacc,
            valuation,
        })
    }

    /// Validate, resolve market data, project and value one company
    pub fn run(&self, assumptions: &AssumptionSet) -> Result<ValuationOutcome> {
        assumptions.validate()?;
        let market = self
            .resolver
            .resolve_blocking(assumptions.profile.sector, assumptions.macro_scenario);
        if market.used_fallback() {
            warn!(
                "{}: market data partly from defaults ({})",
                assumptions.profile.name,
                market.diagnostics.join("; ")
            );
        }
        let outcome = self.run_with_market(assumptions, market)?;
        info!(
            "Valued {} at {:.0} (WACC {:.2}%)",
            assumptions.profile.name,
            outcome.valuation.equity_value,
            outcome.wacc.wacc * 100.0
        );
        Ok(outcome)
    }

    /// Value many companies in parallel; each keeps its own result or error
    pub fn run_batch(&self, sets: &[AssumptionSet]) -> Vec<Result<ValuationOutcome>> {
        sets.par_iter().map(|set| self.run(set)).collect()
    }
}

impl Default for ValuationRunner {
    fn default() -> Self {
        Self::new()
    }
}
