//! Documented fallback figures used whenever a provider cannot answer

use async_trait::async_trait;

use super::provider::{MacroDataProvider, MarketDataError, SectorBenchmarks, ValuationMultiples};
use crate::assumptions::{MacroScenario, Sector};

pub fn default_macro() -> MacroScenario {
    MacroScenario::default()
}

pub fn default_benchmarks(sector: Sector) -> SectorBenchmarks {
    let (growth_pct, ebitda_margin_pct) = match sector {
        Sector::Technology => (15.0, 20.0),
        Sector::Hospitality => (6.0, 12.0),
        Sector::Ecommerce => (9.0, 8.0),
        Sector::Consulting => (8.0, 25.0),
        Sector::Retail => (3.5, 8.0),
        Sector::Services => (5.0, 15.0),
        Sector::Automotive => (4.0, 10.0),
        Sector::Industrial => (4.0, 12.0),
        Sector::Construction | Sector::Energy | Sector::Pharmaceutical | Sector::Other => (3.0, 12.0),
    };
    SectorBenchmarks {
        growth_pct,
        ebitda_margin_pct,
    }
}

pub fn default_multiples(sector: Sector) -> ValuationMultiples {
    let (ev_ebitda, ev_revenue, per) = match sector {
        Sector::Technology => (15.0, 3.5, 25.0),
        Sector::Services => (8.0, 1.2, 14.0),
        Sector::Industrial => (7.5, 1.0, 12.0),
        Sector::Automotive => (5.5, 0.7, 8.0),
        Sector::Retail => (7.0, 0.5, 12.0),
        Sector::Energy => (6.0, 1.1, 10.0),
        Sector::Construction => (6.5, 0.8, 9.0),
        Sector::Pharmaceutical => (12.0, 3.0, 18.0),
        // General market averages
        Sector::Hospitality | Sector::Ecommerce | Sector::Consulting | Sector::Other => (9.5, 1.8, 16.0),
    };
    ValuationMultiples {
        ev_ebitda,
        ev_revenue,
        per,
    }
}

/// Provider that always answers with the fallback tables
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMarketData;

#[async_trait]
impl MacroDataProvider for StaticMarketData {
    async fn macro_indicators(&self) -> Result<MacroScenario, MarketDataError> {
        Ok(default_macro())
    }

    async fn sector_benchmarks(&self, sector: Sector) -> Result<SectorBenchmarks, MarketDataError> {
        Ok(default_benchmarks(sector))
    }

    async fn valuation_multiples(&self, sector: Sector) -> Result<ValuationMultiples, MarketDataError> {
        Ok(default_multiples(sector))
    }

    fn name(&self) -> &str {
        "static defaults"
    }
}
