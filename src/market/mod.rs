//! Macroeconomic indicators, sector benchmarks and trading multiples

mod provider;
mod defaults;
mod snapshot;
mod resolver;

pub use provider::{MacroDataProvider, MarketDataError, SectorBenchmarks, ValuationMultiples};
pub use defaults::{default_benchmarks, default_macro, default_multiples, StaticMarketData};
pub use snapshot::{MarketSnapshot, SectorSnapshot, SnapshotFileProvider};
pub use resolver::{MacroSource, MarketData, MarketDataResolver};
