//! SME Valuation - pro-forma projection and valuation engine for small and medium enterprises
//!
//! This library provides:
//! - Debt schedules for term loans, mortgages, leases, credit lines and factoring
//! - Three-statement projections (income statement, balance sheet, cash flow)
//! - Financial ratio analysis
//! - WACC, DCF with sensitivity grid, trading multiples and precedent transactions
//! - A leverage-weighted blend with illiquidity discount and book-equity floor

pub mod error;
pub mod assumptions;
pub mod debt;
pub mod market;
pub mod projection;
pub mod ratios;
pub mod valuation;
pub mod scenario;

// Re-export commonly used types
pub use error::{EngineError, Result};
pub use assumptions::{AssumptionSet, CompanyProfile, MacroScenario, OperatingAssumptions, Sector};
pub use debt::{DebtInstrument, DebtScheduler};
pub use market::{MacroDataProvider, MarketData, MarketDataResolver};
pub use projection::{ProjectionConfig, ProjectionEngine, ProjectionResult, ProjectionRow};
pub use ratios::{RatioAnalyzer, RatioRow};
pub use valuation::{ValuationConfig, ValuationResult};
pub use scenario::{ValuationOutcome, ValuationRunner};
