//! Figures carried from one projected year into the next

use crate::assumptions::AssumptionSet;
use super::statements::ProjectionRow;

/// Closing position of the last completed year (year 0 = opening balance sheet)
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Last completed projection year
    pub year: u32,

    pub revenue: f64,

    /// Gross fixed assets including all CAPEX recognized so far
    pub gross_fixed_assets: f64,

    pub accumulated_depreciation: f64,

    pub reserves: f64,

    // Working capital balances
    pub receivables: f64,
    pub inventory: f64,
    pub payables: f64,

    /// Declared last year, paid this year
    pub dividends_declared: f64,
}

impl ProjectionState {
    /// Position at projection start, taken from the opening balance sheet
    pub fn from_assumptions(assumptions: &AssumptionSet) -> Self {
        let bs = &assumptions.balance_sheet;
        Self {
            year: 0,
            revenue: assumptions.operating.base_revenue,
            gross_fixed_assets: bs.gross_fixed_assets,
            accumulated_depreciation: bs.accumulated_depreciation(),
            reserves: bs.reserves,
            receivables: bs.receivables,
            inventory: bs.inventory,
            payables: bs.payables,
            dividends_declared: 0.0,
        }
    }

    /// Book value still available for depreciation
    pub fn net_book_value(&self) -> f64 {
        (self.gross_fixed_assets - self.accumulated_depreciation).max(0.0)
    }

    /// Roll the state forward to the closing position of `row`
    pub fn advance(&mut self, row: &ProjectionRow) {
        self.year = row.year;
        self.revenue = row.revenue;
        self.gross_fixed_assets = row.gross_fixed_assets;
        self.accumulated_depreciation = row.accumulated_depreciation;
        self.reserves = row.reserves;
        self.receivables = row.receivables;
        self.inventory = row.inventory;
        self.payables = row.payables;
        self.dividends_declared = row.dividends_declared;
    }
}
