//! Projected financial statements

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, EngineError, Result};

/// Initial investment assumed by the projected ROI, as a share of first-year revenue
pub const ROI_INVESTMENT_SHARE: f64 = 0.2;

/// Income statement, balance sheet and cash-flow lines for one year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    pub year: u32,

    // Income statement
    /// Growth applied to reach this year's revenue, in percent
    pub revenue_growth_pct: f64,
    pub revenue: f64,
    pub variable_costs: f64,
    pub personnel_costs: f64,
    pub general_costs: f64,
    pub marketing_costs: f64,
    pub other_fixed_costs: f64,
    pub ebitda: f64,
    pub depreciation: f64,
    pub ebit: f64,
    pub interest_expense: f64,
    pub factoring_cost: f64,
    /// Interest plus factoring cost
    pub financial_expense: f64,
    pub pre_tax_income: f64,
    pub taxes: f64,
    pub net_income: f64,

    // Assets
    pub gross_fixed_assets: f64,
    pub accumulated_depreciation: f64,
    pub net_fixed_assets: f64,
    pub intangible_assets: f64,
    pub long_term_investments: f64,
    pub inventory: f64,
    pub receivables: f64,
    pub other_current_assets: f64,
    /// Balancing figure
    pub cash: f64,
    pub total_assets: f64,

    // Equity
    pub share_capital: f64,
    pub reserves: f64,
    pub retained_earnings: f64,
    pub total_equity: f64,

    // Liabilities
    pub long_term_debt: f64,
    pub short_term_debt: f64,
    pub total_debt: f64,
    pub payables: f64,
    pub other_liabilities: f64,
    pub labour_liability: f64,
    /// Funding needed to keep cash at its floor
    pub short_term_funding: f64,
    pub total_liabilities: f64,
    pub total_liabilities_and_equity: f64,

    // Cash flow
    pub capex: f64,
    /// Increase in receivables and inventory less increase in payables
    pub working_capital_change: f64,
    pub operating_cash_flow: f64,
    pub investing_cash_flow: f64,
    pub principal_repayment: f64,
    pub dividends_declared: f64,
    /// Prior year's declared dividend
    pub dividends_paid: f64,
    pub financing_cash_flow: f64,
    pub free_cash_flow: f64,
}

impl ProjectionRow {
    pub fn new(year: u32) -> Self {
        Self {
            year,
            ..Default::default()
        }
    }

    pub fn total_fixed_costs(&self) -> f64 {
        self.personnel_costs + self.general_costs + self.marketing_costs + self.other_fixed_costs
    }

    pub fn current_assets(&self) -> f64 {
        self.inventory + self.receivables + self.other_current_assets + self.cash
    }

    pub fn current_liabilities(&self) -> f64 {
        self.short_term_debt + self.payables + self.short_term_funding
    }

    /// Interest-bearing debt and labour liability less cash
    pub fn net_debt(&self) -> f64 {
        self.total_debt + self.short_term_funding + self.labour_liability - self.cash
    }

    /// Reject any non-finite line item
    pub fn check_finite(&self) -> Result<()> {
        let lines = [
            ("revenue", self.revenue),
            ("variable_costs", self.variable_costs),
            ("ebitda", self.ebitda),
            ("depreciation", self.depreciation),
            ("financial_expense", self.financial_expense),
            ("net_income", self.net_income),
            ("net_fixed_assets", self.net_fixed_assets),
            ("inventory", self.inventory),
            ("receivables", self.receivables),
            ("payables", self.payables),
            ("reserves", self.reserves),
            ("total_debt", self.total_debt),
            ("cash", self.cash),
            ("short_term_funding", self.short_term_funding),
            ("total_assets", self.total_assets),
            ("total_liabilities_and_equity", self.total_liabilities_and_equity),
            ("capex", self.capex),
            ("operating_cash_flow", self.operating_cash_flow),
            ("financing_cash_flow", self.financing_cash_flow),
            ("free_cash_flow", self.free_cash_flow),
        ];
        for (quantity, value) in lines {
            ensure_finite(quantity, self.year, value)?;
        }
        Ok(())
    }

    /// Assets must equal liabilities plus equity
    pub fn check_balanced(&self) -> Result<()> {
        let gap = (self.total_assets - self.total_liabilities_and_equity).abs();
        let tolerance = 1e-6 * self.total_assets.abs().max(1.0);
        if gap > tolerance {
            return Err(EngineError::domain(
                "balance_sheet",
                format!(
                    "year {}: assets {:.2} != liabilities and equity {:.2}",
                    self.year, self.total_assets, self.total_liabilities_and_equity
                ),
            ));
        }
        Ok(())
    }
}

/// Complete multi-year projection for one company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub company: String,
    pub base_revenue: f64,
    pub rows: Vec<ProjectionRow>,
}

impl ProjectionResult {
    pub fn new(company: impl Into<String>, base_revenue: f64) -> Self {
        Self {
            company: company.into(),
            base_revenue,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: ProjectionRow) {
        self.rows.push(row);
    }

    pub fn years(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Row for a 1-based projection year
    pub fn row(&self, year: u32) -> Result<&ProjectionRow> {
        year.checked_sub(1)
            .and_then(|index| self.rows.get(index as usize))
            .filter(|row| row.year == year)
            .ok_or(EngineError::MissingProjectionYear { year })
    }

    pub fn first(&self) -> Result<&ProjectionRow> {
        self.row(1)
    }

    pub fn last(&self) -> Result<&ProjectionRow> {
        self.row(self.years().max(1))
    }

    pub fn free_cash_flows(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.free_cash_flow).collect()
    }

    pub fn summary(&self) -> ProjectionSummary {
        let final_revenue = self.rows.last().map(|r| r.revenue).unwrap_or(self.base_revenue);
        let years = self.years();
        let revenue_cagr_pct = if years > 0 && self.base_revenue > 0.0 && final_revenue > 0.0 {
            ((final_revenue / self.base_revenue).powf(1.0 / years as f64) - 1.0) * 100.0
        } else {
            0.0
        };

        // Growth between consecutive projected years
        let growth_rates: Vec<f64> = self
            .rows
            .windows(2)
            .filter(|pair| pair[0].revenue > 0.0)
            .map(|pair| (pair[1].revenue / pair[0].revenue - 1.0) * 100.0)
            .collect();
        let margins: Vec<f64> = self
            .rows
            .iter()
            .filter(|r| r.revenue > 0.0)
            .map(|r| r.ebitda / r.revenue * 100.0)
            .collect();
        let investment = self.rows.first().map(|r| r.revenue * ROI_INVESTMENT_SHARE).unwrap_or(0.0);
        let roi_pct = match self.rows.last() {
            Some(last) if investment > 0.0 => last.net_income / investment * 100.0,
            _ => 0.0,
        };

        ProjectionSummary {
            years,
            final_revenue,
            revenue_cagr_pct,
            avg_revenue_growth_pct: mean(&growth_rates),
            avg_ebitda_margin_pct: mean(&margins),
            roi_pct,
            break_even_year: self.rows.iter().find(|r| r.net_income > 0.0).map(|r| r.year),
            cumulative_net_income: self.rows.iter().map(|r| r.net_income).sum(),
            cumulative_free_cash_flow: self.rows.iter().map(|r| r.free_cash_flow).sum(),
            cumulative_capex: self.rows.iter().map(|r| r.capex).sum(),
            final_equity: self.rows.last().map(|r| r.total_equity).unwrap_or(0.0),
            final_total_debt: self.rows.last().map(|r| r.total_debt).unwrap_or(0.0),
            max_short_term_funding: self
                .rows
                .iter()
                .map(|r| r.short_term_funding)
                .fold(0.0, f64::max),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub years: u32,
    pub final_revenue: f64,
    pub revenue_cagr_pct: f64,
    /// Mean year-on-year growth across projected years
    pub avg_revenue_growth_pct: f64,
    pub avg_ebitda_margin_pct: f64,
    /// Final-year net income over an investment of 20% of first-year revenue
    pub roi_pct: f64,
    /// First year with positive net income
    pub break_even_year: Option<u32>,
    pub cumulative_net_income: f64,
    pub cumulative_free_cash_flow: f64,
    pub cumulative_capex: f64,
    pub final_equity: f64,
    pub final_total_debt: f64,
    pub max_short_term_funding: f64,
}
