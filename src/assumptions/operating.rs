//! Operating, macroeconomic and opening balance-sheet assumptions
//!
//! Percentages are expressed as percent (5.0 = 5%).

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Macroeconomic backdrop for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroScenario {
    pub gdp_growth_pct: f64,
    pub inflation_pct: f64,

    /// 12-month interbank reference rate
    pub reference_rate_pct: f64,

    pub unemployment_pct: f64,
}

impl Default for MacroScenario {
    fn default() -> Self {
        Self {
            gdp_growth_pct: 1.9,
            inflation_pct: 2.5,
            reference_rate_pct: 2.7,
            unemployment_pct: 11.7,
        }
    }
}

impl MacroScenario {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("macro.gdp_growth_pct", self.gdp_growth_pct),
            ("macro.inflation_pct", self.inflation_pct),
            ("macro.reference_rate_pct", self.reference_rate_pct),
            ("macro.unemployment_pct", self.unemployment_pct),
        ];
        for (field, value) in fields {
            if !value.is_finite() || !(-50.0..=100.0).contains(&value) {
                return Err(EngineError::invalid(field, "must be a finite percentage within [-50, 100]"));
            }
        }
        Ok(())
    }
}

/// Revenue, cost and working-capital drivers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingAssumptions {
    /// Last actual annual revenue; year 1 grows off this figure
    pub base_revenue: f64,

    pub revenue_growth_pct: f64,
    pub variable_cost_pct: f64,

    // Annual fixed costs at today's prices
    pub personnel_costs: f64,
    pub general_costs: f64,
    #[serde(default)]
    pub marketing_costs: f64,
    #[serde(default)]
    pub other_fixed_costs: f64,

    pub collection_days: f64,
    pub payment_days: f64,
    pub inventory_days: f64,

    pub tax_rate_pct: f64,
    #[serde(default)]
    pub dividend_payout_pct: f64,

    /// Overrides the sector CAPEX fallback
    #[serde(default)]
    pub capex_pct_of_revenue: Option<f64>,

    /// Observed current EBITDA, if known
    #[serde(default)]
    pub current_ebitda: Option<f64>,
}

impl OperatingAssumptions {
    pub fn total_fixed_costs(&self) -> f64 {
        self.personnel_costs + self.general_costs + self.marketing_costs + self.other_fixed_costs
    }

    /// EBITDA of the base year: the observed figure if supplied, else derived from costs
    pub fn base_ebitda(&self) -> f64 {
        self.current_ebitda.unwrap_or_else(|| {
            self.base_revenue * (1.0 - self.variable_cost_pct / 100.0) - self.total_fixed_costs()
        })
    }

    pub fn base_ebitda_margin_pct(&self) -> f64 {
        if self.base_revenue > 0.0 {
            self.base_ebitda() / self.base_revenue * 100.0
        } else {
            0.0
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.base_revenue.is_finite() || self.base_revenue <= 0.0 {
            return Err(EngineError::invalid(
                "operating.base_revenue",
                "must be a finite, positive amount",
            ));
        }
        if !self.revenue_growth_pct.is_finite() || self.revenue_growth_pct <= -100.0 {
            return Err(EngineError::invalid(
                "operating.revenue_growth_pct",
                "must be finite and greater than -100",
            ));
        }

        let percentages = [
            ("operating.variable_cost_pct", self.variable_cost_pct),
            ("operating.tax_rate_pct", self.tax_rate_pct),
            ("operating.dividend_payout_pct", self.dividend_payout_pct),
        ];
        for (field, value) in percentages {
            if !(0.0..=100.0).contains(&value) {
                return Err(EngineError::invalid(field, "must be within [0, 100]"));
            }
        }
        if let Some(pct) = self.capex_pct_of_revenue {
            if !(0.0..=100.0).contains(&pct) {
                return Err(EngineError::invalid(
                    "operating.capex_pct_of_revenue",
                    "must be within [0, 100]",
                ));
            }
        }

        let amounts = [
            ("operating.personnel_costs", self.personnel_costs),
            ("operating.general_costs", self.general_costs),
            ("operating.marketing_costs", self.marketing_costs),
            ("operating.other_fixed_costs", self.other_fixed_costs),
            ("operating.collection_days", self.collection_days),
            ("operating.payment_days", self.payment_days),
            ("operating.inventory_days", self.inventory_days),
        ];
        for (field, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::invalid(field, "must be finite and non-negative"));
            }
        }

        if let Some(ebitda) = self.current_ebitda {
            if !ebitda.is_finite() {
                return Err(EngineError::invalid("operating.current_ebitda", "must be finite"));
            }
        }
        Ok(())
    }
}

/// Balance sheet at the start of the projection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialBalanceSheet {
    pub gross_fixed_assets: f64,
    /// Gross less accumulated depreciation
    pub net_fixed_assets: f64,
    pub intangible_assets: f64,
    pub long_term_investments: f64,
    pub other_current_assets: f64,
    pub inventory: f64,
    pub receivables: f64,
    pub cash: f64,
    pub payables: f64,
    pub other_liabilities: f64,
    /// Accrued severance and similar labour obligations, counted as debt
    pub labour_liability: f64,
    pub share_capital: f64,
    pub reserves: f64,
    pub retained_earnings: f64,
}

impl InitialBalanceSheet {
    pub fn accumulated_depreciation(&self) -> f64 {
        self.gross_fixed_assets - self.net_fixed_assets
    }

    pub fn book_equity(&self) -> f64 {
        self.share_capital + self.reserves + self.retained_earnings
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("balance_sheet.gross_fixed_assets", self.gross_fixed_assets),
            ("balance_sheet.net_fixed_assets", self.net_fixed_assets),
            ("balance_sheet.intangible_assets", self.intangible_assets),
            ("balance_sheet.long_term_investments", self.long_term_investments),
            ("balance_sheet.other_current_assets", self.other_current_assets),
            ("balance_sheet.inventory", self.inventory),
            ("balance_sheet.receivables", self.receivables),
            ("balance_sheet.cash", self.cash),
            ("balance_sheet.payables", self.payables),
            ("balance_sheet.other_liabilities", self.other_liabilities),
            ("balance_sheet.labour_liability", self.labour_liability),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::invalid(field, "must be finite and non-negative"));
            }
        }
        if self.net_fixed_assets > self.gross_fixed_assets {
            return Err(EngineError::invalid(
                "balance_sheet.net_fixed_assets",
                "cannot exceed gross fixed assets",
            ));
        }
        for (field, value) in [
            ("balance_sheet.share_capital", self.share_capital),
            ("balance_sheet.reserves", self.reserves),
            ("balance_sheet.retained_earnings", self.retained_earnings),
        ] {
            if !value.is_finite() {
                return Err(EngineError::invalid(field, "must be finite"));
            }
        }
        Ok(())
    }
}
