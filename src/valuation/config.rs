//! Methodology settings shared by every valuation method
//!
//! Rates here are decimal fractions (0.055 = 5.5%).

use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Source of the credit spread in the cost of debt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditSpreadSource {
    /// Rating when the profile has one, interest coverage otherwise
    #[default]
    Auto,
    InterestCoverage,
    /// Falls back to coverage when no rating is available
    Rating,
}

/// Equity value used for the WACC capital weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EquityValueBasis {
    /// Base revenue times a multiple
    RevenueMultiple(f64),
    /// Opening book equity
    BookEquity,
}

impl Default for EquityValueBasis {
    fn default() -> Self {
        EquityValueBasis::RevenueMultiple(0.8)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// Explicit risk-free rate; derived from the reference rate when absent
    pub risk_free_rate: Option<f64>,

    /// Deducted from the interbank reference rate to approximate the sovereign yield
    pub reference_rate_spread: f64,

    pub market_risk_premium: f64,

    /// Blume adjustment: adjusted = weight * raw + (1 - weight) * 1.0
    pub beta_blume_weight: f64,

    pub max_specific_premium: f64,

    pub credit_spread_source: CreditSpreadSource,

    pub equity_value_basis: EquityValueBasis,

    /// Share of the Gordon value in the blended terminal value
    pub gordon_weight: f64,

    /// Sensitivity grid steps around the base WACC and growth
    pub wacc_step: f64,
    pub growth_step: f64,

    /// Precedent-transaction base multiples before the sector factor
    pub transaction_ev_ebitda: f64,
    pub transaction_ev_revenue: f64,

    /// Half-widths of the per-method and presentation ranges
    pub dcf_range: f64,
    pub multiples_range: f64,
    pub transactions_range: f64,
    pub presentation_range: f64,

    /// Terminal-value share above which the conclusions carry a warning
    pub terminal_value_warning_share: f64,

    /// Year used to compute company age; the current year when absent
    pub valuation_year: Option<i32>,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: None,
            reference_rate_spread: 0.005,
            market_risk_premium: 0.055,
            beta_blume_weight: 0.67,
            max_specific_premium: 0.08,
            credit_spread_source: CreditSpreadSource::Auto,
            equity_value_basis: EquityValueBasis::default(),
            gordon_weight: 0.6,
            wacc_step: 0.01,
            growth_step: 0.005,
            transaction_ev_ebitda: 7.5,
            transaction_ev_revenue: 1.2,
            dcf_range: 0.10,
            multiples_range: 0.15,
            transactions_range: 0.15,
            presentation_range: 0.15,
            terminal_value_warning_share: 0.75,
            valuation_year: None,
        }
    }
}

impl ValuationConfig {
    pub fn valuation_year(&self) -> i32 {
        self.valuation_year.unwrap_or_else(|| chrono::Utc::now().year())
    }

    /// Risk-free rate as a decimal, given the reference rate in percent
    pub fn risk_free_rate(&self, reference_rate_pct: f64) -> f64 {
        self.risk_free_rate
            .unwrap_or_else(|| (reference_rate_pct / 100.0 - self.reference_rate_spread).max(0.0))
    }
}
