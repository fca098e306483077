//! Company, operating, macroeconomic, debt and CAPEX assumptions

mod company;
mod operating;
mod capex;
pub mod loader;

pub use company::{CompanyProfile, CreditRating, Sector};
pub use operating::{InitialBalanceSheet, MacroScenario, OperatingAssumptions};
pub use capex::{CapexEntry, CapexPlan};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::debt::{AmortizationMethod, DebtInstrument};
use crate::error::{EngineError, Result};

/// Longest supported projection horizon
pub const MAX_HORIZON_YEARS: u32 = 30;

fn default_horizon() -> u32 {
    5
}

/// Everything a valuation run consumes. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssumptionSet {
    pub profile: CompanyProfile,

    /// Provider or default indicators are used when absent
    #[serde(default, rename = "macro")]
    pub macro_scenario: Option<MacroScenario>,

    pub operating: OperatingAssumptions,

    #[serde(default)]
    pub balance_sheet: InitialBalanceSheet,

    #[serde(default)]
    pub debt: Vec<DebtInstrument>,

    #[serde(default)]
    pub capex_plan: CapexPlan,

    #[serde(default = "default_horizon")]
    pub horizon_years: u32,
}

impl AssumptionSet {
    /// Mid-sized industrial company with a typical debt mix
    pub fn sample() -> Self {
        Self {
            profile: CompanyProfile {
                name: "Metalurgia Levante SL".to_string(),
                sector: Sector::Industrial,
                founding_year: 2008,
                employees: 85,
                family_owned: true,
                audited: true,
                largest_client_pct: Some(22.0),
                credit_rating: None,
            },
            macro_scenario: None,
            operating: OperatingAssumptions {
                base_revenue: 12_000_000.0,
                revenue_growth_pct: 5.0,
                variable_cost_pct: 55.0,
                personnel_costs: 2_600_000.0,
                general_costs: 900_000.0,
                marketing_costs: 150_000.0,
                other_fixed_costs: 250_000.0,
                collection_days: 60.0,
                payment_days: 45.0,
                inventory_days: 40.0,
                tax_rate_pct: 25.0,
                dividend_payout_pct: 30.0,
                capex_pct_of_revenue: None,
                current_ebitda: None,
            },
            balance_sheet: InitialBalanceSheet {
                gross_fixed_assets: 4_500_000.0,
                net_fixed_assets: 3_000_000.0,
                intangible_assets: 200_000.0,
                long_term_investments: 100_000.0,
                other_current_assets: 150_000.0,
                inventory: 800_000.0,
                receivables: 1_900_000.0,
                cash: 600_000.0,
                payables: 850_000.0,
                other_liabilities: 200_000.0,
                labour_liability: 0.0,
                share_capital: 1_000_000.0,
                reserves: 2_200_000.0,
                retained_earnings: 300_000.0,
            },
            debt: vec![
                DebtInstrument::term_loan(1_500_000.0, 4.5, 7, AmortizationMethod::French),
                DebtInstrument::mortgage(800_000.0, 3.2, 15),
                DebtInstrument::Lease {
                    monthly_payment: 4_000.0,
                    remaining_months: 30,
                },
                DebtInstrument::CreditLine {
                    limit: 500_000.0,
                    drawn: 150_000.0,
                    rate_pct: 5.5,
                },
            ],
            capex_plan: CapexPlan::default(),
            horizon_years: default_horizon(),
        }
    }

    pub fn from_json_path(path: &Path) -> Result<Self> {
        loader::load_assumption_set(path)
    }

    /// Reject malformed assumptions before any computation
    pub fn validate(&self) -> Result<()> {
        if self.horizon_years == 0 || self.horizon_years > MAX_HORIZON_YEARS {
            return Err(EngineError::invalid(
                "horizon_years",
                format!("must be within 1..={MAX_HORIZON_YEARS}, got {}", self.horizon_years),
            ));
        }
        self.profile.validate()?;
        if let Some(scenario) = &self.macro_scenario {
            scenario.validate()?;
        }
        self.operating.validate()?;
        self.balance_sheet.validate()?;
        for (index, instrument) in self.debt.iter().enumerate() {
            instrument.validate(index)?;
        }
        self.capex_plan.validate(self.horizon_years)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_valid() {
        assert!(AssumptionSet::sample().validate().is_ok());
    }

    #[test]
    fn test_horizon_bounds() {
        let mut set = AssumptionSet::sample();
        set.horizon_years = 0;
        assert!(set.validate().is_err());
        set.horizon_years = 31;
        assert!(set.validate().is_err());
        set.horizon_years = 30;
        assert!(set.validate().is_ok());
    }

    #[test]
    fn test_invalid_debt_names_instrument() {
        let mut set = AssumptionSet::sample();
        set.debt.push(DebtInstrument::CreditLine {
            limit: 10.0,
            drawn: 20.0,
            rate_pct: 3.0,
        });
        let err = set.validate().unwrap_err();
        assert!(err.to_string().contains("debt[4]"));
    }

    #[test]
    fn test_json_roundtrip_keeps_macro_key() {
        let mut set = AssumptionSet::sample();
        set.macro_scenario = Some(MacroScenario::default());
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"macro\""));
        let back: AssumptionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
