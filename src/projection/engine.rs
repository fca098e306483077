//! Year-by-year three-statement projection
//!
//! Each year is built from the previous year's closing state. Cash is the
//! last line computed: it is whatever makes assets equal liabilities plus
//! equity, floored at a share of revenue.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::assumptions::AssumptionSet;
use crate::debt::DebtScheduler;
use crate::error::Result;
use crate::market::MarketData;
use super::state::ProjectionState;
use super::statements::{ProjectionResult, ProjectionRow};

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Straight-line useful life applied to gross fixed assets
    pub useful_life_years: f64,

    /// Cost-of-sales proxy as a share of revenue, used for inventory and payables
    pub cost_of_sales_share: f64,

    /// Minimum cash as a share of revenue
    pub cash_floor_share: f64,

    /// Share of outstanding debt classified as non-current
    pub long_term_debt_share: f64,

    pub days_in_year: f64,

    /// GDP growth (percent) at which the macro factor is neutral
    pub gdp_reference_pct: f64,

    /// Revenue growth sensitivity to GDP deviations from the reference
    pub gdp_sensitivity: f64,

    /// Average assumed growth with the sector benchmark before the macro factor
    pub blend_sector_growth: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            useful_life_years: 10.0,
            cost_of_sales_share: 0.6,
            cash_floor_share: 0.02,
            long_term_debt_share: 0.8,
            days_in_year: 365.0,
            gdp_reference_pct: 2.0,
            gdp_sensitivity: 0.3,
            blend_sector_growth: false,
        }
    }
}

/// Builds a `ProjectionResult` from an assumption set. Holds no state between runs.
pub struct ProjectionEngine<'a> {
    assumptions: &'a AssumptionSet,
    config: ProjectionConfig,
}

impl<'a> ProjectionEngine<'a> {
    pub fn new(assumptions: &'a AssumptionSet, config: ProjectionConfig) -> Self {
        Self { assumptions, config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Scaling of nominal growth by the GDP outlook
    pub fn macro_factor(&self, gdp_growth_pct: f64) -> f64 {
        1.0 + (gdp_growth_pct - self.config.gdp_reference_pct) / 100.0 * self.config.gdp_sensitivity
    }

    /// Revenue growth applied every year, in percent
    pub fn adjusted_growth_pct(&self, market: &MarketData) -> f64 {
        let assumed = self.assumptions.operating.revenue_growth_pct;
        let nominal = if self.config.blend_sector_growth {
            (assumed + market.benchmarks.growth_pct) / 2.0
        } else {
            assumed
        };
        nominal * self.macro_factor(market.macro_scenario.gdp_growth_pct)
    }

    /// CAPEX for `year`: the plan entry if one exists, else a share of revenue
    pub fn capex_for(&self, year: u32, revenue: f64) -> f64 {
        self.assumptions.capex_plan.planned(year).unwrap_or_else(|| {
            let pct = self
                .assumptions
                .operating
                .capex_pct_of_revenue
                .unwrap_or_else(|| self.assumptions.profile.sector.default_capex_pct());
            revenue * pct / 100.0
        })
    }

    /// Project every year of the horizon. Returns all rows or an error, never a partial table.
    pub fn project(&self, market: &MarketData) -> Result<ProjectionResult> {
        self.assumptions.validate()?;

        let growth_pct = self.adjusted_growth_pct(market);
        let inflation_pct = market.macro_scenario.inflation_pct;
        let mut state = ProjectionState::from_assumptions(self.assumptions);
        let mut result = ProjectionResult::new(
            self.assumptions.profile.name.clone(),
            self.assumptions.operating.base_revenue,
        );

        debug!(
            "Projecting {} with growth {:.4}% (macro factor {:.4})",
            self.assumptions.profile.name,
            growth_pct,
            self.macro_factor(market.macro_scenario.gdp_growth_pct)
        );

        for year in 1..=self.assumptions.horizon_years {
            let row = self.project_year(&state, growth_pct, inflation_pct)?;
            row.check_finite()?;
            row.check_balanced()?;
            state.advance(&row);
            result.add_row(row);
        }

        info!(
            "Projected {} years for {}",
            result.years(),
            self.assumptions.profile.name
        );
        Ok(result)
    }

    /// Build one year from the previous closing state
    fn project_year(&self, state: &ProjectionState, growth_pct: f64, inflation_pct: f64) -> Result<ProjectionRow> {
        let op = &self.assumptions.operating;
        let bs = &self.assumptions.balance_sheet;
        let cfg = &self.config;
        let year = state.year + 1;
        let mut row = ProjectionRow::new(year);

        // Income statement
        let price_level = (1.0 + inflation_pct / 100.0).powi(year as i32 - 1);
        row.revenue_growth_pct = growth_pct;
        row.revenue = state.revenue * (1.0 + growth_pct / 100.0);
        row.variable_costs = row.revenue * op.variable_cost_pct / 100.0;
        row.personnel_costs = op.personnel_costs * price_level;
        row.general_costs = op.general_costs * price_level;
        row.marketing_costs = op.marketing_costs * price_level;
        row.other_fixed_costs = op.other_fixed_costs * price_level;
        row.ebitda = row.revenue - row.variable_costs - row.total_fixed_costs();

        // Fully depreciated assets stop depreciating
        row.depreciation = (state.gross_fixed_assets / cfg.useful_life_years).min(state.net_book_value());
        row.ebit = row.ebitda - row.depreciation;

        let debt = DebtScheduler::portfolio_year(&self.assumptions.debt, year);
        row.interest_expense = debt.interest;
        row.factoring_cost = debt.factoring_cost;
        row.financial_expense = debt.interest + debt.factoring_cost;
        row.pre_tax_income = row.ebit - row.financial_expense;
        row.taxes = (row.pre_tax_income * op.tax_rate_pct / 100.0).max(0.0);
        row.net_income = row.pre_tax_income - row.taxes;

        // Fixed assets
        row.capex = self.capex_for(year, row.revenue);
        row.gross_fixed_assets = state.gross_fixed_assets + row.capex;
        row.accumulated_depreciation = state.accumulated_depreciation + row.depreciation;
        row.net_fixed_assets = row.gross_fixed_assets - row.accumulated_depreciation;
        row.intangible_assets = bs.intangible_assets;
        row.long_term_investments = bs.long_term_investments;

        // Working capital
        let cost_base = row.revenue * cfg.cost_of_sales_share;
        row.receivables = row.revenue * op.collection_days / cfg.days_in_year;
        row.inventory = cost_base * op.inventory_days / cfg.days_in_year;
        row.payables = cost_base * op.payment_days / cfg.days_in_year;
        row.other_current_assets = bs.other_current_assets;

        // Equity
        row.dividends_declared = if row.net_income > 0.0 {
            row.net_income * op.dividend_payout_pct / 100.0
        } else {
            0.0
        };
        row.dividends_paid = state.dividends_declared;
        row.share_capital = bs.share_capital;
        row.reserves = state.reserves + row.net_income - row.dividends_declared;
        row.retained_earnings = bs.retained_earnings;
        row.total_equity = row.share_capital + row.reserves + row.retained_earnings;

        // Liabilities
        row.total_debt = debt.closing_balance;
        row.long_term_debt = row.total_debt * cfg.long_term_debt_share;
        row.short_term_debt = row.total_debt - row.long_term_debt;
        row.other_liabilities = bs.other_liabilities;
        row.labour_liability = bs.labour_liability;

        // Cash plug
        let liabilities_before_funding =
            row.total_debt + row.payables + row.other_liabilities + row.labour_liability;
        let non_cash_assets = row.net_fixed_assets
            + row.intangible_assets
            + row.long_term_investments
            + row.inventory
            + row.receivables
            + row.other_current_assets;
        let residual = liabilities_before_funding + row.total_equity - non_cash_assets;
        let cash_floor = row.revenue * cfg.cash_floor_share;
        if residual >= cash_floor {
            row.cash = residual;
            row.short_term_funding = 0.0;
        } else {
            row.cash = cash_floor;
            row.short_term_funding = cash_floor - residual;
            debug!(
                "Year {}: cash floor binds, short-term funding {:.2}",
                year, row.short_term_funding
            );
        }
        row.total_assets = non_cash_assets + row.cash;
        row.total_liabilities = liabilities_before_funding + row.short_term_funding;
        row.total_liabilities_and_equity = row.total_liabilities + row.total_equity;

        // Cash-flow statement
        row.working_capital_change = (row.receivables - state.receivables) + (row.inventory - state.inventory)
            - (row.payables - state.payables);
        row.operating_cash_flow = row.ebitda - row.taxes - row.working_capital_change;
        row.investing_cash_flow = -row.capex;
        row.principal_repayment = debt.principal;
        row.financing_cash_flow = -row.financial_expense - row.principal_repayment - row.dividends_paid;
        row.free_cash_flow = row.operating_cash_flow + row.investing_cash_flow;

        debug!(
            "Year {}: revenue {:.2}, EBITDA {:.2}, net income {:.2}, cash {:.2}",
            year, row.revenue, row.ebitda, row.net_income, row.cash
        );
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{CapexEntry, CapexPlan, InitialBalanceSheet, MacroScenario, Sector};
    use crate::debt::{AmortizationMethod, DebtInstrument};
    use crate::error::EngineError;
    use approx::assert_relative_eq;

    fn market_for(set: &AssumptionSet) -> MarketData {
        MarketData::defaults(set.profile.sector, set.macro_scenario)
    }

    fn run(set: &AssumptionSet) -> ProjectionResult {
        ProjectionEngine::new(set, ProjectionConfig::default())
            .project(&market_for(set))
            .unwrap()
    }

    /// Debt-free company with no CAPEX
    fn unlevered() -> AssumptionSet {
        let mut set = AssumptionSet::sample();
        set.debt.clear();
        set.operating.capex_pct_of_revenue = Some(0.0);
        set.operating.base_revenue = 10_000_000.0;
        set.macro_scenario = Some(MacroScenario {
            gdp_growth_pct: 1.9,
            ..MacroScenario::default()
        });
        set
    }

    #[test]
    fn test_macro_adjusted_revenue() {
        let set = unlevered();
        let engine = ProjectionEngine::new(&set, ProjectionConfig::default());
        assert_relative_eq!(engine.macro_factor(1.9), 0.9997, epsilon = 1e-12);
        assert_relative_eq!(engine.adjusted_growth_pct(&market_for(&set)), 4.9985, epsilon = 1e-9);

        let result = run(&set);
        assert_relative_eq!(result.row(1).unwrap().revenue, 10_499_850.0, epsilon = 1e-4);
        assert_relative_eq!(
            result.row(2).unwrap().revenue,
            10_499_850.0 * 1.049985,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_sector_growth_blending() {
        let mut set = unlevered();
        set.macro_scenario = Some(MacroScenario {
            gdp_growth_pct: 2.0,
            ..MacroScenario::default()
        });
        let config = ProjectionConfig {
            blend_sector_growth: true,
            ..ProjectionConfig::default()
        };
        let engine = ProjectionEngine::new(&set, config);
        // Industrial benchmark growth is 4%
        assert_relative_eq!(engine.adjusted_growth_pct(&market_for(&set)), 4.5, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_debt_zero_capex() {
        let set = unlevered();
        let result = run(&set);
        let gross = set.balance_sheet.gross_fixed_assets;

        for row in &result.rows {
            assert_eq!(row.financial_expense, 0.0);
            assert_eq!(row.capex, 0.0);
            assert_eq!(row.total_debt, 0.0);
            assert_relative_eq!(row.pre_tax_income, row.ebit, epsilon = 1e-9);
            assert_relative_eq!(
                row.taxes,
                (row.ebit * set.operating.tax_rate_pct / 100.0).max(0.0),
                epsilon = 1e-9
            );
            assert_relative_eq!(row.gross_fixed_assets, gross, epsilon = 1e-9);
        }
        // 4.5M gross, 3.0M net: 450k a year for the first five years
        assert_relative_eq!(result.row(1).unwrap().depreciation, gross / 10.0, epsilon = 1e-9);
        assert_relative_eq!(result.row(5).unwrap().net_fixed_assets, 3_000_000.0 - 5.0 * 450_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_depreciation_stops_at_zero_book_value() {
        let mut set = unlevered();
        set.horizon_years = 12;
        let result = run(&set);
        // 3.0M of book value lasts six and two thirds years at 450k
        assert_relative_eq!(result.row(7).unwrap().depreciation, 300_000.0, epsilon = 1e-6);
        assert_eq!(result.row(8).unwrap().depreciation, 0.0);
        assert!(result.rows.iter().all(|r| r.net_fixed_assets >= -1e-9));
    }

    #[test]
    fn test_balance_identity_every_year() {
        let mut set = AssumptionSet::sample();
        set.horizon_years = 30;
        let result = run(&set);
        assert_eq!(result.years(), 30);
        for row in &result.rows {
            assert_relative_eq!(row.total_assets, row.total_liabilities_and_equity, max_relative = 1e-9);
            assert!(row.cash >= row.revenue * 0.02 - 1e-6);
        }
    }

    #[test]
    fn test_cash_floor_records_short_term_funding() {
        let mut set = AssumptionSet::sample();
        set.balance_sheet.reserves = -6_000_000.0;
        let result = run(&set);
        let row = result.row(1).unwrap();

        assert_relative_eq!(row.cash, row.revenue * 0.02, epsilon = 1e-6);
        assert!(row.short_term_funding > 0.0);
        assert_relative_eq!(row.total_assets, row.total_liabilities_and_equity, max_relative = 1e-9);
    }

    #[test]
    fn test_reserves_recursion_and_dividend_lag() {
        let set = AssumptionSet::sample();
        let result = run(&set);

        let mut prior_reserves = set.balance_sheet.reserves;
        let mut prior_declared = 0.0;
        for row in &result.rows {
            if row.net_income <= 0.0 {
                assert_eq!(row.dividends_declared, 0.0);
            } else {
                assert_relative_eq!(row.dividends_declared, row.net_income * 0.30, epsilon = 1e-6);
            }
            assert_relative_eq!(
                row.reserves,
                prior_reserves + row.net_income - row.dividends_declared,
                epsilon = 1e-6
            );
            assert_eq!(row.dividends_paid, prior_declared);
            prior_reserves = row.reserves;
            prior_declared = row.dividends_declared;
        }
        assert_eq!(result.row(1).unwrap().dividends_paid, 0.0);
    }

    #[test]
    fn test_losses_pay_no_dividend_and_no_tax() {
        let mut set = unlevered();
        set.operating.personnel_costs = 9_000_000.0;
        let result = run(&set);
        let row = result.row(1).unwrap();
        assert!(row.net_income < 0.0);
        assert_eq!(row.taxes, 0.0);
        assert_eq!(row.dividends_declared, 0.0);
    }

    #[test]
    fn test_break_even_after_loss_making_first_year() {
        let mut set = unlevered();
        set.macro_scenario = Some(MacroScenario {
            gdp_growth_pct: 2.0,
            inflation_pct: 0.0,
            ..MacroScenario::default()
        });
        set.operating.revenue_growth_pct = 20.0;
        set.operating.personnel_costs = 4_200_000.0;
        let result = run(&set);

        // Year 1: 12M revenue leaves 5.4M against 5.5M of fixed costs and 450k depreciation
        assert!(result.row(1).unwrap().net_income < 0.0);
        assert!(result.row(2).unwrap().net_income > 0.0);
        assert_eq!(result.summary().break_even_year, Some(2));
    }

    #[test]
    fn test_labour_liability_carried_as_liability() {
        let mut set = AssumptionSet::sample();
        let base = run(&set);
        set.balance_sheet.labour_liability = 300_000.0;
        let result = run(&set);

        for (before, row) in base.rows.iter().zip(&result.rows) {
            assert_eq!(row.labour_liability, 300_000.0);
            assert_relative_eq!(row.net_income, before.net_income, epsilon = 1e-6);
            assert_relative_eq!(row.total_assets, row.total_liabilities_and_equity, max_relative = 1e-9);
            assert_relative_eq!(
                row.cash - row.short_term_funding,
                before.cash - before.short_term_funding + 300_000.0,
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn test_working_capital_measured_from_opening_balance() {
        let set = AssumptionSet::sample();
        let result = run(&set);
        let row = result.row(1).unwrap();
        let bs = &set.balance_sheet;

        let expected = (row.receivables - bs.receivables) + (row.inventory - bs.inventory) - (row.payables - bs.payables);
        assert_relative_eq!(row.working_capital_change, expected, epsilon = 1e-6);
        assert_relative_eq!(row.receivables, row.revenue * 60.0 / 365.0, epsilon = 1e-6);
        assert_relative_eq!(row.inventory, row.revenue * 0.6 * 40.0 / 365.0, epsilon = 1e-6);
        assert_relative_eq!(
            row.operating_cash_flow,
            row.ebitda - row.taxes - row.working_capital_change,
            epsilon = 1e-6
        );
        assert_relative_eq!(row.free_cash_flow, row.operating_cash_flow - row.capex, epsilon = 1e-6);
    }

    #[test]
    fn test_capex_plan_then_sector_fallback() {
        let mut set = AssumptionSet::sample();
        set.capex_plan = CapexPlan::new(vec![
            CapexEntry { year: 1, amount: 500_000.0 },
            CapexEntry { year: 2, amount: 0.0 },
        ]);
        let result = run(&set);

        assert_eq!(result.row(1).unwrap().capex, 500_000.0);
        assert_eq!(result.row(2).unwrap().capex, 0.0);
        let row3 = result.row(3).unwrap();
        assert_relative_eq!(row3.capex, row3.revenue * Sector::Industrial.default_capex_pct() / 100.0, epsilon = 1e-6);

        // Year 2 depreciates the year-1 addition
        let gross = set.balance_sheet.gross_fixed_assets;
        assert_relative_eq!(result.row(2).unwrap().depreciation, (gross + 500_000.0) / 10.0, epsilon = 1e-6);
        assert_relative_eq!(result.row(2).unwrap().gross_fixed_assets, gross + 500_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_fixed_costs_inflate() {
        let set = unlevered();
        let result = run(&set);
        let inflation = set.macro_scenario.unwrap().inflation_pct;
        assert_relative_eq!(result.row(1).unwrap().personnel_costs, set.operating.personnel_costs, epsilon = 1e-9);
        assert_relative_eq!(
            result.row(3).unwrap().personnel_costs,
            set.operating.personnel_costs * (1.0 + inflation / 100.0).powi(2),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_debt_split_and_financing() {
        let mut set = unlevered();
        set.debt = vec![DebtInstrument::term_loan(100_000.0, 5.0, 5, AmortizationMethod::French)];
        let result = run(&set);
        let row = result.row(1).unwrap();

        assert_relative_eq!(row.interest_expense, 5_000.0, epsilon = 1e-9);
        assert_relative_eq!(row.total_debt, 81_902.52, epsilon = 0.01);
        assert_relative_eq!(row.long_term_debt, row.total_debt * 0.8, epsilon = 1e-9);
        assert_relative_eq!(row.short_term_debt, row.total_debt * 0.2, epsilon = 1e-9);
        assert_relative_eq!(
            row.financing_cash_flow,
            -(5_000.0 + row.principal_repayment),
            epsilon = 1e-9
        );
        assert_eq!(result.row(5).unwrap().total_debt, 0.0);
    }

    #[test]
    fn test_factoring_cost_is_financial_expense() {
        let mut set = unlevered();
        set.debt = vec![DebtInstrument::Factoring {
            limit: 100_000.0,
            cost_rate_pct: 2.0,
            utilization: 0.8,
        }];
        let row = run(&set).rows[0].clone();
        assert_eq!(row.interest_expense, 0.0);
        assert_relative_eq!(row.factoring_cost, 1_600.0, epsilon = 1e-9);
        assert_relative_eq!(row.financial_expense, 1_600.0, epsilon = 1e-9);
        assert_eq!(row.total_debt, 0.0);
    }

    #[test]
    fn test_invalid_input_rejected_before_projection() {
        let mut set = AssumptionSet::sample();
        set.operating.base_revenue = -1.0;
        let err = ProjectionEngine::new(&set, ProjectionConfig::default())
            .project(&market_for(&set))
            .unwrap_err();
        assert!(matches!(err, EngineError::InputValidation { .. }));
    }

    #[test]
    fn test_overflow_is_rejected() {
        let mut set = unlevered();
        set.operating.base_revenue = 1e300;
        set.operating.revenue_growth_pct = 10_000.0;
        set.balance_sheet = InitialBalanceSheet::default();
        let err = ProjectionEngine::new(&set, ProjectionConfig::default())
            .project(&market_for(&set))
            .unwrap_err();
        assert!(matches!(err, EngineError::ComputationOverflow { .. }));
    }
}
