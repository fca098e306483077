//! Discounted cash flow valuation with a blended terminal value

use log::{debug, warn};

use super::config::ValuationConfig;
use super::discount::{gordon_value, DiscountCurve};
use super::types::{DcfValuation, SensitivityGrid, WaccBreakdown};
use crate::assumptions::{AssumptionSet, MacroScenario, Sector};
use crate::debt::DebtScheduler;
use crate::error::{ensure_finite, Result};
use crate::projection::ProjectionResult;

/// Perpetual growth (decimal): inflation plus a sector share of real growth,
/// bounded to [inflation, GDP + 1pp]
pub fn terminal_growth(macro_scenario: &MacroScenario, sector: Sector) -> f64 {
    let inflation = macro_scenario.inflation_pct / 100.0;
    let gdp = macro_scenario.gdp_growth_pct / 100.0;
    let g = inflation + (gdp - inflation) * sector.terminal_growth_factor();
    g.min(gdp + 0.01).max(inflation)
}

/// Debt and labour liability at the valuation date less opening cash
pub fn net_debt(assumptions: &AssumptionSet) -> f64 {
    let bs = &assumptions.balance_sheet;
    DebtScheduler::current_debt(&assumptions.debt) + bs.labour_liability - bs.cash
}

struct EnterpriseValue {
    pv_free_cash_flows: f64,
    gordon_terminal_value: f64,
    exit_multiple_terminal_value: f64,
    terminal_value: f64,
    pv_terminal_value: f64,
    enterprise_value: f64,
}

pub struct DcfValuator<'a> {
    config: &'a ValuationConfig,
}

impl<'a> DcfValuator<'a> {
    pub fn new(config: &'a ValuationConfig) -> Self {
        Self { config }
    }

    fn enterprise_value(
        &self,
        free_cash_flows: &[f64],
        final_ebitda: f64,
        exit_multiple: f64,
        wacc: f64,
        growth: f64,
    ) -> Result<EnterpriseValue> {
        let horizon = free_cash_flows.len() as u32;
        let final_fcf = free_cash_flows.last().copied().unwrap_or(0.0);
        let curve = DiscountCurve::single_rate(wacc);

        let pv_free_cash_flows = curve.pv_stream(free_cash_flows);
        let gordon_terminal_value = gordon_value(final_fcf * (1.0 + growth), wacc, growth)?;
        let exit_multiple_terminal_value = final_ebitda * exit_multiple;
        let terminal_value = self.config.gordon_weight * gordon_terminal_value
            + (1.0 - self.config.gordon_weight) * exit_multiple_terminal_value;
        let pv_terminal_value = terminal_value * curve.discount_factor(horizon);
        let enterprise_value = ensure_finite("enterprise_value", horizon, pv_free_cash_flows + pv_terminal_value)?;

        Ok(EnterpriseValue {
            pv_free_cash_flows,
            gordon_terminal_value,
            exit_multiple_terminal_value,
            terminal_value,
            pv_terminal_value,
            enterprise_value,
        })
    }

    /// 5×5 grid around the base case; cells with WACC <= g are unavailable
    pub fn sensitivity(
        &self,
        free_cash_flows: &[f64],
        final_ebitda: f64,
        exit_multiple: f64,
        wacc: f64,
        growth: f64,
    ) -> SensitivityGrid {
        let offsets = -SensitivityGrid::STEPS..=SensitivityGrid::STEPS;
        let wacc_values: Vec<f64> = offsets
            .clone()
            .map(|i| wacc + i as f64 * self.config.wacc_step)
            .collect();
        let growth_values: Vec<f64> = offsets
            .map(|j| growth + j as f64 * self.config.growth_step)
            .collect();

        let enterprise_values = wacc_values
            .iter()
            .map(|&w| {
                growth_values
                    .iter()
                    .map(|&g| {
                        if w <= g {
                            return None;
                        }
                        self.enterprise_value(free_cash_flows, final_ebitda, exit_multiple, w, g)
                            .ok()
                            .map(|ev| ev.enterprise_value)
                    })
                    .collect()
            })
            .collect();

        SensitivityGrid {
            wacc_values,
            growth_values,
            enterprise_values,
        }
    }

    pub fn value(
        &self,
        assumptions: &AssumptionSet,
        projection: &ProjectionResult,
        wacc: &WaccBreakdown,
        macro_scenario: &MacroScenario,
    ) -> Result<DcfValuation> {
        let sector = assumptions.profile.sector;
        let growth = terminal_growth(macro_scenario, sector);
        let exit_multiple = sector.exit_multiple();
        let free_cash_flows = projection.free_cash_flows();
        let final_ebitda = projection.last()?.ebitda;

        let base = self.enterprise_value(&free_cash_flows, final_ebitda, exit_multiple, wacc.wacc, growth)?;
        let net_debt = net_debt(assumptions);
        let equity_value = base.enterprise_value - net_debt;
        let terminal_value_share = if base.enterprise_value > 0.0 {
            base.pv_terminal_value / base.enterprise_value
        } else {
            1.0
        };
        if equity_value < 0.0 {
            warn!("DCF equity value for {} is negative ({:.2})", assumptions.profile.name, equity_value);
        }

        let sensitivity = self.sensitivity(&free_cash_flows, final_ebitda, exit_multiple, wacc.wacc, growth);
        debug!(
            "DCF: EV {:.2}, TV share {:.1}%, g {:.2}%, {} of {} sensitivity cells available",
            base.enterprise_value,
            terminal_value_share * 100.0,
            growth * 100.0,
            sensitivity.available_cells(),
            SensitivityGrid::SIZE * SensitivityGrid::SIZE
        );

        Ok(DcfValuation {
            wacc: wacc.wacc,
            terminal_growth: growth,
            pv_free_cash_flows: base.pv_free_cash_flows,
            gordon_terminal_value: base.gordon_terminal_value,
            exit_multiple,
            exit_multiple_terminal_value: base.exit_multiple_terminal_value,
            terminal_value: base.terminal_value,
            pv_terminal_value: base.pv_terminal_value,
            enterprise_value: base.enterprise_value,
            net_debt,
            equity_value,
            terminal_value_share,
            sensitivity,
        })
    }
}
