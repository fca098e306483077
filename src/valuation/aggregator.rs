//! Blends the method estimates into the final equity value
//!
//! Weights depend only on the leverage risk class. The blended value is
//! reduced by an illiquidity discount and then floored at a realization
//! value of the final projected book equity.

use log::{info, warn};

use super::config::ValuationConfig;
use super::types::{
    value_range, DcfValuation, LeverageRisk, MethodEstimate, MultiplesValuation, TransactionValuation,
    ValuationMethod, ValuationResult,
};
use super::multiples::net_debt_to_ebitda;
use crate::assumptions::AssumptionSet;
use crate::error::{ensure_finite, Result};
use crate::projection::ProjectionResult;

/// Realization factor on book equity for a going concern
pub const GOING_CONCERN_REALIZATION: f64 = 0.8;
/// Realization factor when the blended value is negative
pub const DISTRESSED_REALIZATION: f64 = 0.6;

pub fn classify_leverage(dcf_equity_value: f64, net_debt_to_ebitda: f64) -> LeverageRisk {
    if dcf_equity_value < 0.0 || net_debt_to_ebitda > 4.0 {
        LeverageRisk::Critical
    } else if net_debt_to_ebitda > 3.0 {
        LeverageRisk::HighLeverage
    } else {
        LeverageRisk::Normal
    }
}

/// Weight of each method for a risk class; always sums to 1
pub fn method_weights(risk: LeverageRisk) -> [(ValuationMethod, f64); 5] {
    let (dcf, multiples, transactions) = match risk {
        LeverageRisk::Normal => (0.40, 0.20, 0.10),
        LeverageRisk::HighLeverage => (0.50, 0.175, 0.075),
        LeverageRisk::Critical => (0.60, 0.15, 0.05),
    };
    [
        (ValuationMethod::Dcf, dcf),
        (ValuationMethod::MultiplesEvEbitda, multiples),
        (ValuationMethod::MultiplesEvRevenue, multiples),
        (ValuationMethod::TransactionsEvEbitda, transactions),
        (ValuationMethod::TransactionsEvRevenue, transactions),
    ]
}

/// Discount (decimal) by revenue size, one tier higher for family-owned companies
pub fn illiquidity_discount(revenue: f64, family_owned: bool) -> f64 {
    const TIERS: [f64; 3] = [0.10, 0.20, 0.30];
    let tier: usize = if revenue < 5_000_000.0 {
        2
    } else if revenue < 25_000_000.0 {
        1
    } else {
        0
    };
    let tier = if family_owned { (tier + 1).min(2) } else { tier };
    TIERS[tier]
}

/// Floor applied to the discounted value: `(final value, floor, applied)`.
/// No floor exists when book equity is not positive.
pub fn apply_floor(discounted_value: f64, blended_value: f64, book_equity: f64) -> (f64, Option<f64>, bool) {
    if book_equity <= 0.0 {
        return (discounted_value, None, false);
    }
    let factor = if blended_value < 0.0 {
        DISTRESSED_REALIZATION
    } else {
        GOING_CONCERN_REALIZATION
    };
    let floor = book_equity * factor;
    if discounted_value < floor {
        (floor, Some(floor), true)
    } else {
        (discounted_value, Some(floor), false)
    }
}

pub struct ValuationAggregator<'a> {
    config: &'a ValuationConfig,
}

impl<'a> ValuationAggregator<'a> {
    pub fn new(config: &'a ValuationConfig) -> Self {
        Self { config }
    }

    fn estimates(
        &self,
        risk: LeverageRisk,
        dcf: &DcfValuation,
        multiples: &MultiplesValuation,
        transactions: &TransactionValuation,
    ) -> Vec<MethodEstimate> {
        method_weights(risk)
            .into_iter()
            .map(|(method, weight)| {
                let (equity_value, low, high) = match method {
                    ValuationMethod::Dcf => {
                        let (low, high) = value_range(dcf.equity_value, self.config.dcf_range);
                        (dcf.equity_value, low, high)
                    }
                    ValuationMethod::MultiplesEvEbitda => {
                        let v = &multiples.ev_ebitda;
                        (v.equity_value, v.low, v.high)
                    }
                    ValuationMethod::MultiplesEvRevenue => {
                        let v = &multiples.ev_revenue;
                        (v.equity_value, v.low, v.high)
                    }
                    ValuationMethod::TransactionsEvEbitda => {
                        let v = &transactions.ev_ebitda;
                        (v.equity_value, v.low, v.high)
                    }
                    ValuationMethod::TransactionsEvRevenue => {
                        let v = &transactions.ev_revenue;
                        (v.equity_value, v.low, v.high)
                    }
                };
                MethodEstimate {
                    method,
                    equity_value,
                    low,
                    high,
                    weight,
                }
            })
            .collect()
    }

    pub fn aggregate(
        &self,
        assumptions: &AssumptionSet,
        projection: &ProjectionResult,
        dcf: DcfValuation,
        multiples: MultiplesValuation,
        transactions: TransactionValuation,
    ) -> Result<ValuationResult> {
        let profile = &assumptions.profile;
        let operating = &assumptions.operating;
        let net_debt = dcf.net_debt;
        let base_ebitda = operating.base_ebitda();

        let leverage_risk = classify_leverage(dcf.equity_value, net_debt_to_ebitda(net_debt, base_ebitda));
        let methods = self.estimates(leverage_risk, &dcf, &multiples, &transactions);
        let blended_value = ensure_finite(
            "blended_value",
            0,
            methods.iter().map(|m| m.equity_value * m.weight).sum(),
        )?;

        let illiquidity_discount = illiquidity_discount(operating.base_revenue, profile.family_owned);
        let discounted_value = blended_value * (1.0 - illiquidity_discount);

        let book_equity = projection.last()?.total_equity;
        let (equity_value, floor_value, floor_applied) = apply_floor(discounted_value, blended_value, book_equity);
        if floor_applied {
            warn!(
                "{}: discounted value {:.0} below book-equity floor, valuing at {:.0}",
                profile.name, discounted_value, equity_value
            );
        }

        let (low, high) = value_range(equity_value, self.config.presentation_range);
        let enterprise_value = equity_value + net_debt;

        info!(
            "{}: equity value {:.0} ({} leverage, {:.0}% illiquidity discount)",
            profile.name,
            equity_value,
            leverage_risk,
            illiquidity_discount * 100.0
        );

        let mut result = ValuationResult {
            enterprise_value,
            equity_value,
            low,
            high,
            blended_value,
            illiquidity_discount,
            floor_value,
            floor_applied,
            leverage_risk,
            net_debt,
            methods,
            dcf,
            multiples,
            transactions,
            conclusions: Vec::new(),
        };
        result.conclusions = self.conclusions(assumptions, &result);
        Ok(result)
    }

    fn conclusions(&self, assumptions: &AssumptionSet, result: &ValuationResult) -> Vec<String> {
        let millions = |value: f64| value / 1_000_000.0;
        let mut conclusions = vec![format!(
            "Equity value of €{:.1}M, within a range of €{:.1}M to €{:.1}M",
            millions(result.equity_value),
            millions(result.low),
            millions(result.high)
        )];

        let base_ebitda = assumptions.operating.base_ebitda();
        if base_ebitda > 0.0 {
            conclusions.push(format!(
                "Implied EV/EBITDA multiple of {:.1}x on current EBITDA",
                result.enterprise_value / base_ebitda
            ));
        }

        let share = result.dcf.terminal_value_share;
        if share > self.config.terminal_value_warning_share {
            conclusions.push(format!(
                "Warning: {:.0}% of the DCF value comes from the terminal value, so long-term assumptions dominate",
                share * 100.0
            ));
        }

        conclusions.push(format!(
            "WACC of {:.1}% reflects the risk profile of a {} SME",
            result.dcf.wacc * 100.0,
            assumptions.profile.sector
        ));

        if let (true, Some(floor)) = (result.floor_applied, result.floor_value) {
            conclusions.push(format!(
                "Value floored at €{:.1}M, the realization value of projected book equity",
                millions(floor)
            ));
        }

        if result.leverage_risk != LeverageRisk::Normal {
            conclusions.push(format!(
                "Leverage risk is {}: method weights shifted towards the DCF",
                result.leverage_risk
            ));
        }

        conclusions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MarketData;
    use crate::projection::{ProjectionConfig, ProjectionEngine};
    use crate::valuation::{DcfValuator, MultiplesValuator, TransactionValuator, WaccCalculator};
    use approx::assert_relative_eq;

    #[test]
    fn test_leverage_classes() {
        assert_eq!(classify_leverage(1_000.0, 1.5), LeverageRisk::Normal);
        assert_eq!(classify_leverage(1_000.0, 3.0), LeverageRisk::Normal);
        assert_eq!(classify_leverage(1_000.0, 3.5), LeverageRisk::HighLeverage);
        assert_eq!(classify_leverage(1_000.0, 4.5), LeverageRisk::Critical);
        assert_eq!(classify_leverage(-1.0, 0.5), LeverageRisk::Critical);
    }

    #[test]
    fn test_weight_tables_sum_to_one() {
        for risk in [LeverageRisk::Normal, LeverageRisk::HighLeverage, LeverageRisk::Critical] {
            let total: f64 = method_weights(risk).iter().map(|(_, w)| w).sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        }
        let critical = method_weights(LeverageRisk::Critical);
        assert_eq!(critical[0], (ValuationMethod::Dcf, 0.60));
        assert_eq!(critical[4], (ValuationMethod::TransactionsEvRevenue, 0.05));
    }

    #[test]
    fn test_illiquidity_tiers() {
        assert_eq!(illiquidity_discount(3_000_000.0, false), 0.30);
        assert_eq!(illiquidity_discount(12_000_000.0, false), 0.20);
        assert_eq!(illiquidity_discount(40_000_000.0, false), 0.10);
        assert_eq!(illiquidity_discount(40_000_000.0, true), 0.20);
        assert_eq!(illiquidity_discount(12_000_000.0, true), 0.30);
        assert_eq!(illiquidity_discount(3_000_000.0, true), 0.30);
    }

    #[test]
    fn test_distressed_floor() {
        // Negative blended value with 2M of book equity
        let blended = -500_000.0;
        let (value, floor, applied) = apply_floor(blended * 0.7, blended, 2_000_000.0);
        assert_relative_eq!(value, 1_200_000.0, epsilon = 1e-6);
        assert_eq!(floor, Some(1_200_000.0));
        assert!(applied);
    }

    #[test]
    fn test_floor_only_binds_below_book_equity() {
        let (value, floor, applied) = apply_floor(3_000_000.0, 3_750_000.0, 2_000_000.0);
        assert_eq!(value, 3_000_000.0);
        assert_eq!(floor, Some(1_600_000.0));
        assert!(!applied);

        let (value, floor, applied) = apply_floor(1_000_000.0, 1_250_000.0, 2_000_000.0);
        assert_eq!(value, 1_600_000.0);
        assert!(floor.is_some() && applied);

        // Negative book equity: no floor at all
        assert_eq!(apply_floor(-10.0, -20.0, -5.0), (-10.0, None, false));
    }

    #[test]
    fn test_aggregate_sample_company() {
        let set = AssumptionSet::sample();
        let market = MarketData::defaults(set.profile.sector, None);
        let projection = ProjectionEngine::new(&set, ProjectionConfig::default())
            .project(&market)
            .unwrap();
        let config = ValuationConfig {
            valuation_year: Some(2024),
            ..ValuationConfig::default()
        };
        let wacc = WaccCalculator::new(&config).calculate(&set, &projection, &market).unwrap();
        let dcf = DcfValuator::new(&config)
            .value(&set, &projection, &wacc, &market.macro_scenario)
            .unwrap();
        let multiples = MultiplesValuator::new(&config).value(&set, &market).unwrap();
        let transactions = TransactionValuator::new(&config).value(&set).unwrap();
        let dcf_equity = dcf.equity_value;

        let result = ValuationAggregator::new(&config)
            .aggregate(&set, &projection, dcf, multiples, transactions)
            .unwrap();

        assert_eq!(result.methods.len(), 5);
        let expected_risk = classify_leverage(dcf_equity, net_debt_to_ebitda(result.net_debt, 1_500_000.0));
        assert_eq!(result.leverage_risk, expected_risk);
        let blended: f64 = result.methods.iter().map(|m| m.equity_value * m.weight).sum();
        assert_relative_eq!(result.blended_value, blended, epsilon = 1e-6);
        // 12M revenue, family-owned
        assert_eq!(result.illiquidity_discount, 0.30);
        if !result.floor_applied {
            assert_relative_eq!(result.equity_value, blended * 0.70, epsilon = 1e-6);
        }
        assert_relative_eq!(result.enterprise_value, result.equity_value + result.net_debt, epsilon = 1e-6);
        assert_relative_eq!(
            result.method(ValuationMethod::Dcf).unwrap().high,
            dcf_equity + dcf_equity.abs() * 0.10,
            epsilon = 1e-6
        );
        assert!(result.low <= result.equity_value && result.equity_value <= result.high);
        assert!(result.conclusions[0].starts_with("Equity value of €"));
        assert!(result.conclusions.iter().any(|c| c.starts_with("WACC of")));
    }
}
