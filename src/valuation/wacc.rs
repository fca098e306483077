//! Weighted average cost of capital build-up

use log::debug;

use super::config::{CreditSpreadSource, EquityValueBasis, ValuationConfig};
use super::types::WaccBreakdown;
use crate::assumptions::{AssumptionSet, CompanyProfile, CreditRating};
use crate::debt::DebtScheduler;
use crate::error::{ensure_finite, EngineError, Result};
use crate::market::MarketData;
use crate::projection::ProjectionResult;
use crate::ratios::RatioAnalyzer;

/// Small-company premium (decimal) by annual revenue
pub fn size_premium(revenue: f64) -> f64 {
    match revenue {
        r if r < 500_000.0 => 0.060,
        r if r < 2_000_000.0 => 0.045,
        r if r < 10_000_000.0 => 0.030,
        r if r < 50_000_000.0 => 0.015,
        r if r < 200_000_000.0 => 0.005,
        _ => 0.0,
    }
}

/// Spread (decimal) implied by EBITDA interest coverage
pub fn coverage_spread(interest_coverage: f64) -> f64 {
    if interest_coverage > 6.0 {
        0.015
    } else if interest_coverage > 3.0 {
        0.030
    } else {
        0.050
    }
}

pub struct WaccCalculator<'a> {
    config: &'a ValuationConfig,
}

impl<'a> WaccCalculator<'a> {
    pub fn new(config: &'a ValuationConfig) -> Self {
        Self { config }
    }

    pub fn adjusted_beta(&self, raw_beta: f64) -> f64 {
        let w = self.config.beta_blume_weight;
        w * raw_beta + (1.0 - w) * 1.0
    }

    /// Company-specific risk premium (decimal), clamped to the configured ceiling
    pub fn specific_premium(&self, profile: &CompanyProfile, ebitda_margin_pct: f64, sector_margin_pct: f64) -> f64 {
        let mut premium: f64 = 0.0;

        if profile.largest_client_pct.map_or(false, |share| share > 30.0) {
            premium += 0.02;
        }

        let age = profile.age_at(self.config.valuation_year());
        if age < 3 {
            premium += 0.03;
        } else if age < 7 {
            premium += 0.015;
        }

        if profile.employees < 20 {
            premium += 0.01;
        }

        if sector_margin_pct > 0.0 {
            if ebitda_margin_pct > sector_margin_pct * 1.3 {
                premium -= 0.01;
            } else if ebitda_margin_pct < sector_margin_pct * 0.7 {
                premium += 0.02;
            }
        }

        premium.clamp(0.0, self.config.max_specific_premium)
    }

    /// Spread (decimal) over the risk-free rate for the company's debt
    pub fn credit_spread(&self, rating: Option<CreditRating>, interest_coverage: f64) -> f64 {
        match (self.config.credit_spread_source, rating) {
            (CreditSpreadSource::InterestCoverage, _) | (_, None) => coverage_spread(interest_coverage),
            (CreditSpreadSource::Auto | CreditSpreadSource::Rating, Some(rating)) => rating.spread_bps() / 10_000.0,
        }
    }

    pub fn calculate(
        &self,
        assumptions: &AssumptionSet,
        projection: &ProjectionResult,
        market: &MarketData,
    ) -> Result<WaccBreakdown> {
        let profile = &assumptions.profile;
        let operating = &assumptions.operating;
        let tax_rate = operating.tax_rate_pct / 100.0;

        let risk_free_rate = self.config.risk_free_rate(market.macro_scenario.reference_rate_pct);
        let raw_beta = profile.sector.beta();
        let adjusted_beta = self.adjusted_beta(raw_beta);
        let size_premium = size_premium(operating.base_revenue);
        let specific_premium = self.specific_premium(
            profile,
            operating.base_ebitda_margin_pct(),
            market.benchmarks.ebitda_margin_pct,
        );
        let cost_of_equity =
            risk_free_rate + adjusted_beta * self.config.market_risk_premium + size_premium + specific_premium;

        let coverage = RatioAnalyzer::analyze_row(projection.first()?).interest_coverage;
        let credit_spread = self.credit_spread(profile.credit_rating, coverage);
        let pre_tax_cost_of_debt = risk_free_rate + credit_spread;
        let cost_of_debt = pre_tax_cost_of_debt * (1.0 - tax_rate);

        let debt_value = DebtScheduler::current_debt(&assumptions.debt) + assumptions.balance_sheet.labour_liability;
        let equity_value = match self.config.equity_value_basis {
            EquityValueBasis::RevenueMultiple(multiple) => operating.base_revenue * multiple,
            EquityValueBasis::BookEquity => assumptions.balance_sheet.book_equity(),
        }
        .max(0.0);

        let capital = debt_value + equity_value;
        let (equity_weight, debt_weight) = if capital > 0.0 {
            (equity_value / capital, debt_value / capital)
        } else {
            (1.0, 0.0)
        };

        let wacc = ensure_finite("wacc", 0, equity_weight * cost_of_equity + debt_weight * cost_of_debt)?;
        if wacc <= 0.0 {
            return Err(EngineError::domain("wacc", format!("must be positive, got {:.4}%", wacc * 100.0)));
        }

        debug!(
            "WACC {:.2}%: ke {:.2}% (beta {:.3}, size {:.2}%, specific {:.2}%), kd {:.2}%, E/V {:.1}%",
            wacc * 100.0,
            cost_of_equity * 100.0,
            adjusted_beta,
            size_premium * 100.0,
            specific_premium * 100.0,
            cost_of_debt * 100.0,
            equity_weight * 100.0
        );

        Ok(WaccBreakdown {
            risk_free_rate,
            raw_beta,
            adjusted_beta,
            market_risk_premium: self.config.market_risk_premium,
            size_premium,
            specific_premium,
            cost_of_equity,
            credit_spread,
            pre_tax_cost_of_debt,
            cost_of_debt,
            debt_value,
            equity_value,
            equity_weight,
            debt_weight,
            wacc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::Sector;
    use crate::projection::{ProjectionConfig, ProjectionEngine};
    use approx::assert_relative_eq;

    fn config() -> ValuationConfig {
        ValuationConfig {
            valuation_year: Some(2024),
            ..ValuationConfig::default()
        }
    }

    fn profile() -> CompanyProfile {
        CompanyProfile {
            name: "Test".to_string(),
            sector: Sector::Services,
            founding_year: 2010,
            employees: 50,
            family_owned: false,
            audited: true,
            largest_client_pct: None,
            credit_rating: None,
        }
    }

    #[test]
    fn test_blume_adjustment() {
        let config = config();
        let calc = WaccCalculator::new(&config);
        assert_relative_eq!(calc.adjusted_beta(1.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(calc.adjusted_beta(1.35), 0.67 * 1.35 + 0.33, epsilon = 1e-12);
    }

    #[test]
    fn test_size_premium_tiers() {
        assert_eq!(size_premium(300_000.0), 0.060);
        assert_eq!(size_premium(1_500_000.0), 0.045);
        assert_eq!(size_premium(12_000_000.0), 0.015);
        assert_eq!(size_premium(500_000_000.0), 0.0);
    }

    #[test]
    fn test_specific_premium_components() {
        let config = config();
        let calc = WaccCalculator::new(&config);

        // Established, mid-sized, in line with sector
        assert_eq!(calc.specific_premium(&profile(), 15.0, 15.0), 0.0);

        let mut young = profile();
        young.founding_year = 2023;
        young.employees = 8;
        young.largest_client_pct = Some(45.0);
        // 2% + 3% + 1% + 2% for the weak margin
        assert_relative_eq!(calc.specific_premium(&young, 5.0, 15.0), 0.08, epsilon = 1e-12);

        let mut strong = profile();
        strong.founding_year = 2019;
        // 1.5% - 1%
        assert_relative_eq!(calc.specific_premium(&strong, 25.0, 15.0), 0.005, epsilon = 1e-12);
    }

    #[test]
    fn test_specific_premium_is_clamped() {
        let config = ValuationConfig {
            max_specific_premium: 0.05,
            ..config()
        };
        let calc = WaccCalculator::new(&config);
        let mut risky = profile();
        risky.founding_year = 2023;
        risky.employees = 3;
        risky.largest_client_pct = Some(80.0);
        assert_eq!(calc.specific_premium(&risky, 1.0, 15.0), 0.05);

        let mut strong = profile();
        strong.employees = 200;
        assert_eq!(calc.specific_premium(&strong, 40.0, 15.0), 0.0);
    }

    #[test]
    fn test_credit_spread_sources() {
        let config = config();
        let calc = WaccCalculator::new(&config);
        assert_eq!(calc.credit_spread(None, 8.0), 0.015);
        assert_eq!(calc.credit_spread(None, 4.0), 0.030);
        assert_eq!(calc.credit_spread(None, 2.0), 0.050);
        assert_eq!(calc.credit_spread(Some(CreditRating::Bbb), 2.0), 0.015);

        let coverage_only = ValuationConfig {
            credit_spread_source: CreditSpreadSource::InterestCoverage,
            ..config
        };
        let calc = WaccCalculator::new(&coverage_only);
        assert_eq!(calc.credit_spread(Some(CreditRating::Aaa), 2.0), 0.050);
    }

    #[test]
    fn test_full_breakdown_is_consistent() {
        let set = AssumptionSet::sample();
        let market = MarketData::defaults(set.profile.sector, None);
        let projection = ProjectionEngine::new(&set, ProjectionConfig::default())
            .project(&market)
            .unwrap();
        let config = config();
        let w = WaccCalculator::new(&config).calculate(&set, &projection, &market).unwrap();

        assert_relative_eq!(w.risk_free_rate, 0.022, epsilon = 1e-12);
        assert_relative_eq!(w.equity_weight + w.debt_weight, 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            w.cost_of_equity,
            w.risk_free_rate + w.adjusted_beta * 0.055 + w.size_premium + w.specific_premium,
            epsilon = 1e-12
        );
        assert_relative_eq!(w.cost_of_debt, (w.risk_free_rate + w.credit_spread) * 0.75, epsilon = 1e-12);
        assert_relative_eq!(
            w.wacc,
            w.equity_weight * w.cost_of_equity + w.debt_weight * w.cost_of_debt,
            epsilon = 1e-12
        );
        assert_relative_eq!(w.equity_value, 12_000_000.0 * 0.8, epsilon = 1e-6);
        assert!(w.wacc > 0.05 && w.wacc < 0.20);
    }

    #[test]
    fn test_no_capital_means_all_equity() {
        let mut set = AssumptionSet::sample();
        set.debt.clear();
        set.balance_sheet.share_capital = 0.0;
        set.balance_sheet.reserves = 0.0;
        set.balance_sheet.retained_earnings = 0.0;
        let market = MarketData::defaults(set.profile.sector, None);
        let projection = ProjectionEngine::new(&set, ProjectionConfig::default())
            .project(&market)
            .unwrap();
        let config = ValuationConfig {
            equity_value_basis: EquityValueBasis::BookEquity,
            ..config()
        };
        let w = WaccCalculator::new(&config).calculate(&set, &projection, &market).unwrap();
        assert_eq!(w.equity_weight, 1.0);
        assert_eq!(w.debt_weight, 0.0);
        assert_relative_eq!(w.wacc, w.cost_of_equity, epsilon = 1e-12);
    }
}
