//! Comparable-company multiples adjusted for size, growth, leverage and margin

use log::debug;

use super::config::ValuationConfig;
use super::dcf::net_debt;
use super::types::{MultipleAdjustment, MultipleValue, MultiplesValuation};
use crate::assumptions::AssumptionSet;
use crate::error::{ensure_finite, Result};
use crate::market::MarketData;
use crate::ratios::CAPPED_RATIO;

pub fn size_factor(revenue: f64) -> f64 {
    match revenue {
        r if r < 10_000_000.0 => 0.75,
        r if r < 25_000_000.0 => 0.85,
        r if r < 50_000_000.0 => 0.95,
        r if r < 100_000_000.0 => 1.00,
        r if r < 250_000_000.0 => 1.05,
        _ => 1.10,
    }
}

pub fn growth_factor(revenue_growth_pct: f64) -> f64 {
    if revenue_growth_pct > 10.0 {
        1.2
    } else if revenue_growth_pct > 5.0 {
        1.1
    } else {
        1.0
    }
}

pub fn leverage_factor(net_debt_to_ebitda: f64) -> f64 {
    match net_debt_to_ebitda {
        x if x < 1.0 => 1.10,
        x if x < 2.0 => 1.00,
        x if x < 3.0 => 0.85,
        x if x < 4.0 => 0.70,
        x if x < 5.0 => 0.55,
        _ => 0.40,
    }
}

/// Blend of a continuous score and a percentile bucket on margin / sector margin
pub fn margin_factor(ebitda_margin_pct: f64, sector_margin_pct: f64) -> f64 {
    if sector_margin_pct <= 0.0 {
        return 1.0;
    }
    let relative = ebitda_margin_pct / sector_margin_pct;
    let continuous = 0.7 + 0.3 * relative.min(2.0);
    let bucket = match relative {
        r if r >= 1.5 => 1.25,
        r if r >= 1.2 => 1.15,
        r if r >= 0.9 => 1.00,
        r if r >= 0.7 => 0.85,
        _ => 0.70,
    };
    (0.7 * continuous + 0.3 * bucket).clamp(0.65, 1.35)
}

pub fn net_debt_to_ebitda(net_debt: f64, ebitda: f64) -> f64 {
    if ebitda <= 0.0 {
        CAPPED_RATIO
    } else {
        net_debt / ebitda
    }
}

pub struct MultiplesValuator<'a> {
    config: &'a ValuationConfig,
}

impl<'a> MultiplesValuator<'a> {
    pub fn new(config: &'a ValuationConfig) -> Self {
        Self { config }
    }

    pub fn adjustment(&self, assumptions: &AssumptionSet, market: &MarketData) -> MultipleAdjustment {
        let operating = &assumptions.operating;
        MultipleAdjustment {
            size_factor: size_factor(operating.base_revenue),
            growth_factor: growth_factor(operating.revenue_growth_pct),
            leverage_factor: leverage_factor(net_debt_to_ebitda(net_debt(assumptions), operating.base_ebitda())),
            margin_factor: margin_factor(operating.base_ebitda_margin_pct(), market.benchmarks.ebitda_margin_pct),
        }
    }

    pub fn value(&self, assumptions: &AssumptionSet, market: &MarketData) -> Result<MultiplesValuation> {
        let operating = &assumptions.operating;
        let adjustment = self.adjustment(assumptions, market);
        let combined = adjustment.combined();
        let net_debt = net_debt(assumptions);
        let range = self.config.multiples_range;

        let ev_ebitda = MultipleValue::new(
            market.multiples.ev_ebitda * combined,
            operating.base_ebitda(),
            net_debt,
            range,
        );
        let ev_revenue = MultipleValue::new(
            market.multiples.ev_revenue * combined,
            operating.base_revenue,
            net_debt,
            range,
        );
        ensure_finite("multiples_ev_ebitda", 0, ev_ebitda.equity_value)?;
        ensure_finite("multiples_ev_revenue", 0, ev_revenue.equity_value)?;

        debug!(
            "Multiples: adjustment {:.3} (size {:.2}, growth {:.2}, leverage {:.2}, margin {:.3}), EV/EBITDA {:.2}x, EV/Revenue {:.2}x",
            combined,
            adjustment.size_factor,
            adjustment.growth_factor,
            adjustment.leverage_factor,
            adjustment.margin_factor,
            ev_ebitda.multiple,
            ev_revenue.multiple
        );

        Ok(MultiplesValuation {
            adjustment,
            ev_ebitda,
            ev_revenue,
        })
    }
}
