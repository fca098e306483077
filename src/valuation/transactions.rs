//! Precedent-transaction valuation
//!
//! Deal multiples are scaled by a sector factor only; no size or margin
//! adjustment is applied.

use log::debug;

use super::config::ValuationConfig;
use super::dcf::net_debt;
use super::types::{MultipleValue, TransactionValuation};
use crate::assumptions::AssumptionSet;
use crate::error::{ensure_finite, Result};

pub struct TransactionValuator<'a> {
    config: &'a ValuationConfig,
}

impl<'a> TransactionValuator<'a> {
    pub fn new(config: &'a ValuationConfig) -> Self {
        Self { config }
    }

    pub fn value(&self, assumptions: &AssumptionSet) -> Result<TransactionValuation> {
        let operating = &assumptions.operating;
        let sector_factor = assumptions.profile.sector.transaction_factor();
        let net_debt = net_debt(assumptions);
        let range = self.config.transactions_range;

        let ev_ebitda = MultipleValue::new(
            self.config.transaction_ev_ebitda * sector_factor,
            operating.base_ebitda(),
            net_debt,
            range,
        );
        let ev_revenue = MultipleValue::new(
            self.config.transaction_ev_revenue * sector_factor,
            operating.base_revenue,
            net_debt,
            range,
        );
        ensure_finite("transactions_ev_ebitda", 0, ev_ebitda.equity_value)?;
        ensure_finite("transactions_ev_revenue", 0, ev_revenue.equity_value)?;

        debug!(
            "Transactions ({}): factor {:.2}, EV/EBITDA {:.2}x, EV/Revenue {:.2}x",
            assumptions.profile.sector, sector_factor, ev_ebitda.multiple, ev_revenue.multiple
        );

        Ok(TransactionValuation {
            sector_factor,
            ev_ebitda,
            ev_revenue,
        })
    }
}
