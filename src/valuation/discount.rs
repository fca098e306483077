//! Annual discounting at a flat rate
//!
//! Cash flows are assumed to arrive at the end of each year, so the first
//! projected year is discounted one full period.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountCurve {
    /// Annual rate as a decimal
    pub rate: f64,
}

impl DiscountCurve {
    pub fn single_rate(annual_rate: f64) -> Self {
        Self { rate: annual_rate }
    }

    /// Discount factor for a cash flow at the end of `year`
    pub fn discount_factor(&self, year: u32) -> f64 {
        (1.0 + self.rate).powi(-(year as i32))
    }

    /// Present value of end-of-year flows, the first at year 1
    pub fn pv_stream(&self, cash_flows: &[f64]) -> f64 {
        cash_flows
            .iter()
            .enumerate()
            .map(|(index, amount)| amount * self.discount_factor(index as u32 + 1))
            .sum()
    }
}

/// Value at year N of `next_cash_flow` growing at `growth` forever.
/// Rejects `rate <= growth` instead of returning an infinite or negative value.
pub fn gordon_value(next_cash_flow: f64, rate: f64, growth: f64) -> Result<f64> {
    if !rate.is_finite() || !growth.is_finite() {
        return Err(EngineError::domain(
            "terminal_growth",
            format!("non-finite inputs: WACC {rate}, g {growth}"),
        ));
    }
    if rate <= growth {
        return Err(EngineError::domain(
            "terminal_growth",
            format!(
                "WACC {:.4}% must exceed perpetual growth {:.4}%",
                rate * 100.0,
                growth * 100.0
            ),
        ));
    }
    Ok(next_cash_flow / (rate - growth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_discount_factors() {
        let curve = DiscountCurve::single_rate(0.10);
        assert_relative_eq!(curve.discount_factor(0), 1.0);
        assert_relative_eq!(curve.discount_factor(2), 1.0 / 1.21, epsilon = 1e-12);
    }

    #[test]
    fn test_pv_stream() {
        let curve = DiscountCurve::single_rate(0.10);
        let pv = curve.pv_stream(&[110.0, 121.0]);
        assert_relative_eq!(pv, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_gordon_domain() {
        assert_relative_eq!(gordon_value(102.0, 0.08, 0.02).unwrap(), 1_700.0, epsilon = 1e-9);
        assert!(matches!(
            gordon_value(100.0, 0.03, 0.03),
            Err(EngineError::MathematicalDomain { .. })
        ));
        assert!(gordon_value(100.0, 0.02, 0.03).is_err());
    }
}
