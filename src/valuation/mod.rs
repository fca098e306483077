//! Cost of capital, DCF, market multiples, precedent transactions and the blended value

mod config;
mod discount;
mod types;
mod wacc;
mod dcf;
mod multiples;
mod transactions;
mod aggregator;

pub use config::{CreditSpreadSource, EquityValueBasis, ValuationConfig};
pub use discount::{gordon_value, DiscountCurve};
pub use types::{
    value_range, DcfValuation, LeverageRisk, MethodEstimate, MultipleAdjustment, MultipleValue,
    MultiplesValuation, SensitivityGrid, TransactionValuation, ValuationMethod, ValuationResult, WaccBreakdown,
};
pub use wacc::{coverage_spread, size_premium, WaccCalculator};
pub use dcf::{net_debt, terminal_growth, DcfValuator};
pub use multiples::{growth_factor, leverage_factor, margin_factor, net_debt_to_ebitda, size_factor, MultiplesValuator};
pub use transactions::TransactionValuator;
pub use aggregator::{
    apply_floor, classify_leverage, illiquidity_discount, method_weights, ValuationAggregator,
    DISTRESSED_REALIZATION, GOING_CONCERN_REALIZATION,
};
