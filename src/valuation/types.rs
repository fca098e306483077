//! Valuation result types
//!
//! Created once at the end of a run and never mutated.

use serde::{Deserialize, Serialize};

// ============================================================================
// Cost of capital
// ============================================================================

/// Build-up of the discount rate. All rates are decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaccBreakdown {
    pub risk_free_rate: f64,
    pub raw_beta: f64,
    pub adjusted_beta: f64,
    pub market_risk_premium: f64,
    pub size_premium: f64,
    pub specific_premium: f64,
    pub cost_of_equity: f64,
    pub credit_spread: f64,
    pub pre_tax_cost_of_debt: f64,
    pub cost_of_debt: f64,
    pub debt_value: f64,
    pub equity_value: f64,
    pub equity_weight: f64,
    pub debt_weight: f64,
    pub wacc: f64,
}

// ============================================================================
// DCF
// ============================================================================

/// Enterprise values over WACC and growth offsets around the base case.
///
/// The grid is always 5×5 with the base case at the center. Cells are
/// addressed by signed step offsets, `-2..=2` on both axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    /// WACC of each row
    pub wacc_values: Vec<f64>,
    /// Perpetual growth of each column
    pub growth_values: Vec<f64>,
    /// `None` where WACC <= g for that cell
    pub enterprise_values: Vec<Vec<Option<f64>>>,
}

impl SensitivityGrid {
    pub const STEPS: i32 = 2;
    pub const SIZE: usize = 5;

    fn index(offset: i32) -> Option<usize> {
        (-Self::STEPS..=Self::STEPS)
            .contains(&offset)
            .then(|| (offset + Self::STEPS) as usize)
    }

    /// Value at `wacc_offset` WACC steps and `growth_offset` growth steps from the base case
    pub fn at(&self, wacc_offset: i32, growth_offset: i32) -> Option<f64> {
        let row = Self::index(wacc_offset)?;
        let col = Self::index(growth_offset)?;
        self.enterprise_values.get(row)?.get(col).copied().flatten()
    }

    pub fn center(&self) -> Option<f64> {
        self.at(0, 0)
    }

    pub fn available_cells(&self) -> usize {
        self.enterprise_values
            .iter()
            .flatten()
            .filter(|cell| cell.is_some())
            .count()
    }

    /// Smallest and largest available enterprise value
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.enterprise_values
            .iter()
            .flatten()
            .flatten()
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfValuation {
    pub wacc: f64,
    pub terminal_growth: f64,
    pub pv_free_cash_flows: f64,
    pub gordon_terminal_value: f64,
    pub exit_multiple: f64,
    pub exit_multiple_terminal_value: f64,
    /// Blended terminal value at the end of the horizon
    pub terminal_value: f64,
    pub pv_terminal_value: f64,
    pub enterprise_value: f64,
    pub net_debt: f64,
    /// May be negative; flooring happens in aggregation
    pub equity_value: f64,
    /// Share of enterprise value coming from the terminal value
    pub terminal_value_share: f64,
    pub sensitivity: SensitivityGrid,
}

// ============================================================================
// Market approaches
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultipleAdjustment {
    pub size_factor: f64,
    pub growth_factor: f64,
    pub leverage_factor: f64,
    pub margin_factor: f64,
}

impl MultipleAdjustment {
    pub fn combined(&self) -> f64 {
        self.size_factor * self.growth_factor * self.leverage_factor * self.margin_factor
    }
}

/// Value implied by one multiple applied to one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultipleValue {
    pub multiple: f64,
    pub metric: f64,
    pub enterprise_value: f64,
    pub equity_value: f64,
    pub low: f64,
    pub high: f64,
}

impl MultipleValue {
    /// Applies `multiple` to `metric` and bridges to equity; `range` is the
    /// half-width of the equity range as a fraction
    pub fn new(multiple: f64, metric: f64, net_debt: f64, range: f64) -> Self {
        let enterprise_value = multiple * metric;
        let equity_value = enterprise_value - net_debt;
        let (low, high) = value_range(equity_value, range);
        Self {
            multiple,
            metric,
            enterprise_value,
            equity_value,
            low,
            high,
        }
    }
}

/// `value` ± `range` of its magnitude, so low <= high for negative values too
pub fn value_range(value: f64, range: f64) -> (f64, f64) {
    let spread = value.abs() * range;
    (value - spread, value + spread)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplesValuation {
    pub adjustment: MultipleAdjustment,
    pub ev_ebitda: MultipleValue,
    pub ev_revenue: MultipleValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransactionValuation {
    pub sector_factor: f64,
    pub ev_ebitda: MultipleValue,
    pub ev_revenue: MultipleValue,
}

// ============================================================================
// Aggregation
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMethod {
    Dcf,
    MultiplesEvEbitda,
    MultiplesEvRevenue,
    TransactionsEvEbitda,
    TransactionsEvRevenue,
}

impl ValuationMethod {
    pub const ALL: [ValuationMethod; 5] = [
        ValuationMethod::Dcf,
        ValuationMethod::MultiplesEvEbitda,
        ValuationMethod::MultiplesEvRevenue,
        ValuationMethod::TransactionsEvEbitda,
        ValuationMethod::TransactionsEvRevenue,
    ];
}

impl std::fmt::Display for ValuationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dcf => write!(f, "DCF"),
            Self::MultiplesEvEbitda => write!(f, "Multiples EV/EBITDA"),
            Self::MultiplesEvRevenue => write!(f, "Multiples EV/Revenue"),
            Self::TransactionsEvEbitda => write!(f, "Transactions EV/EBITDA"),
            Self::TransactionsEvRevenue => write!(f, "Transactions EV/Revenue"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeverageRisk {
    Normal,
    HighLeverage,
    Critical,
}

impl std::fmt::Display for LeverageRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::HighLeverage => write!(f, "high leverage"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// One method's contribution to the blended value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodEstimate {
    pub method: ValuationMethod,
    pub equity_value: f64,
    pub low: f64,
    pub high: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub enterprise_value: f64,
    /// Final equity value after discount and floor
    pub equity_value: f64,
    pub low: f64,
    pub high: f64,
    pub blended_value: f64,
    pub illiquidity_discount: f64,
    pub floor_value: Option<f64>,
    pub floor_applied: bool,
    pub leverage_risk: LeverageRisk,
    pub net_debt: f64,
    pub methods: Vec<MethodEstimate>,
    pub dcf: DcfValuation,
    pub multiples: MultiplesValuation,
    pub transactions: TransactionValuation,
    pub conclusions: Vec<String>,
}

impl ValuationResult {
    pub fn method(&self, method: ValuationMethod) -> Option<&MethodEstimate> {
        self.methods.iter().find(|m| m.method == method)
    }
}
