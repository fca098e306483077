//! Debt instrument definitions
//!
//! Instruments are held in order on the assumption set and never mutated after
//! construction. All rates are annual percentages (5.0 = 5%).

use serde::{Deserialize, Serialize};

use crate::assumptions::MAX_HORIZON_YEARS;
use crate::error::{EngineError, Result};

/// Longest accepted loan term
pub const MAX_TERM_YEARS: u32 = 100;

/// Share of each monthly lease payment treated as interest
pub const LEASE_INTEREST_SHARE: f64 = 0.30;

/// Default utilization of a factoring line when none is given
pub const DEFAULT_FACTORING_UTILIZATION: f64 = 0.80;

fn default_start_year() -> u32 {
    1
}

fn default_factoring_utilization() -> f64 {
    DEFAULT_FACTORING_UTILIZATION
}

/// Repayment profile of an amortizing loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmortizationMethod {
    /// Constant annual payment (annuity)
    #[default]
    French,
    /// Equal annual principal repayments
    Linear,
    /// Interest only, principal repaid at maturity
    Bullet,
}

/// Shape shared by term loans and mortgages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: f64,

    /// Annual interest rate in percent
    pub rate_pct: f64,

    pub term_years: u32,

    /// First projection year in which the loan accrues interest and amortizes
    #[serde(default = "default_start_year")]
    pub start_year: u32,

    #[serde(default)]
    pub method: AmortizationMethod,
}

impl LoanTerms {
    pub fn new(principal: f64, rate_pct: f64, term_years: u32, method: AmortizationMethod) -> Self {
        Self {
            principal,
            rate_pct,
            term_years,
            start_year: 1,
            method,
        }
    }

    pub fn starting_in(mut self, start_year: u32) -> Self {
        self.start_year = start_year;
        self
    }

    /// Last projection year with a scheduled payment
    pub fn maturity_year(&self) -> u32 {
        self.start_year.saturating_add(self.term_years.saturating_sub(1))
    }

    fn validate(&self, field: &str) -> Result<()> {
        if !self.principal.is_finite() || self.principal < 0.0 {
            return Err(EngineError::invalid(
                format!("{field}.principal"),
                "must be a finite, non-negative amount",
            ));
        }
        if !self.rate_pct.is_finite() || self.rate_pct < 0.0 {
            return Err(EngineError::invalid(
                format!("{field}.rate_pct"),
                "must be a finite, non-negative percentage",
            ));
        }
        if self.term_years == 0 || self.term_years > MAX_TERM_YEARS {
            return Err(EngineError::invalid(
                format!("{field}.term_years"),
                format!("must be within 1..={MAX_TERM_YEARS}, got {}", self.term_years),
            ));
        }
        if self.start_year == 0 || self.start_year > MAX_HORIZON_YEARS {
            return Err(EngineError::invalid(
                format!("{field}.start_year"),
                format!("must be a projection year within 1..={MAX_HORIZON_YEARS}, got {}", self.start_year),
            ));
        }
        Ok(())
    }
}

/// A financing instrument. Dispatch on the variant tag, never on field presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DebtInstrument {
    TermLoan(LoanTerms),

    /// Same math as a term loan, reported separately
    Mortgage(LoanTerms),

    Lease {
        monthly_payment: f64,
        /// Months remaining at the start of the projection
        remaining_months: u32,
    },

    /// Revolving, non-amortizing facility
    CreditLine {
        limit: f64,
        drawn: f64,
        rate_pct: f64,
    },

    /// Receivables financing; a cost line, not balance-sheet debt
    Factoring {
        limit: f64,
        cost_rate_pct: f64,
        #[serde(default = "default_factoring_utilization")]
        utilization: f64,
    },
}

/// Reporting category for an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    TermLoan,
    Mortgage,
    Lease,
    CreditLine,
    Factoring,
}

impl std::fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TermLoan => write!(f, "Term loan"),
            Self::Mortgage => write!(f, "Mortgage"),
            Self::Lease => write!(f, "Lease"),
            Self::CreditLine => write!(f, "Credit line"),
            Self::Factoring => write!(f, "Factoring"),
        }
    }
}

impl DebtInstrument {
    pub fn term_loan(principal: f64, rate_pct: f64, term_years: u32, method: AmortizationMethod) -> Self {
        DebtInstrument::TermLoan(LoanTerms::new(principal, rate_pct, term_years, method))
    }

    pub fn mortgage(principal: f64, rate_pct: f64, term_years: u32) -> Self {
        DebtInstrument::Mortgage(LoanTerms::new(principal, rate_pct, term_years, AmortizationMethod::French))
    }

    pub fn kind(&self) -> InstrumentKind {
        match self {
            DebtInstrument::TermLoan(_) => InstrumentKind::TermLoan,
            DebtInstrument::Mortgage(_) => InstrumentKind::Mortgage,
            DebtInstrument::Lease { .. } => InstrumentKind::Lease,
            DebtInstrument::CreditLine { .. } => InstrumentKind::CreditLine,
            DebtInstrument::Factoring { .. } => InstrumentKind::Factoring,
        }
    }

    /// Whether the instrument carries a balance-sheet liability
    pub fn is_balance_sheet_debt(&self) -> bool {
        !matches!(self, DebtInstrument::Factoring { .. })
    }

    /// Check the instrument's own fields; `index` locates it in error messages
    pub fn validate(&self, index: usize) -> Result<()> {
        let field = format!("debt[{index}]");
        match self {
            DebtInstrument::TermLoan(terms) | DebtInstrument::Mortgage(terms) => terms.validate(&field),
            DebtInstrument::Lease { monthly_payment, .. } => {
                if !monthly_payment.is_finite() || *monthly_payment < 0.0 {
                    return Err(EngineError::invalid(
                        format!("{field}.monthly_payment"),
                        "must be a finite, non-negative amount",
                    ));
                }
                Ok(())
            }
            DebtInstrument::CreditLine { limit, drawn, rate_pct } => {
                if !limit.is_finite() || *limit < 0.0 {
                    return Err(EngineError::invalid(format!("{field}.limit"), "must be non-negative"));
                }
                if !drawn.is_finite() || *drawn < 0.0 || drawn > limit {
                    return Err(EngineError::invalid(
                        format!("{field}.drawn"),
                        format!("must be within [0, limit = {limit}]"),
                    ));
                }
                if !rate_pct.is_finite() || *rate_pct < 0.0 {
                    return Err(EngineError::invalid(format!("{field}.rate_pct"), "must be non-negative"));
                }
                Ok(())
            }
            DebtInstrument::Factoring { limit, cost_rate_pct, utilization } => {
                if !limit.is_finite() || *limit < 0.0 {
                    return Err(EngineError::invalid(format!("{field}.limit"), "must be non-negative"));
                }
                if !cost_rate_pct.is_finite() || *cost_rate_pct < 0.0 {
                    return Err(EngineError::invalid(format!("{field}.cost_rate_pct"), "must be non-negative"));
                }
                if !(0.0..=1.0).contains(utilization) {
                    return Err(EngineError::invalid(
                        format!("{field}.utilization"),
                        "must be a fraction within [0, 1]",
                    ));
                }
                Ok(())
            }
        }
    }
}
