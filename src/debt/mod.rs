//! Debt instruments and their amortization schedules

mod instrument;
mod scheduler;

pub use instrument::{
    AmortizationMethod, DebtInstrument, InstrumentKind, LoanTerms, DEFAULT_FACTORING_UTILIZATION,
    LEASE_INTEREST_SHARE, MAX_TERM_YEARS,
};
pub use scheduler::{annuity_payment, DebtScheduleRow, DebtScheduler, DebtYearSummary};
