//! Per-year debt service for individual instruments and whole portfolios
//!
//! Year 0 denotes the position at the start of the projection; projection
//! years run from 1. The balance reported for year `y` is the closing balance
//! after that year's payment, so the opening balance of year `y` is the
//! closing balance of year `y - 1`.

use serde::{Deserialize, Serialize};

use super::instrument::{AmortizationMethod, DebtInstrument, LoanTerms, LEASE_INTEREST_SHARE};

/// Constant annual payment that retires `principal` over `term_years`
pub fn annuity_payment(principal: f64, rate_pct: f64, term_years: u32) -> f64 {
    if term_years == 0 {
        return principal;
    }
    let r = rate_pct / 100.0;
    let n = i32::try_from(term_years).unwrap_or(i32::MAX);
    if r.abs() < 1e-12 {
        return principal / term_years as f64;
    }
    let growth = (1.0 + r).powi(n);
    principal * r * growth / (growth - 1.0)
}

/// Remaining principal after `elapsed` annual payments
fn loan_balance(terms: &LoanTerms, elapsed: u32) -> f64 {
    if elapsed == 0 {
        return terms.principal;
    }
    if elapsed >= terms.term_years {
        return 0.0;
    }

    let r = terms.rate_pct / 100.0;
    let balance = match terms.method {
        AmortizationMethod::French if r.abs() >= 1e-12 => {
            let payment = annuity_payment(terms.principal, terms.rate_pct, terms.term_years);
            let growth = (1.0 + r).powi(i32::try_from(elapsed).unwrap_or(i32::MAX));
            terms.principal * growth - payment * (growth - 1.0) / r
        }
        // Zero-rate annuity degenerates to straight-line repayment
        AmortizationMethod::French | AmortizationMethod::Linear => {
            terms.principal - terms.principal / terms.term_years as f64 * elapsed as f64
        }
        AmortizationMethod::Bullet => terms.principal,
    };

    balance.max(0.0)
}

fn loan_outstanding(terms: &LoanTerms, year: u32) -> f64 {
    if year < terms.start_year {
        return terms.principal;
    }
    loan_balance(terms, year - terms.start_year + 1)
}

fn loan_is_active(terms: &LoanTerms, year: u32) -> bool {
    year >= terms.start_year && year < terms.start_year.saturating_add(terms.term_years)
}

/// Lease months falling in projection year `year`
fn lease_months_in_year(remaining_months: u32, year: u32) -> u32 {
    if year == 0 {
        return 0;
    }
    let consumed = 12 * (year - 1);
    remaining_months.saturating_sub(consumed).min(12)
}

/// One line of an instrument's amortization table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebtScheduleRow {
    pub year: u32,
    pub opening_balance: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_balance: f64,
}

/// Debt service aggregated over every instrument for one year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtYearSummary {
    pub year: u32,
    pub opening_balance: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_balance: f64,
    /// Factoring charges, kept apart from interest
    pub factoring_cost: f64,
}

/// Stateless schedule calculator dispatching on the instrument variant
pub struct DebtScheduler;

impl DebtScheduler {
    /// Closing balance at the end of `year` (year 0 is the initial position)
    pub fn outstanding_balance(instrument: &DebtInstrument, year: u32) -> f64 {
        match instrument {
            DebtInstrument::TermLoan(terms) | DebtInstrument::Mortgage(terms) => loan_outstanding(terms, year),
            DebtInstrument::Lease { monthly_payment, remaining_months } => {
                let months_left = remaining_months.saturating_sub(12 * year);
                (1.0 - LEASE_INTEREST_SHARE) * monthly_payment * months_left as f64
            }
            DebtInstrument::CreditLine { drawn, .. } => *drawn,
            DebtInstrument::Factoring { .. } => 0.0,
        }
    }

    pub fn opening_balance(instrument: &DebtInstrument, year: u32) -> f64 {
        Self::outstanding_balance(instrument, year.saturating_sub(1))
    }

    /// Interest accrued during `year`
    pub fn interest_expense(instrument: &DebtInstrument, year: u32) -> f64 {
        if year == 0 {
            return 0.0;
        }
        match instrument {
            DebtInstrument::TermLoan(terms) | DebtInstrument::Mortgage(terms) => {
                if loan_is_active(terms, year) {
                    Self::opening_balance(instrument, year) * terms.rate_pct / 100.0
                } else {
                    0.0
                }
            }
            DebtInstrument::Lease { monthly_payment, remaining_months } => {
                LEASE_INTEREST_SHARE * monthly_payment * lease_months_in_year(*remaining_months, year) as f64
            }
            DebtInstrument::CreditLine { drawn, rate_pct, .. } => drawn * rate_pct / 100.0,
            DebtInstrument::Factoring { .. } => 0.0,
        }
    }

    /// Principal repaid during `year`
    pub fn principal_amortization(instrument: &DebtInstrument, year: u32) -> f64 {
        if year == 0 {
            return 0.0;
        }
        (Self::opening_balance(instrument, year) - Self::outstanding_balance(instrument, year)).max(0.0)
    }

    /// Annual cost of a factoring line; zero for every other variant
    pub fn factoring_cost(instrument: &DebtInstrument, year: u32) -> f64 {
        match instrument {
            DebtInstrument::Factoring { limit, cost_rate_pct, utilization } if year > 0 => {
                limit * utilization * cost_rate_pct / 100.0
            }
            _ => 0.0,
        }
    }

    /// Amortization table for years `1..=years`
    pub fn schedule(instrument: &DebtInstrument, years: u32) -> Vec<DebtScheduleRow> {
        (1..=years)
            .map(|year| DebtScheduleRow {
                year,
                opening_balance: Self::opening_balance(instrument, year),
                interest: Self::interest_expense(instrument, year),
                principal: Self::principal_amortization(instrument, year),
                closing_balance: Self::outstanding_balance(instrument, year),
            })
            .collect()
    }

    pub fn portfolio_year(instruments: &[DebtInstrument], year: u32) -> DebtYearSummary {
        instruments.iter().fold(
            DebtYearSummary {
                year,
                ..Default::default()
            },
            |mut acc, instrument| {
                acc.opening_balance += Self::opening_balance(instrument, year);
                acc.interest += Self::interest_expense(instrument, year);
                acc.principal += Self::principal_amortization(instrument, year);
                acc.closing_balance += Self::outstanding_balance(instrument, year);
                acc.factoring_cost += Self::factoring_cost(instrument, year);
                acc
            },
        )
    }

    /// Debt outstanding at the valuation date, i.e. before any projected payment
    pub fn current_debt(instruments: &[DebtInstrument]) -> f64 {
        instruments
            .iter()
            .map(|instrument| Self::outstanding_balance(instrument, 0))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn french_loan() -> DebtInstrument {
        DebtInstrument::term_loan(100_000.0, 5.0, 5, AmortizationMethod::French)
    }

    #[test]
    fn test_french_payment_and_balances() {
        let payment = annuity_payment(100_000.0, 5.0, 5);
        assert_relative_eq!(payment, 23_097.48, epsilon = 0.01);

        let loan = french_loan();
        assert_relative_eq!(DebtScheduler::outstanding_balance(&loan, 1), 81_902.52, epsilon = 0.01);
        assert_relative_eq!(DebtScheduler::interest_expense(&loan, 1), 5_000.0, epsilon = 1e-9);
        assert_eq!(DebtScheduler::outstanding_balance(&loan, 5), 0.0);
        assert_eq!(DebtScheduler::outstanding_balance(&loan, 8), 0.0);
        assert_eq!(DebtScheduler::interest_expense(&loan, 6), 0.0);
    }

    #[test]
    fn test_french_interest_plus_principal_equals_payment() {
        let loan = french_loan();
        let payment = annuity_payment(100_000.0, 5.0, 5);
        for row in DebtScheduler::schedule(&loan, 5) {
            assert_relative_eq!(row.interest + row.principal, payment, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_principal_components_sum_to_principal() {
        let loans = [
            french_loan(),
            DebtInstrument::term_loan(60_000.0, 4.0, 4, AmortizationMethod::Linear),
            DebtInstrument::term_loan(80_000.0, 6.0, 3, AmortizationMethod::Bullet),
            DebtInstrument::mortgage(250_000.0, 3.0, 10),
        ];
        for loan in &loans {
            let total: f64 = DebtScheduler::schedule(loan, 12).iter().map(|row| row.principal).sum();
            assert_relative_eq!(total, DebtScheduler::outstanding_balance(loan, 0), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_balances_monotone_non_increasing() {
        let loan = DebtInstrument::mortgage(400_000.0, 3.5, 15);
        let mut previous = DebtScheduler::outstanding_balance(&loan, 0);
        for year in 1..=20 {
            let balance = DebtScheduler::outstanding_balance(&loan, year);
            assert!(balance <= previous + 1e-9, "balance rose in year {year}");
            assert!(balance >= 0.0);
            previous = balance;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn test_zero_rate_french_is_linear() {
        let loan = DebtInstrument::term_loan(50_000.0, 0.0, 5, AmortizationMethod::French);
        assert_relative_eq!(DebtScheduler::outstanding_balance(&loan, 2), 30_000.0, epsilon = 1e-9);
        assert_eq!(DebtScheduler::interest_expense(&loan, 2), 0.0);
    }

    #[test]
    fn test_linear_schedule() {
        let loan = DebtInstrument::term_loan(60_000.0, 4.0, 4, AmortizationMethod::Linear);
        assert_relative_eq!(DebtScheduler::outstanding_balance(&loan, 1), 45_000.0, epsilon = 1e-9);
        assert_relative_eq!(DebtScheduler::interest_expense(&loan, 2), 45_000.0 * 0.04, epsilon = 1e-9);
        assert_relative_eq!(DebtScheduler::principal_amortization(&loan, 3), 15_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bullet_repays_at_maturity() {
        let loan = DebtInstrument::term_loan(80_000.0, 6.0, 3, AmortizationMethod::Bullet);
        assert_eq!(DebtScheduler::outstanding_balance(&loan, 2), 80_000.0);
        assert_relative_eq!(DebtScheduler::interest_expense(&loan, 3), 4_800.0, epsilon = 1e-9);
        assert_eq!(DebtScheduler::principal_amortization(&loan, 2), 0.0);
        assert_eq!(DebtScheduler::principal_amortization(&loan, 3), 80_000.0);
        assert_eq!(DebtScheduler::outstanding_balance(&loan, 3), 0.0);
    }

    #[test]
    fn test_deferred_start_year() {
        let loan = DebtInstrument::TermLoan(
            LoanTerms::new(100_000.0, 5.0, 5, AmortizationMethod::French).starting_in(3),
        );
        assert_eq!(DebtScheduler::interest_expense(&loan, 2), 0.0);
        assert_eq!(DebtScheduler::outstanding_balance(&loan, 2), 100_000.0);
        assert_relative_eq!(DebtScheduler::outstanding_balance(&loan, 3), 81_902.52, epsilon = 0.01);
        assert_eq!(DebtScheduler::outstanding_balance(&loan, 7), 0.0);
    }

    #[test]
    fn test_lease_split() {
        let lease = DebtInstrument::Lease {
            monthly_payment: 1_000.0,
            remaining_months: 18,
        };
        assert_relative_eq!(DebtScheduler::interest_expense(&lease, 1), 3_600.0, epsilon = 1e-9);
        assert_relative_eq!(DebtScheduler::principal_amortization(&lease, 1), 8_400.0, epsilon = 1e-9);
        assert_relative_eq!(DebtScheduler::interest_expense(&lease, 2), 1_800.0, epsilon = 1e-9);
        assert_relative_eq!(DebtScheduler::outstanding_balance(&lease, 1), 4_200.0, epsilon = 1e-9);
        assert_eq!(DebtScheduler::outstanding_balance(&lease, 2), 0.0);
        assert_eq!(DebtScheduler::interest_expense(&lease, 3), 0.0);
    }

    #[test]
    fn test_credit_line_and_factoring() {
        let line = DebtInstrument::CreditLine {
            limit: 200_000.0,
            drawn: 50_000.0,
            rate_pct: 5.0,
        };
        assert_eq!(DebtScheduler::outstanding_balance(&line, 3), 50_000.0);
        assert_relative_eq!(DebtScheduler::interest_expense(&line, 3), 2_500.0, epsilon = 1e-9);
        assert_eq!(DebtScheduler::principal_amortization(&line, 3), 0.0);

        let factoring = DebtInstrument::Factoring {
            limit: 100_000.0,
            cost_rate_pct: 2.0,
            utilization: 0.8,
        };
        assert_eq!(DebtScheduler::outstanding_balance(&factoring, 1), 0.0);
        assert_eq!(DebtScheduler::interest_expense(&factoring, 1), 0.0);
        assert_relative_eq!(DebtScheduler::factoring_cost(&factoring, 1), 1_600.0, epsilon = 1e-9);
    }

    #[test]
    fn test_portfolio_year_totals() {
        let instruments = vec![
            french_loan(),
            DebtInstrument::CreditLine {
                limit: 100_000.0,
                drawn: 20_000.0,
                rate_pct: 6.0,
            },
        ];
        let year1 = DebtScheduler::portfolio_year(&instruments, 1);
        assert_relative_eq!(year1.opening_balance, 120_000.0, epsilon = 1e-9);
        assert_relative_eq!(year1.interest, 5_000.0 + 1_200.0, epsilon = 1e-9);
        assert_relative_eq!(year1.closing_balance, 81_902.52 + 20_000.0, epsilon = 0.01);
        assert_relative_eq!(DebtScheduler::current_debt(&instruments), 120_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_portfolio() {
        let summary = DebtScheduler::portfolio_year(&[], 1);
        assert_eq!(summary.closing_balance, 0.0);
        assert_eq!(summary.interest, 0.0);
    }
}
