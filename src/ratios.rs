//! Financial ratios derived from projected statements
//!
//! Margins, ROE and ROA are percentages. Leverage, coverage and liquidity
//! ratios are multiples; when their denominator is not positive they report
//! `CAPPED_RATIO` instead of a meaningless quotient.

use serde::{Deserialize, Serialize};

use crate::projection::{ProjectionResult, ProjectionRow};

/// Capped value reported for ratios with a non-positive denominator
pub const CAPPED_RATIO: f64 = 999.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioRow {
    pub year: u32,
    pub ebitda_margin_pct: f64,
    pub net_margin_pct: f64,
    pub roe_pct: f64,
    pub roa_pct: f64,
    pub debt_to_equity: f64,
    pub interest_coverage: f64,
    pub net_debt_to_ebitda: f64,
    pub current_ratio: f64,
}

impl RatioRow {
    pub fn is_capped(value: f64) -> bool {
        value >= CAPPED_RATIO
    }
}

fn capped_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        CAPPED_RATIO
    } else {
        numerator / denominator
    }
}

fn percent_of(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator * 100.0
    } else {
        0.0
    }
}

pub struct RatioAnalyzer;

impl RatioAnalyzer {
    pub fn analyze_row(row: &ProjectionRow) -> RatioRow {
        let debt = row.total_debt + row.short_term_funding;
        RatioRow {
            year: row.year,
            ebitda_margin_pct: percent_of(row.ebitda, row.revenue),
            net_margin_pct: percent_of(row.net_income, row.revenue),
            roe_pct: percent_of(row.net_income, row.total_equity),
            roa_pct: percent_of(row.net_income, row.total_assets),
            debt_to_equity: capped_ratio(debt, row.total_equity),
            interest_coverage: capped_ratio(row.ebitda, row.financial_expense),
            net_debt_to_ebitda: capped_ratio(row.net_debt(), row.ebitda),
            current_ratio: capped_ratio(row.current_assets(), row.current_liabilities()),
        }
    }

    /// One ratio row per projected year
    pub fn analyze(projection: &ProjectionResult) -> Vec<RatioRow> {
        projection.rows.iter().map(Self::analyze_row).collect()
    }
}
