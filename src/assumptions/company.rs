//! Company profile and sector reference data

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Industry classification driving every sector-keyed table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Technology,
    Hospitality,
    Ecommerce,
    Consulting,
    Retail,
    Services,
    Automotive,
    Industrial,
    Construction,
    Energy,
    Pharmaceutical,
    Other,
}

impl Sector {
    pub const ALL: [Sector; 12] = [
        Sector::Technology,
        Sector::Hospitality,
        Sector::Ecommerce,
        Sector::Consulting,
        Sector::Retail,
        Sector::Services,
        Sector::Automotive,
        Sector::Industrial,
        Sector::Construction,
        Sector::Energy,
        Sector::Pharmaceutical,
        Sector::Other,
    ];

    /// Unlevered sector beta before the Blume adjustment
    pub fn beta(&self) -> f64 {
        match self {
            Sector::Technology => 1.35,
            Sector::Hospitality => 1.15,
            Sector::Ecommerce => 1.25,
            Sector::Consulting => 1.10,
            Sector::Retail => 0.95,
            Sector::Services => 1.00,
            Sector::Automotive => 1.20,
            Sector::Industrial => 1.10,
            Sector::Construction => 1.30,
            Sector::Energy => 1.10,
            Sector::Pharmaceutical => 0.90,
            Sector::Other => 1.00,
        }
    }

    /// CAPEX as percent of revenue when no plan entry exists
    pub fn default_capex_pct(&self) -> f64 {
        match self {
            Sector::Hospitality => 6.0,
            Sector::Technology => 3.0,
            Sector::Ecommerce => 2.5,
            Sector::Consulting => 2.0,
            Sector::Retail => 5.0,
            Sector::Services => 3.5,
            Sector::Automotive => 8.0,
            Sector::Industrial => 10.0,
            Sector::Construction | Sector::Energy | Sector::Pharmaceutical | Sector::Other => 4.0,
        }
    }

    /// EV/EBITDA applied to the final-year EBITDA in the exit-multiple terminal value
    pub fn exit_multiple(&self) -> f64 {
        match self {
            Sector::Technology => 15.0,
            Sector::Hospitality => 8.0,
            Sector::Ecommerce => 12.0,
            Sector::Consulting => 10.0,
            Sector::Retail => 7.0,
            Sector::Services => 9.0,
            Sector::Industrial => 8.0,
            Sector::Automotive => 7.0,
            Sector::Construction | Sector::Energy | Sector::Pharmaceutical | Sector::Other => 9.0,
        }
    }

    /// Weight of real GDP growth above inflation in the perpetual growth rate
    pub fn terminal_growth_factor(&self) -> f64 {
        match self {
            Sector::Technology => 1.3,
            Sector::Hospitality => 0.9,
            Sector::Ecommerce => 1.2,
            Sector::Retail => 0.8,
            Sector::Automotive | Sector::Industrial => 0.9,
            Sector::Consulting
            | Sector::Services
            | Sector::Construction
            | Sector::Energy
            | Sector::Pharmaceutical
            | Sector::Other => 1.0,
        }
    }

    /// Scaling of the base precedent-transaction multiples
    pub fn transaction_factor(&self) -> f64 {
        match self {
            Sector::Technology => 1.3,
            Sector::Services => 0.9,
            Sector::Industrial => 0.8,
            Sector::Hospitality => 0.7,
            _ => 1.0,
        }
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Sector::Technology => "Technology",
            Sector::Hospitality => "Hospitality",
            Sector::Ecommerce => "E-commerce",
            Sector::Consulting => "Consulting",
            Sector::Retail => "Retail",
            Sector::Services => "Services",
            Sector::Automotive => "Automotive",
            Sector::Industrial => "Industrial",
            Sector::Construction => "Construction",
            Sector::Energy => "Energy",
            Sector::Pharmaceutical => "Pharmaceutical",
            Sector::Other => "Other",
        };
        write!(f, "{name}")
    }
}

/// Agency-style credit rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CreditRating {
    Aaa,
    Aa,
    A,
    Bbb,
    Bb,
    B,
    Ccc,
    D,
}

impl CreditRating {
    /// Spread over the risk-free rate in basis points
    pub fn spread_bps(&self) -> f64 {
        match self {
            CreditRating::Aaa => 50.0,
            CreditRating::Aa => 75.0,
            CreditRating::A => 100.0,
            CreditRating::Bbb => 150.0,
            CreditRating::Bb => 300.0,
            CreditRating::B => 500.0,
            CreditRating::Ccc => 800.0,
            CreditRating::D => 1000.0,
        }
    }
}

/// Descriptive facts about the company, fixed for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub sector: Sector,
    pub founding_year: i32,
    pub employees: u32,

    #[serde(default)]
    pub family_owned: bool,

    #[serde(default)]
    pub audited: bool,

    /// Share of revenue from the single largest client, in percent
    #[serde(default)]
    pub largest_client_pct: Option<f64>,

    #[serde(default)]
    pub credit_rating: Option<CreditRating>,
}

impl CompanyProfile {
    /// Years since founding as of `valuation_year`, never negative
    pub fn age_at(&self, valuation_year: i32) -> u32 {
        (valuation_year - self.founding_year).max(0) as u32
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::invalid("profile.name", "must not be empty"));
        }
        if !(1800..=2200).contains(&self.founding_year) {
            return Err(EngineError::invalid(
                "profile.founding_year",
                format!("{} is not a plausible founding year", self.founding_year),
            ));
        }
        if let Some(share) = self.largest_client_pct {
            if !(0.0..=100.0).contains(&share) {
                return Err(EngineError::invalid(
                    "profile.largest_client_pct",
                    "must be within [0, 100]",
                ));
            }
        }
        Ok(())
    }
}
