//! Planned capital expenditure by projection year

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapexEntry {
    pub year: u32,
    pub amount: f64,
}

/// Ordered list of planned investments.
///
/// Years without an entry fall back to a percentage of revenue in the
/// projection. An explicit zero entry is a plan, not a gap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapexPlan {
    entries: Vec<CapexEntry>,
}

impl CapexPlan {
    pub fn new(mut entries: Vec<CapexEntry>) -> Self {
        entries.sort_by_key(|entry| entry.year);
        Self { entries }
    }

    pub fn entries(&self) -> &[CapexEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Planned amount for `year`, summing duplicate entries; None if unplanned
    pub fn planned(&self, year: u32) -> Option<f64> {
        let amounts: Vec<f64> = self
            .entries
            .iter()
            .filter(|entry| entry.year == year)
            .map(|entry| entry.amount)
            .collect();
        (!amounts.is_empty()).then(|| amounts.iter().sum())
    }

    /// Load a `year,amount` CSV file
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut reader = csv::Reader::from_reader(file);

        let mut entries = Vec::new();
        for result in reader.deserialize() {
            let entry: CapexEntry = result?;
            entries.push(entry);
        }

        Ok(Self::new(entries))
    }

    pub fn validate(&self, horizon_years: u32) -> Result<()> {
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.year == 0 || entry.year > horizon_years {
                return Err(EngineError::invalid(
                    format!("capex_plan[{index}].year"),
                    format!("{} is outside the projection horizon 1..={horizon_years}", entry.year),
                ));
            }
            if !entry.amount.is_finite() || entry.amount < 0.0 {
                return Err(EngineError::invalid(
                    format!("capex_plan[{index}].amount"),
                    "must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}
