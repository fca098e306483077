//! File-based assumption loading
//!
//! Assumption sets are JSON documents; a CAPEX plan may be supplied
//! separately as a `year,amount` CSV file.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::{AssumptionSet, CapexPlan};
use crate::error::Result;

/// Sample assumption set shipped with the repository
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/sample_company.json";

/// Read and validate one assumption set
pub fn load_assumption_set(path: &Path) -> Result<AssumptionSet> {
    let file = File::open(path)?;
    let set: AssumptionSet = serde_json::from_reader(BufReader::new(file))?;
    set.validate()?;
    info!(
        "Loaded assumptions for {} ({} debt instruments, {} years)",
        set.profile.name,
        set.debt.len(),
        set.horizon_years
    );
    Ok(set)
}

/// Read an assumption set and replace its CAPEX plan with the CSV contents
pub fn load_with_capex_csv(path: &Path, capex_csv: &Path) -> Result<AssumptionSet> {
    let file = File::open(path)?;
    let mut set: AssumptionSet = serde_json::from_reader(BufReader::new(file))?;
    set.capex_plan = CapexPlan::from_csv_path(capex_csv)?;
    debug!("CAPEX plan loaded from {}: {} entries", capex_csv.display(), set.capex_plan.entries().len());
    set.validate()?;
    Ok(set)
}

/// All `*.json` files in a directory, sorted by name
pub fn assumption_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map_or(false, |ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::Sector;

    fn data_path(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
    }

    #[test]
    fn test_load_sample_company() {
        let set = load_assumption_set(&data_path("sample_company.json")).unwrap();
        assert_eq!(set.profile.sector, Sector::Industrial);
        assert_eq!(set.horizon_years, 5);
        assert!(!set.debt.is_empty());
    }

    #[test]
    fn test_capex_csv_replaces_plan() {
        let set = load_with_capex_csv(&data_path("sample_company.json"), &data_path("capex_plan.csv")).unwrap();
        assert!(set.capex_plan.planned(1).is_some());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_assumption_set(&data_path("does_not_exist.json")).unwrap_err();
        assert!(matches!(err, crate::error::EngineError::Io(_)));
    }

    #[test]
    fn test_lists_json_files() {
        let files = assumption_files_in(&data_path("companies")).unwrap();
        assert!(files.len() >= 2);
        assert!(files.iter().all(|p| p.extension().unwrap() == "json"));
    }
}
