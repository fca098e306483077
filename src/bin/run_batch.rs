//! Value every assumption set in a directory
//!
//! Companies are valued in parallel; a failure is reported for that company
//! and the rest of the batch continues.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;

use sme_valuation::assumptions::loader::{assumption_files_in, load_assumption_set};
use sme_valuation::{Sector, ValuationOutcome, ValuationRunner};

#[derive(Parser, Debug)]
#[command(name = "run_batch")]
#[command(about = "Value every *.json assumption set in a directory", long_about = None)]
struct Cli {
    /// Directory holding assumption files
    #[arg(default_value = "data/companies")]
    dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let files = assumption_files_in(&cli.dir).with_context(|| format!("listing {}", cli.dir.display()))?;
    println!("Valuing {} companies from {}...", files.len(), cli.dir.display());

    let start = Instant::now();
    let runner = ValuationRunner::new();
    let results: Vec<(PathBuf, sme_valuation::Result<(Sector, ValuationOutcome)>)> = files
        .par_iter()
        .map(|path| {
            let outcome = load_assumption_set(path)
                .and_then(|set| runner.run(&set).map(|outcome| (set.profile.sector, outcome)));
            (path.clone(), outcome)
        })
        .collect();

    println!(
        "{:<32} {:<14} {:>12} {:>12} {:>8} {:<14}",
        "Company", "Sector", "Equity (M)", "EV (M)", "WACC", "Leverage"
    );
    println!("{}", "-".repeat(98));

    let mut failures = 0;
    for (path, result) in &results {
        match result {
            Ok((sector, outcome)) => {
                let v = &outcome.valuation;
                let name = &outcome.projection.company;
                println!(
                    "{:<32} {:<14} {:>12.3} {:>12.3} {:>7.2}% {:<14}",
                    name,
                    sector.to_string(),
                    v.equity_value / 1_000_000.0,
                    v.enterprise_value / 1_000_000.0,
                    outcome.wacc.wacc * 100.0,
                    v.leverage_risk.to_string()
                );
            }
            Err(e) => {
                failures += 1;
                println!("{:<32} FAILED: {}", path.display(), e);
            }
        }
    }

    println!(
        "\n{} valued, {} failed in {:?}",
        results.len() - failures,
        failures,
        start.elapsed()
    );
    Ok(())
}
