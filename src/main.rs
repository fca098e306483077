//! SME Valuation CLI
//!
//! Projects and values one company from a JSON assumption file

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use sme_valuation::assumptions::loader::{load_assumption_set, load_with_capex_csv, DEFAULT_ASSUMPTIONS_PATH};
use sme_valuation::market::{MarketDataResolver, SnapshotFileProvider};
use sme_valuation::ratios::RatioRow;
use sme_valuation::valuation::{SensitivityGrid, ValuationConfig};
use sme_valuation::{ValuationOutcome, ValuationRunner};

#[derive(Parser, Debug)]
#[command(name = "sme_valuation")]
#[command(version = "0.1.0")]
#[command(about = "Pro-forma projection and valuation of a small or medium enterprise", long_about = None)]
struct Cli {
    /// Assumption set (JSON)
    #[arg(short, long, default_value = DEFAULT_ASSUMPTIONS_PATH)]
    assumptions: PathBuf,

    /// CAPEX plan (CSV with year,amount) replacing the one in the assumption file
    #[arg(long)]
    capex_csv: Option<PathBuf>,

    /// Market data snapshot (JSON); built-in defaults are used when absent
    #[arg(long)]
    market_data: Option<PathBuf>,

    /// Valuation methodology overrides (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Timeout for each market data request
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,

    /// Print the full outcome as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Write the projected statements to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let assumptions = match &cli.capex_csv {
        Some(capex) => load_with_capex_csv(&cli.assumptions, capex),
        None => load_assumption_set(&cli.assumptions),
    }
    .with_context(|| format!("loading {}", cli.assumptions.display()))?;

    let valuation_config: ValuationConfig = match &cli.config {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ValuationConfig::default(),
    };

    let resolver = match &cli.market_data {
        Some(path) => MarketDataResolver::new(Arc::new(SnapshotFileProvider::new(path))),
        None => MarketDataResolver::offline(),
    }
    .with_timeout(Duration::from_secs(cli.timeout_secs));

    let runner = ValuationRunner::new()
        .with_valuation_config(valuation_config)
        .with_resolver(resolver);
    let outcome = runner.run(&assumptions).context("valuation failed")?;

    if let Some(path) = &cli.csv {
        let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
        for row in &outcome.projection.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        eprintln!("Projection written to: {}", path.display());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_report(&outcome);
    }
    Ok(())
}

fn millions(value: f64) -> f64 {
    value / 1_000_000.0
}

fn print_report(outcome: &ValuationOutcome) {
    let projection = &outcome.projection;
    println!("SME Valuation v0.1.0");
    println!("====================\n");
    println!("Company: {}", projection.company);
    println!(
        "Macro: GDP {:.1}%, inflation {:.1}%, reference rate {:.2}% ({:?})",
        outcome.market.macro_scenario.gdp_growth_pct,
        outcome.market.macro_scenario.inflation_pct,
        outcome.market.macro_scenario.reference_rate_pct,
        outcome.market.macro_source
    );
    for note in &outcome.market.diagnostics {
        println!("  fallback: {note}");
    }

    println!("\nProjected statements (EUR M):");
    println!(
        "{:>4} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Year", "Revenue", "EBITDA", "FinExp", "NetInc", "FCF", "Cash", "Debt", "Equity"
    );
    println!("{}", "-".repeat(94));
    for row in &projection.rows {
        println!(
            "{:>4} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3} {:>10.3}",
            row.year,
            millions(row.revenue),
            millions(row.ebitda),
            millions(row.financial_expense),
            millions(row.net_income),
            millions(row.free_cash_flow),
            millions(row.cash),
            millions(row.total_debt + row.short_term_funding),
            millions(row.total_equity),
        );
    }

    let summary = projection.summary();
    println!("\nSummary:");
    println!("  Revenue CAGR: {:.2}%", summary.revenue_cagr_pct);
    println!("  Average revenue growth: {:.1}%", summary.avg_revenue_growth_pct);
    println!("  Average EBITDA margin: {:.1}%", summary.avg_ebitda_margin_pct);
    println!("  Projected ROI: {:.1}%", summary.roi_pct);
    match summary.break_even_year {
        Some(year) => println!("  Break-even year: {year}"),
        None => println!("  Break-even year: not reached"),
    }
    println!("  Cumulative FCF: {:.3}M", millions(summary.cumulative_free_cash_flow));
    println!("  Peak short-term funding: {:.3}M", millions(summary.max_short_term_funding));

    println!("\nRatios:");
    println!(
        "{:>4} {:>9} {:>9} {:>8} {:>8} {:>8} {:>9} {:>9} {:>8}",
        "Year", "EBITDA%", "Net%", "ROE%", "ROA%", "D/E", "Coverage", "ND/EBITDA", "Current"
    );
    for r in &outcome.ratios {
        println!(
            "{:>4} {:>9.2} {:>9.2} {:>8.2} {:>8.2} {:>8} {:>9} {:>9} {:>8}",
            r.year,
            r.ebitda_margin_pct,
            r.net_margin_pct,
            r.roe_pct,
            r.roa_pct,
            multiple(r.debt_to_equity),
            multiple(r.interest_coverage),
            multiple(r.net_debt_to_ebitda),
            multiple(r.current_ratio),
        );
    }

    let w = &outcome.wacc;
    println!("\nCost of capital:");
    println!("  Risk-free rate:    {:>7.2}%", w.risk_free_rate * 100.0);
    println!("  Beta (raw/adj):    {:>7.3} / {:.3}", w.raw_beta, w.adjusted_beta);
    println!("  Size premium:      {:>7.2}%", w.size_premium * 100.0);
    println!("  Specific premium:  {:>7.2}%", w.specific_premium * 100.0);
    println!("  Cost of equity:    {:>7.2}%", w.cost_of_equity * 100.0);
    println!("  Cost of debt (AT): {:>7.2}%", w.cost_of_debt * 100.0);
    println!("  E/V, D/V:          {:>7.1}% / {:.1}%", w.equity_weight * 100.0, w.debt_weight * 100.0);
    println!("  WACC:              {:>7.2}%", w.wacc * 100.0);

    let v = &outcome.valuation;
    println!(
        "\nDCF: EV {:.3}M, terminal growth {:.2}%, terminal value share {:.1}%",
        millions(v.dcf.enterprise_value),
        v.dcf.terminal_growth * 100.0,
        v.dcf.terminal_value_share * 100.0
    );
    print_grid(&v.dcf.sensitivity);

    println!("\nMethods (equity, EUR M):");
    for m in &v.methods {
        println!(
            "  {:<24} {:>9.3} [{:>9.3} - {:>9.3}] weight {:>5.1}%",
            m.method.to_string(),
            millions(m.equity_value),
            millions(m.low),
            millions(m.high),
            m.weight * 100.0
        );
    }
    println!("\n  Blended:              {:>9.3}M", millions(v.blended_value));
    println!("  Illiquidity discount: {:>9.0}%", v.illiquidity_discount * 100.0);
    if let Some(floor) = v.floor_value {
        let applied = if v.floor_applied { " (applied)" } else { "" };
        println!("  Book-equity floor:    {:>9.3}M{}", millions(floor), applied);
    }
    println!(
        "  Equity value:         {:>9.3}M [{:.3} - {:.3}]",
        millions(v.equity_value),
        millions(v.low),
        millions(v.high)
    );
    println!("  Enterprise value:     {:>9.3}M", millions(v.enterprise_value));

    println!("\nConclusions:");
    for c in &v.conclusions {
        println!("  - {c}");
    }
}

fn multiple(value: f64) -> String {
    if RatioRow::is_capped(value) {
        "n/m".to_string()
    } else {
        format!("{value:.2}")
    }
}

fn print_grid(grid: &SensitivityGrid) {
    print!("\n  {:>8}", "WACC\\g");
    for g in &grid.growth_values {
        print!(" {:>9.2}%", g * 100.0);
    }
    println!();
    for (w, row) in grid.wacc_values.iter().zip(&grid.enterprise_values) {
        print!("  {:>7.2}%", w * 100.0);
        for cell in row {
            match cell {
                Some(ev) => print!(" {:>10.3}", millions(*ev)),
                None => print!(" {:>10}", "n/a"),
            }
        }
        println!();
    }
}
