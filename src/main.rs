//! Household Projection CLI
//!
//! Runs one household through one scenario and prints a yearly summary

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;

use household_projection::household::loader::DEFAULT_HOUSEHOLD_PATH;
use household_projection::household::load_household;
use household_projection::projection::export::write_snapshots_csv;
use household_projection::projection::{AssetClass, FloatingRatePolicy};
use household_projection::{
    Granularity, ProjectionConfig, ProjectionEngine, ScenarioAssumptions, YearMonth,
};

#[derive(Parser, Debug)]
#[command(name = "household_projection")]
#[command(about = "Project a household's finances period by period")]
struct Args {
    /// Household JSON document
    #[arg(long, default_value = DEFAULT_HOUSEHOLD_PATH)]
    household: PathBuf,

    /// Scenario assumptions CSV (default: built-in moderate rates)
    #[arg(short, long)]
    assumptions: Option<PathBuf>,

    /// First simulated month, YYYY-MM (default: current month)
    #[arg(short, long)]
    start: Option<YearMonth>,

    /// Step monthly instead of annually
    #[arg(long)]
    monthly: bool,

    /// Fix floating debt rates at the start instead of following the scenario
    #[arg(long)]
    freeze_floating: bool,

    /// Write every snapshot to this CSV file
    #[arg(long, default_value = "projection_output.csv")]
    csv: PathBuf,

    /// Write the full result to this JSON file
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Household Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("===========================\n");

    let household = load_household(&args.household)
        .with_context(|| format!("loading household from {}", args.household.display()))?;

    let assumptions = match &args.assumptions {
        Some(path) => ScenarioAssumptions::from_csv_path(path)
            .with_context(|| format!("loading assumptions from {}", path.display()))?,
        None => ScenarioAssumptions::default_assumptions(),
    };

    let mut config = ProjectionConfig::default();
    if let Some(start) = args.start {
        config.start = start;
    }
    if args.monthly {
        config.granularity = Granularity::Monthly;
    }
    if args.freeze_floating {
        config.floating_rates = FloatingRatePolicy::FreezeAtStart;
    }

    let engine = ProjectionEngine::new(assumptions, config);
    let result = engine
        .project_household(&household)
        .context("projection failed")?;

    println!(
        "Scenario '{}': {} {:?} periods from {}",
        result.scenario,
        result.snapshots.len(),
        result.granularity,
        engine.config().start
    );
    println!();

    println!(
        "{:>7} {:>4} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "Period", "Age", "Inflow", "Outflow", "Cash", "Investments", "Debt", "Net Worth"
    );
    println!("{}", "-".repeat(112));

    // One row per calendar year when stepping monthly
    for snapshot in result
        .snapshots
        .iter()
        .filter(|s| s.period.month == engine.config().start.month)
    {
        println!(
            "{:>7} {:>4} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14}",
            snapshot.year_month().to_string(),
            snapshot.self_age,
            snapshot.total_inflow.to_string(),
            snapshot.total_outflow.to_string(),
            snapshot.asset(AssetClass::LiquidCash).to_string(),
            (snapshot.asset(AssetClass::Savings)
                + snapshot.asset(AssetClass::Investment)
                + snapshot.asset(AssetClass::Pension))
            .to_string(),
            snapshot.debt_total.to_string(),
            snapshot.net_worth.to_string(),
        );
    }

    if !result.pension_estimates.is_empty() {
        println!("\nPension estimates:");
        for (id, estimate) in &result.pension_estimates {
            println!(
                "  {:<20} accumulated {:>14}  monthly {:>12}",
                id,
                estimate.accumulated.to_string(),
                estimate.monthly_payment.to_string()
            );
        }
    }

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Starting net worth: {}", summary.starting_net_worth);
    println!("  Final net worth:    {}", summary.final_net_worth);
    println!("  Peak net worth:     {}", summary.peak_net_worth);
    println!("  Lowest net worth:   {}", summary.lowest_net_worth);
    println!("  Deficit periods:    {}", summary.deficit_periods);
    match summary.first_overdraft {
        Some(ym) => println!("  First overdraft:    {}", ym),
        None => println!("  First overdraft:    never"),
    }
    for (id, reason) in &result.unavailable {
        println!("  Unavailable: {} ({})", id, reason);
    }

    write_snapshots_csv(&args.csv, &result.snapshots)
        .with_context(|| format!("writing {}", args.csv.display()))?;
    println!("\nSnapshots written to: {}", args.csv.display());

    if let Some(path) = &args.json {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &result)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Result written to: {}", path.display());
    }

    Ok(())
}
