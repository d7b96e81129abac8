//! Run the sample household under every assumption set in data/assumptions
//!
//! Outputs one summary row per scenario plus a yearly net worth CSV

use household_projection::assumptions::loader::DEFAULT_ASSUMPTIONS_PATH;
use household_projection::household::load_default_household;
use household_projection::{ProjectionConfig, ProjectionResult, ScenarioRunner, YearMonth};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let start = Instant::now();
    let household = load_default_household()?;
    let scenarios = ScenarioRunner::load_scenarios(Path::new(DEFAULT_ASSUMPTIONS_PATH))?;
    println!(
        "Loaded household and {} scenarios in {:?}",
        scenarios.len(),
        start.elapsed()
    );

    let config = ProjectionConfig {
        detailed_output: false,
        ..ProjectionConfig::default()
    };
    let runner = ScenarioRunner::new(household, config);

    println!("Running projections...");
    let proj_start = Instant::now();
    let results = runner.run_all(&scenarios);
    println!("Projections complete in {:?}", proj_start.elapsed());

    println!(
        "\n{:<16} {:>16} {:>16} {:>16} {:>8} {:>10}",
        "Scenario", "Final NW", "Peak NW", "Lowest NW", "Deficit", "Overdraft"
    );
    println!("{}", "-".repeat(88));

    let mut completed: Vec<&ProjectionResult> = Vec::new();
    for (name, result) in &results {
        match result {
            Ok(result) => {
                let s = result.summary();
                println!(
                    "{:<16} {:>16} {:>16} {:>16} {:>8} {:>10}",
                    name,
                    s.final_net_worth.to_string(),
                    s.peak_net_worth.to_string(),
                    s.lowest_net_worth.to_string(),
                    s.deficit_periods,
                    s.first_overdraft
                        .map(|ym| ym.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
                completed.push(result);
            }
            Err(e) => println!("{:<16} failed: {}", name, e),
        }
    }

    // Net worth by year, one column per scenario
    let mut by_year: BTreeMap<YearMonth, Vec<String>> = BTreeMap::new();
    for (i, result) in completed.iter().enumerate() {
        for snapshot in &result.snapshots {
            let row = by_year
                .entry(snapshot.year_month())
                .or_insert_with(|| vec![String::new(); completed.len()]);
            row[i] = snapshot.net_worth.to_string();
        }
    }

    let output_path = "scenario_net_worth.csv";
    let mut file = File::create(output_path)?;
    let header: Vec<&str> = completed.iter().map(|r| r.scenario.as_str()).collect();
    writeln!(file, "Period,{}", header.join(","))?;
    for (ym, row) in &by_year {
        writeln!(file, "{},{}", ym, row.join(","))?;
    }
    println!("\nOutput written to {}", output_path);

    println!("Total time: {:?}", start.elapsed());
    Ok(())
}
