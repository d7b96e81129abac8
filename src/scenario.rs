//! Scenario runner for batch projections
//!
//! Holds one household and runs it under many assumption sets. Each run owns
//! its own state copy, so scenarios execute in parallel.

use rayon::prelude::*;
use std::path::Path;

use crate::assumptions::ScenarioAssumptions;
use crate::error::{LoadError, Result};
use crate::household::Household;
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};

/// Runs one household under many scenarios
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(household, ProjectionConfig::default());
/// let scenarios = ScenarioRunner::load_scenarios(Path::new("data/assumptions"))?;
/// for (name, result) in runner.run_all(&scenarios) { ... }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    household: Household,
    config: ProjectionConfig,
}

impl ScenarioRunner {
    pub fn new(household: Household, config: ProjectionConfig) -> Self {
        Self { household, config }
    }

    /// Run the household under a single scenario
    pub fn run(&self, assumptions: &ScenarioAssumptions) -> Result<ProjectionResult> {
        let engine = ProjectionEngine::new(assumptions.clone(), self.config.clone());
        engine.project_household(&self.household)
    }

    /// Run every scenario in parallel, keeping input order
    pub fn run_all(
        &self,
        scenarios: &[ScenarioAssumptions],
    ) -> Vec<(String, Result<ProjectionResult>)> {
        scenarios
            .par_iter()
            .map(|assumptions| (assumptions.name.clone(), self.run(assumptions)))
            .collect()
    }

    /// Run the same scenario under several configurations
    pub fn run_configs(
        &self,
        assumptions: &ScenarioAssumptions,
        configs: &[ProjectionConfig],
    ) -> Vec<Result<ProjectionResult>> {
        configs
            .par_iter()
            .map(|config| {
                ProjectionEngine::new(assumptions.clone(), config.clone())
                    .project_household(&self.household)
            })
            .collect()
    }

    /// Load every `*.csv` assumption file in a directory, sorted by name
    pub fn load_scenarios(dir: &Path) -> std::result::Result<Vec<ScenarioAssumptions>, LoadError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().map_or(false, |ext| ext == "csv"))
            .collect();
        paths.sort();

        paths
            .iter()
            .map(|p| ScenarioAssumptions::from_csv_path(p))
            .collect()
    }

    pub fn household(&self) -> &Household {
        &self.household
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ProjectionConfig {
        &mut self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{RateCategory, RateTable};
    use crate::household::{Account, AccountCategory, AllocationMode};
    use crate::money::Money;
    use crate::timeline::{Granularity, YearMonth};
    use chrono::NaiveDate;

    fn runner() -> ScenarioRunner {
        let mut h = Household::single(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(), 60, 80);
        h.accounts.push(Account::new("brokerage", AccountCategory::Investment, Money::from_major(100_000)));
        h.priorities.add_allocation_rule("brokerage", AllocationMode::unlimited());
        ScenarioRunner::new(h, ProjectionConfig::starting(YearMonth::new(2025, 1)))
    }

    #[test]
    fn test_scenarios_run_in_input_order() {
        let runner = runner();
        let scenarios: Vec<_> = [0.02, 0.05, 0.08]
            .iter()
            .map(|&rate| {
                let mut table = RateTable::flat();
                table.set(RateCategory::Investment, rate);
                ScenarioAssumptions::with_rates(format!("inv-{}", rate), table)
            })
            .collect();

        let results = runner.run_all(&scenarios);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, "inv-0.02");

        let finals: Vec<Money> = results
            .iter()
            .map(|(_, r)| r.as_ref().unwrap().summary().final_net_worth)
            .collect();
        // Higher investment return should give a higher final net worth
        assert!(finals[0] < finals[1] && finals[1] < finals[2]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let runner = runner();
        let scenario = ScenarioAssumptions::default_assumptions();
        let parallel = runner.run_all(std::slice::from_ref(&scenario));
        let sequential = runner.run(&scenario).unwrap();
        assert_eq!(parallel[0].1.as_ref().unwrap(), &sequential);
    }

    #[test]
    fn test_run_configs_by_granularity() {
        let runner = runner();
        let configs: Vec<_> = [Granularity::Annual, Granularity::Monthly]
            .iter()
            .map(|&granularity| ProjectionConfig {
                granularity,
                ..runner.config().clone()
            })
            .collect();
        let results = runner.run_configs(&ScenarioAssumptions::flat(), &configs);
        assert_eq!(results[0].as_ref().unwrap().snapshots.len(), 26);
        assert_eq!(results[1].as_ref().unwrap().snapshots.len(), 301);
    }

    #[test]
    fn test_load_bundled_scenarios() {
        let dir = Path::new(crate::assumptions::loader::DEFAULT_ASSUMPTIONS_PATH);
        let scenarios = ScenarioRunner::load_scenarios(dir).unwrap();
        let names: Vec<&str> = scenarios.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["rates", "stress"]);
    }
}
