//! Scenario assumptions: the annual rate behind every rate category
//!
//! An assumption set is an immutable value passed into each run. The engine
//! never hardcodes a growth, return or inflation rate; it asks this set.

mod rates;
pub mod loader;

pub use rates::{GrowthRate, RateCategory, RateOverride, RateTable};
pub use loader::RateRow;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::LoadError;

/// Named set of annual rates, optionally varying by calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioAssumptions {
    pub name: String,
    pub base: RateTable,
    /// Applied in `from_year` order; the latest override at or before a year wins
    #[serde(default)]
    pub overrides: Vec<RateOverride>,
}

impl ScenarioAssumptions {
    /// Moderate default planning assumptions
    pub fn default_assumptions() -> Self {
        Self::with_rates("default", RateTable::default())
    }

    pub fn with_rates(name: impl Into<String>, base: RateTable) -> Self {
        Self {
            name: name.into(),
            base,
            overrides: Vec::new(),
        }
    }

    /// Every category at 0%
    pub fn flat() -> Self {
        Self::with_rates("flat", RateTable::flat())
    }

    /// Add a year-based override, keeping overrides sorted by year
    pub fn with_override(mut self, from_year: i32, category: RateCategory, annual_rate: f64) -> Self {
        self.overrides.push(RateOverride {
            from_year,
            category,
            annual_rate,
        });
        self.overrides.sort_by_key(|o| o.from_year);
        self
    }

    /// Annual rate for a category in a given calendar year
    pub fn annual_rate(&self, category: RateCategory, year: i32) -> f64 {
        self.overrides
            .iter()
            .rev()
            .find(|o| o.category == category && o.from_year <= year)
            .map(|o| o.annual_rate)
            .unwrap_or_else(|| self.base.get(category))
    }

    /// Resolve an entity growth rate to an annual rate
    pub fn resolve(&self, rate: &GrowthRate, year: i32) -> f64 {
        match rate {
            GrowthRate::Linked(category) => self.annual_rate(*category, year),
            GrowthRate::Custom(annual) => *annual,
        }
    }

    /// Load an assumption set from a `category,annual_rate[,from_year]` CSV
    pub fn from_csv_path(path: &Path) -> Result<Self, LoadError> {
        let rows = loader::load_rate_rows(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scenario".to_string());
        Ok(Self::from_rows(name, &rows))
    }

    /// Build from parsed rows; rows without a year set the base rate
    pub fn from_rows(name: impl Into<String>, rows: &[RateRow]) -> Self {
        let mut base = RateTable::flat();
        let mut overrides = Vec::new();

        for row in rows {
            match row.from_year {
                None => base.set(row.category, row.annual_rate),
                Some(year) => overrides.push(RateOverride {
                    from_year: year,
                    category: row.category,
                    annual_rate: row.annual_rate,
                }),
            }
        }
        overrides.sort_by_key(|o| o.from_year);

        Self {
            name: name.into(),
            base,
            overrides,
        }
    }
}

impl Default for ScenarioAssumptions {
    fn default() -> Self {
        Self::default_assumptions()
    }
}
