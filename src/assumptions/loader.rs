//! CSV-based rate assumption loader
//!
//! Expected columns: `category,annual_rate[,from_year]`

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::RateCategory;
use crate::error::LoadError;

/// Default path to the assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

/// Default rate file inside the assumptions directory
pub const DEFAULT_RATES_FILE: &str = "rates.csv";

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    category: String,
    annual_rate: f64,
    #[serde(default)]
    from_year: Option<i32>,
}

/// One parsed rate row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateRow {
    pub category: RateCategory,
    pub annual_rate: f64,
    pub from_year: Option<i32>,
}

/// Load rate rows from a CSV file
pub fn load_rate_rows(path: &Path) -> Result<Vec<RateRow>, LoadError> {
    let file = File::open(path)?;
    parse_rate_rows(file, &path.display().to_string())
}

/// Load rate rows from any reader
pub fn parse_rate_rows<R: Read>(reader: R, source: &str) -> Result<Vec<RateRow>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        let category = row
            .category
            .parse::<RateCategory>()
            .map_err(|reason| LoadError::Invalid {
                file: source.to_string(),
                reason,
            })?;
        if !row.annual_rate.is_finite() || row.annual_rate <= -1.0 {
            return Err(LoadError::Invalid {
                file: source.to_string(),
                reason: format!("rate {} for {} is out of range", row.annual_rate, category),
            });
        }
        rows.push(RateRow {
            category,
            annual_rate: row.annual_rate,
            from_year: row.from_year,
        });
    }

    Ok(rows)
}
