//! Load a household document from JSON

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::Household;
use crate::error::LoadError;

/// Default household document location
pub const DEFAULT_HOUSEHOLD_PATH: &str = "data/household.json";

/// Load a household from a JSON file
pub fn load_household<P: AsRef<Path>>(path: P) -> Result<Household, LoadError> {
    let file = File::open(path)?;
    load_household_from_reader(BufReader::new(file))
}

/// Load a household from any reader (e.g., string buffer, network stream)
pub fn load_household_from_reader<R: Read>(reader: R) -> Result<Household, LoadError> {
    let household: Household = serde_json::from_reader(reader)?;
    Ok(household)
}

/// Load the sample household shipped in `data/`
pub fn load_default_household() -> Result<Household, LoadError> {
    load_household(DEFAULT_HOUSEHOLD_PATH)
}
