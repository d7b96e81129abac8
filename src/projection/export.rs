//! Snapshot export: one CSV row per period

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use super::snapshot::{AssetClass, Snapshot};

/// Flat view of a snapshot; money columns are in major units
#[derive(Debug, Serialize)]
struct SnapshotRecord {
    period: u32,
    year: i32,
    month: u32,
    self_age: u32,
    spouse_age: Option<u32>,
    total_inflow: String,
    total_outflow: String,
    net_cash_flow: String,
    liquid_cash: String,
    savings: String,
    investment: String,
    pension: String,
    overdraft: String,
    real_estate: String,
    total_assets: String,
    debt_total: String,
    net_worth: String,
    unavailable: String,
}

impl From<&Snapshot> for SnapshotRecord {
    fn from(s: &Snapshot) -> Self {
        Self {
            period: s.period.index,
            year: s.period.year,
            month: s.period.month,
            self_age: s.self_age,
            spouse_age: s.spouse_age,
            total_inflow: s.total_inflow.to_string(),
            total_outflow: s.total_outflow.to_string(),
            net_cash_flow: s.net_cash_flow.to_string(),
            liquid_cash: s.asset(AssetClass::LiquidCash).to_string(),
            savings: s.asset(AssetClass::Savings).to_string(),
            investment: s.asset(AssetClass::Investment).to_string(),
            pension: s.asset(AssetClass::Pension).to_string(),
            overdraft: s.asset(AssetClass::Overdraft).to_string(),
            real_estate: s.asset(AssetClass::RealEstate).to_string(),
            total_assets: s.total_assets.to_string(),
            debt_total: s.debt_total.to_string(),
            net_worth: s.net_worth.to_string(),
            unavailable: s.unavailable.join(";"),
        }
    }
}

/// Write snapshots as CSV to any writer
pub fn write_snapshots<W: Write>(writer: W, snapshots: &[Snapshot]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for snapshot in snapshots {
        wtr.serialize(SnapshotRecord::from(snapshot))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write snapshots as CSV to a file
pub fn write_snapshots_csv<P: AsRef<Path>>(path: P, snapshots: &[Snapshot]) -> Result<(), csv::Error> {
    let file = std::fs::File::create(path)?;
    write_snapshots(file, snapshots)
}
