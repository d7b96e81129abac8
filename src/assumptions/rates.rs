//! Rate categories and growth-rate resolution

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of annual rate supplied by the scenario assumption set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RateCategory {
    Inflation,
    Income,
    Investment,
    RealEstate,
    Fixed,
}

impl RateCategory {
    pub const ALL: [RateCategory; 5] = [
        RateCategory::Inflation,
        RateCategory::Income,
        RateCategory::Investment,
        RateCategory::RealEstate,
        RateCategory::Fixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RateCategory::Inflation => "inflation",
            RateCategory::Income => "income",
            RateCategory::Investment => "investment",
            RateCategory::RealEstate => "realEstate",
            RateCategory::Fixed => "fixed",
        }
    }
}

impl fmt::Display for RateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RateCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inflation" => Ok(RateCategory::Inflation),
            "income" => Ok(RateCategory::Income),
            "investment" => Ok(RateCategory::Investment),
            "realestate" | "real_estate" => Ok(RateCategory::RealEstate),
            "fixed" => Ok(RateCategory::Fixed),
            other => Err(format!("unknown rate category: {}", other)),
        }
    }
}

/// Growth rate attached to an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GrowthRate {
    /// Follows the scenario's rate for this category
    Linked(RateCategory),
    /// Entity-specific annual rate, independent of the scenario
    Custom(f64),
}

impl Default for GrowthRate {
    fn default() -> Self {
        GrowthRate::Linked(RateCategory::Fixed)
    }
}

/// Annual rate for every category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub inflation: f64,
    pub income: f64,
    pub investment: f64,
    pub real_estate: f64,
    pub fixed: f64,
}

impl RateTable {
    pub fn get(&self, category: RateCategory) -> f64 {
        match category {
            RateCategory::Inflation => self.inflation,
            RateCategory::Income => self.income,
            RateCategory::Investment => self.investment,
            RateCategory::RealEstate => self.real_estate,
            RateCategory::Fixed => self.fixed,
        }
    }

    pub fn set(&mut self, category: RateCategory, rate: f64) {
        match category {
            RateCategory::Inflation => self.inflation = rate,
            RateCategory::Income => self.income = rate,
            RateCategory::Investment => self.investment = rate,
            RateCategory::RealEstate => self.real_estate = rate,
            RateCategory::Fixed => self.fixed = rate,
        }
    }

    /// All rates zero
    pub fn flat() -> Self {
        Self {
            inflation: 0.0,
            income: 0.0,
            investment: 0.0,
            real_estate: 0.0,
            fixed: 0.0,
        }
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            inflation: 0.025,
            income: 0.03,
            investment: 0.05,
            real_estate: 0.03,
            fixed: 0.0,
        }
    }
}

/// Rate change taking effect from a calendar year onward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateOverride {
    pub from_year: i32,
    pub category: RateCategory,
    pub annual_rate: f64,
}
