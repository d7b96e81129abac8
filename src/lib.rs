//! Household Projection - deterministic multi-year financial projection engine
//!
//! This library provides:
//! - Household model: people, income and expense streams, accounts, debts, real estate
//! - Scenario assumptions with year-based rate overrides
//! - Loan amortization and pension accumulation/distribution math
//! - Period-by-period projection with a priority-ordered cash flow waterfall
//! - Per-period snapshots with an exact net worth conservation check
//! - Parallel multi-scenario runs

pub mod assumptions;
pub mod error;
pub mod finance;
pub mod household;
pub mod money;
pub mod projection;
pub mod scenario;
pub mod timeline;

// Re-export commonly used types
pub use assumptions::{GrowthRate, RateCategory, ScenarioAssumptions};
pub use error::{LoadError, ProjectionError};
pub use household::Household;
pub use money::Money;
pub use projection::{ProjectionConfig, ProjectionEngine, ProjectionResult, ProjectionSummary, Snapshot};
pub use scenario::ScenarioRunner;
pub use timeline::{Granularity, Timeline, YearMonth};
