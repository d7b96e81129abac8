//! Projection engine for multi-year household projections

mod state;
mod engine;
mod cashflows;
mod projector;
mod waterfall;
mod snapshot;
pub mod export;

pub use state::{AccountState, DebtPhase, DebtState, Distribution, HouseholdState, RealEstateState, YearToDate};
pub use engine::{FloatingRatePolicy, ProjectionConfig, ProjectionEngine};
pub use cashflows::{BreakdownEntry, CashFlowSummary, Flow, FlowCategory};
pub use projector::{
    project_account, project_debt, project_real_estate, project_stream, AccountStep, DebtStep,
    PeriodContext, RealEstateStep,
};
pub use waterfall::{Direction, StepKind, WaterfallAllocator, WaterfallOutcome, WaterfallStep};
pub use snapshot::{AssetClass, PeriodTotals, ProjectionResult, ProjectionSummary, Snapshot};
