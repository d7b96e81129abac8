//! Per-period snapshots and the run result

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::cashflows::{BreakdownEntry, CashFlowSummary, FlowCategory};
use super::state::HouseholdState;
use super::waterfall::WaterfallOutcome;
use crate::finance::PensionEstimate;
use crate::household::AccountCategory;
use crate::money::Money;
use crate::timeline::{Granularity, Period, YearMonth};

/// Asset grouping used in snapshot totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetClass {
    LiquidCash,
    Savings,
    Investment,
    Pension,
    /// Carries the (non-positive) overdraft balance
    Overdraft,
    RealEstate,
}

impl From<AccountCategory> for AssetClass {
    fn from(category: AccountCategory) -> Self {
        match category {
            AccountCategory::LiquidCash => AssetClass::LiquidCash,
            AccountCategory::Savings => AssetClass::Savings,
            AccountCategory::Investment => AssetClass::Investment,
            AccountCategory::Pension => AssetClass::Pension,
            AccountCategory::Overdraft => AssetClass::Overdraft,
        }
    }
}

/// Household position at the end of one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub period: Period,
    pub self_age: u32,
    pub spouse_age: Option<u32>,

    // Cash flow
    pub total_inflow: Money,
    pub total_outflow: Money,
    pub net_cash_flow: Money,
    pub income_by_category: BTreeMap<FlowCategory, Money>,
    pub expense_by_category: BTreeMap<FlowCategory, Money>,
    /// Signed subtotals by owner and category; empty unless detailed output is on
    pub breakdown: Vec<BreakdownEntry>,

    // Balance sheet
    pub assets_by_category: BTreeMap<AssetClass, Money>,
    pub total_assets: Money,
    pub debt_total: Money,
    pub net_worth: Money,
    pub account_balances: BTreeMap<String, Money>,
    pub debt_balances: BTreeMap<String, Money>,
    pub real_estate_values: BTreeMap<String, Money>,

    // Conservation components
    pub starting_net_worth: Money,
    pub asset_growth: Money,
    pub debt_change: Money,

    pub waterfall: WaterfallOutcome,
    /// Entities frozen by an arithmetic failure, at or before this period
    pub unavailable: Vec<String>,
}

/// Inputs to a snapshot that do not live in the household state
#[derive(Debug, Clone)]
pub struct PeriodTotals {
    pub period: Period,
    pub self_age: u32,
    pub spouse_age: Option<u32>,
    pub cash_flow: CashFlowSummary,
    pub starting_net_worth: Money,
    pub asset_growth: Money,
    pub debt_change: Money,
    pub waterfall: WaterfallOutcome,
}

impl Snapshot {
    /// Capture the end-of-period state
    pub fn capture(totals: PeriodTotals, state: &HouseholdState, detailed: bool) -> Self {
        let mut assets_by_category: BTreeMap<AssetClass, Money> = BTreeMap::new();
        for account in &state.accounts {
            *assets_by_category
                .entry(account.category.into())
                .or_default() += account.balance;
        }
        if !state.real_estate.is_empty() {
            assets_by_category.insert(AssetClass::RealEstate, state.real_estate_total());
        }
        let total_assets = assets_by_category.values().copied().sum();
        let debt_total = state.debt_total();

        let PeriodTotals {
            period,
            self_age,
            spouse_age,
            cash_flow,
            starting_net_worth,
            asset_growth,
            debt_change,
            mut waterfall,
        } = totals;

        if !detailed {
            waterfall.steps.clear();
        }

        Self {
            period,
            self_age,
            spouse_age,
            total_inflow: cash_flow.total_inflow,
            total_outflow: cash_flow.total_outflow,
            net_cash_flow: cash_flow.net_cash_flow,
            income_by_category: cash_flow.income_by_category(),
            expense_by_category: cash_flow.expense_by_category(),
            breakdown: if detailed { cash_flow.breakdown } else { Vec::new() },
            assets_by_category,
            total_assets,
            debt_total,
            net_worth: total_assets - debt_total,
            account_balances: state
                .accounts
                .iter()
                .map(|a| (a.id.clone(), a.balance))
                .collect(),
            debt_balances: state
                .debts
                .iter()
                .map(|d| (d.id.clone(), d.balance))
                .collect(),
            real_estate_values: state
                .real_estate
                .iter()
                .map(|r| (r.id.clone(), r.value))
                .collect(),
            starting_net_worth,
            asset_growth,
            debt_change,
            waterfall,
            unavailable: state.unavailable.keys().cloned().collect(),
        }
    }

    pub fn year_month(&self) -> YearMonth {
        self.period.year_month()
    }

    pub fn asset(&self, class: AssetClass) -> Money {
        self.assets_by_category
            .get(&class)
            .copied()
            .unwrap_or_default()
    }

    /// Difference between the ending net worth and the sum of its
    /// components; zero for every period of a correct run
    pub fn conservation_gap(&self) -> Money {
        self.net_worth
            - (self.starting_net_worth + self.net_cash_flow + self.asset_growth - self.debt_change)
    }
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    /// Name of the scenario assumptions used
    pub scenario: String,
    pub granularity: Granularity,
    pub snapshots: Vec<Snapshot>,
    /// Benefit estimate per pension account, made at the simulation start
    pub pension_estimates: BTreeMap<String, PensionEstimate>,
    /// Entity id to the reason it was frozen
    pub unavailable: BTreeMap<String, String>,
}

impl ProjectionResult {
    pub fn new(scenario: impl Into<String>, granularity: Granularity) -> Self {
        Self {
            scenario: scenario.into(),
            granularity,
            snapshots: Vec::new(),
            pension_estimates: BTreeMap::new(),
            unavailable: BTreeMap::new(),
        }
    }

    pub fn add_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_inflow = self.snapshots.iter().map(|s| s.total_inflow).sum();
        let total_outflow = self.snapshots.iter().map(|s| s.total_outflow).sum();
        let net_worths = self.snapshots.iter().map(|s| s.net_worth);

        ProjectionSummary {
            scenario: self.scenario.clone(),
            periods: self.snapshots.len() as u32,
            total_inflow,
            total_outflow,
            starting_net_worth: self
                .snapshots
                .first()
                .map(|s| s.starting_net_worth)
                .unwrap_or_default(),
            final_net_worth: self
                .snapshots
                .last()
                .map(|s| s.net_worth)
                .unwrap_or_default(),
            peak_net_worth: net_worths.clone().max().unwrap_or_default(),
            lowest_net_worth: net_worths.min().unwrap_or_default(),
            deficit_periods: self
                .snapshots
                .iter()
                .filter(|s| s.net_cash_flow.is_negative())
                .count() as u32,
            first_overdraft: self
                .snapshots
                .iter()
                .find(|s| s.asset(AssetClass::Overdraft).is_negative())
                .map(|s| s.year_month()),
            unavailable_entities: self.unavailable.len() as u32,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub scenario: String,
    pub periods: u32,
    pub total_inflow: Money,
    pub total_outflow: Money,
    pub starting_net_worth: Money,
    pub final_net_worth: Money,
    pub peak_net_worth: Money,
    pub lowest_net_worth: Money,
    pub deficit_periods: u32,
    /// First period that ended with the overdraft in use
    pub first_overdraft: Option<YearMonth>,
    pub unavailable_entities: u32,
}
