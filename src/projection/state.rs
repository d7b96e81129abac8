//! Run-private household state, mutated in place period by period

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::engine::FloatingRatePolicy;
use crate::assumptions::ScenarioAssumptions;
use crate::household::{AccountCategory, DebtRate, Household, Owner};
use crate::money::Money;
use crate::timeline::Timeline;

/// Payout progress of a pension account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Distribution {
    #[default]
    NotStarted,
    #[serde(rename_all = "camelCase")]
    Paying {
        monthly_payment: Money,
        months_left: u32,
    },
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountState {
    pub id: String,
    pub category: AccountCategory,
    pub owner: Owner,
    pub balance: Money,
    pub distribution: Distribution,
    /// Set after an arithmetic failure; the balance stays as last computed
    pub frozen: bool,
}

impl AccountState {
    /// Whether the waterfall may route money into this account
    pub fn accepts_allocations(&self) -> bool {
        !self.frozen && self.distribution == Distribution::NotStarted
    }
}

/// Lifecycle of a debt within the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebtPhase {
    /// Starts after the simulation start; principal not yet disbursed
    Pending,
    Active,
    Retired,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DebtState {
    pub id: String,
    pub owner: Owner,
    pub balance: Money,
    pub phase: DebtPhase,
    /// Annual rate fixed at the start for floating debts under `FreezeAtStart`
    pub frozen_rate: Option<f64>,
    /// Equal-principal installment, fixed on the first amortizing period
    pub principal_installment: Option<Money>,
    pub frozen: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RealEstateState {
    pub id: String,
    pub owner: Owner,
    pub value: Money,
}

/// Per-account amounts moved by rules in the current calendar year
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearToDate {
    year: Option<i32>,
    allocated: BTreeMap<String, Money>,
    withdrawn: BTreeMap<String, Money>,
}

impl YearToDate {
    /// Reset the running totals when the calendar year changes
    pub fn roll(&mut self, year: i32) {
        if self.year != Some(year) {
            self.year = Some(year);
            self.allocated.clear();
            self.withdrawn.clear();
        }
    }

    pub fn allocated(&self, account_id: &str) -> Money {
        self.allocated.get(account_id).copied().unwrap_or_default()
    }

    pub fn withdrawn(&self, account_id: &str) -> Money {
        self.withdrawn.get(account_id).copied().unwrap_or_default()
    }

    pub fn record_allocation(&mut self, account_id: &str, amount: Money) {
        *self.allocated.entry(account_id.to_string()).or_default() += amount;
    }

    pub fn record_withdrawal(&mut self, account_id: &str, amount: Money) {
        *self.withdrawn.entry(account_id.to_string()).or_default() += amount;
    }
}

/// Mutable state of every entity during a run
///
/// Entity vectors are index-aligned with the household's entity lists.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdState {
    pub accounts: Vec<AccountState>,
    pub debts: Vec<DebtState>,
    pub real_estate: Vec<RealEstateState>,
    pub ytd: YearToDate,
    /// Entities frozen by an arithmetic failure, with the reason
    pub unavailable: BTreeMap<String, String>,
}

impl HouseholdState {
    /// Initialize state from a household at the simulation start
    pub fn initial(
        household: &Household,
        timeline: &Timeline,
        assumptions: &ScenarioAssumptions,
        floating_rates: FloatingRatePolicy,
    ) -> Self {
        let accounts = household
            .accounts
            .iter()
            .map(|a| AccountState {
                id: a.id.clone(),
                category: a.category,
                owner: a.owner,
                balance: a.balance,
                distribution: Distribution::NotStarted,
                frozen: false,
            })
            .collect();

        let start = timeline.start();
        let debts = household
            .debts
            .iter()
            .map(|d| {
                let (balance, phase) = if d.start > start {
                    (Money::ZERO, DebtPhase::Pending)
                } else if d.starting_balance().is_positive() {
                    (d.starting_balance(), DebtPhase::Active)
                } else {
                    (Money::ZERO, DebtPhase::Retired)
                };

                let frozen_rate = match (floating_rates, d.rate) {
                    (FloatingRatePolicy::FreezeAtStart, DebtRate::Floating { base, spread }) => {
                        let year = d.start.max(start).year;
                        Some(assumptions.annual_rate(base, year) + spread)
                    }
                    _ => None,
                };

                DebtState {
                    id: d.id.clone(),
                    owner: d.owner,
                    balance,
                    phase,
                    frozen_rate,
                    principal_installment: None,
                    frozen: false,
                }
            })
            .collect();

        let real_estate = household
            .real_estate
            .iter()
            .map(|r| RealEstateState {
                id: r.id.clone(),
                owner: r.owner,
                value: r.value,
            })
            .collect();

        Self {
            accounts,
            debts,
            real_estate,
            ytd: YearToDate::default(),
            unavailable: BTreeMap::new(),
        }
    }

    /// Sum of account balances; the overdraft contributes its negative balance
    pub fn account_total(&self) -> Money {
        self.accounts.iter().map(|a| a.balance).sum()
    }

    pub fn real_estate_total(&self) -> Money {
        self.real_estate.iter().map(|r| r.value).sum()
    }

    pub fn debt_total(&self) -> Money {
        self.debts.iter().map(|d| d.balance).sum()
    }

    pub fn net_worth(&self) -> Money {
        self.account_total() + self.real_estate_total() - self.debt_total()
    }

    pub fn account(&self, id: &str) -> Option<&AccountState> {
        self.accounts.iter().find(|a| a.id == id)
    }
}
