//! Cash flow priority rules
//!
//! Allocation rules absorb a surplus, withdrawal rules cover a deficit. Each
//! list is ranked densely 1..N; every structural edit re-derives the ranking.
//! Liquid cash and the overdraft account never appear here, their steps are
//! pinned by the waterfall itself.

use serde::{Deserialize, Serialize};

use super::data::{Account, AccountCategory};
use crate::error::{ProjectionError, Result};
use crate::money::Money;
use crate::timeline::YearMonth;

/// What a rule does with its target account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AllocationMode {
    /// Move as much as possible, optionally capped per calendar year
    #[serde(rename_all = "camelCase")]
    Allocate {
        #[serde(default)]
        annual_limit: Option<Money>,
    },
    /// Top up to (surplus) or keep at least (deficit) a target balance
    MaintainBalance { target: Money },
}

impl AllocationMode {
    pub fn unlimited() -> Self {
        AllocationMode::Allocate { annual_limit: None }
    }
}

/// Months during which a rule is active; `until` is exclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWindow {
    #[serde(default)]
    pub from: Option<YearMonth>,
    #[serde(default)]
    pub until: Option<YearMonth>,
}

impl ActiveWindow {
    pub fn contains(&self, ym: YearMonth) -> bool {
        self.from.map_or(true, |from| ym >= from) && self.until.map_or(true, |until| ym < until)
    }
}

/// One ranked step of a waterfall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowRule {
    pub priority: u32,
    pub account_id: String,
    pub mode: AllocationMode,
    #[serde(default)]
    pub window: Option<ActiveWindow>,
}

pub type AllocationRule = CashFlowRule;
pub type WithdrawalRule = CashFlowRule;

impl CashFlowRule {
    pub fn new(priority: u32, account_id: impl Into<String>, mode: AllocationMode) -> Self {
        Self {
            priority,
            account_id: account_id.into(),
            mode,
            window: None,
        }
    }

    pub fn with_window(mut self, window: ActiveWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn is_active(&self, ym: YearMonth) -> bool {
        self.window.map_or(true, |w| w.contains(ym))
    }
}

/// Ordered allocation and withdrawal lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowPriorities {
    #[serde(default)]
    pub allocation: Vec<AllocationRule>,
    #[serde(default)]
    pub withdrawal: Vec<WithdrawalRule>,
}

impl CashFlowPriorities {
    /// Starter lists: every savings, investment and pension account receives
    /// surpluses; pensions are left out of withdrawals because they cannot be
    /// drawn before distribution starts
    pub fn default_for(accounts: &[Account]) -> Self {
        let mut priorities = Self::default();
        for account in accounts {
            match account.category {
                AccountCategory::Savings | AccountCategory::Investment => {
                    priorities.add_allocation_rule(&account.id, AllocationMode::unlimited());
                    priorities.add_withdrawal_rule(&account.id, AllocationMode::unlimited());
                }
                AccountCategory::Pension => {
                    priorities.add_allocation_rule(&account.id, AllocationMode::unlimited());
                }
                AccountCategory::LiquidCash | AccountCategory::Overdraft => {}
            }
        }
        priorities
    }

    pub fn add_allocation_rule(&mut self, account_id: &str, mode: AllocationMode) -> u32 {
        push_rule(&mut self.allocation, account_id, mode)
    }

    pub fn add_withdrawal_rule(&mut self, account_id: &str, mode: AllocationMode) -> u32 {
        push_rule(&mut self.withdrawal, account_id, mode)
    }

    /// Remove the rule at `priority`; later rules move up one rank
    pub fn remove_allocation_rule(&mut self, priority: u32) -> Option<AllocationRule> {
        remove_rule(&mut self.allocation, priority)
    }

    pub fn remove_withdrawal_rule(&mut self, priority: u32) -> Option<WithdrawalRule> {
        remove_rule(&mut self.withdrawal, priority)
    }

    /// Move the rule at rank `from` to rank `to`
    pub fn move_allocation_rule(&mut self, from: u32, to: u32) -> bool {
        move_rule(&mut self.allocation, from, to)
    }

    pub fn move_withdrawal_rule(&mut self, from: u32, to: u32) -> bool {
        move_rule(&mut self.withdrawal, from, to)
    }

    /// Allocation rules in ascending priority
    pub fn allocation_order(&self) -> Vec<&AllocationRule> {
        sorted(&self.allocation)
    }

    /// Withdrawal rules in ascending priority
    pub fn withdrawal_order(&self) -> Vec<&WithdrawalRule> {
        sorted(&self.withdrawal)
    }

    /// Check both lists hold a dense 1..N ranking
    pub fn check_ranking(&self) -> Result<()> {
        check_dense("allocation rules", &self.allocation)?;
        check_dense("withdrawal rules", &self.withdrawal)
    }
}

fn push_rule(rules: &mut Vec<CashFlowRule>, account_id: &str, mode: AllocationMode) -> u32 {
    rerank(rules);
    let priority = rules.len() as u32 + 1;
    rules.push(CashFlowRule::new(priority, account_id, mode));
    priority
}

fn remove_rule(rules: &mut Vec<CashFlowRule>, priority: u32) -> Option<CashFlowRule> {
    rerank(rules);
    let idx = rules.iter().position(|r| r.priority == priority)?;
    let removed = rules.remove(idx);
    rerank(rules);
    Some(removed)
}

fn move_rule(rules: &mut Vec<CashFlowRule>, from: u32, to: u32) -> bool {
    rerank(rules);
    let len = rules.len() as u32;
    if from == 0 || to == 0 || from > len || to > len {
        return false;
    }
    let rule = rules.remove((from - 1) as usize);
    rules.insert((to - 1) as usize, rule);
    rerank(rules);
    true
}

/// Stable-sort by current priority and renumber 1..N
fn rerank(rules: &mut [CashFlowRule]) {
    rules.sort_by_key(|r| r.priority);
    for (i, rule) in rules.iter_mut().enumerate() {
        rule.priority = i as u32 + 1;
    }
}

fn sorted(rules: &[CashFlowRule]) -> Vec<&CashFlowRule> {
    let mut ordered: Vec<&CashFlowRule> = rules.iter().collect();
    ordered.sort_by_key(|r| r.priority);
    ordered
}

fn check_dense(label: &str, rules: &[CashFlowRule]) -> Result<()> {
    let ordered = sorted(rules);
    for (i, rule) in ordered.iter().enumerate() {
        let expected = i as u32 + 1;
        if rule.priority != expected {
            let reason = if i > 0 && ordered[i - 1].priority == rule.priority {
                format!("duplicate priority {} (account {})", rule.priority, rule.account_id)
            } else {
                format!(
                    "priority {} (account {}) leaves a gap, expected {}",
                    rule.priority, rule.account_id, expected
                )
            };
            return Err(ProjectionError::config(label, reason));
        }
    }
    Ok(())
}
