//! Waterfall allocation of a period's net cash flow
//!
//! A surplus pays down the overdraft, then walks the allocation rules, then
//! lands in liquid cash. A deficit draws liquid cash, then walks the
//! withdrawal rules, then charges the overdraft. Both branches are a single
//! linear pass and record every step they take.

use serde::{Deserialize, Serialize};

use super::state::{AccountState, YearToDate};
use crate::error::{ProjectionError, Result};
use crate::household::{AccountCategory, AllocationMode, CashFlowPriorities, CashFlowRule};
use crate::money::Money;
use crate::timeline::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Surplus,
    Deficit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    OverdraftRepayment,
    Allocation,
    CashDeposit,
    CashDraw,
    Withdrawal,
    OverdraftCharge,
}

/// One movement between the period's cash flow and an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallStep {
    pub kind: StepKind,
    pub account_id: String,
    /// Rank of the rule that produced the step, for ranked steps only
    pub priority: Option<u32>,
    pub amount: Money,
}

/// Where a period's net cash flow went (or came from)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallOutcome {
    pub direction: Direction,
    pub net_cash_flow: Money,
    /// Overdraft paydown (surplus) or charge (deficit)
    pub overdraft: Money,
    /// Total across ranked rules
    pub ranked: Money,
    /// Deposited into (surplus) or drawn from (deficit) liquid cash
    pub cash: Money,
    pub steps: Vec<WaterfallStep>,
}

impl WaterfallOutcome {
    fn new(net_cash_flow: Money) -> Self {
        Self {
            direction: if net_cash_flow.is_negative() {
                Direction::Deficit
            } else {
                Direction::Surplus
            },
            net_cash_flow,
            overdraft: Money::ZERO,
            ranked: Money::ZERO,
            cash: Money::ZERO,
            steps: Vec::new(),
        }
    }

    fn record(&mut self, kind: StepKind, account_id: &str, priority: Option<u32>, amount: Money) {
        if amount.is_positive() {
            self.steps.push(WaterfallStep {
                kind,
                account_id: account_id.to_string(),
                priority,
                amount,
            });
        }
    }

    /// Amount the outcome accounts for; equals `|net_cash_flow|` when complete
    pub fn placed(&self) -> Money {
        self.overdraft + self.ranked + self.cash
    }
}

/// Applies one period's net cash flow to the account balances
pub struct WaterfallAllocator<'a> {
    priorities: &'a CashFlowPriorities,
    period: Period,
}

impl<'a> WaterfallAllocator<'a> {
    pub fn new(priorities: &'a CashFlowPriorities, period: Period) -> Self {
        Self { priorities, period }
    }

    pub fn apply(
        &self,
        net_cash_flow: Money,
        accounts: &mut [AccountState],
        ytd: &mut YearToDate,
    ) -> Result<WaterfallOutcome> {
        self.check_ranking("allocation", &self.priorities.allocation)?;
        self.check_ranking("withdrawal", &self.priorities.withdrawal)?;
        ytd.roll(self.period.year);

        let cash = self.pinned(accounts, AccountCategory::LiquidCash)?;
        let overdraft = self.pinned(accounts, AccountCategory::Overdraft)?;

        let mut outcome = WaterfallOutcome::new(net_cash_flow);
        if net_cash_flow.is_negative() {
            self.deficit(-net_cash_flow, accounts, cash, overdraft, ytd, &mut outcome)?;
        } else {
            self.surplus(net_cash_flow, accounts, cash, overdraft, ytd, &mut outcome)?;
        }

        if outcome.placed() != net_cash_flow.abs() {
            return Err(ProjectionError::invariant(
                self.period.index,
                None,
                format!(
                    "waterfall placed {} of a net cash flow of {}",
                    outcome.placed(),
                    net_cash_flow
                ),
            ));
        }
        self.check_balances(accounts)?;
        Ok(outcome)
    }

    fn surplus(
        &self,
        surplus: Money,
        accounts: &mut [AccountState],
        cash: usize,
        overdraft: usize,
        ytd: &mut YearToDate,
        outcome: &mut WaterfallOutcome,
    ) -> Result<()> {
        let mut remaining = surplus;

        let owed = (-accounts[overdraft].balance).non_negative();
        let paydown = remaining.min(owed);
        accounts[overdraft].balance += paydown;
        remaining -= paydown;
        outcome.overdraft = paydown;
        outcome.record(StepKind::OverdraftRepayment, &accounts[overdraft].id, None, paydown);

        for rule in self.priorities.allocation_order() {
            if !remaining.is_positive() {
                break;
            }
            if !rule.is_active(self.period.year_month()) {
                continue;
            }
            let idx = self.target(accounts, rule)?;
            let account = &accounts[idx];
            if !account.accepts_allocations() {
                continue;
            }

            let room = match rule.mode {
                AllocationMode::Allocate { annual_limit: None } => remaining,
                AllocationMode::Allocate {
                    annual_limit: Some(limit),
                } => (limit - ytd.allocated(&account.id)).non_negative(),
                AllocationMode::MaintainBalance { target } => {
                    (target - account.balance).non_negative()
                }
            };
            let amount = remaining.min(room);
            if !amount.is_positive() {
                continue;
            }

            let account = &mut accounts[idx];
            account.balance += amount;
            ytd.record_allocation(&account.id, amount);
            remaining -= amount;
            outcome.ranked += amount;
            outcome.record(StepKind::Allocation, &account.id, Some(rule.priority), amount);
        }

        accounts[cash].balance += remaining;
        outcome.cash = remaining;
        outcome.record(StepKind::CashDeposit, &accounts[cash].id, None, remaining);
        Ok(())
    }

    fn deficit(
        &self,
        shortfall: Money,
        accounts: &mut [AccountState],
        cash: usize,
        overdraft: usize,
        ytd: &mut YearToDate,
        outcome: &mut WaterfallOutcome,
    ) -> Result<()> {
        let mut remaining = shortfall;

        let draw = remaining.min(accounts[cash].balance.non_negative());
        accounts[cash].balance -= draw;
        remaining -= draw;
        outcome.cash = draw;
        outcome.record(StepKind::CashDraw, &accounts[cash].id, None, draw);

        for rule in self.priorities.withdrawal_order() {
            if !remaining.is_positive() {
                break;
            }
            if !rule.is_active(self.period.year_month()) {
                continue;
            }
            let idx = self.target(accounts, rule)?;
            let account = &accounts[idx];
            if account.frozen {
                continue;
            }

            let balance = account.balance.non_negative();
            let available = match rule.mode {
                AllocationMode::Allocate { annual_limit: None } => balance,
                AllocationMode::Allocate {
                    annual_limit: Some(limit),
                } => balance.min((limit - ytd.withdrawn(&account.id)).non_negative()),
                AllocationMode::MaintainBalance { target } => (balance - target).non_negative(),
            };
            let amount = remaining.min(available);
            if !amount.is_positive() {
                continue;
            }

            let account = &mut accounts[idx];
            account.balance -= amount;
            ytd.record_withdrawal(&account.id, amount);
            remaining -= amount;
            outcome.ranked += amount;
            outcome.record(StepKind::Withdrawal, &account.id, Some(rule.priority), amount);
        }

        accounts[overdraft].balance -= remaining;
        outcome.overdraft = remaining;
        outcome.record(StepKind::OverdraftCharge, &accounts[overdraft].id, None, remaining);
        Ok(())
    }

    fn pinned(&self, accounts: &[AccountState], category: AccountCategory) -> Result<usize> {
        accounts
            .iter()
            .position(|a| a.category == category)
            .ok_or_else(|| {
                ProjectionError::invariant(
                    self.period.index,
                    None,
                    format!("no {} account", category.as_str()),
                )
            })
    }

    fn target(&self, accounts: &[AccountState], rule: &CashFlowRule) -> Result<usize> {
        accounts
            .iter()
            .position(|a| a.id == rule.account_id)
            .ok_or_else(|| {
                ProjectionError::invariant(
                    self.period.index,
                    Some(rule.priority),
                    format!("rule targets unknown account {}", rule.account_id),
                )
            })
    }

    fn check_ranking(&self, label: &str, rules: &[CashFlowRule]) -> Result<()> {
        let mut ranks: Vec<u32> = rules.iter().map(|r| r.priority).collect();
        ranks.sort_unstable();
        for (i, rank) in ranks.into_iter().enumerate() {
            if rank != i as u32 + 1 {
                return Err(ProjectionError::invariant(
                    self.period.index,
                    Some(rank),
                    format!("{} rules are not densely ranked", label),
                ));
            }
        }
        Ok(())
    }

    fn check_balances(&self, accounts: &[AccountState]) -> Result<()> {
        match accounts
            .iter()
            .find(|a| a.category != AccountCategory::Overdraft && a.balance.is_negative())
        {
            Some(account) => Err(ProjectionError::invariant(
                self.period.index,
                None,
                format!("account {} went negative ({})", account.id, account.balance),
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::household::Owner;
    use crate::projection::state::Distribution;

    fn account(id: &str, category: AccountCategory, balance: i64) -> AccountState {
        AccountState {
            id: id.to_string(),
            category,
            owner: Owner::Common,
            balance: Money::from_major(balance),
            distribution: Distribution::NotStarted,
            frozen: false,
        }
    }

    fn accounts(cash: i64, overdraft: i64) -> Vec<AccountState> {
        vec![
            account("cash", AccountCategory::LiquidCash, cash),
            account("overdraft", AccountCategory::Overdraft, overdraft),
            account("emergency", AccountCategory::Savings, 2_000),
            account("ira", AccountCategory::Investment, 0),
            account("brokerage", AccountCategory::Investment, 10_000),
        ]
    }

    fn period(index: u32, year: i32) -> Period {
        Period { index, year, month: 1 }
    }

    fn balance(accounts: &[AccountState], id: &str) -> Money {
        accounts.iter().find(|a| a.id == id).unwrap().balance
    }

    fn priorities() -> CashFlowPriorities {
        let mut p = CashFlowPriorities::default();
        p.add_allocation_rule("emergency", AllocationMode::MaintainBalance { target: Money::from_major(5_000) });
        p.add_allocation_rule("ira", AllocationMode::Allocate { annual_limit: Some(Money::from_major(7_000)) });
        p.add_allocation_rule("brokerage", AllocationMode::Allocate { annual_limit: Some(Money::from_major(1_000)) });
        p.add_withdrawal_rule("brokerage", AllocationMode::unlimited());
        p.add_withdrawal_rule("emergency", AllocationMode::MaintainBalance { target: Money::from_major(1_500) });
        p
    }

    #[test]
    fn test_surplus_walks_rules_in_order() {
        let p = priorities();
        let mut accts = accounts(0, -500);
        let mut ytd = YearToDate::default();

        let outcome = WaterfallAllocator::new(&p, period(0, 2025))
            .apply(Money::from_major(15_000), &mut accts, &mut ytd)
            .unwrap();

        assert_eq!(balance(&accts, "overdraft"), Money::ZERO);
        assert_eq!(balance(&accts, "emergency"), Money::from_major(5_000));
        assert_eq!(balance(&accts, "ira"), Money::from_major(7_000));
        assert_eq!(balance(&accts, "brokerage"), Money::from_major(11_000));
        assert_eq!(balance(&accts, "cash"), Money::from_major(3_500));

        assert_eq!(outcome.direction, Direction::Surplus);
        assert_eq!(outcome.overdraft, Money::from_major(500));
        assert_eq!(outcome.ranked, Money::from_major(11_000));
        assert_eq!(outcome.cash, Money::from_major(3_500));
        let kinds: Vec<StepKind> = outcome.steps.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::OverdraftRepayment,
                StepKind::Allocation,
                StepKind::Allocation,
                StepKind::Allocation,
                StepKind::CashDeposit,
            ]
        );
    }

    #[test]
    fn test_annual_limit_spans_periods_and_resets() {
        let mut p = CashFlowPriorities::default();
        p.add_allocation_rule("ira", AllocationMode::Allocate { annual_limit: Some(Money::from_major(7_000)) });
        let mut accts = accounts(0, 0);
        let mut ytd = YearToDate::default();

        for month in 0..2 {
            WaterfallAllocator::new(&p, period(month, 2025))
                .apply(Money::from_major(5_000), &mut accts, &mut ytd)
                .unwrap();
        }
        assert_eq!(balance(&accts, "ira"), Money::from_major(7_000));
        assert_eq!(balance(&accts, "cash"), Money::from_major(3_000));

        WaterfallAllocator::new(&p, period(12, 2026))
            .apply(Money::from_major(5_000), &mut accts, &mut ytd)
            .unwrap();
        assert_eq!(balance(&accts, "ira"), Money::from_major(12_000));
    }

    #[test]
    fn test_deficit_draws_cash_then_rules_then_overdraft() {
        let p = priorities();
        let mut accts = accounts(1_000, 0);
        let mut ytd = YearToDate::default();

        let outcome = WaterfallAllocator::new(&p, period(0, 2025))
            .apply(Money::from_major(-12_000), &mut accts, &mut ytd)
            .unwrap();

        assert_eq!(balance(&accts, "cash"), Money::ZERO);
        assert_eq!(balance(&accts, "brokerage"), Money::ZERO);
        // Only the part above the 1,500 floor is available
        assert_eq!(balance(&accts, "emergency"), Money::from_major(1_500));
        assert_eq!(balance(&accts, "overdraft"), Money::from_major(-500));

        assert_eq!(outcome.direction, Direction::Deficit);
        assert_eq!(outcome.cash, Money::from_major(1_000));
        assert_eq!(outcome.ranked, Money::from_major(10_500));
        assert_eq!(outcome.overdraft, Money::from_major(500));
        assert_eq!(outcome.placed(), Money::from_major(12_000));
    }

    #[test]
    fn test_inactive_rule_is_skipped() {
        let mut p = CashFlowPriorities::default();
        p.allocation.push(
            CashFlowRule::new(1, "ira", AllocationMode::unlimited()).with_window(
                crate::household::ActiveWindow {
                    from: Some(crate::timeline::YearMonth::new(2030, 1)),
                    until: None,
                },
            ),
        );
        let mut accts = accounts(0, 0);
        let mut ytd = YearToDate::default();

        WaterfallAllocator::new(&p, period(0, 2025))
            .apply(Money::from_major(100), &mut accts, &mut ytd)
            .unwrap();
        assert_eq!(balance(&accts, "ira"), Money::ZERO);
        assert_eq!(balance(&accts, "cash"), Money::from_major(100));
    }

    #[test]
    fn test_distributing_account_takes_no_allocations() {
        let mut p = CashFlowPriorities::default();
        p.add_allocation_rule("ira", AllocationMode::unlimited());
        let mut accts = accounts(0, 0);
        accts[3].distribution = Distribution::Finished;
        let mut ytd = YearToDate::default();

        WaterfallAllocator::new(&p, period(0, 2025))
            .apply(Money::from_major(100), &mut accts, &mut ytd)
            .unwrap();
        assert_eq!(balance(&accts, "ira"), Money::ZERO);
    }

    #[test]
    fn test_gapped_ranking_is_invariant_violation() {
        let mut p = CashFlowPriorities::default();
        p.withdrawal.push(CashFlowRule::new(2, "ira", AllocationMode::unlimited()));
        let mut accts = accounts(0, 0);
        let mut ytd = YearToDate::default();

        let err = WaterfallAllocator::new(&p, period(4, 2025))
            .apply(Money::from_major(-100), &mut accts, &mut ytd)
            .unwrap_err();
        assert_eq!(
            err,
            ProjectionError::invariant(4, Some(2), "withdrawal rules are not densely ranked")
        );
    }

    #[test]
    fn test_negative_balance_outside_overdraft_is_invariant_violation() {
        let p = CashFlowPriorities::default();
        let mut accts = accounts(0, 0);
        accts[2].balance = Money::from_major(-1);
        let mut ytd = YearToDate::default();

        let err = WaterfallAllocator::new(&p, period(0, 2025))
            .apply(Money::ZERO, &mut accts, &mut ytd)
            .unwrap_err();
        assert!(err.to_string().contains("emergency"));
    }
}
