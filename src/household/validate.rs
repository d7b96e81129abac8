//! Up-front validation of a household before projection
//!
//! Every check fails fast with a configuration error naming the offending
//! entity, so nothing malformed reaches the period loop.

use std::collections::HashSet;

use super::data::{AccountCategory, EndCondition, Household, Owner, RepaymentType};
use super::rules::{AllocationMode, CashFlowRule};
use crate::error::{ProjectionError, Result};

/// Validate a household whose pinned accounts have already been ensured
pub fn validate_household(household: &Household) -> Result<()> {
    check_people(household)?;
    check_unique_ids(household)?;
    check_streams(household)?;
    check_accounts(household)?;
    check_debts(household)?;
    check_real_estate(household)?;
    check_rules(household)?;
    Ok(())
}

fn check_people(household: &Household) -> Result<()> {
    let people = std::iter::once(("self", &household.person))
        .chain(household.spouse.as_ref().map(|s| ("spouse", s)));
    for (label, person) in people {
        if person.life_expectancy == 0 {
            return Err(ProjectionError::config(label, "life expectancy must be positive"));
        }
        if person.retirement_age > person.life_expectancy {
            return Err(ProjectionError::config(
                label,
                "retirement age exceeds life expectancy",
            ));
        }
    }
    Ok(())
}

fn check_unique_ids(household: &Household) -> Result<()> {
    let mut seen = HashSet::new();
    let ids = household
        .incomes
        .iter()
        .map(|s| &s.id)
        .chain(household.expenses.iter().map(|s| &s.id))
        .chain(household.real_estate.iter().map(|r| &r.id))
        .chain(household.accounts.iter().map(|a| &a.id))
        .chain(household.debts.iter().map(|d| &d.id));

    for id in ids {
        if id.is_empty() {
            return Err(ProjectionError::config("household", "entity with empty id"));
        }
        if !seen.insert(id.as_str()) {
            return Err(ProjectionError::config(id.as_str(), "duplicate entity id"));
        }
    }
    Ok(())
}

fn check_end(household: &Household, id: &str, end: &EndCondition) -> Result<()> {
    household.resolve_end(end, id).map(|_| ())
}

fn check_streams(household: &Household) -> Result<()> {
    for stream in household.incomes.iter().chain(household.expenses.iter()) {
        if stream.amount.is_negative() {
            return Err(ProjectionError::config(&stream.id, "amount must not be negative"));
        }
        let end = household.resolve_end(&stream.end, &stream.id)?;
        if let (Some(start), Some(end)) = (stream.start, end) {
            if end < start {
                return Err(ProjectionError::config(&stream.id, "stream ends before it starts"));
            }
        }
        if stream.owner == Owner::Spouse && household.spouse.is_none() {
            return Err(ProjectionError::config(&stream.id, "owned by a spouse, but none is defined"));
        }
    }
    Ok(())
}

fn check_accounts(household: &Household) -> Result<()> {
    let cash_count = household
        .accounts
        .iter()
        .filter(|a| a.category == AccountCategory::LiquidCash)
        .count();
    let overdraft_count = household
        .accounts
        .iter()
        .filter(|a| a.category == AccountCategory::Overdraft)
        .count();
    if cash_count != 1 {
        return Err(ProjectionError::config(
            "accounts",
            format!("expected exactly one liquid cash account, found {}", cash_count),
        ));
    }
    if overdraft_count != 1 {
        return Err(ProjectionError::config(
            "accounts",
            format!("expected exactly one overdraft account, found {}", overdraft_count),
        ));
    }

    for account in &household.accounts {
        if account.balance.is_negative() && account.category != AccountCategory::Overdraft {
            return Err(ProjectionError::config(&account.id, "only the overdraft account may start negative"));
        }
        if account.owner == Owner::Spouse && household.spouse.is_none() {
            return Err(ProjectionError::config(&account.id, "owned by a spouse, but none is defined"));
        }
        if let Some(contribution) = &account.contribution {
            if contribution.amount.is_negative() {
                return Err(ProjectionError::config(&account.id, "negative contribution"));
            }
            if account.is_pinned() {
                return Err(ProjectionError::config(
                    &account.id,
                    "cash and overdraft accounts cannot take scheduled contributions",
                ));
            }
            check_end(household, &account.id, &contribution.end)?;
        }
        if account.pension.is_some() && account.category != AccountCategory::Pension {
            return Err(ProjectionError::config(&account.id, "pension terms on a non-pension account"));
        }
    }
    Ok(())
}

fn check_debts(household: &Household) -> Result<()> {
    for debt in &household.debts {
        if debt.maturity <= debt.start {
            return Err(ProjectionError::config(&debt.id, "maturity must be after start"));
        }
        if debt.owner == Owner::Spouse && household.spouse.is_none() {
            return Err(ProjectionError::config(&debt.id, "owned by a spouse, but none is defined"));
        }
        if debt.principal.is_negative() || debt.starting_balance().is_negative() {
            return Err(ProjectionError::config(&debt.id, "principal must not be negative"));
        }
        if let RepaymentType::GraceThenAmortize { grace_months, .. } = debt.repayment {
            if grace_months as i64 >= debt.term_months() {
                return Err(ProjectionError::config(&debt.id, "grace window covers the whole term"));
            }
        }
        if let Some(re_id) = &debt.secured_by {
            if !household.real_estate.iter().any(|r| &r.id == re_id) {
                return Err(ProjectionError::config(
                    &debt.id,
                    format!("secured by unknown property {}", re_id),
                ));
            }
        }
    }
    Ok(())
}

fn check_real_estate(household: &Household) -> Result<()> {
    for holding in &household.real_estate {
        if holding.value.is_negative() {
            return Err(ProjectionError::config(&holding.id, "value must not be negative"));
        }
        if holding.owner == Owner::Spouse && household.spouse.is_none() {
            return Err(ProjectionError::config(&holding.id, "owned by a spouse, but none is defined"));
        }
        if let Some(rental) = &holding.rental {
            if rental.amount.is_negative() {
                return Err(ProjectionError::config(&holding.id, "rental income must not be negative"));
            }
        }
    }
    Ok(())
}

fn check_rules(household: &Household) -> Result<()> {
    household.priorities.check_ranking()?;

    let lists: [(&str, &[CashFlowRule]); 2] = [
        ("allocation", &household.priorities.allocation),
        ("withdrawal", &household.priorities.withdrawal),
    ];
    for (label, rules) in lists {
        let mut targets = HashSet::new();
        for rule in rules {
            let entity = format!("{} rule {}", label, rule.priority);
            let account = household.account(&rule.account_id).ok_or_else(|| {
                ProjectionError::config(&entity, format!("unknown account {}", rule.account_id))
            })?;
            if account.is_pinned() {
                return Err(ProjectionError::config(
                    &entity,
                    format!("account {} is pinned and cannot be ranked", account.id),
                ));
            }
            if !targets.insert(rule.account_id.as_str()) {
                return Err(ProjectionError::config(
                    &entity,
                    format!("account {} is already targeted by another rule", rule.account_id),
                ));
            }
            match rule.mode {
                AllocationMode::Allocate { annual_limit: Some(limit) } if limit.is_negative() => {
                    return Err(ProjectionError::config(&entity, "negative annual limit"));
                }
                AllocationMode::MaintainBalance { target } if target.is_negative() => {
                    return Err(ProjectionError::config(&entity, "negative target balance"));
                }
                _ => {}
            }
        }
    }
    Ok(())
}
