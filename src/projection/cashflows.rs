//! Period cash flows and their aggregation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::household::Owner;
use crate::money::Money;

/// What a flow pays for or comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowCategory {
    // Inflows
    Income,
    Rental,
    PensionIncome,
    PensionLumpSum,
    LoanProceeds,
    // Outflows
    Expense,
    Contribution,
    DebtInterest,
    DebtPrincipal,
}

impl FlowCategory {
    pub fn is_inflow(&self) -> bool {
        matches!(
            self,
            FlowCategory::Income
                | FlowCategory::Rental
                | FlowCategory::PensionIncome
                | FlowCategory::PensionLumpSum
                | FlowCategory::LoanProceeds
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowCategory::Income => "income",
            FlowCategory::Rental => "rental",
            FlowCategory::PensionIncome => "pensionIncome",
            FlowCategory::PensionLumpSum => "pensionLumpSum",
            FlowCategory::LoanProceeds => "loanProceeds",
            FlowCategory::Expense => "expense",
            FlowCategory::Contribution => "contribution",
            FlowCategory::DebtInterest => "debtInterest",
            FlowCategory::DebtPrincipal => "debtPrincipal",
        }
    }
}

/// A single movement of cash produced by one entity in one period
///
/// `amount` is a magnitude; the category decides the sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub entity_id: String,
    pub owner: Owner,
    pub category: FlowCategory,
    pub amount: Money,
}

impl Flow {
    pub fn new(entity_id: &str, owner: Owner, category: FlowCategory, amount: Money) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            owner,
            category,
            amount,
        }
    }

    /// Positive for inflows, negative for outflows
    pub fn signed(&self) -> Money {
        if self.category.is_inflow() {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// Signed subtotal for one owner and category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownEntry {
    pub owner: Owner,
    pub category: FlowCategory,
    pub amount: Money,
}

/// Totals of a period's flows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowSummary {
    pub total_inflow: Money,
    pub total_outflow: Money,
    pub net_cash_flow: Money,
    /// Ordered by owner then category
    pub breakdown: Vec<BreakdownEntry>,
}

impl CashFlowSummary {
    pub fn aggregate(flows: &[Flow]) -> Self {
        let mut total_inflow = Money::ZERO;
        let mut total_outflow = Money::ZERO;
        let mut by_key: BTreeMap<(Owner, FlowCategory), Money> = BTreeMap::new();

        for flow in flows {
            if flow.category.is_inflow() {
                total_inflow += flow.amount;
            } else {
                total_outflow += flow.amount;
            }
            *by_key.entry((flow.owner, flow.category)).or_default() += flow.signed();
        }

        let breakdown = by_key
            .into_iter()
            .map(|((owner, category), amount)| BreakdownEntry {
                owner,
                category,
                amount,
            })
            .collect();

        Self {
            total_inflow,
            total_outflow,
            net_cash_flow: total_inflow - total_outflow,
            breakdown,
        }
    }

    /// Unsigned total per inflow category
    pub fn income_by_category(&self) -> BTreeMap<FlowCategory, Money> {
        self.totals_by_category(true)
    }

    /// Unsigned total per outflow category
    pub fn expense_by_category(&self) -> BTreeMap<FlowCategory, Money> {
        self.totals_by_category(false)
    }

    fn totals_by_category(&self, inflows: bool) -> BTreeMap<FlowCategory, Money> {
        let mut totals = BTreeMap::new();
        for entry in self
            .breakdown
            .iter()
            .filter(|e| e.category.is_inflow() == inflows)
        {
            *totals.entry(entry.category).or_default() += entry.amount.abs();
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flows() -> Vec<Flow> {
        vec![
            Flow::new("salary", Owner::SelfOwner, FlowCategory::Income, Money::from_major(5_000)),
            Flow::new("wages", Owner::Spouse, FlowCategory::Income, Money::from_major(3_000)),
            Flow::new("bonus", Owner::SelfOwner, FlowCategory::Income, Money::from_minor(12_345)),
            Flow::new("rent", Owner::Common, FlowCategory::Expense, Money::from_major(2_000)),
            Flow::new("mortgage", Owner::Common, FlowCategory::DebtInterest, Money::from_minor(80_001)),
            Flow::new("ira", Owner::SelfOwner, FlowCategory::Contribution, Money::from_major(500)),
        ]
    }

    #[test]
    fn test_totals_and_net() {
        let summary = CashFlowSummary::aggregate(&flows());
        assert_eq!(summary.total_inflow, Money::from_minor(812_345));
        assert_eq!(summary.total_outflow, Money::from_minor(330_001));
        assert_eq!(summary.net_cash_flow, Money::from_minor(482_344));
    }

    #[test]
    fn test_breakdown_sums_to_net_exactly() {
        let summary = CashFlowSummary::aggregate(&flows());
        let sum: Money = summary.breakdown.iter().map(|e| e.amount).sum();
        assert_eq!(sum, summary.net_cash_flow);

        // Self income lines merge into one entry
        let self_income = summary
            .breakdown
            .iter()
            .find(|e| e.owner == Owner::SelfOwner && e.category == FlowCategory::Income)
            .unwrap();
        assert_eq!(self_income.amount, Money::from_minor(512_345));
    }

    #[test]
    fn test_category_totals() {
        let summary = CashFlowSummary::aggregate(&flows());
        let income = summary.income_by_category();
        assert_eq!(income[&FlowCategory::Income], Money::from_minor(812_345));

        let expense = summary.expense_by_category();
        assert_eq!(expense[&FlowCategory::Expense], Money::from_major(2_000));
        assert_eq!(expense[&FlowCategory::Contribution], Money::from_major(500));
        assert!(!expense.contains_key(&FlowCategory::Income));
    }

    #[test]
    fn test_empty_period() {
        let summary = CashFlowSummary::aggregate(&[]);
        assert_eq!(summary.net_cash_flow, Money::ZERO);
        assert!(summary.breakdown.is_empty());
    }
}
