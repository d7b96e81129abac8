//! Household entity records, cash flow priorities and input loading

mod data;
mod rules;
mod validate;
pub mod loader;

pub use data::{
    Account, AccountCategory, AmortizationPolicy, CashStream, ContributionSchedule, Debt,
    DebtRate, EndCondition, ExpenseStream, Frequency, Household, IncomeStream, Owner,
    PensionCalculation, PensionTerms, Person, RealEstateHolding, ReceiveType, RentalIncome,
    RepaymentType, DEFAULT_CASH_ID, DEFAULT_OVERDRAFT_ID,
};
pub use rules::{
    ActiveWindow, AllocationMode, AllocationRule, CashFlowPriorities, CashFlowRule,
    WithdrawalRule,
};
pub use validate::validate_household;
pub use loader::{load_household, load_household_from_reader, load_default_household};
