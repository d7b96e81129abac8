//! Household entity records
//!
//! These are the plain-data inputs of a projection run. The engine clones them
//! into run-private state and never writes back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::rules::CashFlowPriorities;
use crate::assumptions::{GrowthRate, RateCategory};
use crate::error::{ProjectionError, Result};
use crate::money::Money;
use crate::timeline::YearMonth;

/// Id of the synthesized liquid-cash account
pub const DEFAULT_CASH_ID: &str = "cash";

/// Id of the synthesized overdraft account
pub const DEFAULT_OVERDRAFT_ID: &str = "overdraft";

/// Who an entity belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Owner {
    #[serde(rename = "self")]
    SelfOwner,
    Spouse,
    #[default]
    Common,
}

impl Owner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Owner::SelfOwner => "self",
            Owner::Spouse => "spouse",
            Owner::Common => "common",
        }
    }
}

/// A member of the household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub birth_date: NaiveDate,
    pub retirement_age: u32,
    pub life_expectancy: u32,
}

impl Person {
    pub fn new(birth_date: NaiveDate, retirement_age: u32, life_expectancy: u32) -> Self {
        Self {
            birth_date,
            retirement_age,
            life_expectancy,
        }
    }

    pub fn birth_month(&self) -> YearMonth {
        YearMonth::from_date(self.birth_date)
    }

    /// Month of the birthday on which the person reaches `age`
    pub fn month_at_age(&self, age: u32) -> YearMonth {
        self.birth_month().add_months(age as i64 * 12)
    }

    pub fn retirement_month(&self) -> YearMonth {
        self.month_at_age(self.retirement_age)
    }

    pub fn life_expectancy_month(&self) -> YearMonth {
        self.month_at_age(self.life_expectancy)
    }

    /// Whole years of age at the given month (0 before birth)
    pub fn age_at(&self, ym: YearMonth) -> u32 {
        let months = ym.month_index() - self.birth_month().month_index();
        if months < 0 {
            0
        } else {
            (months / 12) as u32
        }
    }
}

/// How often a stated amount recurs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Frequency {
    #[default]
    Monthly,
    Yearly,
}

impl Frequency {
    /// Annualized amount
    pub fn annual(&self, amount: Money) -> Money {
        match self {
            Frequency::Monthly => Money::from_minor(amount.minor() * 12),
            Frequency::Yearly => amount,
        }
    }
}

/// When a stream or schedule stops (exclusive)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndCondition {
    #[default]
    Never,
    Date(YearMonth),
    SelfRetirement,
    SpouseRetirement,
    SelfLifeExpectancy,
    SpouseLifeExpectancy,
}

impl EndCondition {
    pub fn needs_spouse(&self) -> bool {
        matches!(
            self,
            EndCondition::SpouseRetirement | EndCondition::SpouseLifeExpectancy
        )
    }
}

/// Recurring income or expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashStream {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: Owner,
    pub amount: Money,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default = "default_stream_growth")]
    pub growth: GrowthRate,
    /// Defaults to the simulation start
    #[serde(default)]
    pub start: Option<YearMonth>,
    #[serde(default)]
    pub end: EndCondition,
}

fn default_stream_growth() -> GrowthRate {
    GrowthRate::Linked(RateCategory::Inflation)
}

pub type IncomeStream = CashStream;
pub type ExpenseStream = CashStream;

impl CashStream {
    pub fn new(id: impl Into<String>, owner: Owner, amount: Money, frequency: Frequency) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            owner,
            amount,
            frequency,
            growth: default_stream_growth(),
            start: None,
            end: EndCondition::Never,
        }
    }

    pub fn with_growth(mut self, growth: GrowthRate) -> Self {
        self.growth = growth;
        self
    }

    pub fn with_window(mut self, start: Option<YearMonth>, end: EndCondition) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

/// Kind of balance an account holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AccountCategory {
    LiquidCash,
    Savings,
    Investment,
    Pension,
    Overdraft,
}

impl AccountCategory {
    /// Return rate used when the account does not specify one
    pub fn default_return(&self) -> GrowthRate {
        match self {
            AccountCategory::LiquidCash | AccountCategory::Overdraft => GrowthRate::Custom(0.0),
            AccountCategory::Savings => GrowthRate::Linked(RateCategory::Fixed),
            AccountCategory::Investment | AccountCategory::Pension => {
                GrowthRate::Linked(RateCategory::Investment)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountCategory::LiquidCash => "liquidCash",
            AccountCategory::Savings => "savings",
            AccountCategory::Investment => "investment",
            AccountCategory::Pension => "pension",
            AccountCategory::Overdraft => "overdraft",
        }
    }
}

/// Regular payment into an account, funded from the period's cash flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionSchedule {
    pub amount: Money,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub start: Option<YearMonth>,
    #[serde(default)]
    pub end: EndCondition,
}

/// How the benefit at distribution start is determined
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PensionCalculation {
    /// Projected account balance (accumulation FV)
    #[default]
    Manual,
    /// Defined-benefit estimate: annual salary / 12 × total years of service
    #[serde(rename_all = "camelCase")]
    Auto {
        annual_salary: Money,
        total_service_years: f64,
    },
}

/// How the benefit is paid out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReceiveType {
    #[default]
    Annuity,
    LumpSum,
}

/// Distribution terms of a pension account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PensionTerms {
    /// Owner's age at which distribution begins
    pub start_age: u32,
    /// Number of years payments run for
    pub distribution_years: u32,
    #[serde(default)]
    pub calculation: PensionCalculation,
    #[serde(default)]
    pub receive: ReceiveType,
}

impl PensionTerms {
    pub fn distribution_months(&self) -> u32 {
        self.distribution_years * 12
    }
}

/// Savings, investment, pension, cash or overdraft balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub category: AccountCategory,
    #[serde(default)]
    pub owner: Owner,
    #[serde(default)]
    pub balance: Money,
    #[serde(default)]
    pub return_rate: Option<GrowthRate>,
    #[serde(default)]
    pub contribution: Option<ContributionSchedule>,
    #[serde(default)]
    pub pension: Option<PensionTerms>,
}

impl Account {
    pub fn new(id: impl Into<String>, category: AccountCategory, balance: Money) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            category,
            owner: Owner::Common,
            balance,
            return_rate: None,
            contribution: None,
            pension: None,
        }
    }

    pub fn with_owner(mut self, owner: Owner) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_return(mut self, rate: GrowthRate) -> Self {
        self.return_rate = Some(rate);
        self
    }

    pub fn with_contribution(mut self, schedule: ContributionSchedule) -> Self {
        self.contribution = Some(schedule);
        self
    }

    pub fn with_pension(mut self, terms: PensionTerms) -> Self {
        self.pension = Some(terms);
        self
    }

    /// Return rate with the per-category default applied
    pub fn effective_return(&self) -> GrowthRate {
        self.return_rate
            .unwrap_or_else(|| self.category.default_return())
    }

    pub fn is_pinned(&self) -> bool {
        matches!(
            self.category,
            AccountCategory::LiquidCash | AccountCategory::Overdraft
        )
    }
}

/// Interest basis of a debt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DebtRate {
    Fixed(f64),
    Floating { base: RateCategory, spread: f64 },
}

/// Amortizing schedule used after a grace window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AmortizationPolicy {
    EqualInstallment,
    EqualPrincipal,
}

/// How principal is repaid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepaymentType {
    Bullet,
    EqualInstallment,
    EqualPrincipal,
    #[serde(rename_all = "camelCase")]
    GraceThenAmortize {
        grace_months: u32,
        then: AmortizationPolicy,
    },
}

/// Loan, mortgage or other liability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: Owner,
    /// Original principal
    pub principal: Money,
    /// Outstanding balance at simulation start, for loans already in repayment
    #[serde(default)]
    pub outstanding: Option<Money>,
    pub rate: DebtRate,
    pub repayment: RepaymentType,
    pub start: YearMonth,
    pub maturity: YearMonth,
    /// Real-estate holding this debt finances
    #[serde(default)]
    pub secured_by: Option<String>,
}

impl Debt {
    pub fn new(
        id: impl Into<String>,
        principal: Money,
        rate: DebtRate,
        repayment: RepaymentType,
        start: YearMonth,
        maturity: YearMonth,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            owner: Owner::Common,
            principal,
            outstanding: None,
            rate,
            repayment,
            start,
            maturity,
            secured_by: None,
        }
    }

    pub fn starting_balance(&self) -> Money {
        self.outstanding.unwrap_or(self.principal)
    }

    pub fn term_months(&self) -> i64 {
        self.maturity.month_index() - self.start.month_index()
    }
}

/// Rental income produced by a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalIncome {
    pub amount: Money,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default = "default_stream_growth")]
    pub growth: GrowthRate,
}

/// Owned property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealEstateHolding {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: Owner,
    pub value: Money,
    #[serde(default = "default_appreciation")]
    pub appreciation: GrowthRate,
    #[serde(default)]
    pub rental: Option<RentalIncome>,
}

fn default_appreciation() -> GrowthRate {
    GrowthRate::Linked(RateCategory::RealEstate)
}

impl RealEstateHolding {
    pub fn new(id: impl Into<String>, value: Money) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            owner: Owner::Common,
            value,
            appreciation: default_appreciation(),
            rental: None,
        }
    }
}

/// Complete household snapshot consumed by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    #[serde(rename = "self")]
    pub person: Person,
    #[serde(default)]
    pub spouse: Option<Person>,
    #[serde(default)]
    pub incomes: Vec<IncomeStream>,
    #[serde(default)]
    pub expenses: Vec<ExpenseStream>,
    #[serde(default)]
    pub real_estate: Vec<RealEstateHolding>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub priorities: CashFlowPriorities,
}

impl Household {
    /// Household with one person and no entities
    pub fn single(birth_date: NaiveDate, retirement_age: u32, life_expectancy: u32) -> Self {
        Self {
            person: Person::new(birth_date, retirement_age, life_expectancy),
            spouse: None,
            incomes: Vec::new(),
            expenses: Vec::new(),
            real_estate: Vec::new(),
            accounts: Vec::new(),
            debts: Vec::new(),
            priorities: CashFlowPriorities::default(),
        }
    }

    /// Person whose age drives an owner's schedules (common follows self)
    pub fn person_for(&self, owner: Owner) -> Option<&Person> {
        match owner {
            Owner::SelfOwner | Owner::Common => Some(&self.person),
            Owner::Spouse => self.spouse.as_ref(),
        }
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn liquid_cash(&self) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.category == AccountCategory::LiquidCash)
    }

    pub fn overdraft(&self) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.category == AccountCategory::Overdraft)
    }

    /// Debt financing a property, found through the debt's back-reference
    pub fn attached_debt(&self, real_estate_id: &str) -> Option<&Debt> {
        self.debts
            .iter()
            .find(|d| d.secured_by.as_deref() == Some(real_estate_id))
    }

    /// Add zero-balance cash and overdraft accounts when absent
    pub fn ensure_pinned_accounts(&mut self) {
        if self.liquid_cash().is_none() {
            self.accounts.push(Account::new(
                DEFAULT_CASH_ID,
                AccountCategory::LiquidCash,
                Money::ZERO,
            ));
        }
        if self.overdraft().is_none() {
            self.accounts.push(Account::new(
                DEFAULT_OVERDRAFT_ID,
                AccountCategory::Overdraft,
                Money::ZERO,
            ));
        }
    }

    /// Calendar month an end condition refers to (`None` = open-ended)
    pub fn resolve_end(&self, end: &EndCondition, entity: &str) -> Result<Option<YearMonth>> {
        let spouse = || {
            self.spouse.as_ref().ok_or_else(|| {
                ProjectionError::config(entity, "end condition refers to a spouse, but none is defined")
            })
        };
        Ok(match end {
            EndCondition::Never => None,
            EndCondition::Date(ym) => Some(*ym),
            EndCondition::SelfRetirement => Some(self.person.retirement_month()),
            EndCondition::SelfLifeExpectancy => Some(self.person.life_expectancy_month()),
            EndCondition::SpouseRetirement => Some(spouse()?.retirement_month()),
            EndCondition::SpouseLifeExpectancy => Some(spouse()?.life_expectancy_month()),
        })
    }
}
