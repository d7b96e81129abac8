//! Core projection engine: folds a household over the period sequence

use chrono::Local;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::cashflows::{CashFlowSummary, FlowCategory};
use super::projector::{
    project_account, project_debt, project_real_estate, project_stream, PeriodContext,
};
use super::snapshot::{PeriodTotals, ProjectionResult, Snapshot};
use super::state::HouseholdState;
use super::waterfall::WaterfallAllocator;
use crate::assumptions::ScenarioAssumptions;
use crate::error::{ProjectionError, Result};
use crate::finance::{AccumulationInput, PensionCalculator, PensionEstimate};
use crate::household::{validate_household, Household};
use crate::money::Money;
use crate::timeline::{Granularity, Period, Timeline, YearMonth};

/// How floating debt rates follow the scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FloatingRatePolicy {
    /// Look up base rate + spread in every period's calendar year
    #[default]
    ResolvePerPeriod,
    /// Fix base rate + spread at the later of debt start and simulation start
    FreezeAtStart,
}

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionConfig {
    /// First month of the simulation
    pub start: YearMonth,

    /// Step size
    pub granularity: Granularity,

    pub floating_rates: FloatingRatePolicy,

    /// Keep per-owner breakdowns and waterfall steps in every snapshot
    pub detailed_output: bool,
}

impl ProjectionConfig {
    pub fn starting(start: YearMonth) -> Self {
        Self {
            start,
            ..Default::default()
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            start: YearMonth::from_date(Local::now().date_naive()),
            granularity: Granularity::Annual,
            floating_rates: FloatingRatePolicy::ResolvePerPeriod,
            detailed_output: true,
        }
    }
}

/// Main projection engine
pub struct ProjectionEngine {
    assumptions: ScenarioAssumptions,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions and config
    pub fn new(assumptions: ScenarioAssumptions, config: ProjectionConfig) -> Self {
        Self {
            assumptions,
            config,
        }
    }

    pub fn assumptions(&self) -> &ScenarioAssumptions {
        &self.assumptions
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run a projection for one household
    ///
    /// The household is validated first; any configuration error aborts the
    /// run before the first period. Arithmetic errors freeze only the entity
    /// that raised them.
    pub fn project_household(&self, household: &Household) -> Result<ProjectionResult> {
        let mut household = household.clone();
        household.ensure_pinned_accounts();
        validate_household(&household)?;

        let timeline = Timeline::build(&household, self.config.start, self.config.granularity)?;
        info!(
            "Projecting scenario '{}' from {} over {} {:?} periods",
            self.assumptions.name,
            timeline.start(),
            timeline.len(),
            timeline.granularity()
        );

        let mut state = HouseholdState::initial(
            &household,
            &timeline,
            &self.assumptions,
            self.config.floating_rates,
        );
        let mut result = ProjectionResult::new(&self.assumptions.name, self.config.granularity);
        result.pension_estimates = self.pension_estimates(&household, &timeline)?;

        for period in timeline.periods() {
            let snapshot = self.project_period(&household, &timeline, *period, &mut state)?;
            result.add_snapshot(snapshot);
        }

        result.unavailable = state.unavailable.clone();
        if let Some(last) = result.snapshots.last() {
            info!(
                "Scenario '{}' finished at {} with net worth {}",
                self.assumptions.name,
                last.year_month(),
                last.net_worth
            );
        }
        Ok(result)
    }

    /// Advance every entity one period, run the waterfall and capture a snapshot
    fn project_period(
        &self,
        household: &Household,
        timeline: &Timeline,
        period: Period,
        state: &mut HouseholdState,
    ) -> Result<Snapshot> {
        let ctx = PeriodContext::new(period, timeline, &self.assumptions, household);
        let starting_net_worth = state.net_worth();
        let starting_debt = state.debt_total();
        let mut flows = Vec::new();
        let mut asset_growth = Money::ZERO;

        for stream in &household.incomes {
            flows.extend(project_stream(stream, FlowCategory::Income, &ctx)?);
        }
        for stream in &household.expenses {
            flows.extend(project_stream(stream, FlowCategory::Expense, &ctx)?);
        }

        for (holding, current) in household.real_estate.iter().zip(state.real_estate.iter_mut()) {
            let step = project_real_estate(holding, current, &ctx);
            asset_growth += step.next.value - current.value;
            flows.extend(step.rental);
            *current = step.next;
        }

        for (account, current) in household.accounts.iter().zip(state.accounts.iter_mut()) {
            if current.frozen {
                continue;
            }
            match project_account(account, current, &ctx) {
                Ok(step) => {
                    asset_growth += step.growth;
                    flows.extend(step.flows);
                    *current = step.next;
                }
                Err(err) if err.is_recoverable() => {
                    warn!("{}; freezing account {}", err, account.id);
                    current.frozen = true;
                    state.unavailable.insert(account.id.clone(), err.to_string());
                }
                Err(err) => return Err(err),
            }
        }

        for (debt, current) in household.debts.iter().zip(state.debts.iter_mut()) {
            if current.frozen {
                continue;
            }
            match project_debt(debt, current, &ctx) {
                Ok(step) => {
                    flows.extend(step.flows);
                    *current = step.next;
                }
                Err(err) if err.is_recoverable() => {
                    warn!("{}; freezing debt {}", err, debt.id);
                    current.frozen = true;
                    state.unavailable.insert(debt.id.clone(), err.to_string());
                }
                Err(err) => return Err(err),
            }
        }

        let cash_flow = CashFlowSummary::aggregate(&flows);
        debug!(
            "{} net cash flow {} (in {}, out {})",
            period.year_month(),
            cash_flow.net_cash_flow,
            cash_flow.total_inflow,
            cash_flow.total_outflow
        );

        let waterfall = WaterfallAllocator::new(&household.priorities, period).apply(
            cash_flow.net_cash_flow,
            &mut state.accounts,
            &mut state.ytd,
        )?;

        let totals = PeriodTotals {
            period,
            self_age: timeline.age_at(&household.person, period.index),
            spouse_age: household
                .spouse
                .as_ref()
                .map(|s| timeline.age_at(s, period.index)),
            cash_flow,
            starting_net_worth,
            asset_growth,
            debt_change: state.debt_total() - starting_debt,
            waterfall,
        };
        let snapshot = Snapshot::capture(totals, state, self.config.detailed_output);

        if !snapshot.conservation_gap().is_zero() {
            return Err(ProjectionError::invariant(
                period.index,
                None,
                format!("net worth off by {}", snapshot.conservation_gap()),
            ));
        }
        Ok(snapshot)
    }

    /// Benefit estimate for every pension account, as of the simulation start
    fn pension_estimates(
        &self,
        household: &Household,
        timeline: &Timeline,
    ) -> Result<BTreeMap<String, PensionEstimate>> {
        let start = timeline.start();
        let mut estimates = BTreeMap::new();

        for account in &household.accounts {
            let Some(terms) = &account.pension else {
                continue;
            };
            let person = household.person_for(account.owner).ok_or_else(|| {
                ProjectionError::config(&account.id, "owned by a spouse, but none is defined")
            })?;
            let benefit_start = person.month_at_age(terms.start_age);
            let months_to_start = months_between(start, benefit_start);

            // Contributions are taken to run from now until they end or benefits begin
            let (monthly_contribution, contribution_months) = match &account.contribution {
                Some(schedule) => {
                    let end = household
                        .resolve_end(&schedule.end, &account.id)?
                        .map_or(benefit_start, |end| end.min(benefit_start));
                    let first = schedule.start.map_or(start, |s| s.max(start));
                    (
                        schedule.frequency.annual(schedule.amount).div_round(12),
                        months_between(first, end),
                    )
                }
                None => (Money::ZERO, 0),
            };

            let input = AccumulationInput {
                balance: account.balance,
                monthly_contribution,
                annual_rate: self.assumptions.resolve(&account.effective_return(), start.year),
                months_to_start,
                contribution_months,
            };

            match PensionCalculator::estimate(terms, &input) {
                Some(estimate) => {
                    debug!(
                        "Pension {}: accumulated {}, monthly {}",
                        account.id, estimate.accumulated, estimate.monthly_payment
                    );
                    estimates.insert(account.id.clone(), estimate);
                }
                None => warn!("Pension {} has a zero-length distribution; no estimate", account.id),
            }
        }

        Ok(estimates)
    }
}

fn months_between(from: YearMonth, to: YearMonth) -> u32 {
    (to.month_index() - from.month_index()).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{GrowthRate, RateCategory};
    use crate::household::{
        Account, AccountCategory, AllocationMode, CashStream, ContributionSchedule, Debt, DebtRate,
        EndCondition, Frequency, Owner, PensionCalculation, PensionTerms, Person,
        RealEstateHolding, ReceiveType, RepaymentType,
    };
    use crate::projection::snapshot::AssetClass;
    use chrono::NaiveDate;

    fn birth(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
    }

    fn config() -> ProjectionConfig {
        ProjectionConfig::starting(YearMonth::new(2025, 1))
    }

    fn engine(assumptions: ScenarioAssumptions) -> ProjectionEngine {
        ProjectionEngine::new(assumptions, config())
    }

    /// Age 40 at the start; life expectancy 51 gives exactly 12 annual periods
    fn twelve_year_household() -> Household {
        Household::single(birth(1985), 50, 51)
    }

    #[test]
    fn test_surplus_accumulates_in_ranked_account() {
        // Age 40 at the start, retiring at 65, life expectancy 90
        let mut h = Household::single(birth(1985), 65, 90);
        h.incomes.push(
            CashStream::new("salary", Owner::SelfOwner, Money::from_major(50), Frequency::Yearly)
                .with_growth(GrowthRate::Custom(0.0)),
        );
        h.accounts.push(
            Account::new("savings", AccountCategory::Savings, Money::from_major(1_000))
                .with_return(GrowthRate::Custom(0.0)),
        );
        h.priorities.add_allocation_rule("savings", AllocationMode::unlimited());

        let result = engine(ScenarioAssumptions::flat()).project_household(&h).unwrap();

        assert!(result.snapshots.len() > 12);
        let twelfth = &result.snapshots[11];
        assert_eq!(twelfth.period.year, 2036);
        assert_eq!(twelfth.account_balances["savings"], Money::from_major(1_600));
        assert_eq!(twelfth.account_balances["cash"], Money::ZERO);
    }

    #[test]
    fn test_equal_principal_debt_first_year() {
        let mut h = twelve_year_household();
        h.debts.push(Debt::new(
            "student-loan",
            Money::from_major(30_000),
            DebtRate::Fixed(0.04),
            RepaymentType::EqualPrincipal,
            YearMonth::new(2025, 1),
            YearMonth::new(2035, 1),
        ));
        h.accounts.push(Account::new("cash", AccountCategory::LiquidCash, Money::from_major(100_000)));

        let result = engine(ScenarioAssumptions::flat()).project_household(&h).unwrap();
        let first = &result.snapshots[0];

        assert_eq!(first.expense_by_category[&FlowCategory::DebtInterest], Money::from_major(1_200));
        assert_eq!(first.expense_by_category[&FlowCategory::DebtPrincipal], Money::from_major(3_000));
        assert_eq!(first.debt_balances["student-loan"], Money::from_major(27_000));

        // Retired after ten payments; no more debt service
        let after = &result.snapshots[10];
        assert_eq!(after.debt_balances["student-loan"], Money::ZERO);
        assert!(after.expense_by_category.is_empty());
    }

    #[test]
    fn test_deficit_draws_cash_then_withdrawal_rule() {
        let mut h = twelve_year_household();
        h.expenses.push(
            CashStream::new("living", Owner::Common, Money::from_major(200), Frequency::Yearly)
                .with_growth(GrowthRate::Custom(0.0)),
        );
        h.accounts.push(Account::new("cash", AccountCategory::LiquidCash, Money::from_major(50)));
        h.accounts.push(
            Account::new("brokerage", AccountCategory::Investment, Money::from_major(500))
                .with_return(GrowthRate::Custom(0.0)),
        );
        h.priorities.add_withdrawal_rule("brokerage", AllocationMode::unlimited());

        let result = engine(ScenarioAssumptions::flat()).project_household(&h).unwrap();
        let first = &result.snapshots[0];

        assert_eq!(first.account_balances["cash"], Money::ZERO);
        assert_eq!(first.account_balances["brokerage"], Money::from_major(350));
        assert_eq!(first.account_balances["overdraft"], Money::ZERO);

        // Brokerage runs dry in the third year and the overdraft covers the rest
        let third = &result.snapshots[2];
        assert_eq!(third.account_balances["brokerage"], Money::ZERO);
        assert_eq!(third.account_balances["overdraft"], Money::from_major(-50));

        let summary = result.summary();
        assert_eq!(summary.first_overdraft, Some(YearMonth::new(2027, 1)));
        assert_eq!(summary.deficit_periods, 12);
    }

    #[test]
    fn test_surplus_repays_overdraft_first() {
        let mut h = twelve_year_household();
        h.incomes.push(
            CashStream::new("salary", Owner::SelfOwner, Money::from_major(300), Frequency::Yearly)
                .with_growth(GrowthRate::Custom(0.0)),
        );
        h.accounts.push(Account::new("overdraft", AccountCategory::Overdraft, Money::from_major(-500)));

        let result = engine(ScenarioAssumptions::flat()).project_household(&h).unwrap();
        assert_eq!(result.snapshots[0].account_balances["overdraft"], Money::from_major(-200));
        assert_eq!(result.snapshots[1].account_balances["overdraft"], Money::ZERO);
        assert_eq!(result.snapshots[1].account_balances["cash"], Money::from_major(100));
    }

    fn full_household() -> Household {
        let mut h = Household::single(birth(1980), 62, 85);
        h.spouse = Some(Person::new(birth(1983), 60, 88));
        h.incomes.push(
            CashStream::new("salary", Owner::SelfOwner, Money::from_major(7_500), Frequency::Monthly)
                .with_growth(GrowthRate::Linked(RateCategory::Income))
                .with_window(None, EndCondition::SelfRetirement),
        );
        h.incomes.push(
            CashStream::new("spouse-salary", Owner::Spouse, Money::from_minor(412_345), Frequency::Monthly)
                .with_window(None, EndCondition::SpouseRetirement),
        );
        h.expenses.push(CashStream::new("living", Owner::Common, Money::from_minor(633_337), Frequency::Monthly));
        h.real_estate.push(RealEstateHolding::new("home", Money::from_major(450_000)));

        let mut mortgage = Debt::new(
            "mortgage",
            Money::from_major(360_000),
            DebtRate::Floating {
                base: RateCategory::Inflation,
                spread: 0.02,
            },
            RepaymentType::EqualInstallment,
            YearMonth::new(2018, 6),
            YearMonth::new(2048, 6),
        );
        mortgage.outstanding = Some(Money::from_major(298_765));
        mortgage.secured_by = Some("home".to_string());
        h.debts.push(mortgage);
        h.debts.push(Debt::new(
            "car-loan",
            Money::from_major(25_000),
            DebtRate::Fixed(0.059),
            RepaymentType::GraceThenAmortize {
                grace_months: 6,
                then: crate::household::AmortizationPolicy::EqualInstallment,
            },
            YearMonth::new(2027, 3),
            YearMonth::new(2032, 3),
        ));

        h.accounts.push(Account::new("cash", AccountCategory::LiquidCash, Money::from_major(8_000)));
        h.accounts.push(Account::new("emergency", AccountCategory::Savings, Money::from_major(12_000)));
        h.accounts.push(
            Account::new("brokerage", AccountCategory::Investment, Money::from_minor(4_567_891))
                .with_owner(Owner::SelfOwner),
        );
        h.accounts.push(
            Account::new("pension", AccountCategory::Pension, Money::from_major(95_000))
                .with_owner(Owner::SelfOwner)
                .with_contribution(ContributionSchedule {
                    amount: Money::from_major(600),
                    frequency: Frequency::Monthly,
                    start: None,
                    end: EndCondition::SelfRetirement,
                })
                .with_pension(PensionTerms {
                    start_age: 65,
                    distribution_years: 20,
                    calculation: PensionCalculation::Manual,
                    receive: ReceiveType::Annuity,
                }),
        );
        h.accounts.push(
            Account::new("spouse-db", AccountCategory::Pension, Money::ZERO)
                .with_owner(Owner::Spouse)
                .with_pension(PensionTerms {
                    start_age: 62,
                    distribution_years: 0,
                    calculation: PensionCalculation::Auto {
                        annual_salary: Money::from_major(52_000),
                        total_service_years: 25.0,
                    },
                    receive: ReceiveType::LumpSum,
                }),
        );
        h.priorities.add_allocation_rule(
            "emergency",
            AllocationMode::MaintainBalance {
                target: Money::from_major(25_000),
            },
        );
        h.priorities.add_allocation_rule(
            "brokerage",
            AllocationMode::Allocate {
                annual_limit: Some(Money::from_major(20_000)),
            },
        );
        h.priorities.add_withdrawal_rule("emergency", AllocationMode::unlimited());
        h.priorities.add_withdrawal_rule("brokerage", AllocationMode::unlimited());
        h
    }

    #[test]
    fn test_net_worth_is_conserved_every_period() {
        let h = full_household();
        for granularity in [Granularity::Annual, Granularity::Monthly] {
            let config = ProjectionConfig {
                granularity,
                ..config()
            };
            let result = ProjectionEngine::new(ScenarioAssumptions::default_assumptions(), config)
                .project_household(&h)
                .unwrap();
            for snapshot in &result.snapshots {
                assert_eq!(snapshot.conservation_gap(), Money::ZERO);
                assert_eq!(snapshot.waterfall.placed(), snapshot.net_cash_flow.abs());
                let breakdown: Money = snapshot.breakdown.iter().map(|e| e.amount).sum();
                assert_eq!(breakdown, snapshot.net_cash_flow);
            }
        }
    }

    #[test]
    fn test_identical_inputs_give_identical_output() {
        let h = full_household();
        let run = || {
            let result = engine(ScenarioAssumptions::default_assumptions())
                .project_household(&h)
                .unwrap();
            serde_json::to_string(&result).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_balances_stay_non_negative_outside_overdraft() {
        let h = full_household();
        let result = engine(ScenarioAssumptions::default_assumptions())
            .project_household(&h)
            .unwrap();
        for snapshot in &result.snapshots {
            for (id, balance) in &snapshot.account_balances {
                if id != "overdraft" {
                    assert!(!balance.is_negative(), "{} negative in {}", id, snapshot.year_month());
                }
            }
        }
    }

    #[test]
    fn test_lump_sum_lands_at_benefit_start() {
        let h = full_household();
        let result = engine(ScenarioAssumptions::default_assumptions())
            .project_household(&h)
            .unwrap();

        // Spouse born 1983 reaches 62 in 2045
        let payout = result
            .snapshots
            .iter()
            .find(|s| s.income_by_category.contains_key(&FlowCategory::PensionLumpSum))
            .unwrap();
        assert_eq!(payout.period.year, 2045);
        assert_eq!(
            payout.income_by_category[&FlowCategory::PensionLumpSum],
            Money::from_minor(10_833_325)
        );
        assert_eq!(payout.account_balances["spouse-db"], Money::ZERO);
        assert!(result.pension_estimates.contains_key("spouse-db"));
    }

    #[test]
    fn test_pension_annuity_runs_out_after_distribution_years() {
        let h = full_household();
        let result = engine(ScenarioAssumptions::default_assumptions())
            .project_household(&h)
            .unwrap();

        // Self born 1980 starts at 65 in 2045 and is paid for 20 years
        let paying: Vec<i32> = result
            .snapshots
            .iter()
            .filter(|s| s.income_by_category.contains_key(&FlowCategory::PensionIncome))
            .map(|s| s.period.year)
            .collect();
        assert_eq!(paying.first(), Some(&2045));
        assert_eq!(paying.last(), Some(&2064));
        assert_eq!(paying.len(), 20);

        let after = result.snapshots.iter().find(|s| s.period.year == 2065).unwrap();
        assert_eq!(after.account_balances["pension"], Money::ZERO);
        assert!(result.pension_estimates["pension"].monthly_payment.is_positive());
    }

    #[test]
    fn test_pending_debt_disburses_proceeds() {
        let h = full_household();
        let result = engine(ScenarioAssumptions::default_assumptions())
            .project_household(&h)
            .unwrap();

        let disbursed = result.snapshots.iter().find(|s| s.period.year == 2027).unwrap();
        assert_eq!(
            disbursed.income_by_category[&FlowCategory::LoanProceeds],
            Money::from_major(25_000)
        );
        assert_eq!(disbursed.debt_balances["car-loan"], Money::from_major(25_000));
        let before = result.snapshots.iter().find(|s| s.period.year == 2026).unwrap();
        assert_eq!(before.debt_balances["car-loan"], Money::ZERO);
    }

    #[test]
    fn test_arithmetic_error_freezes_only_that_entity() {
        let mut h = twelve_year_household();
        h.accounts.push(
            Account::new("annuity", AccountCategory::Pension, Money::from_major(10_000))
                .with_return(GrowthRate::Custom(0.0))
                .with_pension(PensionTerms {
                    start_age: 45,
                    distribution_years: 0,
                    calculation: PensionCalculation::Manual,
                    receive: ReceiveType::Annuity,
                }),
        );
        h.accounts.push(
            Account::new("savings", AccountCategory::Savings, Money::from_major(1_000))
                .with_return(GrowthRate::Custom(0.10)),
        );

        let result = engine(ScenarioAssumptions::flat()).project_household(&h).unwrap();

        assert_eq!(result.snapshots.len(), 12);
        assert!(result.unavailable.contains_key("annuity"));
        assert!(result.pension_estimates.is_empty());

        // 1985 + 45 = 2030
        let before = result.snapshots.iter().find(|s| s.period.year == 2029).unwrap();
        assert!(before.unavailable.is_empty());
        let frozen = result.snapshots.iter().find(|s| s.period.year == 2030).unwrap();
        assert_eq!(frozen.unavailable, vec!["annuity".to_string()]);
        assert_eq!(frozen.account_balances["annuity"], Money::from_major(10_000));
        let last = result.snapshots.last().unwrap();
        assert_eq!(last.unavailable, vec!["annuity".to_string()]);
        assert_eq!(last.account_balances["annuity"], Money::from_major(10_000));
        // Unrelated accounts keep growing
        assert!(last.account_balances["savings"] > Money::from_major(2_800));
    }

    #[test]
    fn test_configuration_error_aborts_before_first_period() {
        let mut h = twelve_year_household();
        h.debts.push(Debt::new(
            "bad-loan",
            Money::from_major(1_000),
            DebtRate::Fixed(0.05),
            RepaymentType::Bullet,
            YearMonth::new(2030, 1),
            YearMonth::new(2029, 1),
        ));
        let err = engine(ScenarioAssumptions::flat()).project_household(&h).unwrap_err();
        assert_eq!(
            err,
            ProjectionError::config("bad-loan", "maturity must be after start")
        );
    }

    #[test]
    fn test_start_after_horizon_is_rejected() {
        let h = twelve_year_household();
        let config = ProjectionConfig::starting(YearMonth::new(2040, 1));
        let err = ProjectionEngine::new(ScenarioAssumptions::flat(), config)
            .project_household(&h)
            .unwrap_err();
        assert!(matches!(err, ProjectionError::Configuration { .. }));
    }

    #[test]
    fn test_summary_reports_net_worth_path() {
        let h = full_household();
        let result = engine(ScenarioAssumptions::default_assumptions())
            .project_household(&h)
            .unwrap();
        let summary = result.summary();
        assert_eq!(summary.periods as usize, result.snapshots.len());
        assert_eq!(summary.final_net_worth, result.snapshots.last().unwrap().net_worth);
        assert!(summary.peak_net_worth >= summary.final_net_worth);
        assert!(summary.lowest_net_worth <= summary.starting_net_worth.max(summary.final_net_worth));
        assert_eq!(
            result.snapshots[0].asset(AssetClass::RealEstate),
            Money::from_major(450_000).scale(1.03)
        );
    }

    #[test]
    fn test_summary_only_output_drops_details() {
        let h = full_household();
        let config = ProjectionConfig {
            detailed_output: false,
            ..config()
        };
        let result = ProjectionEngine::new(ScenarioAssumptions::default_assumptions(), config)
            .project_household(&h)
            .unwrap();
        assert!(result.snapshots.iter().all(|s| s.breakdown.is_empty()));
        assert!(result.snapshots.iter().all(|s| s.waterfall.steps.is_empty()));
    }
}
