//! Per-entity period transitions
//!
//! Each function takes an entity, its state at the start of the period and the
//! period context, and returns the next state plus the flows it produced.
//! Nothing here touches other entities; the engine stitches results together.

use crate::assumptions::{GrowthRate, ScenarioAssumptions};
use crate::error::{ProjectionError, Result};
use crate::finance::{amortize, LoanPeriod, PensionCalculator};
use crate::household::{
    Account, AmortizationPolicy, CashStream, Debt, DebtRate, Frequency, Household,
    PensionCalculation, PensionTerms, RealEstateHolding, ReceiveType, RepaymentType,
};
use crate::money::Money;
use crate::timeline::{monthly_rate, Period, Timeline, YearMonth};

use super::cashflows::{Flow, FlowCategory};
use super::state::{AccountState, DebtPhase, DebtState, Distribution, RealEstateState};

/// Everything a transition needs to know about the current period
#[derive(Debug, Clone, Copy)]
pub struct PeriodContext<'a> {
    pub period: Period,
    pub timeline: &'a Timeline,
    pub assumptions: &'a ScenarioAssumptions,
    pub household: &'a Household,
}

impl<'a> PeriodContext<'a> {
    pub fn new(
        period: Period,
        timeline: &'a Timeline,
        assumptions: &'a ScenarioAssumptions,
        household: &'a Household,
    ) -> Self {
        Self {
            period,
            timeline,
            assumptions,
            household,
        }
    }

    fn ordinal(&self) -> i64 {
        self.period.index as i64
    }

    /// Annual rate of `rate` in this period's calendar year
    pub fn annual_rate(&self, rate: &GrowthRate) -> f64 {
        self.assumptions.resolve(rate, self.period.year)
    }

    /// Compound rate per period of `rate` in this period
    pub fn periodic_rate(&self, rate: &GrowthRate) -> f64 {
        self.timeline
            .granularity()
            .periodic_rate(self.annual_rate(rate))
    }

    /// Cumulative growth from period `from` up to (excluding) this period,
    /// using the rate of each intervening period's calendar year
    pub fn growth_factor(&self, rate: &GrowthRate, from: i64) -> f64 {
        let granularity = self.timeline.granularity();
        let step = self.timeline.months_per_period() as i64;
        (from..self.ordinal())
            .map(|ordinal| {
                let year = self.timeline.start().add_months(ordinal * step).year;
                1.0 + granularity.periodic_rate(self.assumptions.resolve(rate, year))
            })
            .product()
    }

    /// Per-period share of a recurring amount
    fn per_period(&self, amount: Money, frequency: Frequency) -> Money {
        frequency
            .annual(amount)
            .div_round(self.timeline.periods_per_year() as i64)
    }

    /// Whether this period lies in `[start, end)`; a missing start means the
    /// simulation start, a missing end means open-ended
    fn in_window(&self, start: Option<YearMonth>, end: Option<YearMonth>) -> bool {
        let k = self.ordinal();
        let from = start.map_or(0, |s| self.timeline.ordinal_of(s));
        k >= from && end.map_or(true, |e| k < self.timeline.ordinal_of(e))
    }
}

/// Income or expense amount for the period, if the stream is active
pub fn project_stream(
    stream: &CashStream,
    category: FlowCategory,
    ctx: &PeriodContext,
) -> Result<Option<Flow>> {
    let end = ctx.household.resolve_end(&stream.end, &stream.id)?;
    if !ctx.in_window(stream.start, end) {
        return Ok(None);
    }

    let from = stream.start.map_or(0, |s| ctx.timeline.ordinal_of(s));
    let amount = ctx
        .per_period(stream.amount, stream.frequency)
        .scale(ctx.growth_factor(&stream.growth, from));

    if !amount.is_positive() {
        return Ok(None);
    }
    Ok(Some(Flow::new(&stream.id, stream.owner, category, amount)))
}

/// Result of advancing a property one period
#[derive(Debug, Clone)]
pub struct RealEstateStep {
    pub next: RealEstateState,
    pub rental: Option<Flow>,
}

pub fn project_real_estate(
    holding: &RealEstateHolding,
    state: &RealEstateState,
    ctx: &PeriodContext,
) -> RealEstateStep {
    let appreciation = state.value.scale(ctx.periodic_rate(&holding.appreciation));
    let next = RealEstateState {
        value: state.value + appreciation,
        ..state.clone()
    };

    let rental = holding.rental.as_ref().and_then(|rental| {
        let amount = ctx
            .per_period(rental.amount, rental.frequency)
            .scale(ctx.growth_factor(&rental.growth, 0));
        amount
            .is_positive()
            .then(|| Flow::new(&holding.id, holding.owner, FlowCategory::Rental, amount))
    });

    RealEstateStep { next, rental }
}

/// Result of advancing an account one period
#[derive(Debug, Clone)]
pub struct AccountStep {
    pub next: AccountState,
    pub flows: Vec<Flow>,
    /// Balance change before the waterfall runs
    pub growth: Money,
}

pub fn project_account(
    account: &Account,
    state: &AccountState,
    ctx: &PeriodContext,
) -> Result<AccountStep> {
    let mut next = state.clone();
    let mut flows = Vec::new();
    let return_rate = account.effective_return();

    let benefit = match &account.pension {
        Some(terms) => Some((terms, benefit_start_ordinal(account, terms, ctx)?)),
        None => None,
    };

    match benefit {
        Some((terms, start)) if ctx.ordinal() >= start => {
            distribute(account, terms, &mut next, &return_rate, ctx, &mut flows)?;
        }
        _ => {
            next.balance += next.balance.scale(ctx.periodic_rate(&return_rate));
            if let Some(amount) = contribution_due(account, ctx)? {
                next.balance += amount;
                flows.push(Flow::new(&account.id, account.owner, FlowCategory::Contribution, amount));
            }
        }
    }

    Ok(AccountStep {
        growth: next.balance - state.balance,
        next,
        flows,
    })
}

fn benefit_start_ordinal(account: &Account, terms: &PensionTerms, ctx: &PeriodContext) -> Result<i64> {
    let person = ctx.household.person_for(account.owner).ok_or_else(|| {
        ProjectionError::config(&account.id, "owned by a spouse, but none is defined")
    })?;
    Ok(ctx.timeline.ordinal_of(person.month_at_age(terms.start_age)))
}

fn contribution_due(account: &Account, ctx: &PeriodContext) -> Result<Option<Money>> {
    let Some(schedule) = &account.contribution else {
        return Ok(None);
    };
    let end = ctx.household.resolve_end(&schedule.end, &account.id)?;
    if !ctx.in_window(schedule.start, end) {
        return Ok(None);
    }
    let amount = ctx.per_period(schedule.amount, schedule.frequency);
    Ok(amount.is_positive().then_some(amount))
}

/// Pay out a pension in monthly sub-steps
fn distribute(
    account: &Account,
    terms: &PensionTerms,
    next: &mut AccountState,
    return_rate: &GrowthRate,
    ctx: &PeriodContext,
    flows: &mut Vec<Flow>,
) -> Result<()> {
    let annual_rate = ctx.annual_rate(return_rate);

    if next.distribution == Distribution::NotStarted {
        if let PensionCalculation::Auto {
            annual_salary,
            total_service_years,
        } = terms.calculation
        {
            next.balance = PensionCalculator::defined_benefit(annual_salary, total_service_years);
        }

        match terms.receive {
            ReceiveType::LumpSum => {
                let paid = next.balance;
                next.balance = Money::ZERO;
                next.distribution = Distribution::Finished;
                if paid.is_positive() {
                    flows.push(Flow::new(&account.id, account.owner, FlowCategory::PensionLumpSum, paid));
                }
                return Ok(());
            }
            ReceiveType::Annuity => {
                let months = terms.distribution_months();
                let monthly_payment =
                    PensionCalculator::distribution_payment(next.balance, annual_rate, months)
                        .ok_or_else(|| {
                            ProjectionError::arithmetic(
                                &account.id,
                                ctx.period.index,
                                "pension distribution length is zero",
                            )
                        })?;
                next.distribution = Distribution::Paying {
                    monthly_payment,
                    months_left: months,
                };
            }
        }
    }

    match next.distribution {
        Distribution::Paying {
            monthly_payment,
            mut months_left,
        } => {
            let r_m = monthly_rate(annual_rate);
            let mut paid = Money::ZERO;
            for _ in 0..ctx.timeline.months_per_period() {
                if months_left == 0 {
                    break;
                }
                next.balance += next.balance.scale(r_m);
                // Final payment clears the rounding residual
                let payment = if months_left == 1 {
                    next.balance
                } else {
                    monthly_payment.min(next.balance)
                };
                next.balance -= payment;
                paid += payment;
                months_left -= 1;
            }

            next.distribution = if months_left == 0 {
                Distribution::Finished
            } else {
                Distribution::Paying {
                    monthly_payment,
                    months_left,
                }
            };
            if paid.is_positive() {
                flows.push(Flow::new(&account.id, account.owner, FlowCategory::PensionIncome, paid));
            }
        }
        Distribution::Finished => {
            next.balance += next.balance.scale(ctx.periodic_rate(return_rate));
        }
        Distribution::NotStarted => {}
    }

    Ok(())
}

/// Result of advancing a debt one period
#[derive(Debug, Clone)]
pub struct DebtStep {
    pub next: DebtState,
    pub flows: Vec<Flow>,
}

/// First and last period of a debt's repayment window, both inclusive
///
/// The window opens in the period holding the start month and closes in the
/// period holding the last month before maturity. It depends only on the debt
/// and the period grid, so a loan disbursed mid-run repays over the same
/// periods as one already running at the simulation start.
fn repayment_window(debt: &Debt, timeline: &Timeline) -> (i64, i64) {
    (
        timeline.ordinal_of(debt.start),
        timeline.ordinal_of(debt.maturity.add_months(-1)),
    )
}

pub fn project_debt(debt: &Debt, state: &DebtState, ctx: &PeriodContext) -> Result<DebtStep> {
    let mut next = state.clone();
    let mut flows = Vec::new();
    let k = ctx.ordinal();
    let (first, last) = repayment_window(debt, ctx.timeline);

    if next.phase == DebtPhase::Pending {
        if k < first {
            return Ok(DebtStep { next, flows });
        }
        // Disbursed at the top of the period; the first payment is due in it too
        next.balance = debt.principal;
        next.phase = DebtPhase::Active;
        flows.push(Flow::new(&debt.id, debt.owner, FlowCategory::LoanProceeds, debt.principal));
    }
    if next.phase != DebtPhase::Active {
        return Ok(DebtStep { next, flows });
    }

    let annual_rate = match debt.rate {
        DebtRate::Fixed(rate) => rate,
        DebtRate::Floating { base, spread } => next
            .frozen_rate
            .unwrap_or_else(|| ctx.assumptions.annual_rate(base, ctx.period.year) + spread),
    };

    let months_per_period = ctx.timeline.months_per_period() as i64;
    let grace_periods = match debt.repayment {
        RepaymentType::GraceThenAmortize { grace_months, .. } => {
            (grace_months as i64 + months_per_period - 1) / months_per_period
        }
        _ => 0,
    };

    let period = LoanPeriod {
        outstanding: next.balance,
        annual_rate,
        repayment: debt.repayment,
        periods_elapsed: k - first,
        periods_remaining: last - k + 1,
        periods_per_year: ctx.timeline.periods_per_year(),
        grace_periods,
        principal_installment: next.principal_installment,
    };
    let split = amortize(&period)
        .map_err(|e| ProjectionError::arithmetic(&debt.id, ctx.period.index, e.to_string()))?;

    if next.principal_installment.is_none()
        && period.policy() == Some(AmortizationPolicy::EqualPrincipal)
    {
        next.principal_installment = Some(split.principal);
    }

    if split.interest.is_positive() {
        flows.push(Flow::new(&debt.id, debt.owner, FlowCategory::DebtInterest, split.interest));
    }
    if split.principal.is_positive() {
        flows.push(Flow::new(&debt.id, debt.owner, FlowCategory::DebtPrincipal, split.principal));
    }

    next.balance -= split.principal;
    if !next.balance.is_positive() {
        next.phase = DebtPhase::Retired;
    }

    Ok(DebtStep { next, flows })
}
