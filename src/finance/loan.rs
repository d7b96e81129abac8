//! Loan amortization: per-period interest/principal split by repayment policy
//!
//! The split is recomputed from the outstanding balance and the number of
//! periods left to maturity, so a schedule can be resumed from any point. The
//! one exception is the equal-principal installment, which is fixed on the
//! first amortizing period and carried forward by the caller.
//! Interest uses the nominal periodic rate `annual_rate / periods_per_year`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::household::{AmortizationPolicy, RepaymentType};
use crate::money::Money;

/// One period's debt service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSplit {
    pub interest: Money,
    pub principal: Money,
}

impl PaymentSplit {
    pub fn total(&self) -> Money {
        self.interest + self.principal
    }
}

/// Why a split could not be computed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmortizationError {
    /// Balance outstanding with no periods left to repay it
    #[error("{outstanding} outstanding past maturity with no periods left")]
    NoPeriodsRemaining { outstanding: Money },
}

/// Inputs for a single period
#[derive(Debug, Clone, Copy)]
pub struct LoanPeriod {
    pub outstanding: Money,
    pub annual_rate: f64,
    pub repayment: RepaymentType,
    /// Periods since the loan started (0 = first repayment period)
    pub periods_elapsed: i64,
    /// Periods left including this one
    pub periods_remaining: i64,
    pub periods_per_year: u32,
    /// Length of an interest-only window, in periods
    pub grace_periods: i64,
    /// Equal-principal installment fixed earlier in the schedule; derived
    /// from this period's balance when unset
    pub principal_installment: Option<Money>,
}

impl LoanPeriod {
    /// Policy in force this period; `None` while only interest is due
    pub fn policy(&self) -> Option<AmortizationPolicy> {
        match self.repayment {
            RepaymentType::Bullet => None,
            RepaymentType::EqualInstallment => Some(AmortizationPolicy::EqualInstallment),
            RepaymentType::EqualPrincipal => Some(AmortizationPolicy::EqualPrincipal),
            RepaymentType::GraceThenAmortize { then, .. } => {
                (self.periods_elapsed >= self.grace_periods).then_some(then)
            }
        }
    }
}

/// Constant principal repaid each period under equal-principal
pub fn equal_principal_installment(balance: Money, periods: i64) -> Money {
    balance.div_round(periods.max(1))
}

/// Level payment that amortizes `principal` over `periods` at `rate` per period
pub fn level_payment(principal: f64, rate: f64, periods: i64) -> f64 {
    if periods <= 0 {
        return principal;
    }
    if rate.abs() < 1e-12 {
        return principal / periods as f64;
    }
    principal * rate / (1.0 - (1.0 + rate).powi(-(periods as i32)))
}

/// Compute the interest and principal due this period
pub fn amortize(input: &LoanPeriod) -> Result<PaymentSplit, AmortizationError> {
    let outstanding = input.outstanding;
    if !outstanding.is_positive() {
        return Ok(PaymentSplit::default());
    }
    if input.periods_remaining <= 0 {
        return Err(AmortizationError::NoPeriodsRemaining { outstanding });
    }

    let rate = input.annual_rate / input.periods_per_year as f64;
    let interest = outstanding.scale(rate);
    let last_period = input.periods_remaining == 1;

    let principal = if last_period {
        // Everything left is due at maturity
        outstanding
    } else {
        match input.policy() {
            None => Money::ZERO,
            Some(AmortizationPolicy::EqualPrincipal) => input
                .principal_installment
                .unwrap_or_else(|| equal_principal_installment(outstanding, input.periods_remaining)),
            Some(AmortizationPolicy::EqualInstallment) => {
                let payment = Money::from_minor(
                    level_payment(outstanding.minor() as f64, rate, input.periods_remaining).round()
                        as i64,
                );
                (payment - interest).max(Money::ZERO)
            }
        }
    };

    Ok(PaymentSplit {
        interest,
        principal: principal.min(outstanding),
    })
}

/// Full schedule for a fresh loan, one split per period
pub fn amortization_schedule(
    principal: Money,
    annual_rate: f64,
    repayment: RepaymentType,
    total_periods: i64,
    periods_per_year: u32,
    grace_periods: i64,
) -> Result<Vec<PaymentSplit>, AmortizationError> {
    let mut outstanding = principal;
    let mut installment = None;
    let mut schedule = Vec::with_capacity(total_periods.max(0) as usize);

    for elapsed in 0..total_periods {
        let period = LoanPeriod {
            outstanding,
            annual_rate,
            repayment,
            periods_elapsed: elapsed,
            periods_remaining: total_periods - elapsed,
            periods_per_year,
            grace_periods,
            principal_installment: installment,
        };
        let split = amortize(&period)?;
        if installment.is_none() && period.policy() == Some(AmortizationPolicy::EqualPrincipal) {
            installment = Some(split.principal);
        }
        outstanding -= split.principal;
        schedule.push(split);
    }

    Ok(schedule)
}
