//! Pension benefit math
//!
//! Accumulation runs monthly at the compound-equivalent rate
//! `r_m = (1+annual)^(1/12) - 1`; distribution pays a level monthly amount
//! that depletes the accumulated balance over the distribution window.

use serde::{Deserialize, Serialize};

use crate::household::{PensionCalculation, PensionTerms, ReceiveType};
use crate::money::Money;
use crate::timeline::monthly_rate;

/// Benefit a pension account is expected to pay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PensionEstimate {
    /// Balance at distribution start
    pub accumulated: Money,
    /// Level monthly payment; zero for a lump sum
    pub monthly_payment: Money,
    pub receive: ReceiveType,
}

/// Inputs for a benefit estimate made ahead of distribution
#[derive(Debug, Clone, Copy)]
pub struct AccumulationInput {
    pub balance: Money,
    pub monthly_contribution: Money,
    pub annual_rate: f64,
    /// Months until distribution starts
    pub months_to_start: u32,
    /// Months during which contributions are paid (capped at `months_to_start`)
    pub contribution_months: u32,
}

/// Pension calculation helpers
pub struct PensionCalculator;

impl PensionCalculator {
    /// Future value of a balance plus end-of-month contributions
    ///
    /// Contributions stop after `contribution_months`; what they built keeps
    /// compounding until `months`.
    pub fn future_value(
        balance: f64,
        monthly_contribution: f64,
        monthly_rate: f64,
        months: u32,
        contribution_months: u32,
    ) -> f64 {
        let paying = contribution_months.min(months);
        let growth = (1.0 + monthly_rate).powi(months as i32);

        let contributions = if monthly_rate.abs() < 1e-10 {
            monthly_contribution * paying as f64
        } else {
            let annuity_fv =
                monthly_contribution * ((1.0 + monthly_rate).powi(paying as i32) - 1.0) / monthly_rate;
            annuity_fv * (1.0 + monthly_rate).powi((months - paying) as i32)
        };

        balance * growth + contributions
    }

    /// Level payment that depletes `balance` over `months` at `monthly_rate`
    ///
    /// Returns `None` for a zero-length distribution.
    pub fn level_payment(balance: f64, monthly_rate: f64, months: u32) -> Option<f64> {
        if months == 0 {
            return None;
        }
        if monthly_rate.abs() < 1e-10 {
            return Some(balance / months as f64);
        }
        let v = 1.0 / (1.0 + monthly_rate);
        Some(balance * monthly_rate / (1.0 - v.powi(months as i32)))
    }

    /// Defined-benefit lump: annual salary / 12 × years of service
    pub fn defined_benefit(annual_salary: Money, total_service_years: f64) -> Money {
        annual_salary.div_round(12).scale(total_service_years)
    }

    /// Monthly payment for an annuity starting from `balance`
    pub fn distribution_payment(balance: Money, annual_rate: f64, months: u32) -> Option<Money> {
        Self::level_payment(balance.minor() as f64, monthly_rate(annual_rate), months)
            .map(|pmt| Money::from_minor(pmt.round() as i64))
    }

    /// Projected benefit for a pension account
    ///
    /// Returns `None` when the terms describe an annuity with no months.
    pub fn estimate(terms: &PensionTerms, input: &AccumulationInput) -> Option<PensionEstimate> {
        let accumulated = match terms.calculation {
            PensionCalculation::Manual => {
                let fv = Self::future_value(
                    input.balance.minor() as f64,
                    input.monthly_contribution.minor() as f64,
                    monthly_rate(input.annual_rate),
                    input.months_to_start,
                    input.contribution_months,
                );
                Money::from_minor(fv.round() as i64)
            }
            PensionCalculation::Auto {
                annual_salary,
                total_service_years,
            } => Self::defined_benefit(annual_salary, total_service_years),
        };

        let monthly_payment = match terms.receive {
            ReceiveType::LumpSum => Money::ZERO,
            ReceiveType::Annuity => {
                Self::distribution_payment(accumulated, input.annual_rate, terms.distribution_months())?
            }
        };

        Some(PensionEstimate {
            accumulated,
            monthly_payment,
            receive: terms.receive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn terms(receive: ReceiveType, calculation: PensionCalculation) -> PensionTerms {
        PensionTerms {
            start_age: 65,
            distribution_years: 20,
            calculation,
            receive,
        }
    }

    #[test]
    fn test_future_value_without_contributions() {
        let r = monthly_rate(0.05);
        let fv = PensionCalculator::future_value(1_000.0, 0.0, r, 120, 0);
        assert_relative_eq!(fv, 1_000.0 * 1.05f64.powi(10), max_relative = 1e-10);
    }

    #[test]
    fn test_future_value_zero_rate_is_linear() {
        let fv = PensionCalculator::future_value(1_000.0, 100.0, 0.0, 24, 12);
        assert_relative_eq!(fv, 2_200.0);
    }

    #[test]
    fn test_contributions_keep_compounding_after_they_stop() {
        let r = 0.004;
        let short = PensionCalculator::future_value(0.0, 100.0, r, 24, 12);
        let annuity = 100.0 * ((1.0 + r).powi(12) - 1.0) / r;
        assert_relative_eq!(short, annuity * (1.0 + r).powi(12), max_relative = 1e-12);
    }

    #[test]
    fn test_payment_depletes_balance() {
        let r = monthly_rate(0.04);
        let pmt = PensionCalculator::level_payment(250_000.0, r, 240).unwrap();

        let mut balance = 250_000.0;
        for _ in 0..240 {
            balance = balance * (1.0 + r) - pmt;
        }
        assert!(balance.abs() < 1e-6);
    }

    #[test]
    fn test_zero_rate_payment_is_linear() {
        let pmt = PensionCalculator::level_payment(120_000.0, 0.0, 240).unwrap();
        assert_relative_eq!(pmt, 500.0);
    }

    #[test]
    fn test_zero_months_has_no_payment() {
        assert!(PensionCalculator::level_payment(1_000.0, 0.01, 0).is_none());
        let t = PensionTerms {
            distribution_years: 0,
            ..terms(ReceiveType::Annuity, PensionCalculation::Manual)
        };
        let input = AccumulationInput {
            balance: Money::from_major(1_000),
            monthly_contribution: Money::ZERO,
            annual_rate: 0.03,
            months_to_start: 12,
            contribution_months: 0,
        };
        assert!(PensionCalculator::estimate(&t, &input).is_none());
    }

    #[test]
    fn test_auto_defined_benefit() {
        let calc = PensionCalculation::Auto {
            annual_salary: Money::from_major(60_000),
            total_service_years: 30.0,
        };
        let input = AccumulationInput {
            balance: Money::ZERO,
            monthly_contribution: Money::ZERO,
            annual_rate: 0.0,
            months_to_start: 0,
            contribution_months: 0,
        };
        let estimate = PensionCalculator::estimate(&terms(ReceiveType::Annuity, calc), &input).unwrap();
        assert_eq!(estimate.accumulated, Money::from_major(150_000));
        // 150,000 over 240 months at 0%
        assert_eq!(estimate.monthly_payment, Money::from_major(625));
    }

    #[test]
    fn test_lump_sum_skips_payment() {
        let input = AccumulationInput {
            balance: Money::from_major(50_000),
            monthly_contribution: Money::from_major(500),
            annual_rate: 0.0,
            months_to_start: 24,
            contribution_months: 24,
        };
        let estimate = PensionCalculator::estimate(
            &terms(ReceiveType::LumpSum, PensionCalculation::Manual),
            &input,
        )
        .unwrap();
        assert_eq!(estimate.accumulated, Money::from_major(62_000));
        assert_eq!(estimate.monthly_payment, Money::ZERO);
        assert_eq!(estimate.receive, ReceiveType::LumpSum);
    }
}
