//! Fixed-point money in integer minor units
//!
//! Every balance, flow and total in the engine is a `Money`. Scaling by a real
//! factor rounds half away from zero, and that is the only place rounding happens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Number of minor units in one major unit
pub const MINOR_PER_MAJOR: i64 = 100;

/// Signed amount of money in minor units (cents)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Build from a raw minor-unit count
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Build from a whole number of major units
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Build from a fractional major amount, rounding to the nearest minor unit
    pub fn from_major_f64(major: f64) -> Self {
        Money((major * MINOR_PER_MAJOR as f64).round() as i64)
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Value in major units, for display only
    pub fn to_major_f64(self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
    }

    /// Multiply by a real factor, rounding half away from zero
    pub fn scale(self, factor: f64) -> Self {
        Money((self.0 as f64 * factor).round() as i64)
    }

    /// Divide into `parts` equal shares, rounding to the nearest minor unit
    pub fn div_round(self, parts: i64) -> Self {
        if parts == 0 {
            return Money::ZERO;
        }
        Money((self.0 as f64 / parts as f64).round() as i64)
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    pub fn min(self, other: Money) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Money) -> Self {
        Money(self.0.max(other.0))
    }

    /// Floor at zero
    pub fn non_negative(self) -> Self {
        self.max(Money::ZERO)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per = MINOR_PER_MAJOR as u64;
        write!(f, "{}{}.{:02}", sign, abs / per, abs % per)
    }
}
