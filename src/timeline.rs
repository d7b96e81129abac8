//! Timeline construction and calendar resolution
//!
//! The timeline is the ordered period sequence the engine folds over. It also
//! owns every conversion from calendar months to period ordinals, so entity
//! windows, ages and rule windows all agree on where a boundary falls.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProjectionError, Result};
use crate::household::{Household, Person};

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Months since year 0, used for ordinal arithmetic
    pub fn month_index(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }

    pub fn from_month_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }

    pub fn add_months(&self, months: i64) -> Self {
        Self::from_month_index(self.month_index() + months)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Parse `YYYY-MM`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{}'", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in '{}'", s))?;

        let ym = YearMonth::new(year, month);
        if !ym.is_valid() {
            return Err(format!("month out of range in '{}'", s));
        }
        Ok(ym)
    }
}

/// Step size of the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Granularity {
    #[default]
    Annual,
    Monthly,
}

impl Granularity {
    pub fn months_per_period(&self) -> u32 {
        match self {
            Granularity::Annual => 12,
            Granularity::Monthly => 1,
        }
    }

    pub fn periods_per_year(&self) -> u32 {
        12 / self.months_per_period()
    }

    /// Convert an annual rate into the equivalent compound rate per period
    pub fn periodic_rate(&self, annual_rate: f64) -> f64 {
        match self {
            Granularity::Annual => annual_rate,
            Granularity::Monthly => monthly_rate(annual_rate),
        }
    }
}

/// Equivalent monthly compound rate: (1+r)^(1/12) - 1
pub fn monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

/// One simulation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// 0-based ordinal
    pub index: u32,
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn year_month(&self) -> YearMonth {
        YearMonth::new(self.year, self.month)
    }
}

/// Ordered, finite period sequence plus calendar helpers
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    start: YearMonth,
    granularity: Granularity,
    periods: Vec<Period>,
}

impl Timeline {
    /// Build the period sequence from `start` up to the later of the two
    /// life-expectancy months (inclusive)
    pub fn build(household: &Household, start: YearMonth, granularity: Granularity) -> Result<Self> {
        if !start.is_valid() {
            return Err(ProjectionError::config(
                "timeline",
                format!("invalid start month {}", start),
            ));
        }

        let self_end = household.person.life_expectancy_month();
        let end = match &household.spouse {
            Some(spouse) => self_end.max(spouse.life_expectancy_month()),
            None => self_end,
        };

        if end < start {
            return Err(ProjectionError::config(
                "timeline",
                format!("simulation start {} is after the horizon {}", start, end),
            ));
        }

        let step = granularity.months_per_period() as i64;
        let count = (end.month_index() - start.month_index()) / step + 1;
        let periods = (0..count)
            .map(|i| {
                let ym = start.add_months(i * step);
                Period {
                    index: i as u32,
                    year: ym.year,
                    month: ym.month,
                }
            })
            .collect();

        Ok(Self {
            start,
            granularity,
            periods,
        })
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn start(&self) -> YearMonth {
        self.start
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn months_per_period(&self) -> u32 {
        self.granularity.months_per_period()
    }

    pub fn periods_per_year(&self) -> u32 {
        self.granularity.periods_per_year()
    }

    /// Ordinal of the period containing `ym`; negative before the start
    pub fn ordinal_of(&self, ym: YearMonth) -> i64 {
        let offset = ym.month_index() - self.start.month_index();
        offset.div_euclid(self.months_per_period() as i64)
    }

    /// First calendar month of period `index`
    pub fn month_of(&self, index: u32) -> YearMonth {
        self.start
            .add_months(index as i64 * self.months_per_period() as i64)
    }

    /// Whole years of age at the first month of period `index`
    pub fn age_at(&self, person: &Person, index: u32) -> u32 {
        person.age_at(self.month_of(index))
    }
}
