//! Due-date arithmetic used when a list is recalculated.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountBy {
    #[default]
    Days,
    BusinessDays,
    Weeks,
    Months,
}

impl CountBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountBy::Days => "DAYS",
            CountBy::BusinessDays => "BUSINESS DAYS",
            CountBy::Weeks => "WEEKS",
            CountBy::Months => "MONTHS",
        }
    }
}

impl fmt::Display for CountBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "DAYS" | "DAY" => Ok(CountBy::Days),
            "BUSINESS DAYS" | "BUSINESS DAY" => Ok(CountBy::BusinessDays),
            "WEEKS" | "WEEK" => Ok(CountBy::Weeks),
            "MONTHS" | "MONTH" => Ok(CountBy::Months),
            _ => Err(anyhow!("Unknown count-by unit '{}'", s)),
        }
    }
}

/// Move `start` by a signed `offset` counted in `units`. `None` when the
/// result leaves the representable calendar.
pub fn shift(start: NaiveDate, offset: i32, units: CountBy) -> Option<NaiveDate> {
    let magnitude = offset.unsigned_abs();
    let forward = offset >= 0;

    match units {
        CountBy::Days => shift_days(start, u64::from(magnitude), forward),
        CountBy::Weeks => shift_days(start, u64::from(magnitude) * 7, forward),
        CountBy::Months => {
            if forward {
                start.checked_add_months(Months::new(magnitude))
            } else {
                start.checked_sub_months(Months::new(magnitude))
            }
        }
        CountBy::BusinessDays => {
            let mut date = start;
            let mut remaining = magnitude;
            while remaining > 0 {
                date = shift_days(date, 1, forward)?;
                if !is_weekend(date) {
                    remaining -= 1;
                }
            }
            Some(date)
        }
    }
}

fn shift_days(start: NaiveDate, days: u64, forward: bool) -> Option<NaiveDate> {
    if forward {
        start.checked_add_days(Days::new(days))
    } else {
        start.checked_sub_days(Days::new(days))
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
