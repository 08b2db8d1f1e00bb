//! Next-occurrence arithmetic for repeating tasks.
//!
//! Dates are whole calendar days. Month and year steps use overflow
//! normalization: the day of month is kept and any surplus days spill into
//! the following month, so `2024-01-31 + 1 month` is `2024-03-02` and
//! `2024-02-29 + 1 year` is `2025-03-01`. Every step strictly moves the date
//! forward, which the catch-up engine relies on.

use super::error::RecurrenceError;
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceRule {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceRule {
    pub const ALL: [RecurrenceRule; 4] = [Self::Daily, Self::Weekly, Self::Monthly, Self::Yearly];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Parses a stored rule where the empty string means "does not repeat".
    pub fn parse_optional(rule: &str) -> Result<Option<Self>, RecurrenceError> {
        match rule {
            "" => Ok(None),
            other => other.parse().map(Some),
        }
    }

    /// Moves `current` forward by `interval` steps of this rule.
    ///
    /// A non-positive interval is treated as 1.
    pub fn advance(self, current: NaiveDate, interval: i64) -> Result<NaiveDate, RecurrenceError> {
        let interval = if interval <= 0 {
            tracing::warn!(rule = self.as_str(), interval, "non-positive recurrence interval, defaulting to 1");
            1
        } else {
            interval
        };

        let next = match self {
            Self::Daily => add_days(current, interval),
            Self::Weekly => interval.checked_mul(7).and_then(|days| add_days(current, days)),
            Self::Monthly => add_months(current, interval),
            Self::Yearly => interval.checked_mul(12).and_then(|months| add_months(current, months)),
        };
        next.ok_or(RecurrenceError::OutOfRange)
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrenceRule {
    type Err = RecurrenceError;

    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        match rule {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "" => Err(RecurrenceError::InvalidRule),
            other => Err(RecurrenceError::UnsupportedRule(other.to_string())),
        }
    }
}

/// Next due date of a task stored with the textual `rule`.
///
/// Fails with [`RecurrenceError::InvalidRule`] for an empty rule and
/// [`RecurrenceError::UnsupportedRule`] for anything outside the known set.
pub fn next_due_date(current: NaiveDate, rule: &str, interval: i64) -> Result<NaiveDate, RecurrenceError> {
    rule.parse::<RecurrenceRule>()?.advance(current, interval)
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::try_from(days).ok()?))
}

fn add_months(date: NaiveDate, months: i64) -> Option<NaiveDate> {
    let total = i64::from(date.year()).checked_mul(12)?.checked_add(i64::from(date.month0()))?.checked_add(months)?;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_days(Days::new(u64::from(date.day0())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_and_weekly_steps() {
        assert_eq!(next_due_date(date(2024, 6, 1), "daily", 1).unwrap(), date(2024, 6, 2));
        assert_eq!(next_due_date(date(2024, 6, 1), "daily", 3).unwrap(), date(2024, 6, 4));
        assert_eq!(next_due_date(date(2024, 6, 1), "weekly", 2).unwrap(), date(2024, 6, 15));
        assert_eq!(next_due_date(date(2024, 12, 30), "weekly", 1).unwrap(), date(2025, 1, 6));
    }

    #[test]
    fn monthly_overflows_into_next_month() {
        assert_eq!(next_due_date(date(2024, 1, 31), "monthly", 1).unwrap(), date(2024, 3, 2));
        assert_eq!(next_due_date(date(2023, 1, 31), "monthly", 1).unwrap(), date(2023, 3, 3));
        assert_eq!(next_due_date(date(2024, 1, 15), "monthly", 1).unwrap(), date(2024, 2, 15));
        assert_eq!(next_due_date(date(2024, 11, 30), "monthly", 3).unwrap(), date(2025, 3, 2));
        assert_eq!(next_due_date(date(2024, 12, 10), "monthly", 1).unwrap(), date(2025, 1, 10));
    }

    #[test]
    fn yearly_from_leap_day() {
        assert_eq!(next_due_date(date(2024, 2, 29), "yearly", 1).unwrap(), date(2025, 3, 1));
        assert_eq!(next_due_date(date(2024, 2, 29), "yearly", 4).unwrap(), date(2028, 2, 29));
        assert_eq!(next_due_date(date(2023, 7, 4), "yearly", 1).unwrap(), date(2024, 7, 4));
    }

    #[test]
    fn non_positive_interval_counts_as_one() {
        assert_eq!(next_due_date(date(2024, 6, 1), "daily", 0).unwrap(), date(2024, 6, 2));
        assert_eq!(next_due_date(date(2024, 6, 1), "weekly", -3).unwrap(), date(2024, 6, 8));
    }

    #[test]
    fn rule_errors() {
        assert_eq!(next_due_date(date(2024, 6, 1), "", 1), Err(RecurrenceError::InvalidRule));
        assert_eq!(
            next_due_date(date(2024, 6, 1), "hourly", 1),
            Err(RecurrenceError::UnsupportedRule("hourly".to_string()))
        );
        assert_eq!(next_due_date(NaiveDate::MAX, "daily", 1), Err(RecurrenceError::OutOfRange));
    }

    #[test]
    fn every_step_moves_forward() {
        let mut start = date(2023, 12, 25);
        for _ in 0..800 {
            for rule in RecurrenceRule::ALL {
                for interval in [1, 2, 5] {
                    let next = rule.advance(start, interval).unwrap();
                    assert!(next > start, "{} x{} from {} gave {}", rule, interval, start, next);
                }
            }
            start = start.succ_opt().unwrap();
        }
    }

    #[test]
    fn optional_parsing() {
        assert_eq!(RecurrenceRule::parse_optional(""), Ok(None));
        assert_eq!(RecurrenceRule::parse_optional("monthly"), Ok(Some(RecurrenceRule::Monthly)));
        assert!(RecurrenceRule::parse_optional("Monthly").is_err());
    }
}
