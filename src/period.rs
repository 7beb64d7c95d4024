//! Quick date-range presets for filtering transactions.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

/// A shorthand for a date range relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    /// The seven days before today, plus today.
    #[serde(rename = "7days")]
    SevenDays,
    /// The 28 days before today, plus today.
    #[serde(rename = "28days")]
    TwentyEightDays,
    /// The previous calendar month.
    #[serde(rename = "lastMonth")]
    LastMonth,
    /// No date bounds.
    #[default]
    #[serde(rename = "all")]
    All,
}

impl Period {
    /// The tag used for this period in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SevenDays => "7days",
            Self::TwentyEightDays => "28days",
            Self::LastMonth => "lastMonth",
            Self::All => "all",
        }
    }

    /// Resolve the period to inclusive date bounds, relative to `today`.
    ///
    /// Returns `None` for [Period::All].
    pub fn resolve(self, today: Date) -> Option<DateRange> {
        match self {
            Self::SevenDays => Some(days_before(today, 7)),
            Self::TwentyEightDays => Some(days_before(today, 28)),
            Self::LastMonth => Some(previous_month_bounds(today)),
            Self::All => None,
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

fn days_before(today: Date, days: i64) -> DateRange {
    DateRange {
        start: today - Duration::days(days),
        end: today,
    }
}

fn previous_month_bounds(today: Date) -> DateRange {
    let first_of_this_month = first_day_of_month(today);
    let end = first_of_this_month - Duration::days(1);

    DateRange {
        start: first_day_of_month(end),
        end,
    }
}

/// The first day of the month that `date` falls in.
pub fn first_day_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

/// The three-letter English abbreviation of `month`.
pub fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
