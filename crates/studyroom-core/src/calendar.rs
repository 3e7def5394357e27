//! Week boundaries, calendar-day comparison and duration formatting.
//!
//! Timestamps are stored in UTC; everything that talks about "days" or
//! "weeks" works on the local calendar date of a timestamp.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// First day of the study week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekStart::Monday => f.write_str("monday"),
            WeekStart::Sunday => f.write_str("sunday"),
        }
    }
}

impl FromStr for WeekStart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monday" | "mon" => Ok(WeekStart::Monday),
            "sunday" | "sun" => Ok(WeekStart::Sunday),
            other => Err(format!("invalid week start day: {other}")),
        }
    }
}

/// Inclusive date-only week window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    pub fn containing(date: NaiveDate, start_day: WeekStart) -> Self {
        let start = week_start(date, start_day);
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The week immediately before this one.
    pub fn previous(&self) -> Self {
        Self {
            start: self.start - Duration::days(7),
            end: self.end - Duration::days(7),
        }
    }
}

/// First calendar day of the week containing `date`.
pub fn week_start(date: NaiveDate, start_day: WeekStart) -> NaiveDate {
    let back = match start_day {
        // Sunday counts as the 7th day of a Monday week.
        WeekStart::Monday => date.weekday().num_days_from_monday(),
        WeekStart::Sunday => date.weekday().num_days_from_sunday(),
    };
    date - Duration::days(i64::from(back))
}

/// Midnight at the start of the week containing `date`.
pub fn week_start_datetime(date: NaiveDate, start_day: WeekStart) -> NaiveDateTime {
    week_start(date, start_day).and_time(NaiveTime::MIN)
}

/// Last instant (23:59:59.999) of the week containing `date`.
pub fn week_end(date: NaiveDate, start_day: WeekStart) -> NaiveDateTime {
    let last_day = week_start(date, start_day) + Duration::days(6);
    last_day.and_time(end_of_day())
}

/// The week containing "now" according to `clock`.
pub fn current_week_range(clock: &dyn Clock, start_day: WeekStart) -> WeekRange {
    WeekRange::containing(local_date(clock.now()), start_day)
}

/// Local calendar date of a UTC timestamp.
pub fn local_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

pub fn is_same_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    local_date(a) == local_date(b)
}

pub fn is_today(ts: DateTime<Utc>, clock: &dyn Clock) -> bool {
    is_same_day(ts, clock.now())
}

/// Compact human duration such as `"1h 5m"` or `"12m 30s"`.
pub fn format_duration(seconds: u64, include_seconds: bool) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 || hours > 0 {
        parts.push(format!("{minutes}m"));
    }
    if include_seconds && (secs > 0 || parts.is_empty()) {
        parts.push(format!("{secs}s"));
    }

    if parts.is_empty() {
        "0m".to_string()
    } else {
        parts.join(" ")
    }
}

/// Clock-face rendering: `HH:MM:SS` when there are hours, else `MM:SS`.
pub fn format_timer(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}
