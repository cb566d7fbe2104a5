//! Calendar dimension types
//!
//! One `CalendarDay` per date in the observed creation range, used for
//! calendar-based joins downstream (month, ISO week, business-day flag).

use chrono::{Datelike, Month, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// A (year, month) period
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// English month name ("January")
    pub fn month_name(&self) -> &'static str {
        month_name(self.month)
    }

    /// Sortable key, e.g. "2024-01"
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Display label, e.g. "January 2024"
    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }
}

/// English month name for a 1-based month number; empty for out-of-range input.
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map_or("", |m| m.name())
}

/// English weekday name ("Monday")
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Monday to Friday
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// One row of the calendar table
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub weekday_name: &'static str,
    pub business_day: bool,
    pub iso_week: u32,
    /// "YYYY-MM"
    pub month_key: String,
}

impl CalendarDay {
    pub fn new(date: NaiveDate) -> Self {
        let period = YearMonth::of(date);
        Self {
            date,
            year: period.year,
            month: period.month,
            month_name: period.month_name(),
            weekday_name: weekday_name(date.weekday()),
            business_day: is_business_day(date),
            iso_week: date.iso_week().week(),
            month_key: period.key(),
        }
    }

    /// "S" for business days, "N" otherwise
    pub fn business_day_flag(&self) -> &'static str {
        if self.business_day {
            "S"
        } else {
            "N"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_day_fields() {
        // 2024-01-06 is a Saturday in ISO week 1
        let day = CalendarDay::new(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        assert_eq!(day.weekday_name, "Saturday");
        assert_eq!(day.business_day_flag(), "N");
        assert_eq!(day.iso_week, 1);
        assert_eq!(day.month_key, "2024-01");
        assert_eq!(day.month_name, "January");
    }

    #[test]
    fn year_month_label() {
        let period = YearMonth::of(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(period.label(), "December 2023");
        assert!(period < YearMonth { year: 2024, month: 1 });
        assert_eq!(month_name(13), "");
    }
}
