//! Date arithmetic helpers
//!
//! Day differences floor the exact time delta, so an event twelve hours
//! before the reference counts as -1 day, not 0.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days from `earlier` to `later`, floored.
pub fn days_between(later: NaiveDateTime, earlier: NaiveDateTime) -> i64 {
    seconds_between(later, earlier).div_euclid(SECONDS_PER_DAY)
}

/// Seconds from `earlier` to `later`
pub fn seconds_between(later: NaiveDateTime, earlier: NaiveDateTime) -> i64 {
    (later - earlier).num_seconds()
}

/// Count Monday-Friday days in `[start, end)`. Negative spans count as zero.
pub fn business_days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    if end <= start {
        return 0;
    }
    let total = (end - start).num_days();
    let full_weeks = total / 7;
    let mut count = full_weeks * 5;
    let mut day = start + Duration::days(full_weeks * 7);
    while day < end {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
        day += Duration::days(1);
    }
    count
}

/// Round to the nearest whole second
pub fn round_to_second(dt: NaiveDateTime) -> NaiveDateTime {
    let truncated = dt.with_nanosecond(0).unwrap_or(dt);
    if dt.nanosecond() >= 500_000_000 {
        truncated + Duration::seconds(1)
    } else {
        truncated
    }
}

/// Midnight of a date
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

/// Format a second count as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_hms(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "00:00:00".to_string();
    }
    let total = seconds.floor() as i64;
    let hours = total.div_euclid(3600);
    let minutes = total.rem_euclid(3600) / 60;
    let secs = total.rem_euclid(60);
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn days_between_floors() {
        assert_eq!(days_between(at(2024, 1, 5, 0), at(2024, 1, 1, 0)), 4);
        assert_eq!(days_between(at(2024, 1, 5, 23), at(2024, 1, 1, 0)), 4);
        assert_eq!(days_between(at(2024, 1, 1, 0), at(2024, 1, 1, 12)), -1);
    }

    #[test]
    fn business_days_skip_weekends() {
        // Mon 2024-01-01 .. Mon 2024-01-08: five weekdays
        assert_eq!(business_days_between(date(2024, 1, 1), date(2024, 1, 8)), 5);
        // Fri .. Mon: only Friday
        assert_eq!(business_days_between(date(2024, 1, 5), date(2024, 1, 8)), 1);
        assert_eq!(business_days_between(date(2024, 1, 6), date(2024, 1, 8)), 0);
        assert_eq!(business_days_between(date(2024, 1, 8), date(2024, 1, 8)), 0);
        assert_eq!(business_days_between(date(2024, 1, 8), date(2024, 1, 1)), 0);
        assert_eq!(business_days_between(date(2024, 1, 3), date(2024, 1, 31)), 20);
    }

    #[test]
    fn hms_formatting() {
        assert_eq!(format_hms(0.0), "00:00:00");
        assert_eq!(format_hms(3661.7), "01:01:01");
        assert_eq!(format_hms(90_000.0), "25:00:00");
        assert_eq!(format_hms(f64::NAN), "00:00:00");
    }

    #[test]
    fn rounds_to_nearest_second() {
        let base = at(2024, 3, 1, 10);
        let late = base + Duration::milliseconds(999);
        let early = base + Duration::milliseconds(2);
        assert_eq!(round_to_second(late), base + Duration::seconds(1));
        assert_eq!(round_to_second(early), base);
    }
}
