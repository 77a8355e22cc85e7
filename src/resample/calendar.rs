//! Calendar-key helpers shared by the regularizer and the aggregator.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::resample::types::WeekKey;

/// Zeroes minutes, seconds and sub-seconds.
pub fn truncate_to_hour(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date()
        .and_time(NaiveTime::from_hms_opt(ts.hour(), 0, 0).unwrap_or_default())
}

/// Midnight of the same day.
pub fn truncate_to_day(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_time(NaiveTime::default())
}

/// Midnight on the first day of the month.
pub fn truncate_to_month(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date()
        .with_day(1)
        .unwrap_or(ts.date())
        .and_time(NaiveTime::default())
}

/// Midnight on January 1.
pub fn truncate_to_year(ts: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(ts.year(), 1, 1)
        .unwrap_or(ts.date())
        .and_time(NaiveTime::default())
}

/// ISO week of `date` with the year the week belongs to.
///
/// Early-January days in week 52 go to the previous year and late-December
/// days already in week 1 go to the next one. Every other date, week 53
/// included, keeps its calendar year.
pub fn week_key(date: NaiveDate) -> WeekKey {
    let week = date.iso_week().week();
    let year = if week == 52 && date.month() == 1 {
        date.year() - 1
    } else if week == 1 && date.month() == 12 {
        date.year() + 1
    } else {
        date.year()
    };
    WeekKey { year, week }
}

/// Every calendar day from `first` to `last`, inclusive.
pub fn days_spanned(first: NaiveDate, last: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    first.iter_days().take_while(move |d| *d <= last)
}

/// The 24 whole-hour timestamps of `day`.
pub fn hours_of(day: NaiveDate) -> impl Iterator<Item = NaiveDateTime> {
    (0..24).filter_map(move |h| day.and_hms_opt(h, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_truncations() {
        let ts = dt(2019, 7, 18, 13, 45, 12);
        assert_eq!(truncate_to_hour(ts), dt(2019, 7, 18, 13, 0, 0));
        assert_eq!(truncate_to_day(ts), dt(2019, 7, 18, 0, 0, 0));
        assert_eq!(truncate_to_month(ts), dt(2019, 7, 1, 0, 0, 0));
        assert_eq!(truncate_to_year(ts), dt(2019, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_truncate_to_hour_drops_subseconds() {
        let ts = dt(2019, 7, 18, 13, 5, 0) + chrono::TimeDelta::milliseconds(250);
        assert_eq!(truncate_to_hour(ts), dt(2019, 7, 18, 13, 0, 0));
    }

    #[test]
    fn test_week_52_in_january_belongs_to_previous_year() {
        // 2017-01-01 is a Sunday in ISO week 52 of 2016.
        let date = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
        assert_eq!(date.iso_week().week(), 52);
        assert_eq!(week_key(date), WeekKey { year: 2016, week: 52 });
    }

    #[test]
    fn test_week_1_in_december_belongs_to_next_year() {
        // 2019-12-30 is the Monday of ISO week 1 of 2020.
        let date = NaiveDate::from_ymd_opt(2019, 12, 30).unwrap();
        assert_eq!(date.iso_week().week(), 1);
        assert_eq!(week_key(date), WeekKey { year: 2020, week: 1 });
    }

    #[test]
    fn test_week_53_in_january_keeps_calendar_year() {
        // 2021-01-02 is a Saturday in ISO week 53 of 2020.
        let date = NaiveDate::from_ymd_opt(2021, 1, 2).unwrap();
        assert_eq!(date.iso_week().week(), 53);
        assert_eq!(week_key(date), WeekKey { year: 2021, week: 53 });
    }

    #[test]
    fn test_days_spanned_is_inclusive() {
        let first = NaiveDate::from_ymd_opt(2020, 2, 27).unwrap();
        let last = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let days: Vec<_> = days_spanned(first, last).collect();
        assert_eq!(days.len(), 4);
        assert_eq!(days[2], NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
    }

    #[test]
    fn test_hours_of_day() {
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let hours: Vec<_> = hours_of(day).collect();
        assert_eq!(hours.len(), 24);
        assert_eq!(hours[23], dt(2020, 1, 1, 23, 0, 0));
    }
}
