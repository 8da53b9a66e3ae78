use chrono::{Datelike, NaiveDate, Weekday};

use super::domain::DayPortion;

/// Monday through Friday, irrespective of holidays.
pub fn is_working_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Count of working days in the inclusive range. Returns 0 when `end < start`.
pub fn working_days_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| is_working_day(*day))
        .count() as u32
}

/// Days the request consumes: working-day count scaled by the portion of each
/// day taken. Stays at 0.5 granularity.
pub fn leave_days(start: NaiveDate, end: NaiveDate, portion: DayPortion) -> f64 {
    f64::from(working_days_between(start, end)) * portion.multiplier()
}
