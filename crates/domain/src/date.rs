use chrono::prelude::*;
use chrono_tz::Tz;

const MILLIS_PER_DAY: i64 = 1000 * 60 * 60 * 24;

/// Parses a `YYYY-MM-DD` date (leading zeros optional)
pub fn is_valid_date(datestr: &str) -> anyhow::Result<(i32, u32, u32)> {
    let invalid = || anyhow::Error::msg(format!("Invalid date: {}", datestr));
    let dates = datestr.split('-').collect::<Vec<_>>();
    if dates.len() != 3 {
        return Err(invalid());
    }
    let year = dates[0].parse::<i32>().map_err(|_| invalid())?;
    let month = dates[1].parse::<u32>().map_err(|_| invalid())?;
    let day = dates[2].parse::<u32>().map_err(|_| invalid())?;

    if !(1970..=2100).contains(&year) || month < 1 || month > 12 {
        return Err(invalid());
    }

    if day < 1 || day > get_month_length(year, month) {
        return Err(invalid());
    }

    Ok((year, month, day))
}

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

// month: January -> 1
pub fn get_month_length(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// A half open time range `[start_ts, end_ts)` in millis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSpan {
    pub start_ts: i64,
    pub end_ts: i64,
}

fn start_of_day(date: NaiveDate, tz: &Tz) -> i64 {
    match date.and_hms_opt(0, 0, 0) {
        Some(midnight) => match tz.from_local_datetime(&midnight).earliest() {
            Some(dt) => dt.timestamp_millis(),
            // Midnight skipped by DST, the day starts one hour later
            None => midnight.and_utc().timestamp_millis() + 1000 * 60 * 60,
        },
        None => 0,
    }
}

/// The span covering the calendar days from `start` to `end`, both inclusive
pub fn days_span(start: (i32, u32, u32), end: (i32, u32, u32), tz: &Tz) -> Option<TimeSpan> {
    let start_date = NaiveDate::from_ymd_opt(start.0, start.1, start.2)?;
    let end_date = NaiveDate::from_ymd_opt(end.0, end.1, end.2)?.succ_opt()?;
    Some(TimeSpan {
        start_ts: start_of_day(start_date, tz),
        end_ts: start_of_day(end_date, tz),
    })
}

/// The span of the calendar day containing `now` in the given timezone
pub fn day_span(now: i64, tz: &Tz) -> TimeSpan {
    let date = match tz.timestamp_millis_opt(now).single() {
        Some(dt) => dt.date_naive(),
        None => {
            return TimeSpan {
                start_ts: now,
                end_ts: now + MILLIS_PER_DAY,
            }
        }
    };
    let ymd = (date.year(), date.month(), date.day());
    days_span(ymd, ymd, tz).unwrap_or(TimeSpan {
        start_ts: now,
        end_ts: now + MILLIS_PER_DAY,
    })
}
