use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

use crate::errors::{NanosError, NanosResult};

/// `moment` shifted by a whole number of days (negative goes back).
///
/// Fails instead of wrapping when the result leaves chrono's date range.
pub fn days_after<Tz: TimeZone>(moment: DateTime<Tz>, days: i64) -> NanosResult<DateTime<Tz>> {
    TimeDelta::try_days(days)
        .and_then(|delta| moment.checked_add_signed(delta))
        .ok_or(NanosError::DateOutOfRange { days })
}

/// Now in `tz`, shifted by `days` days.
pub fn days_after_now<Tz: TimeZone>(days: i64, tz: &Tz) -> NanosResult<DateTime<Tz>> {
    days_after(Utc::now().with_timezone(tz), days)
}

pub fn tomorrow<Tz: TimeZone>(tz: &Tz) -> NanosResult<DateTime<Tz>> {
    days_after_now(1, tz)
}

pub fn days_before_now<Tz: TimeZone>(days: i64, tz: &Tz) -> NanosResult<DateTime<Tz>> {
    let back = days.checked_neg().ok_or(NanosError::DateOutOfRange { days })?;
    days_after_now(back, tz)
}

pub fn yesterday<Tz: TimeZone>(tz: &Tz) -> NanosResult<DateTime<Tz>> {
    days_before_now(1, tz)
}

/// Midnight at the start of yesterday, in `tz`.
pub fn yesterday_start<Tz: TimeZone>(tz: &Tz) -> NanosResult<DateTime<Tz>> {
    start_of_day(&yesterday(tz)?)
}

/// Last microsecond of yesterday, in `tz`.
pub fn yesterday_end<Tz: TimeZone>(tz: &Tz) -> NanosResult<DateTime<Tz>> {
    end_of_day(&yesterday(tz)?)
}

/// Last microsecond of today's *local* calendar date, labelled with `tz`.
pub fn today_eod<Tz: TimeZone>(tz: &Tz) -> NanosResult<DateTime<Tz>> {
    at_time(Local::now().date_naive(), last_microsecond(), tz)
}

/// `00:00:00` on the calendar day of `moment`, in its own zone.
pub fn start_of_day<Tz: TimeZone>(moment: &DateTime<Tz>) -> NanosResult<DateTime<Tz>> {
    at_time(moment.date_naive(), NaiveTime::MIN, &moment.timezone())
}

/// `23:59:59.999999` on the calendar day of `moment`, in its own zone.
pub fn end_of_day<Tz: TimeZone>(moment: &DateTime<Tz>) -> NanosResult<DateTime<Tz>> {
    at_time(moment.date_naive(), last_microsecond(), &moment.timezone())
}

fn last_microsecond() -> NaiveTime {
    NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or(NaiveTime::MIN)
}

fn at_time<Tz: TimeZone>(date: NaiveDate, time: NaiveTime, tz: &Tz) -> NanosResult<DateTime<Tz>> {
    let wall = date.and_time(time);
    // ambiguous (DST fold) resolves to the earlier instant
    tz.from_local_datetime(&wall)
        .earliest()
        .ok_or_else(|| NanosError::NonexistentLocalTime {
            datetime: wall.to_string(),
        })
}
