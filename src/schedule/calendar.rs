//! Local calendar arithmetic shared by the evaluators and the refresh planner.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::DailyTime;
use crate::constants::forward_progress_step;

/// Resolve a local wall-clock time to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap are pushed forward one hour.
pub fn resolve_local<Tz: TimeZone>(naive: NaiveDateTime, time_zone: &Tz) -> Option<DateTime<Utc>> {
    match time_zone.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Some(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => time_zone
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|instant| instant.with_timezone(&Utc)),
    }
}

/// The instant a daily time occurs on a local date.
pub fn daily_time_on<Tz: TimeZone>(
    date: NaiveDate,
    time: DailyTime,
    time_zone: &Tz,
) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(time.hour(), time.minute(), 0)?;
    resolve_local(naive, time_zone)
}

/// First instant of the local day after the one containing `now`.
///
/// Usually local midnight. Zones that skip midnight on a DST change get the
/// first valid hour instead.
pub fn start_of_next_day<Tz: TimeZone>(now: DateTime<Utc>, time_zone: &Tz) -> Option<DateTime<Utc>> {
    let tomorrow = now.with_timezone(time_zone).date_naive().succ_opt()?;
    (0..=3).find_map(|hour| {
        let naive = tomorrow.and_hms_opt(hour, 0, 0)?;
        time_zone
            .from_local_datetime(&naive)
            .earliest()
            .map(|instant| instant.with_timezone(&Utc))
    })
}

/// Apply the forward-progress rule: anything missing or not strictly after
/// `now` becomes `now + 1 minute`.
pub fn ensure_future(now: DateTime<Utc>, candidate: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match candidate {
        Some(instant) if instant > now => instant,
        _ => now + forward_progress_step(),
    }
}
