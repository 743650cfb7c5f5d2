//! Fixed daily clock time decisions.
//!
//! Both events are materialized on yesterday, today and tomorrow. That
//! window always contains at least one past and one future event, which
//! covers overnight windows where the dark time is earlier in the day than
//! the light time.
//!
//! Exact ties are broken by precedence (light 0, dark 1) in both directions:
//! the current mode takes the highest `(instant, precedence)` at or before
//! `now`, so dark wins a tie, while the next transition takes the lowest
//! `(instant, precedence)` after `now`, so light wins a tie.

use chrono::{DateTime, TimeZone, Utc};

use super::calendar::{daily_time_on, ensure_future};
use super::{DailyTime, ScheduleDecision};
use crate::constants::{REASON_IDENTICAL_CUSTOM_TIMES, REASON_INVALID_CUSTOM_SCHEDULE};

#[derive(Debug, Clone, Copy)]
struct CustomEvent {
    instant: DateTime<Utc>,
    is_dark: bool,
}

impl CustomEvent {
    fn sort_key(&self) -> (DateTime<Utc>, u8) {
        (self.instant, u8::from(self.is_dark))
    }
}

/// Decide the current mode and next switch for a custom light/dark pair.
pub fn evaluate_custom<Tz: TimeZone>(
    now: DateTime<Utc>,
    light_time: DailyTime,
    dark_time: DailyTime,
    time_zone: &Tz,
) -> ScheduleDecision {
    if light_time == dark_time {
        return ScheduleDecision::fixed(false, REASON_IDENTICAL_CUSTOM_TIMES);
    }

    let today = now.with_timezone(time_zone).date_naive();
    let events: Vec<CustomEvent> = [today.pred_opt(), Some(today), today.succ_opt()]
        .into_iter()
        .flatten()
        .flat_map(|date| {
            [
                daily_time_on(date, light_time, time_zone).map(|instant| CustomEvent {
                    instant,
                    is_dark: false,
                }),
                daily_time_on(date, dark_time, time_zone).map(|instant| CustomEvent {
                    instant,
                    is_dark: true,
                }),
            ]
        })
        .flatten()
        .collect();

    let current = events
        .iter()
        .filter(|event| event.instant <= now)
        .max_by_key(|event| event.sort_key());
    let next = events
        .iter()
        .filter(|event| event.instant > now)
        .min_by_key(|event| event.sort_key());

    match (current, next) {
        (Some(current), Some(next)) => ScheduleDecision::Transition {
            current_is_dark: current.is_dark,
            next_transition: ensure_future(now, Some(next.instant)),
            next_is_dark: next.is_dark,
        },
        _ => ScheduleDecision::fixed(false, REASON_INVALID_CUSTOM_SCHEDULE),
    }
}
