//! Sunrise/sunset driven decisions.
//!
//! Today's and tomorrow's classifications are passed in explicitly so the
//! evaluator never has to walk the calendar itself. Degenerate normal days
//! are treated as polar night before any branching.

use chrono::{DateTime, TimeZone, Utc};

use super::ScheduleDecision;
use super::calendar::{ensure_future, start_of_next_day};
use crate::constants::{REASON_MIDNIGHT_SUN, REASON_POLAR_NIGHT};
use crate::geo::SolarDay;

/// Decide the current mode and the next switch from two days of solar data.
///
/// `time_zone` locates "start of tomorrow" for days without a sunrise or
/// sunset.
pub fn evaluate_solar<Tz: TimeZone>(
    now: DateTime<Utc>,
    today: SolarDay,
    tomorrow: SolarDay,
    time_zone: &Tz,
) -> ScheduleDecision {
    let tomorrow = tomorrow.normalized();

    match today.normalized() {
        SolarDay::Normal { sunrise, .. } if now < sunrise => {
            transition(now, true, Some(sunrise), false)
        }
        SolarDay::Normal { sunset, .. } if now < sunset => {
            transition(now, false, Some(sunset), true)
        }
        SolarDay::Normal { .. } => dark_until(now, tomorrow, time_zone),
        SolarDay::AlwaysDark => dark_until(now, tomorrow, time_zone),
        SolarDay::AlwaysLight => light_until(now, tomorrow, time_zone),
    }
}

/// Currently dark; find when light begins based on tomorrow.
fn dark_until<Tz: TimeZone>(
    now: DateTime<Utc>,
    tomorrow: SolarDay,
    time_zone: &Tz,
) -> ScheduleDecision {
    match tomorrow {
        SolarDay::AlwaysDark => ScheduleDecision::fixed(true, REASON_POLAR_NIGHT),
        SolarDay::AlwaysLight => transition(now, true, start_of_next_day(now, time_zone), false),
        SolarDay::Normal { sunrise, .. } => transition(now, true, Some(sunrise), false),
    }
}

/// Currently light; find when dark begins based on tomorrow.
fn light_until<Tz: TimeZone>(
    now: DateTime<Utc>,
    tomorrow: SolarDay,
    time_zone: &Tz,
) -> ScheduleDecision {
    match tomorrow {
        SolarDay::AlwaysLight => ScheduleDecision::fixed(false, REASON_MIDNIGHT_SUN),
        SolarDay::AlwaysDark => transition(now, false, start_of_next_day(now, time_zone), true),
        SolarDay::Normal { sunset, .. } => transition(now, false, Some(sunset), true),
    }
}

fn transition(
    now: DateTime<Utc>,
    current_is_dark: bool,
    candidate: Option<DateTime<Utc>>,
    next_is_dark: bool,
) -> ScheduleDecision {
    ScheduleDecision::Transition {
        current_is_dark,
        next_transition: ensure_future(now, candidate),
        next_is_dark,
    }
}
