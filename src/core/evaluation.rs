//! One evaluation of the user's preferences at an instant.

use chrono::{DateTime, TimeZone, Utc};

use crate::config::{Appearance, Preferences, ScheduleMode};
use crate::constants::{REASON_FORCED_DARK, REASON_FORCED_LIGHT, REASON_POLAR_NIGHT};
use crate::geo::{Coordinate, solar_day_for_date};
use crate::schedule::{ScheduleDecision, evaluate_custom, evaluate_solar};

/// Outcome of evaluating the preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Decided(ScheduleDecision),
    /// A solar schedule is active but no coordinate is known yet.
    AwaitingLocation,
}

impl Evaluation {
    pub fn decision(&self) -> Option<&ScheduleDecision> {
        match self {
            Evaluation::Decided(decision) => Some(decision),
            Evaluation::AwaitingLocation => None,
        }
    }
}

/// Evaluate `preferences` at `now` with the calendar of `time_zone`.
///
/// `coordinate` is only consulted for a followed solar schedule.
pub fn evaluate<Tz: TimeZone>(
    preferences: &Preferences,
    coordinate: Option<Coordinate>,
    now: DateTime<Utc>,
    time_zone: &Tz,
) -> Evaluation {
    let decision = match (preferences.appearance, preferences.schedule) {
        (Appearance::Light, _) => ScheduleDecision::fixed(false, REASON_FORCED_LIGHT),
        (Appearance::Dark, _) => ScheduleDecision::fixed(true, REASON_FORCED_DARK),
        (Appearance::Auto, ScheduleMode::Custom) => evaluate_custom(
            now,
            preferences.light_time,
            preferences.dark_time,
            time_zone,
        ),
        (Appearance::Auto, ScheduleMode::Solar) => {
            let Some(coordinate) = coordinate else {
                return Evaluation::AwaitingLocation;
            };
            let today = now.with_timezone(time_zone).date_naive();
            let Some(tomorrow) = today.succ_opt() else {
                return Evaluation::Decided(ScheduleDecision::fixed(true, REASON_POLAR_NIGHT));
            };
            evaluate_solar(
                now,
                solar_day_for_date(today, coordinate, time_zone),
                solar_day_for_date(tomorrow, coordinate, time_zone),
                time_zone,
            )
        }
    };

    Evaluation::Decided(decision)
}
