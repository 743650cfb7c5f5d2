//! Human-readable rendering of decisions and solar days.
//!
//! Shared by the daemon log output and the `status`/`week` commands.

use chrono::{DateTime, Duration, DurationRound, TimeZone, Utc};

use crate::geo::SolarDay;
use crate::schedule::ScheduleDecision;

/// Text shown when a solar schedule has no coordinate yet.
pub const WAITING_FOR_LOCATION: &str = "Waiting for location";

pub fn mode_name(is_dark: bool) -> &'static str {
    if is_dark { "Dark" } else { "Light" }
}

/// Countdown until `until`, rounded up to whole minutes: `2h 5m` or `7m`.
///
/// Past instants render as `0m`.
pub fn format_remaining(until: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (until - now).num_seconds().max(0);
    let total_minutes = (seconds + 59) / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// One-line summary of a decision, e.g. `Next: 19:00 (6h 59m) -> Dark mode`.
///
/// Fixed decisions render their reason.
pub fn describe_decision<Tz: TimeZone>(
    decision: &ScheduleDecision,
    now: DateTime<Utc>,
    time_zone: &Tz,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match decision {
        ScheduleDecision::Transition {
            next_transition,
            next_is_dark,
            ..
        } => format!(
            "Next: {} ({}) -> {} mode",
            next_transition.with_timezone(time_zone).format("%H:%M"),
            format_remaining(*next_transition, now),
            mode_name(*next_is_dark)
        ),
        ScheduleDecision::Fixed { reason, .. } => reason.clone(),
    }
}

/// Sunrise/sunset cell for the weekly preview.
pub fn describe_solar_day<Tz: TimeZone>(day: &SolarDay, time_zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match day {
        SolarDay::Normal { sunrise, sunset } => format!(
            "{} – {}",
            sunrise.with_timezone(time_zone).format("%H:%M"),
            sunset.with_timezone(time_zone).format("%H:%M")
        ),
        SolarDay::AlwaysDark => "Polar night".to_string(),
        SolarDay::AlwaysLight => "Midnight sun".to_string(),
    }
}

/// When a visible countdown should next be redrawn.
///
/// The next whole-minute boundary after `now`, or the transition itself when
/// it is still ahead and comes sooner.
pub fn next_countdown_update(
    now: DateTime<Utc>,
    next_transition: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    let minute = Duration::minutes(1);
    let boundary = match now.duration_trunc(minute) {
        Ok(floor) => floor + minute,
        Err(_) => now + minute,
    };

    match next_transition {
        Some(transition) if transition > now && transition < boundary => transition,
        _ => boundary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 24, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_remaining_rounds_up() {
        let now = base();
        assert_eq!(format_remaining(now + Duration::seconds(1), now), "1m");
        assert_eq!(format_remaining(now + Duration::seconds(60), now), "1m");
        assert_eq!(format_remaining(now + Duration::seconds(61), now), "2m");
        assert_eq!(format_remaining(now + Duration::minutes(125), now), "2h 5m");
        assert_eq!(format_remaining(now + Duration::hours(3), now), "3h 0m");
        assert_eq!(format_remaining(now - Duration::minutes(5), now), "0m");
    }

    #[test]
    fn test_describe_transition() {
        let now = base();
        let decision = ScheduleDecision::Transition {
            current_is_dark: false,
            next_transition: Utc.with_ymd_and_hms(2026, 2, 24, 19, 0, 0).unwrap(),
            next_is_dark: true,
        };
        assert_eq!(
            describe_decision(&decision, now, &Utc),
            "Next: 19:00 (7h 0m) -> Dark mode"
        );
        assert_eq!(
            describe_decision(&decision, now, &chrono_tz::Europe::Berlin),
            "Next: 20:00 (7h 0m) -> Dark mode"
        );
    }

    #[test]
    fn test_describe_fixed_uses_reason() {
        let decision = ScheduleDecision::fixed(false, "Forced Light mode");
        assert_eq!(describe_decision(&decision, base(), &Utc), "Forced Light mode");
    }

    #[test]
    fn test_describe_solar_day() {
        let day = SolarDay::Normal {
            sunrise: Utc.with_ymd_and_hms(2026, 3, 20, 6, 4, 0).unwrap(),
            sunset: Utc.with_ymd_and_hms(2026, 3, 20, 18, 13, 0).unwrap(),
        };
        assert_eq!(describe_solar_day(&day, &Utc), "06:04 – 18:13");
        assert_eq!(describe_solar_day(&SolarDay::AlwaysDark, &Utc), "Polar night");
        assert_eq!(describe_solar_day(&SolarDay::AlwaysLight, &Utc), "Midnight sun");
    }

    #[test]
    fn test_countdown_ignores_past_transition() {
        let now = base() + Duration::seconds(10);
        let past = base() + Duration::seconds(5);
        assert_eq!(
            next_countdown_update(now, Some(past)),
            base() + Duration::seconds(60)
        );
    }

    #[test]
    fn test_countdown_uses_sooner_transition() {
        let now = base() + Duration::seconds(10);
        let soon = base() + Duration::seconds(20);
        assert_eq!(next_countdown_update(now, Some(soon)), soon);
    }

    #[test]
    fn test_countdown_on_exact_minute() {
        let now = base();
        assert_eq!(next_countdown_update(now, None), base() + Duration::minutes(1));
        assert_eq!(
            next_countdown_update(now, Some(base() + Duration::hours(1))),
            base() + Duration::minutes(1)
        );
    }
}
