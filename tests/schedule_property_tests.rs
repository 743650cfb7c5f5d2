use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;

use duskmode::config::{Appearance, Preferences, ScheduleMode};
use duskmode::core::{Evaluation, evaluate};
use duskmode::geo::{Coordinate, SolarDay, solar_day_for_date};
use duskmode::refresh::{RefreshInputs, RefreshScheduler, stale_backoff};
use duskmode::schedule::{DailyTime, ScheduleDecision, evaluate_custom, evaluate_solar};

/// Any instant in 2026.
fn instant_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap().timestamp();
    (0_i64..365 * 86_400).prop_map(move |offset| {
        Utc.timestamp_opt(start + offset, 0)
            .single()
            .unwrap_or_default()
    })
}

fn daily_time_strategy() -> impl Strategy<Value = DailyTime> {
    (0_i64..1440).prop_map(DailyTime::from_minutes)
}

fn zone_strategy() -> impl Strategy<Value = Tz> {
    prop_oneof![
        Just(Tz::UTC),
        Just(chrono_tz::Europe::Berlin),
        Just(chrono_tz::America::New_York),
        Just(chrono_tz::Australia::Lord_Howe),
        Just(chrono_tz::Asia::Kolkata),
    ]
}

fn coordinate_strategy() -> impl Strategy<Value = Coordinate> {
    (-90.0..=90.0_f64, -180.0..=180.0_f64)
        .prop_map(|(lat, lon)| Coordinate::new(lat, lon).unwrap())
}

proptest! {
    /// Distinct custom times always yield a future switch within about a day.
    #[test]
    fn test_custom_schedule_moves_forward(
        now in instant_strategy(),
        light in daily_time_strategy(),
        dark in daily_time_strategy(),
        zone in zone_strategy(),
    ) {
        prop_assume!(light != dark);

        match evaluate_custom(now, light, dark, &zone) {
            ScheduleDecision::Transition { current_is_dark, next_transition, next_is_dark } => {
                prop_assert!(next_transition > now);
                prop_assert!(next_transition - now <= Duration::hours(26));
                // A DST gap can shift one event past the other
                if zone == Tz::UTC {
                    prop_assert_ne!(current_is_dark, next_is_dark);
                }
            }
            other => prop_assert!(false, "unexpected decision {other:?}"),
        }
    }

    /// Same inputs, same custom decision.
    #[test]
    fn test_custom_schedule_is_deterministic(
        now in instant_strategy(),
        light in daily_time_strategy(),
        dark in daily_time_strategy(),
        zone in zone_strategy(),
    ) {
        prop_assert_eq!(
            evaluate_custom(now, light, dark, &zone),
            evaluate_custom(now, light, dark, &zone)
        );
    }

    /// Same inputs, same solar days and the same decision.
    #[test]
    fn test_solar_schedule_is_deterministic(
        now in instant_strategy(),
        coordinate in coordinate_strategy(),
        zone in zone_strategy(),
    ) {
        let local_date = now.with_timezone(&zone).date_naive();
        let tomorrow = local_date.succ_opt().unwrap();
        let today_day = solar_day_for_date(local_date, coordinate, &zone);
        let tomorrow_day = solar_day_for_date(tomorrow, coordinate, &zone);

        prop_assert_eq!(today_day, solar_day_for_date(local_date, coordinate, &zone));
        prop_assert_eq!(
            evaluate_solar(now, today_day, tomorrow_day, &zone),
            evaluate_solar(now, today_day, tomorrow_day, &zone)
        );
    }

    /// Identical custom times never produce a transition.
    #[test]
    fn test_identical_custom_times_are_fixed(
        now in instant_strategy(),
        time in daily_time_strategy(),
        zone in zone_strategy(),
    ) {
        let decision = evaluate_custom(now, time, time, &zone);
        let is_fixed_light = matches!(decision, ScheduleDecision::Fixed { is_dark: false, .. });
        prop_assert!(is_fixed_light);
    }

    /// The calculator is total and its normal days are well ordered.
    #[test]
    fn test_solar_day_is_well_formed(
        now in instant_strategy(),
        coordinate in coordinate_strategy(),
        zone in zone_strategy(),
    ) {
        let date = now.with_timezone(&zone).date_naive();
        if let SolarDay::Normal { sunrise, sunset } = solar_day_for_date(date, coordinate, &zone) {
            prop_assert!(sunrise < sunset);
        }
    }

    /// A followed solar schedule never plans a switch at or before `now`.
    #[test]
    fn test_solar_evaluation_moves_forward(
        now in instant_strategy(),
        coordinate in coordinate_strategy(),
        zone in zone_strategy(),
    ) {
        let preferences = Preferences {
            appearance: Appearance::Auto,
            schedule: ScheduleMode::Solar,
            ..Preferences::default()
        };

        match evaluate(&preferences, Some(coordinate), now, &zone) {
            Evaluation::Decided(ScheduleDecision::Transition { next_transition, .. }) => {
                prop_assert!(next_transition > now);
            }
            Evaluation::Decided(ScheduleDecision::Fixed { .. }) => {}
            Evaluation::AwaitingLocation => prop_assert!(false, "coordinate was provided"),
        }
    }

    /// Every planned wake is strictly in the future.
    #[test]
    fn test_planned_wake_is_in_future(
        now in instant_strategy(),
        offset_minutes in -600_i64..600,
        automatic in any::<bool>(),
        poll_age_minutes in proptest::option::of(0_i64..120),
        zone in zone_strategy(),
    ) {
        let decision = ScheduleDecision::Transition {
            current_is_dark: false,
            next_transition: now + Duration::minutes(offset_minutes),
            next_is_dark: true,
        };
        let inputs = RefreshInputs {
            is_automatic_mode: automatic,
            requires_location: true,
            last_location_poll: poll_age_minutes.map(|age| now - Duration::minutes(age)),
        };

        let mut scheduler = RefreshScheduler::new();
        let plan = scheduler.plan_next_wake(now, &decision, &inputs, &zone);
        prop_assert!(plan.is_some());
        if let Some(plan) = plan {
            prop_assert!(plan.next_wake > now);
        }
    }

    #[test]
    fn test_stale_backoff_is_bounded(retry in 0_u32..100) {
        let seconds = stale_backoff(retry).num_seconds();
        prop_assert!((1..=60).contains(&seconds));
    }
}
