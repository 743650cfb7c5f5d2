//! Drive a session the way the daemon loop does: tick, jump to the planned
//! wake, tick again.

use chrono::{DateTime, TimeZone, Utc};

use duskmode::config::{ApplierKind, Appearance, Config, ScheduleMode};
use duskmode::core::{Evaluation, Session};
use duskmode::location::DisabledProvider;
use duskmode::theme::LogApplier;

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, hour, minute, 0).unwrap()
}

fn session(config: Config) -> Session {
    Session::new(
        config,
        Box::new(LogApplier::new()),
        Box::new(DisabledProvider),
        false,
    )
}

fn custom_config() -> Config {
    Config {
        schedule: Some(ScheduleMode::Custom),
        light_time: Some("07:00".to_string()),
        dark_time: Some("19:00".to_string()),
        automatic_location: Some(false),
        timezone: Some("UTC".to_string()),
        applier: Some(ApplierKind::Log),
        ..Config::default()
    }
}

/// Follow planned wakes from `start` for `steps` iterations.
fn run(session: &mut Session, start: DateTime<Utc>, steps: usize) -> Vec<(DateTime<Utc>, bool)> {
    let mut now = start;
    let mut trace = Vec::new();
    for _ in 0..steps {
        let outcome = session.tick(now);
        trace.push((now, session.applied_mode().unwrap_or_default()));
        match outcome.next_wake {
            Some(wake) => {
                assert!(wake > now, "wake {wake} not after {now}");
                now = wake;
            }
            None => break,
        }
    }
    trace
}

#[test]
fn test_custom_schedule_over_a_day() {
    let mut session = session(custom_config());
    let trace = run(&mut session, at(10, 5, 0), 5);

    assert_eq!(
        trace,
        vec![
            (at(10, 5, 0), true),
            (at(10, 7, 0), false),
            (at(10, 19, 0), true),
            // Midnight recomputation in automatic mode
            (at(11, 0, 0), true),
            (at(11, 7, 0), false),
        ]
    );
}

#[test]
fn test_forced_mode_sleeps_until_an_event() {
    let config = Config {
        appearance: Some(Appearance::Dark),
        ..custom_config()
    };
    let mut session = session(config);

    let outcome = session.tick(at(10, 12, 0));
    assert_eq!(outcome.next_wake, None);
    assert_eq!(session.applied_mode(), Some(true));
}

#[test]
fn test_manual_coordinate_drives_solar_schedule() {
    // Berlin; sunrise and sunset both fall between 05:00 and 18:00 UTC in March
    let config = Config {
        schedule: Some(ScheduleMode::Solar),
        latitude: Some(52.52),
        longitude: Some(13.405),
        ..custom_config()
    };
    let mut session = session(config);

    let outcome = session.tick(at(10, 12, 0));
    let Evaluation::Decided(decision) = outcome.evaluation else {
        panic!("manual coordinate should be used");
    };
    assert!(!decision.current_is_dark());
    let sunset = decision.next_transition().unwrap();
    assert!(sunset > at(10, 15, 0) && sunset < at(10, 18, 0));

    // Waking at sunset switches to dark and targets tomorrow's sunrise
    let outcome = session.tick(sunset);
    assert_eq!(session.applied_mode(), Some(true));
    let sunrise = outcome.evaluation.decision().unwrap().next_transition().unwrap();
    assert!(sunrise > at(11, 4, 0) && sunrise < at(11, 7, 0));
}

#[test]
fn test_solar_schedule_without_location_keeps_waiting() {
    let config = Config {
        schedule: Some(ScheduleMode::Solar),
        ..custom_config()
    };
    let mut session = session(config);

    let outcome = session.tick(at(10, 12, 0));
    assert_eq!(outcome.evaluation, Evaluation::AwaitingLocation);
    assert_eq!(outcome.next_wake, Some(at(10, 12, 1)));
    assert_eq!(session.applied_mode(), None);
}
