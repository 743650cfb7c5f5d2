//! Mutable scheduling state owned by the main loop.
//!
//! A [`Session`] turns "it is now T" into an applied mode and the next wake
//! instant. It knows nothing about channels or signals, so the whole
//! evaluate/apply/plan cycle can be driven directly from tests.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::evaluation::{Evaluation, evaluate};
use crate::config::{Config, Preferences};
use crate::constants::{
    ZONE_MISMATCH_WARNING_HOURS, apply_retry_interval, awaiting_location_retry,
    location_refresh_interval,
};
use crate::display::{WAITING_FOR_LOCATION, describe_decision, mode_name};
use crate::geo::Coordinate;
use crate::geo::timezone::{ZoneSource, resolve_zone, solar_offset_gap_hours, system_zone};
use crate::location::{LocationFix, LocationProvider};
use crate::refresh::{RefreshInputs, RefreshScheduler};
use crate::theme::ThemeApplier;

/// Result of one [`Session::tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub evaluation: Evaluation,
    /// `None` means wait for an external event.
    pub next_wake: Option<DateTime<Utc>>,
}

pub struct Session {
    config: Config,
    preferences: Preferences,
    applier: Box<dyn ThemeApplier>,
    location: Box<dyn LocationProvider>,
    refresh: RefreshScheduler,
    system_zone: Option<Tz>,
    detected_coordinate: Option<Coordinate>,
    last_location_poll: Option<DateTime<Utc>>,
    poll_requested: bool,
    applied_mode: Option<bool>,
    last_evaluation: Option<Evaluation>,
    /// Zone and coordinate last reported as mismatched.
    zone_warning: Option<(Tz, Coordinate)>,
    debug_enabled: bool,
}

impl Session {
    pub fn new(
        config: Config,
        applier: Box<dyn ThemeApplier>,
        location: Box<dyn LocationProvider>,
        debug_enabled: bool,
    ) -> Self {
        Self {
            preferences: config.preferences(),
            config,
            applier,
            location,
            refresh: RefreshScheduler::new(),
            system_zone: system_zone(),
            detected_coordinate: None,
            last_location_poll: None,
            poll_requested: true,
            applied_mode: None,
            last_evaluation: None,
            zone_warning: None,
            debug_enabled,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Last mode the applier accepted.
    pub fn applied_mode(&self) -> Option<bool> {
        self.applied_mode
    }

    pub fn stale_retry_count(&self) -> u32 {
        self.refresh.stale_retry_count()
    }

    /// Poll the location on the next tick regardless of its age.
    pub fn request_location_poll(&mut self) {
        self.poll_requested = true;
    }

    /// The system zone may have changed along with the clock.
    pub fn refresh_system_zone(&mut self) {
        self.system_zone = system_zone();
    }

    /// Swap in a reloaded configuration.
    ///
    /// `applier` and `location` replace the current ones when given; the
    /// caller decides whether the relevant settings changed.
    pub fn replace_config(
        &mut self,
        config: Config,
        applier: Option<Box<dyn ThemeApplier>>,
        location: Option<Box<dyn LocationProvider>>,
    ) {
        self.preferences = config.preferences();
        self.config = config;
        if let Some(applier) = applier {
            self.applier = applier;
            // A new applier has not applied anything yet
            self.applied_mode = None;
        }
        if let Some(location) = location {
            self.location = location;
            self.detected_coordinate = None;
        }
        self.refresh.reset();
        self.last_evaluation = None;
        self.poll_requested = true;
    }

    /// Calendar zone and where it came from, for the active coordinate.
    pub fn time_zone(&self) -> (Tz, ZoneSource) {
        resolve_zone(
            self.config.timezone.as_deref(),
            self.system_zone,
            self.active_coordinate(),
        )
    }

    /// Detected coordinate, else the manual one.
    pub fn active_coordinate(&self) -> Option<Coordinate> {
        self.detected_coordinate.or(self.preferences.manual_coordinate)
    }

    fn polls_location(&self) -> bool {
        self.preferences.automatic_location && self.preferences.requires_location()
    }

    fn poll_location_if_due(&mut self, now: DateTime<Utc>) {
        if !self.polls_location() {
            return;
        }

        let due = match self.last_location_poll {
            Some(last) => now - last >= location_refresh_interval(),
            None => true,
        };
        if !(self.poll_requested || due) {
            return;
        }

        self.poll_requested = false;
        self.last_location_poll = Some(now);

        match self.location.poll() {
            LocationFix::Located(coordinate) => {
                if self.detected_coordinate != Some(coordinate) {
                    log_block_start!(
                        "Location: {}, {}",
                        coordinate.latitude_label(),
                        coordinate.longitude_label()
                    );
                    if self.debug_enabled {
                        log_indented!("Provider: {}", self.location.name());
                    }
                }
                self.detected_coordinate = Some(coordinate);
            }
            LocationFix::Denied => {
                log_pipe!();
                log_warning!("Location access was denied");
                self.log_location_fallback();
            }
            LocationFix::Unavailable(reason) => {
                log_pipe!();
                log_warning!("Location unavailable: {reason}");
                self.log_location_fallback();
            }
        }
    }

    fn log_location_fallback(&self) {
        if self.detected_coordinate.is_some() {
            log_indented!("Keeping the previously detected location");
        } else if self.preferences.manual_coordinate.is_some() {
            log_indented!("Using the configured coordinates");
        }
    }

    /// Warn once per zone and coordinate pair when the calendar zone is far
    /// from the coordinate's solar time. Returns whether a warning was logged.
    fn warn_on_zone_mismatch(&mut self, zone: Tz, source: ZoneSource, now: DateTime<Utc>) -> bool {
        if !self.preferences.requires_location() {
            return false;
        }
        let Some(coordinate) = self.active_coordinate() else {
            return false;
        };
        if self.zone_warning == Some((zone, coordinate)) {
            return false;
        }

        let gap = solar_offset_gap_hours(&zone, coordinate, now);
        if gap <= ZONE_MISMATCH_WARNING_HOURS {
            return false;
        }

        self.zone_warning = Some((zone, coordinate));
        log_pipe!();
        log_warning!(
            "Time zone {} ({source}) is {gap:.1}h away from solar time at {}, {}",
            zone.name(),
            coordinate.latitude_label(),
            coordinate.longitude_label()
        );
        log_indented!("Sunrise and sunset may fall on the wrong local day");
        log_indented!("Set `timezone` in the config to the zone of this location");
        true
    }

    fn apply(&mut self, is_dark: bool, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.applied_mode == Some(is_dark) {
            return None;
        }

        match self.applier.apply(is_dark) {
            Ok(()) => {
                log_block_start!("Switched to {} mode", mode_name(is_dark));
                if self.debug_enabled {
                    log_indented!("Applier: {}", self.applier.name());
                }
                self.applied_mode = Some(is_dark);
                None
            }
            Err(e) => {
                log_pipe!();
                log_error!("Failed to apply {} mode: {e}", mode_name(is_dark));
                log_indented!("Retrying in {}s", apply_retry_interval().num_seconds());
                Some(now + apply_retry_interval())
            }
        }
    }

    fn log_evaluation(&self, evaluation: &Evaluation, now: DateTime<Utc>, time_zone: &Tz) {
        match evaluation {
            Evaluation::Decided(decision) => {
                log_block_start!("{} mode", mode_name(decision.current_is_dark()));
                log_indented!("{}", describe_decision(decision, now, time_zone));
            }
            Evaluation::AwaitingLocation => {
                log_block_start!("{WAITING_FOR_LOCATION}");
            }
        }
    }

    /// Evaluate at `now`, apply the mode if it changed and plan the next wake.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        self.poll_location_if_due(now);

        let (time_zone, source) = self.time_zone();
        self.warn_on_zone_mismatch(time_zone, source, now);
        let evaluation = evaluate(&self.preferences, self.active_coordinate(), now, &time_zone);

        if self.last_evaluation.as_ref() != Some(&evaluation) {
            self.log_evaluation(&evaluation, now, &time_zone);
        }

        let next_wake = match &evaluation {
            Evaluation::Decided(decision) => {
                let apply_retry = self.apply(decision.current_is_dark(), now);
                let inputs = RefreshInputs {
                    is_automatic_mode: self.preferences.is_automatic_mode(),
                    requires_location: self.polls_location(),
                    last_location_poll: self.last_location_poll,
                };
                let planned = self
                    .refresh
                    .plan_next_wake(now, decision, &inputs, &time_zone)
                    .map(|plan| plan.next_wake);

                match (planned, apply_retry) {
                    (Some(planned), Some(retry)) => Some(planned.min(retry)),
                    (planned, retry) => planned.or(retry),
                }
            }
            Evaluation::AwaitingLocation => {
                // Keep asking while the provider has nothing
                self.poll_requested = true;
                Some(now + awaiting_location_retry())
            }
        };

        if self.debug_enabled
            && let Some(wake) = next_wake
        {
            log_debug!(
                "Next wake at {}",
                wake.with_timezone(&time_zone).format("%Y-%m-%d %H:%M:%S %Z")
            );
        }

        self.last_evaluation = Some(evaluation.clone());
        TickOutcome {
            evaluation,
            next_wake,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Appearance, ScheduleMode};
    use crate::location::MockLocationProvider;
    use crate::schedule::ScheduleDecision;
    use crate::theme::{ApplyError, MockThemeApplier};
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, hour, minute, 0).unwrap()
    }

    fn custom_config() -> Config {
        Config {
            schedule: Some(ScheduleMode::Custom),
            light_time: Some("07:00".to_string()),
            dark_time: Some("19:00".to_string()),
            timezone: Some("UTC".to_string()),
            ..Config::default()
        }
    }

    fn idle_location() -> Box<MockLocationProvider> {
        let mut location = MockLocationProvider::new();
        location.expect_poll().never();
        location.expect_name().return_const("mock");
        Box::new(location)
    }

    fn recording_applier(expected: Vec<bool>) -> Box<MockThemeApplier> {
        let mut applier = MockThemeApplier::new();
        let mut sequence = mockall::Sequence::new();
        for is_dark in expected {
            applier
                .expect_apply()
                .withf(move |mode| *mode == is_dark)
                .times(1)
                .in_sequence(&mut sequence)
                .returning(|_| Ok(()));
        }
        applier.expect_name().return_const("mock");
        Box::new(applier)
    }

    #[test]
    fn test_applies_once_per_mode_change() {
        let mut session = Session::new(
            custom_config(),
            recording_applier(vec![false, true]),
            idle_location(),
            false,
        );

        let first = session.tick(at(12, 0));
        assert_eq!(first.next_wake, Some(at(19, 0)));
        assert_eq!(session.applied_mode(), Some(false));

        // Same mode: no second apply
        session.tick(at(15, 0));

        let evening = session.tick(at(19, 0));
        assert_eq!(session.applied_mode(), Some(true));
        assert_eq!(
            evening.evaluation,
            Evaluation::Decided(ScheduleDecision::Transition {
                current_is_dark: true,
                next_transition: Utc.with_ymd_and_hms(2026, 4, 11, 7, 0, 0).unwrap(),
                next_is_dark: false,
            })
        );
        // Local midnight comes before the 07:00 switch
        assert_eq!(
            evening.next_wake,
            Some(Utc.with_ymd_and_hms(2026, 4, 11, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_apply_failure_is_retried() {
        let mut applier = MockThemeApplier::new();
        let mut calls = 0;
        applier.expect_apply().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(ApplyError::MissingCommand("light"))
            } else {
                Ok(())
            }
        });
        applier.expect_name().return_const("mock");

        let mut session = Session::new(custom_config(), Box::new(applier), idle_location(), false);

        let outcome = session.tick(at(12, 0));
        assert_eq!(session.applied_mode(), None);
        assert_eq!(outcome.next_wake, Some(at(12, 1)));

        session.tick(at(12, 1));
        assert_eq!(session.applied_mode(), Some(false));
    }

    #[test]
    fn test_forced_mode_sleeps_until_event() {
        let config = Config {
            appearance: Some(Appearance::Dark),
            ..custom_config()
        };
        let mut session = Session::new(
            config,
            recording_applier(vec![true]),
            idle_location(),
            false,
        );

        let outcome = session.tick(at(12, 0));
        assert_eq!(outcome.next_wake, None);
        assert_eq!(
            outcome.evaluation,
            Evaluation::Decided(ScheduleDecision::fixed(true, "Forced Dark mode"))
        );
    }

    #[test]
    fn test_awaiting_location_retries_every_minute() {
        let config = Config {
            timezone: Some("UTC".to_string()),
            ..Config::default()
        };
        let mut location = MockLocationProvider::new();
        location
            .expect_poll()
            .times(2)
            .returning(|| LocationFix::Unavailable("no fix".to_string()));
        location.expect_name().return_const("mock");

        let mut applier = MockThemeApplier::new();
        applier.expect_apply().never();
        applier.expect_name().return_const("mock");

        let mut session = Session::new(config, Box::new(applier), Box::new(location), false);

        let outcome = session.tick(at(12, 0));
        assert_eq!(outcome.evaluation, Evaluation::AwaitingLocation);
        assert_eq!(outcome.next_wake, Some(at(12, 1)));

        session.tick(at(12, 1));
    }

    #[test]
    fn test_location_polled_every_thirty_minutes() {
        let london = Coordinate::new(51.5074, -0.1278).unwrap();
        let config = Config {
            timezone: Some("Europe/London".to_string()),
            ..Config::default()
        };
        let mut location = MockLocationProvider::new();
        location
            .expect_poll()
            .times(2)
            .returning(move || LocationFix::Located(london));
        location.expect_name().return_const("mock");

        let mut applier = MockThemeApplier::new();
        applier.expect_apply().returning(|_| Ok(()));
        applier.expect_name().return_const("mock");

        let mut session = Session::new(config, Box::new(applier), Box::new(location), false);

        let start = at(11, 0);
        let outcome = session.tick(start);
        assert_eq!(session.active_coordinate(), Some(london));
        assert_eq!(outcome.next_wake, Some(start + Duration::minutes(30)));

        // Not due yet
        session.tick(start + Duration::minutes(10));
        // Due
        session.tick(start + Duration::minutes(30));
    }

    #[test]
    fn test_denied_location_falls_back_to_manual() {
        let config = Config {
            latitude: Some(35.6762),
            longitude: Some(139.6503),
            timezone: Some("Asia/Tokyo".to_string()),
            ..Config::default()
        };
        let mut location = MockLocationProvider::new();
        location.expect_poll().times(1).returning(|| LocationFix::Denied);
        location.expect_name().return_const("mock");

        let mut applier = MockThemeApplier::new();
        applier.expect_apply().returning(|_| Ok(()));
        applier.expect_name().return_const("mock");

        let mut session = Session::new(config, Box::new(applier), Box::new(location), false);
        let outcome = session.tick(at(3, 0));

        assert!(outcome.evaluation.decision().is_some());
        assert_eq!(
            session.active_coordinate(),
            Some(Coordinate::new(35.6762, 139.6503).unwrap())
        );
    }

    #[test]
    fn test_replace_config_reapplies_with_new_applier() {
        let mut session = Session::new(
            custom_config(),
            recording_applier(vec![false]),
            idle_location(),
            false,
        );
        session.tick(at(12, 0));

        let dark = Config {
            appearance: Some(Appearance::Dark),
            ..custom_config()
        };
        session.replace_config(dark, Some(recording_applier(vec![true])), None);
        assert_eq!(session.applied_mode(), None);

        session.tick(at(12, 5));
        assert_eq!(session.applied_mode(), Some(true));
    }

    fn solar_config(timezone: &str, latitude: f64, longitude: f64) -> Config {
        Config {
            schedule: Some(ScheduleMode::Solar),
            automatic_location: Some(false),
            latitude: Some(latitude),
            longitude: Some(longitude),
            timezone: Some(timezone.to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_warns_once_on_mismatched_zone() {
        // New York coordinates on a UTC calendar
        let mut session = Session::new(
            solar_config("UTC", 40.7128, -74.0060),
            Box::new(MockThemeApplier::new()),
            idle_location(),
            false,
        );
        let (zone, source) = session.time_zone();
        assert_eq!(zone, Tz::UTC);

        assert!(session.warn_on_zone_mismatch(zone, source, at(12, 0)));
        assert!(!session.warn_on_zone_mismatch(zone, source, at(12, 5)));
    }

    #[test]
    fn test_matching_zone_is_not_reported() {
        let mut session = Session::new(
            solar_config("Europe/Berlin", 52.52, 13.405),
            Box::new(MockThemeApplier::new()),
            idle_location(),
            false,
        );
        let (zone, source) = session.time_zone();

        assert!(!session.warn_on_zone_mismatch(zone, source, at(12, 0)));
    }

    #[test]
    fn test_custom_schedule_ignores_zone_mismatch() {
        let config = Config {
            latitude: Some(40.7128),
            longitude: Some(-74.0060),
            ..custom_config()
        };
        let mut session = Session::new(
            config,
            Box::new(MockThemeApplier::new()),
            idle_location(),
            false,
        );
        let (zone, source) = session.time_zone();

        assert!(!session.warn_on_zone_mismatch(zone, source, at(12, 0)));
    }
}
