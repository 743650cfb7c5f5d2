//! Sunrise and sunset calculation with polar day and polar night handling.
//!
//! Uses the standard almanac approximation for the sun's position with the
//! civil twilight zenith (90.833°). The calculation runs twice per day: once
//! seeded at 06:00 local mean time for sunrise and once at 18:00 for sunset.
//! When the sun never crosses the zenith threshold the day is classified as
//! [`SolarDay::AlwaysDark`] or [`SolarDay::AlwaysLight`] instead of producing
//! event times.
//!
//! Everything here is pure and total. Any input that cannot produce a usable
//! pair of events falls back to `AlwaysDark`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use super::coordinate::Coordinate;
use crate::constants::{SOLAR_ZENITH_DEGREES, SUNRISE_ESTIMATE_HOUR, SUNSET_ESTIMATE_HOUR};

/// Classification of one calendar day at one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolarDay {
    /// The sun rises and sets. `sunrise >= sunset` is degenerate; see
    /// [`SolarDay::normalized`].
    Normal {
        sunrise: DateTime<Utc>,
        sunset: DateTime<Utc>,
    },
    /// The sun never climbs above the twilight threshold.
    AlwaysDark,
    /// The sun never drops below the twilight threshold.
    AlwaysLight,
}

impl SolarDay {
    /// Reclassify a degenerate `Normal` (sunrise not before sunset) as `AlwaysDark`.
    pub fn normalized(self) -> Self {
        match self {
            SolarDay::Normal { sunrise, sunset } if sunrise >= sunset => SolarDay::AlwaysDark,
            other => other,
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, SolarDay::Normal { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolarEvent {
    Sunrise,
    Sunset,
}

/// Outcome of one event calculation.
#[derive(Debug, Clone, Copy)]
struct EventEstimate {
    /// UTC hour of the event in `[0, 24)`, absent when the sun never crosses.
    utc_hour: Option<f64>,
    /// Cosine of the local hour angle; outside `[-1, 1]` means no crossing.
    cos_hour_angle: f64,
}

/// Compute the solar classification for the calendar day containing `date`
/// as seen in `time_zone`.
pub fn solar_day<Z: TimeZone, Tz: TimeZone>(
    date: DateTime<Z>,
    coordinate: Coordinate,
    time_zone: &Tz,
) -> SolarDay {
    let local_date = date.with_timezone(time_zone).date_naive();
    solar_day_for_date(local_date, coordinate, time_zone)
}

/// Compute the solar classification for a local calendar date.
pub fn solar_day_for_date<Tz: TimeZone>(
    local_date: NaiveDate,
    coordinate: Coordinate,
    time_zone: &Tz,
) -> SolarDay {
    let day_of_year = f64::from(local_date.ordinal());
    let sunrise = estimate_event(SolarEvent::Sunrise, day_of_year, coordinate);
    let sunset = estimate_event(SolarEvent::Sunset, day_of_year, coordinate);

    if let (Some(rise_hour), Some(set_hour)) = (sunrise.utc_hour, sunset.utc_hour) {
        let rise = instant_on_local_date(local_date, rise_hour, time_zone);
        let set = instant_on_local_date(local_date, set_hour, time_zone);
        if let (Some(sunrise), Some(sunset)) = (rise, set)
            && sunrise < sunset
        {
            return SolarDay::Normal { sunrise, sunset };
        }
    }

    classify_without_events(sunrise.cos_hour_angle, sunset.cos_hour_angle)
}

/// Classification used when no valid event pair exists.
fn classify_without_events(sunrise_cos_h: f64, sunset_cos_h: f64) -> SolarDay {
    if sunrise_cos_h > 1.0 || sunset_cos_h > 1.0 {
        SolarDay::AlwaysDark
    } else if sunrise_cos_h < -1.0 || sunset_cos_h < -1.0 {
        SolarDay::AlwaysLight
    } else {
        SolarDay::AlwaysDark
    }
}

fn estimate_event(event: SolarEvent, day_of_year: f64, coordinate: Coordinate) -> EventEstimate {
    let longitude_hour = coordinate.longitude / 15.0;
    let seed_hour = match event {
        SolarEvent::Sunrise => SUNRISE_ESTIMATE_HOUR,
        SolarEvent::Sunset => SUNSET_ESTIMATE_HOUR,
    };
    let t = day_of_year + (seed_hour - longitude_hour) / 24.0;

    let mean_anomaly = 0.9856 * t - 3.289;
    let true_longitude = normalize_degrees(
        mean_anomaly
            + 1.916 * sin_deg(mean_anomaly)
            + 0.020 * sin_deg(2.0 * mean_anomaly)
            + 282.634,
    );

    // atan lands in the wrong quadrant half the time; align it with L
    let mut right_ascension =
        normalize_degrees((0.91764 * tan_deg(true_longitude)).atan().to_degrees());
    let longitude_quadrant = (true_longitude / 90.0).floor() * 90.0;
    let ascension_quadrant = (right_ascension / 90.0).floor() * 90.0;
    right_ascension += longitude_quadrant - ascension_quadrant;
    let right_ascension_hours = right_ascension / 15.0;

    let sin_declination = 0.39782 * sin_deg(true_longitude);
    let cos_declination = sin_declination.asin().cos();

    let cos_hour_angle = (cos_deg(SOLAR_ZENITH_DEGREES)
        - sin_declination * sin_deg(coordinate.latitude))
        / (cos_declination * cos_deg(coordinate.latitude));

    if !(-1.0..=1.0).contains(&cos_hour_angle) {
        return EventEstimate {
            utc_hour: None,
            cos_hour_angle,
        };
    }

    let hour_angle_degrees = match event {
        SolarEvent::Sunrise => 360.0 - cos_hour_angle.acos().to_degrees(),
        SolarEvent::Sunset => cos_hour_angle.acos().to_degrees(),
    };
    let local_mean_time =
        hour_angle_degrees / 15.0 + right_ascension_hours - 0.06571 * t - 6.622;

    EventEstimate {
        utc_hour: Some(normalize_hours(local_mean_time - longitude_hour)),
        cos_hour_angle,
    }
}

/// Place a UTC hour-of-day on the given local calendar date.
///
/// The hour is first applied to the date at 00:00 UTC. If that instant does
/// not fall on `local_date` in `time_zone` the neighbouring UTC days are
/// tried, which keeps events on the right day for zones far from UTC.
///
/// Returns `None` when the instant would leave chrono's supported range.
fn instant_on_local_date<Tz: TimeZone>(
    local_date: NaiveDate,
    utc_hour: f64,
    time_zone: &Tz,
) -> Option<DateTime<Utc>> {
    if !utc_hour.is_finite() {
        return None;
    }
    let midnight = local_date.and_hms_opt(0, 0, 0)?.and_utc();
    let base = midnight
        .checked_add_signed(Duration::milliseconds((utc_hour * 3_600_000.0).round() as i64))?;

    [
        Some(base),
        base.checked_sub_signed(Duration::days(1)),
        base.checked_add_signed(Duration::days(1)),
    ]
    .into_iter()
    .flatten()
    .find(|candidate| candidate.with_timezone(time_zone).date_naive() == local_date)
    .or(Some(base))
}

fn normalize_degrees(value: f64) -> f64 {
    value.rem_euclid(360.0)
}

fn normalize_hours(value: f64) -> f64 {
    value.rem_euclid(24.0)
}

fn sin_deg(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

fn cos_deg(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

fn tan_deg(degrees: f64) -> f64 {
    degrees.to_radians().tan()
}
