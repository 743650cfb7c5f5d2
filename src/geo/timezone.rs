//! Time zone resolution for schedule calendars.
//!
//! The calendar zone decides which local date "today" refers to and where
//! local midnight falls. Resolution order is: explicit `timezone` setting,
//! the system zone, the zone containing the active coordinates, then UTC.

use chrono::{DateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use std::path::Path;
use tzf_rs::DefaultFinder;

use super::coordinate::Coordinate;

static FINDER: Lazy<DefaultFinder> = Lazy::new(DefaultFinder::new);

/// Where the resolved zone came from, for status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSource {
    Config,
    System,
    Coordinates,
    Fallback,
}

impl std::fmt::Display for ZoneSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ZoneSource::Config => "config",
            ZoneSource::System => "system",
            ZoneSource::Coordinates => "coordinates",
            ZoneSource::Fallback => "fallback",
        };
        f.write_str(label)
    }
}

/// Look up the IANA zone containing a coordinate.
///
/// Returns `None` for open ocean and for names chrono-tz does not know.
pub fn zone_for_coordinate(coordinate: Coordinate) -> Option<Tz> {
    let name = FINDER.get_tz_name(coordinate.longitude, coordinate.latitude);
    parse_zone(name)
}

/// Parse an IANA zone name such as `Europe/Berlin`.
pub fn parse_zone(name: &str) -> Option<Tz> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    name.parse::<Tz>().ok()
}

/// Detect the system zone from `TZ`, `/etc/timezone`, or the `/etc/localtime` link.
pub fn system_zone() -> Option<Tz> {
    if let Ok(value) = std::env::var("TZ")
        && let Some(zone) = parse_zone(value.trim_start_matches(':'))
    {
        return Some(zone);
    }

    if let Ok(content) = std::fs::read_to_string("/etc/timezone")
        && let Some(zone) = parse_zone(&content)
    {
        return Some(zone);
    }

    std::fs::read_link("/etc/localtime")
        .ok()
        .and_then(|target| zone_from_zoneinfo_path(&target))
}

/// Extract the zone name from a path like `/usr/share/zoneinfo/Europe/Berlin`.
fn zone_from_zoneinfo_path(path: &Path) -> Option<Tz> {
    let text = path.to_string_lossy();
    let (_, name) = text.split_once("zoneinfo/")?;
    parse_zone(name)
}

/// Resolve the calendar zone.
///
/// `configured` is the raw `timezone` setting. Validation rejects unknown
/// names before this runs, so an unparsable value simply falls through.
pub fn resolve_zone(
    configured: Option<&str>,
    system: Option<Tz>,
    coordinate: Option<Coordinate>,
) -> (Tz, ZoneSource) {
    if let Some(zone) = configured.and_then(parse_zone) {
        return (zone, ZoneSource::Config);
    }
    if let Some(zone) = system {
        return (zone, ZoneSource::System);
    }
    if let Some(zone) = coordinate.and_then(zone_for_coordinate) {
        return (zone, ZoneSource::Coordinates);
    }
    (Tz::UTC, ZoneSource::Fallback)
}

/// Hours between the zone's UTC offset at `at` and the coordinate's solar
/// offset, wrapped across the date line into `0..=12`.
///
/// A large gap means local midnight sits far from solar midnight, so
/// sunrise and sunset land on different local dates.
pub fn solar_offset_gap_hours(zone: &Tz, coordinate: Coordinate, at: DateTime<Utc>) -> f64 {
    let offset_seconds = zone
        .offset_from_utc_datetime(&at.naive_utc())
        .fix()
        .local_minus_utc();
    let zone_hours = f64::from(offset_seconds) / 3600.0;
    let gap = (zone_hours - coordinate.longitude / 15.0).rem_euclid(24.0);
    gap.min(24.0 - gap)
}
