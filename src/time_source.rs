//! Where "now" comes from.
//!
//! Everything that needs the current instant goes through [`now`]. The
//! daemon uses the system clock; `status --at` installs a fixed instant so
//! the whole evaluation pipeline answers for that moment instead.

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::schedule::calendar::resolve_local;

static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Whether the instant is frozen rather than read from the clock.
    fn is_fixed(&self) -> bool {
        false
    }
}

pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
pub struct FixedTimeSource {
    instant: DateTime<Utc>,
}

impl FixedTimeSource {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }

    fn is_fixed(&self) -> bool {
        true
    }
}

/// Install the global time source. Only the first call has an effect.
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

pub fn now() -> DateTime<Utc> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).now()
}

pub fn is_fixed() -> bool {
    TIME_SOURCE
        .get()
        .map(|source| source.is_fixed())
        .unwrap_or(false)
}

/// Parse a user-supplied instant.
///
/// Accepts RFC 3339 (`2026-06-21T12:00:00+02:00`) or a local wall time
/// `YYYY-MM-DD HH:MM[:SS]` interpreted in `time_zone`.
pub fn parse_datetime<Tz: TimeZone>(input: &str, time_zone: &Tz) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }

    let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok());

    match naive {
        Some(naive) => match resolve_local(naive, time_zone) {
            Some(instant) => Ok(instant),
            None => bail!("'{input}' does not exist in the configured time zone"),
        },
        None => bail!("Invalid date/time '{input}'. Use YYYY-MM-DD HH:MM[:SS] or RFC 3339"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;

    #[test]
    fn test_parse_rfc3339() {
        let parsed = parse_datetime("2026-06-21T12:00:00+02:00", &Utc).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 6, 21, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_local_wall_time() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let parsed = parse_datetime("2026-01-15 07:30", &tz).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 0).unwrap());

        let parsed = parse_datetime(" 2026-01-15 07:30:15 ", &tz).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 15, 12, 30, 15).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_datetime("tomorrow", &Utc).is_err());
        assert!(parse_datetime("2026-13-01 00:00", &Utc).is_err());
    }

    #[test]
    fn test_fixed_source() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let source = FixedTimeSource::new(instant);
        assert_eq!(source.now(), instant);
        assert!(source.is_fixed());
        assert!(!RealTimeSource.is_fixed());
    }
}
