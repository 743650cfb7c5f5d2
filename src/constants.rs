//! Application-wide constants and defaults.
//!
//! Grouped by concern. Values that appear in user-visible output (the
//! fixed-state reasons) are part of the status contract and must stay stable.

use chrono::Duration;

// # Solar Calculation

/// Sun zenith angle used for sunrise and sunset (civil twilight convention).
pub const SOLAR_ZENITH_DEGREES: f64 = 90.833;

/// Local hour used to seed the sunrise estimate.
pub const SUNRISE_ESTIMATE_HOUR: f64 = 6.0;

/// Local hour used to seed the sunset estimate.
pub const SUNSET_ESTIMATE_HOUR: f64 = 18.0;

/// Gap between a zone's UTC offset and the coordinate's solar offset
/// (longitude / 15) above which the zone is reported as a likely mismatch.
pub const ZONE_MISMATCH_WARNING_HOURS: f64 = 4.0;

/// Days covered by the weekly preview.
pub const FORECAST_DAYS: u32 = 7;

// # Schedule Decisions

pub const REASON_POLAR_NIGHT: &str = "Polar night: staying in Dark mode.";
pub const REASON_MIDNIGHT_SUN: &str = "Midnight sun: staying in Light mode.";
pub const REASON_IDENTICAL_CUSTOM_TIMES: &str = "Custom Light and Dark times cannot be identical.";
pub const REASON_INVALID_CUSTOM_SCHEDULE: &str = "Custom schedule is invalid.";
pub const REASON_FORCED_LIGHT: &str = "Forced Light mode";
pub const REASON_FORCED_DARK: &str = "Forced Dark mode";

/// Replacement offset for a transition instant that is not in the future.
pub fn forward_progress_step() -> Duration {
    Duration::minutes(1)
}

// # Refresh Scheduling

/// Upper bound on the stale retry counter (2^6 s already exceeds the delay cap).
pub const STALE_RETRY_CAP: u32 = 6;

/// Longest delay between stale-transition retries, in seconds.
pub const MAX_STALE_BACKOFF_SECS: i64 = 60;

/// Interval after which the location provider is polled again.
pub fn location_refresh_interval() -> Duration {
    Duration::minutes(30)
}

/// Retry delay while no coordinate is available for a solar schedule.
pub fn awaiting_location_retry() -> Duration {
    Duration::seconds(60)
}

/// Retry delay after the applier failed to switch the appearance.
pub fn apply_retry_interval() -> Duration {
    Duration::seconds(60)
}

// # Configuration Defaults

/// Custom schedule light time, minutes after midnight (07:00).
pub const DEFAULT_LIGHT_MINUTES: i64 = 7 * 60;
/// Custom schedule dark time, minutes after midnight (19:00).
pub const DEFAULT_DARK_MINUTES: i64 = 19 * 60;
pub const DEFAULT_AUTOMATIC_LOCATION: bool = true;

/// Config file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "duskmode.toml";

/// Debounce window for config file change events, in milliseconds.
pub const CONFIG_WATCH_DEBOUNCE_MS: u64 = 500;

// # Desktop Integration

/// Desktop id reported to GeoClue2.
pub const GEOCLUE_DESKTOP_ID: &str = "duskmode";

/// Seconds to wait for GeoClue2 to report a first fix.
pub const GEOCLUE_FIX_TIMEOUT_SECS: u64 = 10;

pub const GNOME_SCHEMA: &str = "org.gnome.desktop.interface";
pub const GNOME_COLOR_SCHEME_KEY: &str = "color-scheme";
pub const GNOME_DARK_VALUE: &str = "prefer-dark";
pub const GNOME_LIGHT_VALUE: &str = "default";

// # Process Management

pub const LOCK_FILE_NAME: &str = "duskmode.lock";

// # Exit Codes

pub const EXIT_FAILURE: i32 = 1;
