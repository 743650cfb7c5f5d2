//! Configuration system for duskmode.
//!
//! Settings live in `duskmode.toml` under `$XDG_CONFIG_HOME/duskmode/` (or a
//! directory given with `--config`). A commented default file is written on
//! first start.
//!
//! ```toml
//! #[Appearance]
//! appearance = "auto"          # "auto" follows the schedule; "light" or "dark" forces a mode
//! schedule = "solar"           # "solar" (sunrise/sunset) or "custom" (fixed times)
//!
//! #[Custom schedule]
//! light_time = "07:00"         # Switch to Light mode (HH:MM)
//! dark_time = "19:00"          # Switch to Dark mode (HH:MM)
//!
//! #[Location]
//! automatic_location = true    # Ask GeoClue2 for the current location
//! latitude = 52.52             # Manual coordinates, used when no location is detected
//! longitude = 13.405
//! timezone = "Europe/Berlin"   # Calendar zone (default: system zone)
//!
//! #[Applier]
//! applier = "gnome"            # "gnome", "command" or "log"
//! light_command = ["..."]      # Commands for applier = "command"
//! dark_command = ["..."]
//! ```
//!
//! Every field is optional. Loading parses, validates, and returns the raw
//! [`Config`]; [`Config::preferences`] turns it into typed [`Preferences`]
//! with defaults filled in.

pub mod builder;
pub mod loading;
pub mod validation;
pub mod watcher;

use serde::Deserialize;

use crate::constants::*;
use crate::geo::Coordinate;
use crate::schedule::DailyTime;

pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};
pub use watcher::start_config_watcher;

/// Appearance preference.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    /// Follow the active schedule.
    #[default]
    Auto,
    /// Always Light mode.
    Light,
    /// Always Dark mode.
    Dark,
}

impl Appearance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Appearance::Auto => "auto",
            Appearance::Light => "light",
            Appearance::Dark => "dark",
        }
    }
}

/// Which source drives automatic switching.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    #[default]
    Solar,
    Custom,
}

impl ScheduleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleMode::Solar => "solar",
            ScheduleMode::Custom => "custom",
        }
    }
}

/// How a mode change is applied to the desktop.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplierKind {
    /// GNOME `color-scheme` via gsettings.
    #[default]
    Gnome,
    /// User-supplied commands.
    Command,
    /// Log only.
    Log,
}

impl ApplierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplierKind::Gnome => "gnome",
            ApplierKind::Command => "command",
            ApplierKind::Log => "log",
        }
    }
}

/// Raw settings as read from `duskmode.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub appearance: Option<Appearance>,
    pub schedule: Option<ScheduleMode>,
    pub light_time: Option<String>, // "HH:MM"
    pub dark_time: Option<String>,  // "HH:MM"
    pub automatic_location: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>, // IANA name
    pub applier: Option<ApplierKind>,
    pub light_command: Option<Vec<String>>,
    pub dark_command: Option<Vec<String>>,
}

/// Typed view of the settings the scheduling loop reads on every wake-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preferences {
    pub appearance: Appearance,
    pub schedule: ScheduleMode,
    pub light_time: DailyTime,
    pub dark_time: DailyTime,
    pub automatic_location: bool,
    pub manual_coordinate: Option<Coordinate>,
}

impl Preferences {
    /// Automatic location is only consulted for a followed solar schedule.
    pub fn requires_location(&self) -> bool {
        self.appearance == Appearance::Auto && self.schedule == ScheduleMode::Solar
    }

    pub fn is_automatic_mode(&self) -> bool {
        self.appearance == Appearance::Auto
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Config::default().preferences()
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        load()
    }

    pub fn appearance(&self) -> Appearance {
        self.appearance.unwrap_or_default()
    }

    pub fn schedule_mode(&self) -> ScheduleMode {
        self.schedule.unwrap_or_default()
    }

    pub fn applier_kind(&self) -> ApplierKind {
        self.applier.unwrap_or_default()
    }

    /// Custom light time; unparsable values fall back to 07:00.
    pub fn light_time(&self) -> DailyTime {
        parse_time_or(self.light_time.as_deref(), DEFAULT_LIGHT_MINUTES)
    }

    /// Custom dark time; unparsable values fall back to 19:00.
    pub fn dark_time(&self) -> DailyTime {
        parse_time_or(self.dark_time.as_deref(), DEFAULT_DARK_MINUTES)
    }

    /// Manual coordinates when both are present and in range.
    pub fn manual_coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Coordinate::new(latitude, longitude).ok(),
            _ => None,
        }
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            appearance: self.appearance(),
            schedule: self.schedule_mode(),
            light_time: self.light_time(),
            dark_time: self.dark_time(),
            automatic_location: self
                .automatic_location
                .unwrap_or(DEFAULT_AUTOMATIC_LOCATION),
            manual_coordinate: self.manual_coordinate(),
        }
    }

    /// Log the effective settings as a block.
    pub fn log_config(&self) {
        let preferences = self.preferences();

        log_block_start!("Loaded configuration");
        log_indented!("Appearance: {}", preferences.appearance.as_str());
        log_indented!("Schedule: {}", preferences.schedule.as_str());

        if preferences.schedule == ScheduleMode::Custom {
            log_indented!(
                "Light at {}, Dark at {}",
                preferences.light_time,
                preferences.dark_time
            );
        }

        log_indented!(
            "Automatic location: {}",
            if preferences.automatic_location {
                "enabled"
            } else {
                "disabled"
            }
        );
        if let Some(coordinate) = preferences.manual_coordinate {
            log_indented!(
                "Manual coordinates: {}, {}",
                coordinate.latitude_label(),
                coordinate.longitude_label()
            );
        }
        if let Some(ref zone) = self.timezone {
            log_indented!("Time zone: {zone}");
        }
        log_indented!("Applier: {}", self.applier_kind().as_str());
    }
}

fn parse_time_or(text: Option<&str>, fallback_minutes: i64) -> DailyTime {
    text.and_then(|text| text.parse::<DailyTime>().ok())
        .unwrap_or_else(|| DailyTime::from_minutes(fallback_minutes))
}
