//! One-shot command handlers.
//!
//! `status`, `week` and `apply` evaluate the configuration themselves and
//! exit; `reload` and `stop` signal the running scheduler found through the
//! lock file.

pub mod apply;
pub mod reload;
pub mod status;
pub mod stop;
pub mod week;

use chrono_tz::Tz;

use crate::config::Config;
use crate::geo::Coordinate;
use crate::geo::timezone::{ZoneSource, resolve_zone, system_zone};
use crate::location::{LocationFix, LocationProvider, create_provider};

/// How the coordinate used by a command was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSource {
    Detected,
    Configured,
}

impl CoordinateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateSource::Detected => "detected",
            CoordinateSource::Configured => "configured",
        }
    }
}

/// Location and calendar zone resolved once for a command.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext {
    pub coordinate: Option<(Coordinate, CoordinateSource)>,
    pub time_zone: Tz,
    pub zone_source: ZoneSource,
}

impl CommandContext {
    /// Resolve the context, polling the location provider when `needs_location`.
    pub fn resolve(config: &Config, needs_location: bool) -> Self {
        let preferences = config.preferences();
        let mut provider = create_provider(preferences.automatic_location);
        let coordinate = if needs_location {
            locate(config, provider.as_mut())
        } else {
            preferences
                .manual_coordinate
                .map(|coordinate| (coordinate, CoordinateSource::Configured))
        };

        let (time_zone, zone_source) = resolve_zone(
            config.timezone.as_deref(),
            system_zone(),
            coordinate.map(|(coordinate, _)| coordinate),
        );

        Self {
            coordinate,
            time_zone,
            zone_source,
        }
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate.map(|(coordinate, _)| coordinate)
    }
}

/// Ask `provider` once, falling back to the configured coordinates.
pub fn locate(
    config: &Config,
    provider: &mut dyn LocationProvider,
) -> Option<(Coordinate, CoordinateSource)> {
    let preferences = config.preferences();

    if preferences.automatic_location {
        match provider.poll() {
            LocationFix::Located(coordinate) => {
                return Some((coordinate, CoordinateSource::Detected));
            }
            LocationFix::Denied => log_warning!("Location access was denied"),
            LocationFix::Unavailable(reason) => log_warning!("Location unavailable: {reason}"),
        }
    }

    preferences
        .manual_coordinate
        .map(|coordinate| (coordinate, CoordinateSource::Configured))
}
