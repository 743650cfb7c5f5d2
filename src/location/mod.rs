//! Location providers.
//!
//! The scheduling loop asks a [`LocationProvider`] for a fix when a solar
//! schedule is active and automatic location is enabled. Providers block for
//! at most a few seconds and report failure as data, never as a panic.

pub mod geoclue;

use crate::geo::Coordinate;

pub use geoclue::GeoclueProvider;

/// Result of one location poll.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationFix {
    Located(Coordinate),
    /// The location service refused access.
    Denied,
    /// No fix could be obtained; the string explains why.
    Unavailable(String),
}

#[cfg_attr(test, mockall::automock)]
pub trait LocationProvider {
    fn poll(&mut self) -> LocationFix;

    fn name(&self) -> &'static str;
}

/// Provider used when automatic location is switched off.
#[derive(Debug, Default)]
pub struct DisabledProvider;

impl LocationProvider for DisabledProvider {
    fn poll(&mut self) -> LocationFix {
        LocationFix::Unavailable("automatic location is disabled".to_string())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Build the provider matching the automatic-location setting.
pub fn create_provider(automatic_location: bool) -> Box<dyn LocationProvider> {
    if automatic_location {
        Box::new(GeoclueProvider::new())
    } else {
        Box::new(DisabledProvider)
    }
}
