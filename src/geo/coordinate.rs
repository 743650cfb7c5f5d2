//! Geographic coordinate value type.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on Earth in decimal degrees.
///
/// Latitude is in `[-90, 90]` and longitude in `[-180, 180]`. Values built
/// through [`Coordinate::new`] or [`Coordinate::parse`] always satisfy these
/// ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            bail!("Latitude must be between -90 and 90 degrees (got {latitude})");
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            bail!("Longitude must be between -180 and 180 degrees (got {longitude})");
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse manual coordinate fields.
    ///
    /// Surrounding whitespace is ignored. Returns `None` when either field is
    /// empty, unparsable, or out of range.
    pub fn parse(latitude: &str, longitude: &str) -> Option<Self> {
        let latitude = latitude.trim().parse::<f64>().ok()?;
        let longitude = longitude.trim().parse::<f64>().ok()?;
        Self::new(latitude, longitude).ok()
    }

    /// Latitude in degrees with a hemisphere suffix, e.g. `40.7128°N`.
    pub fn latitude_label(&self) -> String {
        let hemisphere = if self.latitude >= 0.0 { 'N' } else { 'S' };
        format!("{:.4}°{hemisphere}", self.latitude.abs())
    }

    /// Longitude in degrees with a hemisphere suffix, e.g. `74.0060°W`.
    pub fn longitude_label(&self) -> String {
        let hemisphere = if self.longitude >= 0.0 { 'E' } else { 'W' };
        format!("{:.4}°{hemisphere}", self.longitude.abs())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_range_limits() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(-91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, 180.1).is_err());
        assert!(Coordinate::new(0.0, -360.0).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let coordinate = Coordinate::parse("  52.52 ", "\t13.405\n").unwrap();
        assert_eq!(coordinate.latitude, 52.52);
        assert_eq!(coordinate.longitude, 13.405);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Coordinate::parse("", "13.4").is_none());
        assert!(Coordinate::parse("north", "13.4").is_none());
        assert!(Coordinate::parse("95", "13.4").is_none());
        assert!(Coordinate::parse("52.5", "200").is_none());
    }

    #[test]
    fn test_labels() {
        let coordinate = Coordinate::new(40.7128, -74.006).unwrap();
        assert_eq!(coordinate.latitude_label(), "40.7128°N");
        assert_eq!(coordinate.longitude_label(), "74.0060°W");
        assert_eq!(coordinate.to_string(), "40.7128, -74.0060");
    }
}
