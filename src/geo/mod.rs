//! Geographic and astronomical calculations.
//!
//! ## Module Structure
//!
//! - [`coordinate`]: Validated latitude/longitude value type
//! - [`solar`]: Sunrise/sunset calculation with polar day and night classification
//! - [`forecast`]: Seven-day solar preview built from independent daily calculations
//! - [`timezone`]: Calendar zone resolution (config, system, coordinates, UTC)
//!
//! Everything here is pure apart from system zone detection, which reads the
//! environment and `/etc`.

pub mod coordinate;
pub mod forecast;
pub mod solar;
pub mod timezone;

pub use coordinate::Coordinate;
pub use forecast::{ForecastDay, weekly_forecast};
pub use solar::{SolarDay, solar_day, solar_day_for_date};
