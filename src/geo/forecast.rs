//! Seven-day solar preview.

use chrono::{DateTime, NaiveDate, TimeZone};

use super::coordinate::Coordinate;
use super::solar::{SolarDay, solar_day_for_date};
use crate::constants::FORECAST_DAYS;

/// One row of the weekly preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day: SolarDay,
}

/// Solar classification for the local date of `start` and the six days after it.
///
/// Each day is computed independently.
pub fn weekly_forecast<Tz: TimeZone>(
    start: DateTime<Tz>,
    coordinate: Coordinate,
    time_zone: &Tz,
) -> Vec<ForecastDay> {
    let first = start.with_timezone(time_zone).date_naive();
    first
        .iter_days()
        .take(FORECAST_DAYS as usize)
        .map(|date| ForecastDay {
            date,
            day: solar_day_for_date(date, coordinate, time_zone),
        })
        .collect()
}
