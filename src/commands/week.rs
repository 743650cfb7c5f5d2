//! `duskmode week`: sunrise and sunset for the next seven days.

use anyhow::{Result, bail};
use chrono::TimeZone;

use super::CommandContext;
use crate::config::Config;
use crate::display::describe_solar_day;
use crate::geo::{ForecastDay, SolarDay, weekly_forecast};
use crate::time_source;

pub fn handle_week_command() -> Result<()> {
    let config = Config::load()?;
    let context = CommandContext::resolve(&config, true);

    let Some(coordinate) = context.coordinate() else {
        bail!("No location available: enable automatic_location or set latitude and longitude");
    };

    let now = time_source::now().with_timezone(&context.time_zone);
    let forecast = weekly_forecast(now, coordinate, &context.time_zone);

    log_version!();
    log_block_start!(
        "Solar preview for {}, {}",
        coordinate.latitude_label(),
        coordinate.longitude_label()
    );
    log_indented!("Time zone: {} ({})", context.time_zone, context.zone_source);
    log_pipe!();
    for row in &forecast {
        log_decorated!("{}", format_row(row, &context.time_zone));
    }
    log_end!();

    Ok(())
}

/// `Mon 2026-10-19  07:12 – 18:21  11h 9m`
pub fn format_row<Tz: TimeZone>(row: &ForecastDay, time_zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let cell = describe_solar_day(&row.day, time_zone);
    let date = row.date.format("%a %Y-%m-%d");

    match row.day {
        SolarDay::Normal { sunrise, sunset } => {
            let minutes = (sunset - sunrise).num_minutes();
            format!("{date}  {cell}  {}h {}m", minutes / 60, minutes % 60)
        }
        _ => format!("{date}  {cell}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_format_rows() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let normal = ForecastDay {
            date,
            day: SolarDay::Normal {
                sunrise: Utc.with_ymd_and_hms(2026, 10, 19, 6, 12, 0).unwrap(),
                sunset: Utc.with_ymd_and_hms(2026, 10, 19, 17, 21, 0).unwrap(),
            },
        };
        assert_eq!(
            format_row(&normal, &Utc),
            "Mon 2026-10-19  06:12 – 17:21  11h 9m"
        );

        let polar = ForecastDay {
            date,
            day: SolarDay::AlwaysDark,
        };
        assert_eq!(format_row(&polar, &Utc), "Mon 2026-10-19  Polar night");
    }
}
