//! Configuration validation.
//!
//! Rejects settings the scheduling loop cannot act on. Identical custom
//! times are deliberately allowed here: the schedule engine reports them as
//! a fixed Light state with an explanation instead of refusing to start.

use anyhow::{Context, Result, bail};

use super::{ApplierKind, Config};
use crate::geo::timezone::parse_zone;
use crate::schedule::DailyTime;

pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(lat) = config.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        bail!("latitude must be between -90 and 90 degrees (got {lat})");
    }

    if let Some(lon) = config.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        bail!("longitude must be between -180 and 180 degrees (got {lon})");
    }

    if config.latitude.is_some() != config.longitude.is_some() {
        bail!("latitude and longitude must be set together");
    }

    if let Some(ref text) = config.light_time {
        text.parse::<DailyTime>()
            .with_context(|| format!("light_time '{text}' is not a valid HH:MM time"))?;
    }

    if let Some(ref text) = config.dark_time {
        text.parse::<DailyTime>()
            .with_context(|| format!("dark_time '{text}' is not a valid HH:MM time"))?;
    }

    if let Some(ref zone) = config.timezone
        && parse_zone(zone).is_none()
    {
        bail!("timezone '{zone}' is not a known IANA time zone");
    }

    if config.applier_kind() == ApplierKind::Command {
        validate_command("light_command", config.light_command.as_deref())?;
        validate_command("dark_command", config.dark_command.as_deref())?;
    }

    Ok(())
}

fn validate_command(field: &str, command: Option<&[String]>) -> Result<()> {
    match command {
        None => bail!("applier = \"command\" requires {field} to be set"),
        Some([]) => bail!("{field} must not be empty"),
        Some([program, ..]) if program.trim().is_empty() => {
            bail!("{field} must start with a program name")
        }
        Some(_) => Ok(()),
    }
}
