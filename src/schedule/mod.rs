//! Light/dark schedule decisions.
//!
//! Two interchangeable sources feed the same decision type:
//!
//! - [`solar`]: sunrise/sunset classifications for today and tomorrow
//! - [`custom`]: a fixed pair of daily clock times
//!
//! Both evaluators are pure. They take `now` explicitly and never read a
//! clock, so the same inputs always produce the same decision.

pub mod calendar;
pub mod custom;
pub mod solar;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub use custom::evaluate_custom;
pub use solar::evaluate_solar;

/// What the display mode should be now and what happens next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleDecision {
    /// A mode switch is scheduled. `next_transition` is strictly after the
    /// `now` the decision was computed for.
    Transition {
        current_is_dark: bool,
        next_transition: DateTime<Utc>,
        next_is_dark: bool,
    },
    /// No switch is scheduled; `reason` explains why.
    Fixed { is_dark: bool, reason: String },
}

impl ScheduleDecision {
    pub fn fixed(is_dark: bool, reason: impl Into<String>) -> Self {
        ScheduleDecision::Fixed {
            is_dark,
            reason: reason.into(),
        }
    }

    /// The mode that should be active right now.
    pub fn current_is_dark(&self) -> bool {
        match self {
            ScheduleDecision::Transition {
                current_is_dark, ..
            } => *current_is_dark,
            ScheduleDecision::Fixed { is_dark, .. } => *is_dark,
        }
    }

    pub fn next_transition(&self) -> Option<DateTime<Utc>> {
        match self {
            ScheduleDecision::Transition {
                next_transition, ..
            } => Some(*next_transition),
            ScheduleDecision::Fixed { .. } => None,
        }
    }
}

/// A recurring time of day without a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DailyTime {
    hour: u32,
    minute: u32,
}

impl DailyTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 {
            bail!("Hour must be between 0 and 23 (got {hour})");
        }
        if minute > 59 {
            bail!("Minute must be between 0 and 59 (got {minute})");
        }
        Ok(Self { hour, minute })
    }

    /// Build from minutes since midnight, clamping into `0..=1439`.
    pub fn from_minutes(minutes: i64) -> Self {
        let minutes = minutes.clamp(0, 1439) as u32;
        Self {
            hour: minutes / 60,
            minute: minutes % 60,
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

impl FromStr for DailyTime {
    type Err = anyhow::Error;

    /// Accepts `HH:MM` and `HH:MM:SS`; seconds are ignored.
    fn from_str(text: &str) -> Result<Self> {
        let text = text.trim();
        let mut parts = text.split(':');
        let (Some(hour), Some(minute)) = (parts.next(), parts.next()) else {
            bail!("Invalid time '{text}' (expected HH:MM)");
        };
        if let Some(second) = parts.next() {
            second
                .parse::<u32>()
                .ok()
                .filter(|second| *second < 60)
                .with_context(|| format!("Invalid seconds in '{text}'"))?;
        }
        if parts.next().is_some() {
            bail!("Invalid time '{text}' (expected HH:MM)");
        }

        let hour = hour
            .parse::<u32>()
            .with_context(|| format!("Invalid hour in '{text}'"))?;
        let minute = minute
            .parse::<u32>()
            .with_context(|| format!("Invalid minute in '{text}'"))?;
        DailyTime::new(hour, minute)
    }
}

impl fmt::Display for DailyTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_time_parsing() {
        assert_eq!("07:00".parse::<DailyTime>().unwrap(), DailyTime::new(7, 0).unwrap());
        assert_eq!(" 19:45 ".parse::<DailyTime>().unwrap(), DailyTime::new(19, 45).unwrap());
        assert_eq!("6:05:30".parse::<DailyTime>().unwrap(), DailyTime::new(6, 5).unwrap());

        assert!("24:00".parse::<DailyTime>().is_err());
        assert!("12:60".parse::<DailyTime>().is_err());
        assert!("12".parse::<DailyTime>().is_err());
        assert!("12:00:99".parse::<DailyTime>().is_err());
        assert!("12:00:00:00".parse::<DailyTime>().is_err());
        assert!("noon".parse::<DailyTime>().is_err());
    }

    #[test]
    fn test_daily_time_minutes() {
        assert_eq!(DailyTime::from_minutes(-5), DailyTime::new(0, 0).unwrap());
        assert_eq!(DailyTime::from_minutes(5000), DailyTime::new(23, 59).unwrap());
        assert_eq!(DailyTime::from_minutes(427).to_string(), "07:07");
        assert_eq!(DailyTime::new(19, 0).unwrap().minutes_since_midnight(), 1140);
    }

    #[test]
    fn test_decision_accessors() {
        let at = chrono::TimeZone::with_ymd_and_hms(&Utc, 2026, 2, 24, 19, 0, 0).unwrap();
        let transition = ScheduleDecision::Transition {
            current_is_dark: false,
            next_transition: at,
            next_is_dark: true,
        };
        assert!(!transition.current_is_dark());
        assert_eq!(transition.next_transition(), Some(at));

        let fixed = ScheduleDecision::fixed(true, "Forced Dark mode");
        assert!(fixed.current_is_dark());
        assert_eq!(fixed.next_transition(), None);
    }

    #[test]
    fn test_decision_serializes_with_kind_tag() {
        let fixed = ScheduleDecision::fixed(false, "Midnight sun: staying in Light mode.");
        let json = serde_json::to_value(&fixed).unwrap();
        assert_eq!(json["kind"], "fixed");
        assert_eq!(json["is_dark"], false);
        assert_eq!(json["reason"], "Midnight sun: staying in Light mode.");
    }
}
