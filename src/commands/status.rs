//! `duskmode status`: what the schedule says right now (or at `--at`).

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use super::CommandContext;
use crate::config::{Config, Preferences};
use crate::core::{Evaluation, evaluate};
use crate::display::{WAITING_FOR_LOCATION, describe_decision, mode_name, next_countdown_update};
use crate::geo::Coordinate;
use crate::logger::Log;
use crate::schedule::ScheduleDecision;
use crate::time_source::{self, FixedTimeSource};

const FOLLOW_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Serialized by `status --json`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub evaluated_at: DateTime<Utc>,
    pub time_zone: String,
    pub time_zone_source: String,
    pub appearance: &'static str,
    pub schedule: &'static str,
    pub coordinate: Option<Coordinate>,
    pub coordinate_source: Option<&'static str>,
    pub current_mode: Option<&'static str>,
    pub decision: Option<ScheduleDecision>,
    pub summary: String,
}

impl StatusReport {
    pub fn build(
        preferences: &Preferences,
        context: &CommandContext,
        evaluation: &Evaluation,
        now: DateTime<Utc>,
    ) -> Self {
        let decision = evaluation.decision().cloned();
        let summary = match &decision {
            Some(decision) => describe_decision(decision, now, &context.time_zone),
            None => WAITING_FOR_LOCATION.to_string(),
        };

        Self {
            evaluated_at: now,
            time_zone: context.time_zone.name().to_string(),
            time_zone_source: context.zone_source.to_string(),
            appearance: preferences.appearance.as_str(),
            schedule: preferences.schedule.as_str(),
            coordinate: context.coordinate(),
            coordinate_source: context.coordinate.map(|(_, source)| source.as_str()),
            current_mode: decision
                .as_ref()
                .map(|decision| mode_name(decision.current_is_dark())),
            decision,
            summary,
        }
    }
}

pub fn handle_status_command(at: Option<&str>, json: bool, follow: bool) -> Result<()> {
    if json {
        // Keep stdout parseable
        Log::set_enabled(false);
    }

    let config = Config::load()?;
    let preferences = config.preferences();
    let context = CommandContext::resolve(&config, preferences.requires_location());

    if let Some(at) = at {
        let instant = time_source::parse_datetime(at, &context.time_zone)?;
        time_source::init_time_source(Arc::new(FixedTimeSource::new(instant)));
    }

    if follow {
        return follow_status(&preferences, &context);
    }

    let now = time_source::now();
    let evaluation = evaluate(&preferences, context.coordinate(), now, &context.time_zone);
    let report = StatusReport::build(&preferences, &context, &evaluation, now);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_human_readable(&report, &context);
    }

    Ok(())
}

fn display_human_readable(report: &StatusReport, context: &CommandContext) {
    let local = report.evaluated_at.with_timezone(&context.time_zone);

    let marker = if time_source::is_fixed() { " (--at)" } else { "" };
    println!(
        "          Time: {}{marker}",
        local.format("%Y-%m-%d %H:%M:%S %Z")
    );
    println!(
        "     Time zone: {} ({})",
        report.time_zone, report.time_zone_source
    );
    println!("    Appearance: {}", report.appearance);
    println!("      Schedule: {}", report.schedule);
    if let (Some(coordinate), Some(source)) = (report.coordinate, report.coordinate_source) {
        println!(
            "      Location: {}, {} ({source})",
            coordinate.latitude_label(),
            coordinate.longitude_label()
        );
    }
    match report.current_mode {
        Some(mode) => println!("  Current mode: {mode}"),
        None => println!("  Current mode: unknown"),
    }
    println!("        Status: {}", report.summary);
}

/// Print a countdown line at every minute boundary and at each switch.
fn follow_status(preferences: &Preferences, context: &CommandContext) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&stop))?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&stop))?;

    println!("Following schedule (press Ctrl+C to stop)...\n");

    while !stop.load(Ordering::SeqCst) {
        let now = Utc::now();
        let evaluation = evaluate(preferences, context.coordinate(), now, &context.time_zone);
        let local = now.with_timezone(&context.time_zone);

        let (mode, summary, next) = match evaluation.decision() {
            Some(decision) => (
                mode_name(decision.current_is_dark()),
                describe_decision(decision, now, &context.time_zone),
                decision.next_transition(),
            ),
            None => ("Unknown", WAITING_FOR_LOCATION.to_string(), None),
        };
        println!("[{}] {mode} mode | {summary}", local.format("%H:%M:%S"));
        std::io::stdout().flush()?;

        let redraw_at = next_countdown_update(now, next);
        while !stop.load(Ordering::SeqCst) && Utc::now() < redraw_at {
            thread::sleep(FOLLOW_POLL_INTERVAL);
        }
    }

    println!("\nStopped following.");
    Ok(())
}
