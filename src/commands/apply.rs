//! `duskmode apply`: evaluate once, switch the desktop, exit.

use anyhow::{Result, bail};

use crate::config::Config;
use crate::core::{Evaluation, Session};
use crate::io::lock::running_instance_pid;
use crate::location::create_provider;
use crate::theme::create_applier;
use crate::time_source;

pub fn handle_apply_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    if let Some(pid) = running_instance_pid() {
        log_pipe!();
        log_warning!("The scheduler is running (PID: {pid})");
        log_indented!("It will switch again at its next planned time");
    }

    let config = Config::load()?;
    let automatic_location = config.preferences().automatic_location;
    let mut session = Session::new(
        config.clone(),
        create_applier(&config),
        create_provider(automatic_location),
        debug_enabled,
    );

    let outcome = session.tick(time_source::now());

    match outcome.evaluation {
        Evaluation::AwaitingLocation => {
            bail!("No location available: enable automatic_location or set latitude and longitude")
        }
        Evaluation::Decided(decision) => {
            if session.applied_mode() != Some(decision.current_is_dark()) {
                bail!("Failed to apply the current mode");
            }
        }
    }

    log_end!();
    Ok(())
}
