//! `duskmode reload`: tell the running scheduler to re-read its config.

use anyhow::{Result, bail};
use nix::sys::signal::Signal;

use crate::config::Config;
use crate::io::lock::running_instance_pid;
use crate::utils::signal_process;

pub fn handle_reload_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    // Refuse to ask the scheduler for a config it would reject
    let config = Config::load()?;
    if debug_enabled {
        config.log_config();
    }

    let Some(pid) = running_instance_pid() else {
        bail!("duskmode isn't running");
    };

    signal_process(pid, Signal::SIGUSR2)?;
    log_block_start!("Reload requested (PID: {pid})");
    log_end!();
    Ok(())
}
