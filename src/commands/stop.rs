//! `duskmode stop`: terminate the running scheduler.

use anyhow::{Result, bail};
use nix::sys::signal::Signal;
use std::thread;
use std::time::Duration;

use crate::io::lock::running_instance_pid;
use crate::utils::{is_process_running, signal_process};

const STOP_TIMEOUT: Duration = Duration::from_secs(3);
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn handle_stop_command(debug_enabled: bool) -> Result<()> {
    log_version!();

    let Some(pid) = running_instance_pid() else {
        bail!("duskmode isn't running");
    };

    log_block_start!("Stopping duskmode (PID: {pid})...");
    signal_process(pid, Signal::SIGTERM)?;
    if debug_enabled {
        log_pipe!();
        log_debug!("SIGTERM sent to process {pid}");
    }

    let attempts = STOP_TIMEOUT.as_millis() / STOP_POLL_INTERVAL.as_millis();
    for _ in 0..attempts {
        if !is_process_running(pid) {
            log_pipe!();
            log_info!("Process terminated");
            log_end!();
            return Ok(());
        }
        thread::sleep(STOP_POLL_INTERVAL);
    }

    log_pipe!();
    log_warning!("Process did not exit within {}s", STOP_TIMEOUT.as_secs());
    log_indented!("The signal was delivered; it may still be shutting down");
    log_end!();
    Ok(())
}
