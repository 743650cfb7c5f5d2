//! Lifecycle of the long-running scheduler.
//!
//! Resource acquisition happens here, in order: configuration, the
//! single-instance lock, signal handling, then the optional monitors
//! (logind sleep/resume, clock changes, config file watching). The loop
//! itself lives in [`crate::core`].
//!
//! ```no_run
//! use duskmode::Duskmode;
//!
//! # fn main() -> anyhow::Result<()> {
//! Duskmode::new(false).run()?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Result, bail};

use crate::{
    config::{self, Config},
    core::{Core, CoreParams},
    io::dbus,
    io::lock::{LockOutcome, acquire_lock},
    io::signals::setup_signal_handler,
    location::create_provider,
    theme::create_applier,
    utils::private_path,
};

/// Builder for the scheduler process.
pub struct Duskmode {
    debug_enabled: bool,
}

impl Duskmode {
    pub fn new(debug_enabled: bool) -> Self {
        Self { debug_enabled }
    }

    /// Run until SIGINT, SIGTERM or SIGHUP.
    pub fn run(self) -> Result<()> {
        log_version!();

        let config = Config::load()?;

        let lock = match acquire_lock()? {
            LockOutcome::Acquired(lock) => lock,
            LockOutcome::Held { pid } => {
                bail!("duskmode is already running (PID: {pid})");
            }
        };

        let signal_state = setup_signal_handler(self.debug_enabled)?;

        // Both monitors degrade to a warning when D-Bus or timerfd are missing
        dbus::start_system_event_monitor(signal_state.signal_sender.clone(), self.debug_enabled);

        if let Err(e) =
            config::start_config_watcher(signal_state.signal_sender.clone(), self.debug_enabled)
            && self.debug_enabled
        {
            log_pipe!();
            log_warning!("Config file watching unavailable: {}", e);
            log_indented!("Hot config reload disabled, use SIGUSR2 for manual reload");
        }

        config.log_config();

        let applier = create_applier(&config);
        let location = create_provider(config.preferences().automatic_location);
        log_block_start!("Theme applier: {}", applier.name());
        if config.preferences().requires_location() {
            log_indented!("Location provider: {}", location.name());
        }

        log_block_start!("Lock acquired, starting duskmode...");
        if self.debug_enabled {
            log_indented!("Lock file: {}", private_path(lock.path()));
        }

        let core = Core::new(CoreParams {
            config,
            applier,
            location,
            signal_state,
            debug_enabled: self.debug_enabled,
            lock: Some(lock),
        });

        core.execute()
    }
}
