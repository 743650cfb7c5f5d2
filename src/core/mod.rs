//! The scheduling loop.
//!
//! [`Core`] owns the [`Session`] and the signal channel. Each iteration
//! reads the clock, lets the session evaluate, apply and plan, and then
//! blocks on the channel until the planned wake instant or the first
//! external event, whichever comes first. There is only ever one pending
//! wait; any event cancels it and the next iteration re-plans.

pub mod evaluation;
pub mod session;

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::atomic::Ordering;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use crate::config::{self, Config};
use crate::io::lock::InstanceLock;
use crate::io::signals::{SignalMessage, SignalState};
use crate::location::{LocationProvider, create_provider};
use crate::theme::{ThemeApplier, create_applier};
use crate::time_source;

pub use evaluation::{Evaluation, evaluate};
pub use session::{Session, TickOutcome};

/// Everything the loop needs, bundled to keep `Core::new` readable.
pub struct CoreParams {
    pub config: Config,
    pub applier: Box<dyn ThemeApplier>,
    pub location: Box<dyn LocationProvider>,
    pub signal_state: SignalState,
    pub debug_enabled: bool,
    pub lock: Option<InstanceLock>,
}

pub struct Core {
    session: Session,
    signal_state: SignalState,
    debug_enabled: bool,
    lock: Option<InstanceLock>,
}

impl Core {
    pub fn new(params: CoreParams) -> Self {
        Self {
            session: Session::new(
                params.config,
                params.applier,
                params.location,
                params.debug_enabled,
            ),
            signal_state: params.signal_state,
            debug_enabled: params.debug_enabled,
            lock: params.lock,
        }
    }

    /// Run until a shutdown request arrives.
    pub fn execute(mut self) -> Result<()> {
        let (time_zone, source) = self.session.time_zone();
        log_block_start!("Calendar time zone: {time_zone} ({source})");

        while self.signal_state.is_running() {
            let now = time_source::now();
            let outcome = self.session.tick(now);

            let message = match outcome.next_wake {
                Some(wake) => self
                    .signal_state
                    .signal_receiver
                    .recv_timeout(wait_duration(now, wake)),
                None => self
                    .signal_state
                    .signal_receiver
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };

            match message {
                Ok(message) => self.handle_message(message),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log_pipe!();
                    log_warning!("Event channel closed, stopping");
                    break;
                }
            }
        }

        log_block_start!("Shutting down duskmode...");
        if let Some(lock) = self.lock.take() {
            if self.debug_enabled {
                log_indented!("Releasing lock {}", crate::utils::private_path(lock.path()));
            }
            drop(lock);
        }
        log_end!();

        Ok(())
    }

    fn handle_message(&mut self, message: SignalMessage) {
        if self.debug_enabled {
            log_debug!("Event: {message:?}");
        }

        match message {
            SignalMessage::Shutdown => {
                self.signal_state.running.store(false, Ordering::SeqCst);
            }
            SignalMessage::Reload => self.reload_config(),
            SignalMessage::Refresh | SignalMessage::Sleep { resuming: true } => {
                self.session.request_location_poll();
            }
            SignalMessage::TimeChange => {
                self.session.refresh_system_zone();
                self.session.request_location_poll();
            }
            // Nothing to do until resume
            SignalMessage::Sleep { resuming: false } => {}
        }
    }

    fn reload_config(&mut self) {
        let new_config = match config::load() {
            Ok(config) => config,
            Err(e) => {
                log_pipe!();
                log_error!("Failed to reload config: {e:#}");
                log_indented!("Continuing with previous configuration");
                return;
            }
        };

        let current = self.session.config();
        if *current == new_config {
            if self.debug_enabled {
                log_debug!("Configuration unchanged");
            }
            return;
        }

        let applier = applier_changed(current, &new_config).then(|| create_applier(&new_config));
        let location = (current.preferences().automatic_location
            != new_config.preferences().automatic_location)
            .then(|| create_provider(new_config.preferences().automatic_location));

        new_config.log_config();
        self.session.replace_config(new_config, applier, location);
    }
}

fn applier_changed(old: &Config, new: &Config) -> bool {
    old.applier_kind() != new.applier_kind()
        || old.light_command != new.light_command
        || old.dark_command != new.dark_command
}

/// Time to block before `wake`; zero when it already passed.
pub fn wait_duration(now: DateTime<Utc>, wake: DateTime<Utc>) -> Duration {
    (wake - now).to_std().unwrap_or(Duration::ZERO)
}
