//! Applying a light or dark mode to the desktop.
//!
//! The scheduling loop only knows the [`ThemeApplier`] trait. Implementations:
//!
//! - [`CommandApplier`]: runs one command per mode; the GNOME preset sets
//!   `org.gnome.desktop.interface color-scheme` through `gsettings`
//! - [`LogApplier`]: records the change in the log and does nothing else

pub mod command;

use thiserror::Error;

use crate::config::{ApplierKind, Config};

pub use command::CommandApplier;

/// Failure to switch the desktop appearance.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("no command configured for {0} mode")]
    MissingCommand(&'static str),
}

/// Capability to switch the desktop between light and dark.
#[cfg_attr(test, mockall::automock)]
pub trait ThemeApplier {
    fn apply(&mut self, is_dark: bool) -> Result<(), ApplyError>;

    /// Short name for log output.
    fn name(&self) -> &'static str;
}

/// Applier that only logs mode changes.
#[derive(Debug, Default)]
pub struct LogApplier {
    last_applied: Option<bool>,
}

impl LogApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent mode passed to `apply`.
    pub fn last_applied(&self) -> Option<bool> {
        self.last_applied
    }
}

impl ThemeApplier for LogApplier {
    fn apply(&mut self, is_dark: bool) -> Result<(), ApplyError> {
        self.last_applied = Some(is_dark);
        log_decorated!(
            "Appearance: {} mode (not applied, log applier)",
            crate::display::mode_name(is_dark)
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Build the applier selected in the configuration.
pub fn create_applier(config: &Config) -> Box<dyn ThemeApplier> {
    match config.applier_kind() {
        ApplierKind::Gnome => Box::new(CommandApplier::gnome()),
        ApplierKind::Command => Box::new(CommandApplier::new(
            config.light_command.clone().unwrap_or_default(),
            config.dark_command.clone().unwrap_or_default(),
        )),
        ApplierKind::Log => Box::new(LogApplier::new()),
    }
}
