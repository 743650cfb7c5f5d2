//! Command-based appearance switching.

use std::process::Command;

use super::{ApplyError, ThemeApplier};
use crate::constants::{GNOME_COLOR_SCHEME_KEY, GNOME_DARK_VALUE, GNOME_LIGHT_VALUE, GNOME_SCHEMA};

/// Runs a configured argv for each mode.
#[derive(Debug, Clone)]
pub struct CommandApplier {
    light: Vec<String>,
    dark: Vec<String>,
    name: &'static str,
}

impl CommandApplier {
    pub fn new(light: Vec<String>, dark: Vec<String>) -> Self {
        Self {
            light,
            dark,
            name: "command",
        }
    }

    /// `gsettings set org.gnome.desktop.interface color-scheme ...`
    pub fn gnome() -> Self {
        let gsettings = |value: &str| {
            vec![
                "gsettings".to_string(),
                "set".to_string(),
                GNOME_SCHEMA.to_string(),
                GNOME_COLOR_SCHEME_KEY.to_string(),
                value.to_string(),
            ]
        };
        Self {
            light: gsettings(GNOME_LIGHT_VALUE),
            dark: gsettings(GNOME_DARK_VALUE),
            name: "gnome",
        }
    }

    /// The argv run for a mode.
    pub fn command_for(&self, is_dark: bool) -> &[String] {
        if is_dark { &self.dark } else { &self.light }
    }
}

impl ThemeApplier for CommandApplier {
    fn apply(&mut self, is_dark: bool) -> Result<(), ApplyError> {
        let Some((program, args)) = self.command_for(is_dark).split_first() else {
            return Err(ApplyError::MissingCommand(if is_dark { "dark" } else { "light" }));
        };

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| ApplyError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ApplyError::CommandFailed {
                program: program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
