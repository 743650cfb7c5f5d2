//! Default configuration file generation.
//!
//! Uses a small builder so every setting's comment lines up in one column.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::constants::*;
use crate::schedule::DailyTime;
use crate::utils::private_path;

/// Write a commented default `duskmode.toml` to `path`.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(path, default_config_content())
        .with_context(|| format!("Failed to write default config to {}", private_path(path)))?;

    log_block_start!("Created default configuration");
    log_indented!("{}", private_path(path));
    Ok(())
}

/// Contents of a freshly generated config file.
pub fn default_config_content() -> String {
    let light = DailyTime::from_minutes(DEFAULT_LIGHT_MINUTES);
    let dark = DailyTime::from_minutes(DEFAULT_DARK_MINUTES);

    let mut content = ConfigBuilder::new()
        .add_section("Appearance")
        .add_setting(
            "appearance",
            "\"auto\"",
            "\"auto\" follows the schedule; \"light\" or \"dark\" forces a mode",
        )
        .add_setting(
            "schedule",
            "\"solar\"",
            "\"solar\" (sunrise/sunset) or \"custom\" (fixed times)",
        )
        .add_section("Custom schedule")
        .add_setting("light_time", &format!("\"{light}\""), "Switch to Light mode (HH:MM)")
        .add_setting("dark_time", &format!("\"{dark}\""), "Switch to Dark mode (HH:MM)")
        .add_section("Location")
        .add_setting(
            "automatic_location",
            &DEFAULT_AUTOMATIC_LOCATION.to_string(),
            "Ask GeoClue2 for the current location",
        )
        .add_commented_setting("latitude", "52.52", "Manual latitude (-90 to 90)")
        .add_commented_setting("longitude", "13.405", "Manual longitude (-180 to 180)")
        .add_commented_setting(
            "timezone",
            "\"Europe/Berlin\"",
            "Calendar zone (default: system zone)",
        )
        .add_section("Applier")
        .add_setting("applier", "\"gnome\"", "\"gnome\", \"command\" or \"log\"")
        .add_commented_setting(
            "light_command",
            "[\"notify-send\", \"Light\"]",
            "Command run for Light mode (applier = \"command\")",
        )
        .add_commented_setting(
            "dark_command",
            "[\"notify-send\", \"Dark\"]",
            "Command run for Dark mode (applier = \"command\")",
        )
        .build();
    content.push('\n');
    content
}

struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    /// A setting written commented out, as an example value.
    fn add_commented_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("# {key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        result.join("\n")
    }
}
