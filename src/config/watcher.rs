//! Hot reload of `duskmode.toml`.
//!
//! Watches the config directory (editors often replace files rather than
//! writing in place) and forwards relevant changes to the main loop as
//! [`SignalMessage::Reload`], debounced so an editor save burst triggers one
//! reload.

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use super::get_config_path;
use crate::constants::{CONFIG_FILE_NAME, CONFIG_WATCH_DEBOUNCE_MS};
use crate::io::signals::SignalMessage;
use crate::utils::private_path;

/// Start watching the active config file on a background thread.
///
/// Returns without watching when the config directory does not exist.
pub fn start_config_watcher(signal_sender: Sender<SignalMessage>, debug_enabled: bool) -> Result<()> {
    let config_path = get_config_path()?;
    let Some(config_dir) = config_path.parent().map(Path::to_path_buf) else {
        return Ok(());
    };

    if !config_dir.is_dir() {
        if debug_enabled {
            log_pipe!();
            log_debug!("No configuration directory to watch for hot reload");
        }
        return Ok(());
    }

    if debug_enabled {
        log_pipe!();
        log_debug!("Watching configuration for changes:");
        log_indented!("{}", private_path(&config_path));
    }

    let (tx, rx) = std::sync::mpsc::channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res
                && matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                )
            {
                let _ = tx.send(event);
            }
        },
        NotifyConfig::default(),
    )
    .context("Failed to create file watcher")?;

    watcher
        .watch(&config_dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("Failed to watch directory: {}", config_dir.display()))?;

    thread::spawn(move || {
        // Dropping the watcher stops notifications
        let _watcher = watcher;
        let mut last_reload = Instant::now();

        for event in rx {
            if !event.paths.iter().any(|path| affects_config(path, &config_path)) {
                continue;
            }

            if last_reload.elapsed() < Duration::from_millis(CONFIG_WATCH_DEBOUNCE_MS) {
                continue;
            }

            if debug_enabled {
                log_pipe!();
                log_info!("Configuration file change detected");
            }

            if signal_sender.send(SignalMessage::Reload).is_err() {
                break;
            }
            last_reload = Instant::now();
        }
    });

    Ok(())
}

/// Whether a change to `event_path` concerns the config file.
///
/// Editor swap and backup files share the config's name as a prefix.
fn affects_config(event_path: &Path, config_path: &PathBuf) -> bool {
    if event_path == config_path {
        return true;
    }
    if event_path.parent() != config_path.parent() {
        return false;
    }
    event_path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with(CONFIG_FILE_NAME))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affects_config() {
        let config = PathBuf::from("/home/user/.config/duskmode/duskmode.toml");

        assert!(affects_config(&config, &config));
        assert!(affects_config(
            Path::new("/home/user/.config/duskmode/duskmode.toml~"),
            &config
        ));
        assert!(!affects_config(
            Path::new("/home/user/.config/duskmode/notes.txt"),
            &config
        ));
        assert!(!affects_config(
            Path::new("/home/user/.config/other/duskmode.toml"),
            &config
        ));
    }
}
