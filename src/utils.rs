//! Small process and path helpers shared across modules.

use std::path::Path;

/// Render a path with the home directory replaced by `~`.
///
/// Keeps user names out of logs.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(relative) = path.strip_prefix(&home)
    {
        if relative.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", relative.display());
    }
    path.display().to_string()
}

/// Check whether a process with `pid` exists.
pub fn is_process_running(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    match i32::try_from(pid) {
        Ok(raw) => kill(Pid::from_raw(raw), None).is_ok(),
        Err(_) => false,
    }
}

/// Send `signal` to `pid`.
pub fn signal_process(pid: u32, signal: nix::sys::signal::Signal) -> anyhow::Result<()> {
    use anyhow::Context;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).context("PID out of range")?;
    kill(Pid::from_raw(raw), signal)
        .with_context(|| format!("Failed to send {signal} to process {pid}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_path_outside_home() {
        assert_eq!(private_path(Path::new("/etc/localtime")), "/etc/localtime");
    }

    #[test]
    fn test_private_path_inside_home() {
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".config").join("duskmode");
            assert_eq!(private_path(&path), "~/.config/duskmode");
        }
    }

    #[test]
    fn test_current_process_is_running() {
        assert!(is_process_running(std::process::id()));
    }
}
