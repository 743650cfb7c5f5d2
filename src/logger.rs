//! Box-drawing log output.
//!
//! Every line the daemon prints goes through the macros defined here so the
//! output forms one continuous tree:
//!
//! ```text
//! ┏ duskmode v0.3.0 ━━╸
//! ┃
//! ┣ Loading configuration from ~/.config/duskmode/duskmode.toml
//! ┃   Schedule: solar
//! ┃
//! ┣[INFO] Received refresh signal
//! ╹
//! ```
//!
//! - `log_block_start!` opens a block (`┃` spacer, then `┣ message`)
//! - `log_decorated!` continues a block
//! - `log_indented!` prints details under the current line
//! - `log_pipe!` inserts a spacer before a leveled message
//! - `log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!`
//!   print a colored `[LEVEL]` label
//! - `log_version!` and `log_end!` open and close the tree
//!
//! Output can be silenced at runtime, which `status --json` relies on to keep
//! stdout machine-readable.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static TIMESTAMPS_ENABLED: AtomicBool = AtomicBool::new(false);

pub struct Log;

impl Log {
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Prefix each line with the wall-clock time (debug mode).
    pub fn set_timestamps(enabled: bool) {
        TIMESTAMPS_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// `[HH:MM:SS] ` in the local zone, or empty when timestamps are off.
    pub fn timestamp_prefix() -> String {
        if TIMESTAMPS_ENABLED.load(Ordering::SeqCst) {
            format!("[{}] ", chrono::Local::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Level labels with their ANSI color.
pub mod level {
    pub const INFO: &str = "┣[\x1b[32mINFO\x1b[0m] ";
    pub const DEBUG: &str = "┣[\x1b[36mDEBUG\x1b[0m] ";
    pub const WARNING: &str = "┣[\x1b[33mWARNING\x1b[0m] ";
    pub const ERROR: &str = "┣[\x1b[31mERROR\x1b[0m] ";
    pub const CRITICAL: &str = "┣[\x1b[31mCRITICAL\x1b[0m] ";
    pub const ERROR_EXIT: &str = "┗[\x1b[31mERROR\x1b[0m] ";
}

/// Assemble one output line; `spaced` puts a `┃` line above it.
pub fn format_line(prefix: &str, lead: &str, message: &str, spaced: bool) -> String {
    if spaced {
        format!("{prefix}┃\n{prefix}{lead}{message}\n")
    } else {
        format!("{prefix}{lead}{message}\n")
    }
}

pub fn write_output(text: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(text.as_bytes());
    let _ = stdout.flush();
}

/// Backend of the logging macros.
pub fn emit(lead: &str, message: &str, spaced: bool) {
    if Log::is_enabled() {
        let prefix = Log::timestamp_prefix();
        write_output(&format_line(&prefix, lead, message, spaced));
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_emit {
    ($lead:expr, $spaced:expr, $fmt:literal $($arg:tt)*) => {
        $crate::logger::emit($lead, &format!($fmt $($arg)*), $spaced)
    };
    ($lead:expr, $spaced:expr, $expr:expr) => {
        $crate::logger::emit($lead, &format!("{}", $expr), $spaced)
    };
}

#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)+) => { $crate::__log_emit!("┣ ", true, $($arg)+) };
}

#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)+) => { $crate::__log_emit!("┣ ", false, $($arg)+) };
}

#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)+) => { $crate::__log_emit!("┃   ", false, $($arg)+) };
}

#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit("┃", "", false)
    };
}

/// `┏ duskmode vX.Y.Z ━━╸`
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit(
            "┏ ",
            &format!("{} v{} ━━╸", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            false,
        )
    };
}

#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit("╹", "", false)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => { $crate::__log_emit!($crate::logger::level::INFO, false, $($arg)+) };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => { $crate::__log_emit!($crate::logger::level::DEBUG, false, $($arg)+) };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)+) => { $crate::__log_emit!($crate::logger::level::WARNING, false, $($arg)+) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => { $crate::__log_emit!($crate::logger::level::ERROR, false, $($arg)+) };
}

#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)+) => { $crate::__log_emit!($crate::logger::level::CRITICAL, false, $($arg)+) };
}

/// Error that ends the program: spacer, then `┗[ERROR] message`.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)+) => { $crate::__log_emit!($crate::logger::level::ERROR_EXIT, true, $($arg)+) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        assert_eq!(format_line("", "┣ ", "hello", false), "┣ hello\n");
        assert_eq!(
            format_line("[12:00:00] ", "┣ ", "block", true),
            "[12:00:00] ┃\n[12:00:00] ┣ block\n"
        );
        assert_eq!(format_line("", "┃", "", false), "┃\n");
    }

    #[test]
    fn test_timestamps_off_by_default() {
        assert!(Log::timestamp_prefix().is_empty());
    }
}
