//! Command-line argument parsing.
//!
//! `duskmode [OPTIONS] [COMMAND]`. Global options may appear before or after
//! the command. Problems are reported through the logger and turn into
//! [`CliAction::ShowHelpDueToError`] so `main` can print usage and exit 1.

/// Options accepted by every command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonOptions {
    pub debug_enabled: bool,
    pub config_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the scheduler in the foreground (default)
    Run,
    /// Print the current decision
    Status {
        at: Option<String>,
        json: bool,
        follow: bool,
    },
    /// Seven-day sunrise/sunset preview
    Week,
    /// Evaluate once, apply the mode and exit
    Apply,
    /// Ask the running scheduler to reload its configuration
    Reload,
    /// Ask the running scheduler to exit
    Stop,
}

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "run" => Command::Run,
            "status" | "s" => Command::Status {
                at: None,
                json: false,
                follow: false,
            },
            "week" | "w" => Command::Week,
            "apply" | "a" => Command::Apply,
            "reload" | "r" => Command::Reload,
            "stop" => Command::Stop,
            _ => return None,
        })
    }
}

#[derive(Debug, PartialEq)]
pub enum CliAction {
    Execute {
        command: Command,
        options: CommonOptions,
    },
    ShowHelp,
    ShowVersion,
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse `args`, where the first item is the program name.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut options = CommonOptions::default();
        let mut command: Option<Command> = None;
        let mut at: Option<String> = None;
        let mut json = false;
        let mut follow = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut error_found = false;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => options.debug_enabled = true,
                "--json" => json = true,
                "--follow" | "-f" => follow = true,
                "--config" | "-c" => match iter.next() {
                    Some(dir) if !dir.starts_with('-') => options.config_dir = Some(dir.clone()),
                    _ => {
                        log_warning!("Missing directory for --config. Usage: --config <directory>");
                        error_found = true;
                    }
                },
                "--at" => match iter.next() {
                    Some(value) if !value.starts_with('-') => at = Some(value.clone()),
                    _ => {
                        log_warning!("Missing value for --at. Usage: --at \"YYYY-MM-DD HH:MM\"");
                        error_found = true;
                    }
                },
                flag if flag.starts_with('-') => {
                    log_warning!("Unknown option: {flag}");
                    error_found = true;
                }
                name => match (&command, Command::from_name(name)) {
                    (None, Some(parsed)) => command = Some(parsed),
                    (Some(_), Some(_)) => {
                        log_error!("Cannot use multiple commands at once");
                        error_found = true;
                    }
                    (_, None) => {
                        log_warning!("Unknown command: {name}");
                        error_found = true;
                    }
                },
            }
        }

        if display_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }
        if display_help {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }

        let command = match command.unwrap_or(Command::Run) {
            Command::Status { .. } => Command::Status { at, json, follow },
            other => {
                if at.is_some() || json || follow {
                    log_warning!("--at, --json and --follow only apply to the status command");
                    error_found = true;
                }
                other
            }
        };

        if let Command::Status {
            json: true,
            follow: true,
            ..
        } = command
        {
            log_warning!("--json cannot be combined with --follow");
            error_found = true;
        }

        if let Command::Status {
            at: Some(_),
            follow: true,
            ..
        } = command
        {
            log_warning!("--at cannot be combined with --follow");
            error_found = true;
        }

        let action = if error_found {
            CliAction::ShowHelpDueToError
        } else {
            CliAction::Execute { command, options }
        };

        ParsedArgs { action }
    }

    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("duskmode [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("run                    Run the scheduler (default)");
    log_indented!("status, s              Show the current mode and next switch");
    log_indented!("    --at <time>        Evaluate at another instant (YYYY-MM-DD HH:MM)");
    log_indented!("    --json             Print machine-readable output");
    log_indented!("    -f, --follow       Keep printing a live countdown");
    log_indented!("week, w                Show sunrise and sunset for the next seven days");
    log_indented!("apply, a               Apply the current mode once and exit");
    log_indented!("reload, r              Reload configuration of the running scheduler");
    log_indented!("stop                   Stop the running scheduler");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        let mut full = vec!["duskmode"];
        full.extend_from_slice(args);
        ParsedArgs::parse(full).action
    }

    fn execute(command: Command, debug_enabled: bool, config_dir: Option<&str>) -> CliAction {
        CliAction::Execute {
            command,
            options: CommonOptions {
                debug_enabled,
                config_dir: config_dir.map(str::to_string),
            },
        }
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(parse(&[]), execute(Command::Run, false, None));
    }

    #[test]
    fn test_parse_debug_flag() {
        assert_eq!(parse(&["--debug"]), execute(Command::Run, true, None));
        assert_eq!(parse(&["-d"]), execute(Command::Run, true, None));
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(parse(&["--help"]), CliAction::ShowHelp);
        assert_eq!(parse(&["-h"]), CliAction::ShowHelp);
        assert_eq!(parse(&["--version"]), CliAction::ShowVersion);
        assert_eq!(parse(&["-V"]), CliAction::ShowVersion);
        assert_eq!(parse(&["-v"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_version_takes_precedence() {
        assert_eq!(parse(&["--help", "--version"]), CliAction::ShowVersion);
        assert_eq!(parse(&["status", "-V"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_parse_unknown_flag() {
        assert_eq!(parse(&["--bogus"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["-d", "--bogus"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_config_dir() {
        assert_eq!(
            parse(&["--config", "/tmp/dm", "week"]),
            execute(Command::Week, false, Some("/tmp/dm"))
        );
        assert_eq!(
            parse(&["apply", "-c", "/tmp/dm", "-d"]),
            execute(Command::Apply, true, Some("/tmp/dm"))
        );
        assert_eq!(parse(&["--config"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_status_options() {
        assert_eq!(
            parse(&["status", "--at", "2026-06-21 12:00", "--json"]),
            execute(
                Command::Status {
                    at: Some("2026-06-21 12:00".to_string()),
                    json: true,
                    follow: false,
                },
                false,
                None
            )
        );
        assert_eq!(
            parse(&["s", "-f"]),
            execute(
                Command::Status {
                    at: None,
                    json: false,
                    follow: true,
                },
                false,
                None
            )
        );
    }

    #[test]
    fn test_status_options_rejected_elsewhere() {
        assert_eq!(parse(&["week", "--json"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["--at", "2026-01-01 00:00"]), CliAction::ShowHelpDueToError);
        assert_eq!(
            parse(&["status", "--json", "--follow"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            parse(&["status", "--at", "2026-01-01 00:00", "-f"]),
            CliAction::ShowHelpDueToError
        );
    }

    #[test]
    fn test_command_aliases() {
        assert_eq!(parse(&["r"]), execute(Command::Reload, false, None));
        assert_eq!(parse(&["w"]), execute(Command::Week, false, None));
        assert_eq!(parse(&["a"]), execute(Command::Apply, false, None));
        assert_eq!(parse(&["stop"]), execute(Command::Stop, false, None));
        assert_eq!(parse(&["run", "-d"]), execute(Command::Run, true, None));
    }

    #[test]
    fn test_multiple_commands_rejected() {
        assert_eq!(parse(&["reload", "stop"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["sunrise"]), CliAction::ShowHelpDueToError);
    }
}
