//! Entry point: parse arguments, then hand off to the library.
//!
//! `run` (the default) starts the scheduler through [`Duskmode`]; every other
//! command is a one-shot handler in `duskmode::commands`.

use duskmode::{
    Duskmode,
    args::{self, CliAction, Command, ParsedArgs},
    commands, config,
    constants::EXIT_FAILURE,
    log_error_exit,
    logger::Log,
};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    let result = match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Execute { command, options } => {
            if options.debug_enabled {
                Log::set_timestamps(true);
            }

            config::set_config_dir(options.config_dir).and_then(|()| {
                let debug_enabled = options.debug_enabled;
                match command {
                    Command::Run => Duskmode::new(debug_enabled).run(),
                    Command::Status { at, json, follow } => {
                        commands::status::handle_status_command(at.as_deref(), json, follow)
                    }
                    Command::Week => commands::week::handle_week_command(),
                    Command::Apply => commands::apply::handle_apply_command(debug_enabled),
                    Command::Reload => commands::reload::handle_reload_command(debug_enabled),
                    Command::Stop => commands::stop::handle_stop_command(debug_enabled),
                }
            })
        }
    };

    if let Err(e) = result {
        // JSON output may have silenced the logger; errors always surface
        Log::set_enabled(true);
        log_error_exit!("{e:#}");
        std::process::exit(EXIT_FAILURE);
    }
}
