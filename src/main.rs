//! reparser - CLI entry point

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{CommandFactory, FromArgMatches};
use tracing_subscriber::EnvFilter;

use reparser::cli::{build_cli_styles, Cli, Commands, ConfigCommands};
use reparser::LockHeld;

use commands::UnknownReparser;

/// Exit status when another run holds the job lock.
const EXIT_LOCKED: u8 = 1;
/// Exit status when the requested reparser does not exist.
const EXIT_UNKNOWN_TASK: u8 = 2;

fn init_logging(verbose: bool) {
    let default = if verbose { "reparser=debug" } else { "reparser=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn dispatch(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Run(args) => commands::run::handle(config_path, &args),
        Commands::List => commands::list::handle(config_path),
        Commands::Detect { name, id } => commands::detect::handle(config_path, &name, id),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(config_path),
            ConfigCommands::Path => commands::config::handle_path(config_path),
        },
    }
}

/// Map an error to the process exit status and report it on stderr.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if let Some(held) = err.downcast_ref::<LockHeld>() {
        eprintln!("{}", held);
        return ExitCode::from(EXIT_LOCKED);
    }
    if let Some(unknown) = err.downcast_ref::<UnknownReparser>() {
        eprintln!("{}", unknown);
        return ExitCode::from(EXIT_UNKNOWN_TASK);
    }
    eprintln!("Error: {:#}", err);
    ExitCode::FAILURE
}

#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let matches = Cli::command().styles(build_cli_styles()).get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    init_logging(cli.verbose);

    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => exit_code_for(&err),
    }
}
