// External crates
use clap::Parser;
use tracing::info;

// Internal imports
use nexus_core::nexus_error;
use nexus_messages::{msg, MESSAGES};

// Local modules
mod cli;
mod commands;

use cli::Args;
use commands::execute_command;

fn main() {
    let args = Args::parse();

    // Keep the guard alive so file logs are flushed on exit
    let _log_guard = nexus_logging::init_subscriber(args.verbose);

    info!(command = ?args.command, repo = ?args.repo, "Starting nexus command");

    if let Err(e) = execute_command(args) {
        nexus_error!("{}", msg!(MESSAGES.common.error_generic, error = format!("{:#}", e)));
        std::process::exit(1);
    }
}
