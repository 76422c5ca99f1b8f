// CLI argument parsing and definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "nexus")]
#[command(about = "Push gems to a Nexus rubygems repository")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Ask again for the URL and credentials
    #[arg(short = 'c', long = "nexus-clear", global = true)]
    pub clear: bool,

    /// Config file to use instead of ~/.gem/nexus
    #[arg(long = "nexus-config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Use the settings stored under this repository key
    #[arg(long, value_name = "KEY", global = true)]
    pub repo: Option<String>,

    /// Keep the credentials in a separate file
    #[arg(long, value_name = "FILE", global = true)]
    pub secrets: Option<PathBuf>,

    /// Ask for the password on every run instead of storing it
    #[arg(long, global = true)]
    pub password: bool,

    /// Encrypt the stored credentials with a passphrase
    #[arg(long, global = true)]
    pub encrypt: bool,

    /// Print request diagnostics (repeat for more log output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Configure URL and credentials without sending anything
    Setup,
    /// Upload a gem to the repository
    Push {
        /// Path to the .gem file
        gem: PathBuf,
    },
    /// Send an authorized request to the repository
    Request {
        /// GET, POST, PUT or DELETE
        method: String,
        /// Path relative to the repository URL
        path: String,
    },
    /// Store the credentials in plaintext again
    Decrypt,
}
