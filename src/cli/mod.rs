//! CLI argument parsing using clap 4.x derive macros

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Travel-health assistant
///
/// Ask about a destination and three agents answer in turn: one lists the
/// diseases to watch for, one finds where to get vaccinated and one books
/// the appointment.
#[derive(Parser, Debug)]
#[command(name = "travel-health")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute (defaults to `chat`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Model identifier (overrides config and environment)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// OpenAI-compatible endpoint base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive console session
    Chat,

    /// Start the WebSocket relay
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List the configured agents and their instructions
    Agents,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
