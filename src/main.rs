//! `travel-health` - a terminal travel-health assistant
//!
//! Three agents share one group chat: a disease lookup, a vaccine locator and
//! a vaccine booker. The binary drives them from the console or relays them
//! over a WebSocket.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ConfigCommand};
use travel_health_core::config::{default_config_path, Config};
use travel_health_core::llm::{create_service, CompletionService};
use travel_health_core::output::OutputFormatter;
use travel_health_core::session::{run_console, ChatSession, ConsoleSink};

mod cli;
mod server;

/// Main entry point for the health agent CLI
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tracing::info!("Starting health agent...");

    // Runs before loading: the target file may not exist yet
    if let Some(Commands::Config {
        cmd: ConfigCommand::Init { force },
    }) = &cli.command
    {
        let path = config_path(&cli)?;
        if path.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
        Config::default().save(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let config = load_config(&cli)?;

    match &cli.command {
        None | Some(Commands::Chat) => {
            let service = connect(&config)?;
            run_chat(&config, service).await?;
        }

        Some(Commands::Serve { port }) => {
            let service = connect(&config)?;
            let port = port.unwrap_or(config.server.port);
            let state = Arc::new(server::AppState { config, service });
            tokio::select! {
                result = server::start_server(port, state) => result?,
                _ = tokio::signal::ctrl_c() => tracing::info!("shutting down relay"),
            }
        }

        Some(Commands::Agents) => {
            let formatter = OutputFormatter::new();
            let roster: Vec<_> = config
                .roster()?
                .into_iter()
                .map(|role| (role, config.instructions_for(role)))
                .collect();
            print!("{}", formatter.format_roster(&roster));
        }

        Some(Commands::Config { cmd: ConfigCommand::Show }) => {
            let text = toml::to_string_pretty(&config).context("Failed to serialize configuration")?;
            print!("{}", text);
        }

        Some(Commands::Config { cmd: ConfigCommand::Init { .. } }) => {}
    }

    Ok(())
}

/// Logs go to stderr so they never interleave with the conversation.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// File, then environment, then command line.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config =
        Config::load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
    config.apply_env();
    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.provider.base_url = base_url.clone();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(path.clone()),
        None => default_config_path().context("Could not determine the config directory"),
    }
}

fn connect(config: &Config) -> Result<Arc<dyn CompletionService>> {
    create_service(config).context("Cannot start without model credentials")
}

async fn run_chat(config: &Config, service: Arc<dyn CompletionService>) -> Result<()> {
    let mut session = ChatSession::new(config, service)?;
    let mut sink = ConsoleSink::new(std::io::stdout(), OutputFormatter::new());
    let input = tokio::io::BufReader::new(tokio::io::stdin());

    run_console(&mut session, input, &mut sink)
        .await
        .context("Console session failed")?;

    let mut out = sink.into_inner();
    writeln!(out)?;
    Ok(())
}
