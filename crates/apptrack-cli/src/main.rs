use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use apptrack_cli::commands::{report, run};
use apptrack_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Run { events, log }) => {
            let config = Config::load_from(cli.config.as_deref())
                .context("failed to load configuration")?;
            tracing::debug!(?config, "loaded configuration");
            run::run(&config, events.as_deref(), log.as_deref())?;
        }
        Some(Commands::Report { log, json }) => {
            let config = Config::load_from(cli.config.as_deref())
                .context("failed to load configuration")?;
            let log_path = log.as_deref().unwrap_or(&config.log_path);
            report::run(log_path, *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
