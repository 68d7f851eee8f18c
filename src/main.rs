use clap::Parser;
use eyre::{Context, Result};

mod cli;
mod commands;
mod compose;
mod config;
mod event;
mod render;
mod sink;

use cli::{Cli, Commands};
use config::Config;

/// Process diagnostics go to stderr; the per-host log files are the product
/// and must stay clean of them.
fn setup_logging(verbose: bool, quiet: bool) {
    let mut builder = env_logger::Builder::new();

    // RUST_LOG env var takes precedence, otherwise use the CLI flags
    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        let level = if quiet {
            log::LevelFilter::Error
        } else if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        };
        builder.filter_level(level);
    }

    builder.init();
}

fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Event { action } => commands::event::run(action, &config),
        Commands::Ingest { file } => commands::ingest::run(file, &config),
        Commands::Config { action } => commands::config::run(action, &config),
        Commands::Doctor => commands::doctor::run(&config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    log::debug!("Resolved config: {:?}", config);

    run(cli, config).context("Command failed")?;

    Ok(())
}
