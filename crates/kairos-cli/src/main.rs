use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use kairos_cli::commands::{
    add, calendar, categories, delete, done, edit, history, list, theme, time,
};
use kairos_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut stdout = std::io::stdout().lock();
    match command {
        Commands::Add(args) => add::run(&mut stdout, args, &config)?,
        Commands::List(args) => list::run(&mut stdout, args, &config)?,
        Commands::Done(args) => done::run(&mut stdout, args, &config)?,
        Commands::Delete(args) => delete::run(&mut stdout, args, &config)?,
        Commands::Edit(args) => edit::run(&mut stdout, args, &config)?,
        Commands::Time(args) => time::run(&mut stdout, args, &config)?,
        Commands::Calendar(args) => calendar::run(&mut stdout, args, &config)?,
        Commands::History(args) => history::run(&mut stdout, args, &config)?,
        Commands::Categories(action) => categories::run(&mut stdout, action, &config)?,
        Commands::Theme(args) => theme::run(&mut stdout, args, &config)?,
    }
    stdout.flush()?;

    Ok(())
}
