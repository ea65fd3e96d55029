//! purr - Main Entry Point

use anyhow::Result;
use clap::Parser;
use purr::Cli;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let clean = purr::run(&cli, &mut std::io::stdout().lock(), &mut std::io::stderr().lock())?;
    if !clean {
        std::process::exit(1);
    }
    Ok(())
}
