//! Forge CLI
//!
//! Inspects type library archives and deploys them into fresh registries.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Commands::Inspect { archive, json } => commands::run_inspect(&archive, json),
        Commands::Deploy {
            archives,
            ext_path,
            config,
            json,
        } => commands::run_deploy(&archives, &ext_path, config.as_deref(), json),
    }
}
