//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Forge - inspect and deploy type libraries
#[derive(Parser, Debug)]
#[command(name = "forge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show an archive's extensions and descriptors without deploying it
    Inspect {
        /// Archive to inspect
        archive: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Deploy archives and report what got registered
    ///
    /// Types are resolved against a catalog that accepts every class name,
    /// so descriptor wiring can be checked without host code.
    ///
    /// Examples:
    ///   forge deploy lib/widgets.pkg
    ///   forge deploy lib/*.pkg --ext-path ext
    ///   forge deploy lib/widgets.pkg --config forge.toml --json
    Deploy {
        /// Archives to deploy, in order
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        /// Directory holding optional packages (repeatable; replaces the
        /// configured ext_path)
        #[arg(long = "ext-path", value_name = "DIR")]
        ext_path: Vec<PathBuf>,

        /// Configuration file with a [deployer] table
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_deploy() {
        let cli = Cli::parse_from([
            "forge",
            "deploy",
            "a.pkg",
            "b.pkg",
            "--ext-path",
            "ext",
            "--ext-path",
            "/opt/ext",
            "--json",
        ]);
        assert_eq!(
            cli.command,
            Commands::Deploy {
                archives: vec![PathBuf::from("a.pkg"), PathBuf::from("b.pkg")],
                ext_path: vec![PathBuf::from("ext"), PathBuf::from("/opt/ext")],
                config: None,
                json: true,
            }
        );
    }

    #[test]
    fn test_deploy_requires_archive() {
        assert!(Cli::try_parse_from(["forge", "deploy"]).is_err());
    }

    #[test]
    fn test_global_verbose() {
        let cli = Cli::parse_from(["forge", "inspect", "a.pkg", "-v"]);
        assert!(cli.verbose);
    }
}
