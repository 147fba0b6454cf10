//! Deploy command implementation

use std::path::{Path, PathBuf};

use colored::Colorize;
use forge_deployer::{Deployer, DeployerConfig, TypeDeployer};
use forge_loader::ClassCatalog;
use forge_registry::{ConverterEntry, Registries};
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Serialize)]
struct DeployReport {
    archives: Vec<String>,
    roles: Vec<RoleEntry>,
    types: Vec<TypeEntry>,
    converters: Vec<ConverterEntry>,
}

#[derive(Debug, Serialize)]
struct RoleEntry {
    shorthand: String,
    role: String,
}

#[derive(Debug, Serialize)]
struct TypeEntry {
    role: String,
    name: String,
    class_name: String,
}

/// Run the deploy command
pub fn run_deploy(
    archives: &[PathBuf],
    ext_path: &[PathBuf],
    config_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = load_config(ext_path, config_path)?;
    let report = deploy(archives, &config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn load_config(ext_path: &[PathBuf], config_path: Option<&Path>) -> Result<DeployerConfig> {
    let mut config = match config_path {
        Some(path) => DeployerConfig::from_path(path)?,
        None => DeployerConfig::default(),
    };
    if !ext_path.is_empty() {
        config.ext_path = ext_path.to_vec();
    }
    Ok(config)
}

fn deploy(archives: &[PathBuf], config: &DeployerConfig) -> Result<DeployReport> {
    let deployer = Deployer::from_config(config, ClassCatalog::lenient(), Registries::new())?;

    for archive in archives {
        tracing::debug!("Deploying {}", archive.display());
        deployer.create_deployer(archive)?.deploy_all()?;
    }

    let registries = deployer.registries();
    let roles = registries
        .roles
        .list()
        .into_iter()
        .map(|(shorthand, role)| RoleEntry { shorthand, role })
        .collect();

    let mut types = Vec::new();
    for token in registries.types.roles() {
        for name in registries.types.names(&token) {
            let class_name = registries.types.class_name(&token, &name).unwrap_or_default();
            types.push(TypeEntry {
                role: token.name.clone(),
                name,
                class_name,
            });
        }
    }

    Ok(DeployReport {
        archives: archives.iter().map(|a| a.display().to_string()).collect(),
        roles,
        types,
        converters: registries.converters.converters(),
    })
}

fn print_report(report: &DeployReport) {
    println!(
        "{} {} archive(s)",
        "Deployed".green().bold(),
        report.archives.len()
    );
    println!();

    println!("{}:", "Roles".bold());
    for role in &report.roles {
        println!("  {:<16} {}", role.shorthand.green(), role.role);
    }
    println!();

    println!("{}:", "Types".bold());
    if report.types.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for entry in &report.types {
        println!(
            "  {} {} -> {}",
            entry.role.cyan(),
            entry.name.green(),
            entry.class_name
        );
    }
    println!();

    println!("{}:", "Converters".bold());
    if report.converters.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for converter in &report.converters {
        println!(
            "  {} -> {} ({})",
            converter.source,
            converter.destination,
            converter.class_name.green()
        );
    }
}
