//! Inspect command implementation

use std::path::Path;

use colored::Colorize;
use forge_deployer::{
    Configuration, Definition, DescriptorBuilder, ROLE_DESCRIPTOR, RoleDefinition,
    RoleDescriptorBuilder, SERVICE_DESCRIPTOR, ServiceDefinition, ServiceDescriptorBuilder,
    TYPE_DESCRIPTOR, TypeDescriptorBuilder,
};
use forge_extension::Extension;
use forge_loader::Archive;
use serde::Serialize;

use crate::error::Result;

#[derive(Debug, Serialize)]
struct InspectReport {
    archive: String,
    available: Vec<Extension>,
    required: Vec<Extension>,
    optional: Vec<Extension>,
    roles: Vec<RoleDefinition>,
    types: Vec<Definition>,
    services: Vec<ServiceDefinition>,
}

/// Run the inspect command
pub fn run_inspect(path: &Path, json: bool) -> Result<()> {
    let report = inspect(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn inspect(path: &Path) -> Result<InspectReport> {
    let archive = Archive::open(path)?;
    let package = archive.package()?;

    let roles = match read_descriptor(&archive, ROLE_DESCRIPTOR, "roles")? {
        Some((tree, url)) => RoleDescriptorBuilder.build(&tree, &url)?.definitions().to_vec(),
        None => Vec::new(),
    };
    let types = match read_descriptor(&archive, TYPE_DESCRIPTOR, "types")? {
        Some((tree, url)) => TypeDescriptorBuilder.build(&tree, &url)?.definitions().to_vec(),
        None => Vec::new(),
    };
    let services = match read_descriptor(&archive, SERVICE_DESCRIPTOR, "services")? {
        Some((tree, url)) => ServiceDescriptorBuilder
            .build(&tree, &url)?
            .definitions()
            .to_vec(),
        None => Vec::new(),
    };

    Ok(InspectReport {
        archive: archive.path().display().to_string(),
        available: package.available,
        required: package.required,
        optional: package.optional,
        roles,
        types,
        services,
    })
}

fn read_descriptor(
    archive: &Archive,
    entry: &str,
    root: &str,
) -> Result<Option<(Configuration, String)>> {
    let Some(bytes) = archive.read_entry(entry)? else {
        return Ok(None);
    };
    let url = format!("{}!/{}", archive.path().display(), entry);
    let text = String::from_utf8_lossy(&bytes);
    let tree = Configuration::from_toml(root, &text, &url)?;
    Ok(Some((tree, url)))
}

fn print_report(report: &InspectReport) {
    println!("{} {}", "Archive".bold(), report.archive);
    println!();

    print_extensions("Provides", &report.available);
    print_extensions("Requires", &report.required);
    print_extensions("Optionally uses", &report.optional);

    println!("{}:", "Roles".bold());
    if report.roles.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for role in &report.roles {
        println!("  {:<14} {}", role.shorthand.green(), role.name);
    }
    println!();

    println!("{}:", "Types".bold());
    if report.types.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for definition in &report.types {
        match definition {
            Definition::Type(t) => println!(
                "  {} {} -> {}",
                t.role.as_deref().unwrap_or("?").cyan(),
                t.name.as_deref().unwrap_or("?").green(),
                t.class_name.as_deref().unwrap_or("?")
            ),
            Definition::Converter(c) => println!(
                "  {} {} ({} -> {})",
                "converter".cyan(),
                c.class_name.as_deref().unwrap_or("?").green(),
                c.source.as_deref().unwrap_or("?"),
                c.destination.as_deref().unwrap_or("?")
            ),
        }
    }
    println!();

    println!("{}:", "Services".bold());
    if report.services.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for service in &report.services {
        println!("  {:<14} {}", service.role.green(), service.factory);
    }
}

fn print_extensions(label: &str, extensions: &[Extension]) {
    if extensions.is_empty() {
        return;
    }
    println!("{}:", label.bold());
    for extension in extensions {
        println!("  {} {}", "+".green(), extension);
    }
    println!();
}
