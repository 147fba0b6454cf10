//! Deployment of Forge type libraries.
//!
//! A [`Deployer`] turns an archive into registered roles, types, converters
//! and services:
//!
//! 1. the scope manager builds a loading scope for the archive;
//! 2. a [`Deployment`] reads the archive's role, type and service
//!    descriptors and registers the roles right away;
//! 3. types and services are registered when asked for, through
//!    [`TypeDeployer::deploy_all`] or [`TypeDeployer::deploy_type`].
//!
//! Descriptors are TOML documents read into a generic [`Configuration`]
//! tree and interpreted by the builders in [`builder`].

pub mod builder;
pub mod config;
pub mod configuration;
pub mod deployer;
pub mod deployment;
pub mod descriptor;
pub mod error;

pub use builder::{
    COMPATIBLE_VERSION, DescriptorBuilder, RoleDescriptorBuilder, ServiceDescriptorBuilder,
    TypeDescriptorBuilder,
};
pub use config::DeployerConfig;
pub use configuration::Configuration;
pub use deployer::Deployer;
pub use deployment::{Deployment, ROLE_DESCRIPTOR, SERVICE_DESCRIPTOR, TYPE_DESCRIPTOR, TypeDeployer};
pub use descriptor::{
    ConverterDefinition, Definition, Descriptor, RoleDefinition, RoleDescriptor, ServiceDefinition,
    ServiceDescriptor, TypeDefinition, TypeDescriptor,
};
pub use error::{Error, Result};
