//! Per-scope deployment of descriptors.
//!
//! A [`Deployment`] belongs to exactly one loading scope. Loading its
//! descriptors registers the declared roles immediately; type and service
//! definitions are kept and registered later on request.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Weak};

use forge_loader::{KeyedCache, LoadingScope, Resource};
use forge_registry::DefaultTypeFactory;
use parking_lot::RwLock;

use crate::builder::{
    DescriptorBuilder, RoleDescriptorBuilder, ServiceDescriptorBuilder, TypeDescriptorBuilder,
};
use crate::configuration::Configuration;
use crate::deployer::DeployerInner;
use crate::descriptor::{Definition, ServiceDescriptor, TypeDescriptor};
use crate::error::{Error, Result};

pub const ROLE_DESCRIPTOR: &str = "META-INF/forge/roles.toml";
pub const TYPE_DESCRIPTOR: &str = "META-INF/forge/types.toml";
pub const SERVICE_DESCRIPTOR: &str = "META-INF/forge/services.toml";

/// Registers the types a deployment knows about.
pub trait TypeDeployer: Send + Sync {
    /// Deploy every type definition, then every service definition, in
    /// discovery order.
    fn deploy_all(&self) -> Result<()>;

    /// Deploy every definition with role shorthand `role` and name `name`.
    fn deploy_type(&self, role: &str, name: &str) -> Result<()>;

    /// Deploy a single definition through this deployment's scope.
    fn deploy_definition(&self, definition: &Definition) -> Result<()>;
}

pub struct Deployment {
    deployer: Weak<DeployerInner>,
    scope: Arc<LoadingScope>,
    type_descriptors: RwLock<Vec<TypeDescriptor>>,
    service_descriptors: RwLock<Vec<ServiceDescriptor>>,
    factories: KeyedCache<String, DefaultTypeFactory>,
}

impl Deployment {
    pub(crate) fn new(deployer: Weak<DeployerInner>, scope: Arc<LoadingScope>) -> Self {
        Self {
            deployer,
            scope,
            type_descriptors: RwLock::new(Vec::new()),
            service_descriptors: RwLock::new(Vec::new()),
            factories: KeyedCache::new(),
        }
    }

    pub fn scope(&self) -> &Arc<LoadingScope> {
        &self.scope
    }

    /// Type descriptors loaded so far.
    pub fn type_descriptors(&self) -> Vec<TypeDescriptor> {
        self.type_descriptors.read().clone()
    }

    /// Service descriptors loaded so far.
    pub fn service_descriptors(&self) -> Vec<ServiceDescriptor> {
        self.service_descriptors.read().clone()
    }

    /// Read the role, type and service descriptors.
    ///
    /// With `archive`, only that archive of the scope is searched; without,
    /// every descriptor visible to the scope is read. Roles are deployed as
    /// soon as their descriptor is parsed.
    pub fn load_descriptors(&self, archive: Option<&Path>) -> Result<()> {
        let deployer = self.deployer()?;

        for resource in self.locate(archive, ROLE_DESCRIPTOR) {
            let url = resource.url();
            let tree = read_tree(&resource, "roles", &url)?;
            let descriptor = RoleDescriptorBuilder.build(&tree, &url)?;
            for role in descriptor.definitions() {
                deployer.handle_role(role)?;
            }
            tracing::debug!("Deployed {} role(s) from {}", descriptor.definitions().len(), url);
        }

        for resource in self.locate(archive, TYPE_DESCRIPTOR) {
            let url = resource.url();
            let tree = read_tree(&resource, "types", &url)?;
            let descriptor = TypeDescriptorBuilder.build(&tree, &url)?;
            tracing::debug!("Loaded {} type(s) from {}", descriptor.definitions().len(), url);
            self.type_descriptors.write().push(descriptor);
        }

        for resource in self.locate(archive, SERVICE_DESCRIPTOR) {
            let url = resource.url();
            let tree = read_tree(&resource, "services", &url)?;
            let descriptor = ServiceDescriptorBuilder.build(&tree, &url)?;
            tracing::debug!("Loaded {} service(s) from {}", descriptor.definitions().len(), url);
            self.service_descriptors.write().push(descriptor);
        }

        Ok(())
    }

    /// The factory for `role`, created on first request.
    pub fn factory(&self, role: &str) -> Arc<DefaultTypeFactory> {
        self.factories.get_or_insert_with(role.to_string(), || {
            DefaultTypeFactory::new(role, Arc::clone(&self.scope))
        })
    }

    fn locate(&self, archive: Option<&Path>, name: &str) -> Vec<Resource> {
        match archive {
            Some(archive) => self.scope.archive_resource(archive, name).into_iter().collect(),
            None => self.scope.resources(name),
        }
    }

    fn deployer(&self) -> Result<Arc<DeployerInner>> {
        self.deployer.upgrade().ok_or(Error::DeployerDropped)
    }
}

impl fmt::Debug for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deployment")
            .field("scope", &format_args!("{}", self.scope.id()))
            .field("type_descriptors", &self.type_descriptors.read().len())
            .field("service_descriptors", &self.service_descriptors.read().len())
            .finish()
    }
}

impl TypeDeployer for Deployment {
    fn deploy_all(&self) -> Result<()> {
        let deployer = self.deployer()?;

        for descriptor in self.type_descriptors() {
            for definition in descriptor.definitions() {
                deployer.handle_type(self, definition)?;
            }
        }
        for descriptor in self.service_descriptors() {
            for service in descriptor.definitions() {
                deployer.handle_service(self, service)?;
            }
        }
        Ok(())
    }

    fn deploy_type(&self, role: &str, name: &str) -> Result<()> {
        let deployer = self.deployer()?;

        let mut deployed = 0;
        for descriptor in self.type_descriptors() {
            for definition in descriptor.definitions() {
                if definition.role() == Some(role) && definition.name() == Some(name) {
                    deployer.handle_type(self, definition)?;
                    deployed += 1;
                }
            }
        }
        if deployed == 0 {
            tracing::debug!("No definition of {} '{}' in {}", role, name, self.scope.id());
        }
        Ok(())
    }

    fn deploy_definition(&self, definition: &Definition) -> Result<()> {
        self.deployer()?.handle_type(self, definition)
    }
}

fn read_tree(resource: &Resource, root: &str, url: &str) -> Result<Configuration> {
    let bytes = resource.read()?;
    let text = String::from_utf8(bytes).map_err(|e| Error::MalformedDescriptor {
        url: url.to_string(),
        message: format!("not valid UTF-8: {e}"),
    })?;
    Configuration::from_toml(root, &text, url)
}
