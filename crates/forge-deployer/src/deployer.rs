//! The deployer: entry point for deploying type libraries.

use std::path::Path;
use std::sync::Arc;

use forge_loader::{
    ClassCatalog, Instance, KeyedCache, LoadingScope, ScopeId, ScopeManager, scan_extension_dirs,
};
use forge_registry::Registries;
use forge_registry::roles::{CONVERTER_ROLE, SERVICE_FACTORY_ROLE};

use crate::config::DeployerConfig;
use crate::deployment::Deployment;
use crate::descriptor::{ConverterDefinition, Definition, RoleDefinition, ServiceDefinition};
use crate::error::{Error, Result};

/// Deploys archives into a set of registries.
///
/// Deployments are cached per loading scope: asking twice for the same
/// archive returns the same [`Deployment`] and reads its descriptors once.
///
/// # Example
///
/// ```rust,no_run
/// use forge_deployer::{Deployer, DeployerConfig, TypeDeployer};
/// use forge_registry::{Registries, builtin_catalog};
/// use std::path::Path;
///
/// # fn main() -> forge_deployer::Result<()> {
/// let deployer = Deployer::from_config(
///     &DeployerConfig::default(),
///     builtin_catalog(),
///     Registries::new(),
/// )?;
/// let deployment = deployer.create_deployer(Path::new("lib/widgets.pkg"))?;
/// deployment.deploy_all()?;
/// # Ok(())
/// # }
/// ```
pub struct Deployer {
    inner: Arc<DeployerInner>,
}

pub(crate) struct DeployerInner {
    manager: Arc<ScopeManager>,
    registries: Registries,
    deployments: KeyedCache<ScopeId, Deployment>,
}

impl Deployer {
    pub fn new(manager: Arc<ScopeManager>, registries: Registries) -> Self {
        Self {
            inner: Arc::new(DeployerInner {
                manager,
                registries,
                deployments: KeyedCache::new(),
            }),
        }
    }

    /// Build a deployer from configuration.
    ///
    /// Optional packages are discovered in `config.ext_path`; `catalog`
    /// backs the base scope every archive scope delegates to.
    pub fn from_config(
        config: &DeployerConfig,
        catalog: ClassCatalog,
        registries: Registries,
    ) -> Result<Self> {
        let repository = scan_extension_dirs(&config.ext_path, &config.archive_extensions)?;
        tracing::debug!(
            "Found {} optional package(s) in {} director(ies)",
            repository.len(),
            config.ext_path.len()
        );
        let manager = ScopeManager::new(
            Arc::new(LoadingScope::root(catalog)),
            Arc::new(repository),
            config.delegation,
        );
        Ok(Self::new(Arc::new(manager), registries))
    }

    pub fn registries(&self) -> &Registries {
        &self.inner.registries
    }

    pub fn scope_manager(&self) -> &Arc<ScopeManager> {
        &self.inner.manager
    }

    /// The deployment for an archive, reading its descriptors on first use.
    pub fn create_deployer(&self, archive: &Path) -> Result<Arc<Deployment>> {
        let scope = self.inner.manager.create_scope(archive)?;
        let archive = dunce::canonicalize(archive)?;
        self.inner.deployment_for(scope, Some(&archive))
    }

    /// The deployment for a scope, reading every descriptor the scope can
    /// see on first use.
    pub fn create_scope_deployer(&self, scope: Arc<LoadingScope>) -> Result<Arc<Deployment>> {
        self.inner.deployment_for(scope, None)
    }

    /// A deployer sharing this one's scope manager, with its own
    /// deployments and `registries`.
    pub fn create_child_deployer(&self, registries: Registries) -> Deployer {
        Deployer::new(Arc::clone(&self.inner.manager), registries)
    }

    /// Deploy a type or converter definition on behalf of `deployment`.
    pub fn handle_type(&self, deployment: &Deployment, definition: &Definition) -> Result<()> {
        self.inner.handle_type(deployment, definition)
    }

    pub fn handle_converter(
        &self,
        deployment: &Deployment,
        converter: &ConverterDefinition,
    ) -> Result<()> {
        self.inner.handle_converter(deployment, converter)
    }

    pub fn handle_role(&self, role: &RoleDefinition) -> Result<()> {
        self.inner.handle_role(role)
    }

    pub fn handle_service(&self, deployment: &Deployment, service: &ServiceDefinition) -> Result<()> {
        self.inner.handle_service(deployment, service)
    }

    /// Construct the type registered as `name` under role shorthand `role`.
    pub fn create_type(&self, role: &str, name: &str) -> Result<Instance> {
        let registries = &self.inner.registries;
        let role_name = registries.roles.resolve(role).ok_or_else(|| Error::UnknownRole {
            name: name.to_string(),
            shorthand: role.to_string(),
        })?;
        let token = self.inner.manager.base().resolve_type(&role_name)?;
        Ok(registries.types.create(&token, name)?)
    }
}

impl DeployerInner {
    fn deployment_for(
        self: &Arc<Self>,
        scope: Arc<LoadingScope>,
        archive: Option<&Path>,
    ) -> Result<Arc<Deployment>> {
        self.deployments.get_or_try_insert_with(scope.id(), || {
            let deployment = Deployment::new(Arc::downgrade(self), Arc::clone(&scope));
            deployment.load_descriptors(archive)?;
            match archive {
                Some(archive) => tracing::info!("Deployed {}", archive.display()),
                None => tracing::info!("Deployed descriptors visible to {}", scope.id()),
            }
            Ok(deployment)
        })
    }

    pub(crate) fn handle_type(&self, deployment: &Deployment, definition: &Definition) -> Result<()> {
        let definition_type = match definition {
            Definition::Converter(converter) => return self.handle_converter(deployment, converter),
            Definition::Type(definition_type) => definition_type,
        };

        let missing = |attribute| Error::MissingAttribute {
            attribute,
            definition: definition.to_string(),
        };
        let name = definition_type.name.as_deref().ok_or_else(|| missing("name"))?;
        let shorthand = definition_type.role.as_deref().ok_or_else(|| missing("role"))?;
        let class_name = definition_type
            .class_name
            .as_deref()
            .ok_or_else(|| missing("classname"))?;

        let role = self
            .registries
            .roles
            .resolve(shorthand)
            .ok_or_else(|| Error::UnknownRole {
                name: name.to_string(),
                shorthand: shorthand.to_string(),
            })?;
        let token = deployment.scope().resolve_type(&role)?;

        let factory = deployment.factory(&role);
        self.registries
            .types
            .register_type(&token, name, class_name, factory.clone())?;
        factory.add_binding(name, class_name);
        Ok(())
    }

    pub(crate) fn handle_converter(
        &self,
        deployment: &Deployment,
        converter: &ConverterDefinition,
    ) -> Result<()> {
        let missing = |attribute| Error::MissingAttribute {
            attribute,
            definition: Definition::Converter(converter.clone()).to_string(),
        };
        let class_name = converter
            .class_name
            .as_deref()
            .ok_or_else(|| missing("classname"))?;
        let source = converter.source.as_deref().ok_or_else(|| missing("source"))?;
        let destination = converter
            .destination
            .as_deref()
            .ok_or_else(|| missing("destination"))?;

        let token = deployment.scope().resolve_type(CONVERTER_ROLE)?;
        self.registries
            .converters
            .register_converter(class_name, source, destination)?;

        let factory = deployment.factory(CONVERTER_ROLE);
        self.registries
            .types
            .register_type(&token, class_name, class_name, factory.clone())?;
        factory.add_binding(class_name, class_name);
        Ok(())
    }

    pub(crate) fn handle_role(&self, role: &RoleDefinition) -> Result<()> {
        self.registries.roles.register(&role.name, &role.shorthand)?;
        Ok(())
    }

    pub(crate) fn handle_service(
        &self,
        deployment: &Deployment,
        service: &ServiceDefinition,
    ) -> Result<()> {
        let role = self
            .registries
            .roles
            .resolve(&service.role)
            .ok_or_else(|| Error::UnknownRole {
                name: service.factory.clone(),
                shorthand: service.role.clone(),
            })?;
        let token = deployment.scope().resolve_type(SERVICE_FACTORY_ROLE)?;

        let factory = deployment.factory(SERVICE_FACTORY_ROLE);
        self.registries
            .types
            .register_type(&token, &role, &service.factory, factory.clone())?;
        factory.add_binding(role, service.factory.clone());
        Ok(())
    }
}
