//! The main `Container` struct: registration and resolution.

use crate::config::ContainerConfig;
use crate::core::{Instance, Provider, ProviderRecord, ResolutionGuard, ServiceDefinition};
use crate::error::{ConstructError, ResolveError, Result};
use crate::id::{ServiceId, Token};
use crate::service::{Arguments, Injectable, Service};
use dashmap::DashMap;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

pub(crate) const DEFAULT_SCOPE: &str = "default";

/// One container's identifier-to-record mapping.
pub(crate) struct Registry {
  pub(crate) name: Option<String>,
  providers: DashMap<ServiceId, Arc<ProviderRecord>>,
}

impl Registry {
  pub(crate) fn new(name: Option<String>) -> Self {
    Self {
      name,
      providers: DashMap::new(),
    }
  }

  pub(crate) fn label(&self) -> &str {
    self.name.as_deref().unwrap_or(DEFAULT_SCOPE)
  }

  /// Distinguishes registries that share a label.
  pub(crate) fn identity(&self) -> usize {
    self as *const Registry as usize
  }

  // The map guard is released before the record is returned, so callers are
  // free to construct (and register) while holding the record.
  pub(crate) fn record(&self, id: &ServiceId) -> Option<Arc<ProviderRecord>> {
    self.providers.get(id).map(|entry| Arc::clone(entry.value()))
  }

  fn insert(&self, definition: ServiceDefinition) {
    let id = definition.id.clone();
    self
      .providers
      .insert(id, Arc::new(ProviderRecord::new(Arc::new(definition))));
  }

  /// Inserts a fresh record for `definition` unless one appeared meanwhile.
  pub(crate) fn adopt(&self, id: &ServiceId, definition: Arc<ServiceDefinition>) -> Arc<ProviderRecord> {
    let entry = self
      .providers
      .entry(id.clone())
      .or_insert_with(|| Arc::new(ProviderRecord::new(definition)));
    Arc::clone(entry.value())
  }
}

/// State shared by the default container and all of its scopes.
pub(crate) struct Root {
  pub(crate) default: Arc<Registry>,
  pub(crate) scopes: DashMap<String, Arc<Registry>>,
  pub(crate) config: ContainerConfig,
}

/// What [`Container::reset_with`] discards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResetStrategy {
  /// Forget every registration.
  #[default]
  Services,
  /// Keep registrations but drop cached instances, so the next resolution
  /// builds them again.
  Values,
}

/// The dependency-injection container.
///
/// A `Container` is a cheap handle: cloning it yields another handle to the same
/// registry. Every handle belongs to a family made of one default container and
/// any number of named scopes created with [`Container::of`]. Dropping the last
/// handle of a family drops every cached instance it owns.
#[derive(Clone)]
pub struct Container {
  pub(crate) root: Arc<Root>,
  pub(crate) registry: Arc<Registry>,
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("scope", &self.registry.label())
      .field("services", &self.registry.providers.len())
      .finish()
  }
}

impl Default for Container {
  fn default() -> Self {
    Self::with_config(ContainerConfig::default())
  }
}

impl Container {
  /// Creates a new, empty default container.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a default container whose registrations are adjusted by `config`.
  /// Scopes listed in the configuration are created right away.
  pub fn with_config(config: ContainerConfig) -> Self {
    let scopes = config.scopes.clone();
    let default = Arc::new(Registry::new(None));
    let container = Self {
      root: Arc::new(Root {
        default: Arc::clone(&default),
        scopes: DashMap::new(),
        config,
      }),
      registry: default,
    };
    for scope in &scopes {
      container.of(scope);
    }
    container
  }

  pub fn config(&self) -> &ContainerConfig {
    &self.root.config
  }

  // --- Registration ---

  /// Registers a service, replacing any previous registration under its id.
  ///
  /// Global services always land in the default container, whichever handle
  /// they were registered through.
  pub fn register<T: ?Sized + Any + Send + Sync>(&self, service: Service<T>) {
    let mut definition = service.into_definition();
    self.root.config.apply(&mut definition);
    let target = if definition.global {
      &self.root.default
    } else {
      &self.registry
    };
    debug!(
      service = %definition.id,
      scope = target.label(),
      transient = definition.transient,
      global = definition.global,
      "registered service"
    );
    target.insert(definition);
  }

  /// Registers `instance` under its own type.
  pub fn add_instance<T: Any + Send + Sync>(&self, instance: T) {
    self.register(Service::<T>::new().value(instance));
  }

  /// Whether this container's own registry holds `id`.
  pub fn has(&self, id: impl Into<ServiceId>) -> bool {
    let id: ServiceId = id.into();
    self.registry.providers.contains_key(&id)
  }

  /// Removes the registration for `id`, returning whether there was one.
  pub fn remove(&self, id: impl Into<ServiceId>) -> bool {
    let id: ServiceId = id.into();
    let removed = self.registry.providers.remove(&id).is_some();
    trace!(service = %id, scope = self.registry.label(), removed, "removed service");
    removed
  }

  /// Clears every registration in this container.
  pub fn reset(&self) {
    self.reset_with(ResetStrategy::Services);
  }

  pub fn reset_with(&self, strategy: ResetStrategy) {
    match strategy {
      ResetStrategy::Services => self.registry.providers.clear(),
      ResetStrategy::Values => {
        for mut entry in self.registry.providers.iter_mut() {
          let definition = Arc::clone(&entry.value().definition);
          *entry.value_mut() = Arc::new(ProviderRecord::new(definition));
        }
      }
    }
    debug!(scope = self.registry.label(), ?strategy, "reset container");
  }

  // --- Resolution ---

  /// Resolves `T`, registering it from its [`Injectable`] implementation if
  /// nothing is registered for it yet.
  pub fn get<T: Injectable>(&self) -> Result<Arc<T>> {
    self.resolve(ServiceId::injectable::<T>())
  }

  /// Resolves `id` and downcasts the result to `T`.
  pub fn resolve<T: ?Sized + Any + Send + Sync>(&self, id: impl Into<ServiceId>) -> Result<Arc<T>> {
    let id: ServiceId = id.into();
    let instance = self.get_instance(&id)?;
    instance.downcast::<T>().ok_or_else(|| ResolveError::TypeMismatch {
      id,
      expected: type_name::<T>(),
      actual: instance.type_name(),
    })
  }

  pub fn get_token<T: ?Sized + Any + Send + Sync>(&self, token: &Token<T>) -> Result<Arc<T>> {
    self.resolve(token)
  }

  /// Resolves `id` without fixing its type.
  pub fn get_instance(&self, id: impl Into<ServiceId>) -> Result<Instance> {
    let id: ServiceId = id.into();
    let (owner, record) = self.locate(&id)?;
    owner.instantiate(&record)
  }

  fn instantiate(&self, record: &ProviderRecord) -> Result<Instance> {
    let definition = &record.definition;
    if !definition.transient {
      if let Some(instance) = record.cached.get() {
        trace!(service = %definition.id, scope = self.registry.label(), "cache hit");
        return Ok(instance.clone());
      }
    }

    // Entered before touching the cell: re-entering a cell that is still being
    // initialised on this thread would block forever.
    let _guard = ResolutionGuard::enter(self.registry.identity(), &definition.id)?;
    if definition.transient {
      return self.construct(definition);
    }
    record
      .cached
      .get_or_try_init(|| self.construct(definition))
      .cloned()
  }

  fn construct(&self, definition: &ServiceDefinition) -> Result<Instance> {
    trace!(
      service = %definition.id,
      produces = definition.produces,
      scope = self.registry.label(),
      "constructing service"
    );
    let constructed = match &definition.provider {
      Provider::Value(value) => Ok(value.clone()),
      Provider::Constructor(constructor) => self
        .arguments(definition)
        .and_then(|mut args| constructor(&mut args)),
      Provider::Function(factory) => factory(self),
      Provider::FactoryMethod { factory, method } => self.call_factory_method(definition, factory, method),
      Provider::Unspecified => Err(ConstructError::MissingProvider),
    };
    constructed.map_err(|source| ResolveError::Construct {
      id: definition.id.clone(),
      source: Box::new(source),
    })
  }

  fn arguments(&self, definition: &ServiceDefinition) -> Result<Arguments, ConstructError> {
    let mut values = Vec::with_capacity(definition.dependencies.len());
    for dependency in &definition.dependencies {
      let instance = self.get_instance(dependency)?;
      values.push((dependency.clone(), instance));
    }
    Ok(Arguments::new(values))
  }

  fn call_factory_method(
    &self,
    definition: &ServiceDefinition,
    factory: &ServiceId,
    method: &str,
  ) -> Result<Instance, ConstructError> {
    if method.is_empty() {
      return Err(ConstructError::MalformedFactory {
        factory: factory.clone(),
        method: method.to_owned(),
        reason: "method name is empty",
      });
    }
    let (owner, record) = self.locate(factory)?;
    let receiver = owner.instantiate(&record)?;
    let call = record
      .definition
      .methods
      .get(method)
      .ok_or_else(|| ConstructError::MalformedFactory {
        factory: factory.clone(),
        method: method.to_owned(),
        reason: "the factory exposes no method with this name",
      })?;
    let mut args = self.arguments(definition)?;
    call(&receiver, &mut args)
  }
}
