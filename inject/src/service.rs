//! Registration: the `Service` builder, the `Injectable` trait and the
//! arguments handed to constructors.

use crate::config::ServiceOptions;
use crate::container::Container;
use crate::core::{ConstructorFn, FactoryFn, Instance, MethodFn, Provider, ServiceDefinition};
use crate::error::ConstructError;
use crate::id::ServiceId;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// A type the container can build on its own.
///
/// `dependencies` lists, in constructor order, the services `construct` will
/// take from its [`Arguments`]. Types implementing this trait can be resolved
/// with [`Container::get`] without being registered first.
///
/// ```
/// use fibre_inject::{Arguments, ConstructError, Container, Injectable, ServiceId};
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// impl Injectable for Config {
///   fn construct(_: &mut Arguments) -> Result<Self, ConstructError> {
///     Ok(Config { url: "sqlite::memory:".into() })
///   }
/// }
///
/// struct Database { config: Arc<Config> }
/// impl Injectable for Database {
///   fn dependencies() -> Vec<ServiceId> {
///     vec![ServiceId::injectable::<Config>()]
///   }
///   fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
///     Ok(Database { config: args.take()? })
///   }
/// }
///
/// let container = Container::new();
/// let db = container.get::<Database>().unwrap();
/// assert_eq!(db.config.url, "sqlite::memory:");
/// ```
pub trait Injectable: Any + Send + Sync + Sized {
  fn dependencies() -> Vec<ServiceId> {
    Vec::new()
  }

  fn construct(args: &mut Arguments) -> Result<Self, ConstructError>;

  /// Factory methods this type exposes to `Service::factory_method` registrations.
  fn methods(_methods: &mut Methods<Self>) {}

  /// Lifecycle options applied when the container registers `Self` on its own.
  fn options() -> ServiceOptions {
    ServiceOptions::default()
  }
}

pub(crate) fn default_definition<T: Injectable>() -> ServiceDefinition {
  Service::<T>::injectable().into_definition()
}

/// The resolved dependencies of a service, in declaration order.
pub struct Arguments {
  values: Vec<(ServiceId, Instance)>,
  position: usize,
}

impl Arguments {
  pub(crate) fn new(values: Vec<(ServiceId, Instance)>) -> Self {
    Self {
      values,
      position: 0,
    }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Number of arguments not yet taken.
  pub fn remaining(&self) -> usize {
    self.values.len() - self.position
  }

  /// Takes the next argument without checking its type.
  pub fn take_instance(&mut self) -> Result<Instance, ConstructError> {
    let (_, instance) = self.values.get(self.position).ok_or(ConstructError::MissingArgument {
      position: self.position,
      available: self.values.len(),
    })?;
    let instance = instance.clone();
    self.position += 1;
    Ok(instance)
  }

  /// Takes the next argument as an `Arc<T>`.
  pub fn take<T: ?Sized + Any + Send + Sync>(&mut self) -> Result<Arc<T>, ConstructError> {
    let position = self.position;
    let (id, instance) = self.values.get(position).ok_or(ConstructError::MissingArgument {
      position,
      available: self.values.len(),
    })?;
    let value = instance.downcast::<T>().ok_or_else(|| ConstructError::ArgumentType {
      position,
      id: id.clone(),
      expected: type_name::<T>(),
      actual: instance.type_name(),
    })?;
    self.position += 1;
    Ok(value)
  }
}

/// Factory methods exposed by a type, looked up by name.
pub struct Methods<T> {
  table: HashMap<String, MethodFn>,
  _marker: PhantomData<fn(&T)>,
}

impl<T: Any + Send + Sync> Methods<T> {
  fn new() -> Self {
    Self {
      table: HashMap::new(),
      _marker: PhantomData,
    }
  }

  /// Adds a method producing `U` from the receiver and the product's arguments.
  pub fn add<U, F>(&mut self, name: impl Into<String>, method: F) -> &mut Self
  where
    U: Any + Send + Sync,
    F: Fn(&T, &mut Arguments) -> Result<U, ConstructError> + Send + Sync + 'static,
  {
    let erased: MethodFn = Arc::new(move |receiver: &Instance, args: &mut Arguments| {
      let this = receiver.downcast::<T>().ok_or(ConstructError::ReceiverType {
        expected: type_name::<T>(),
        actual: receiver.type_name(),
      })?;
      method(&*this, args).map(|product| Instance::new(Arc::new(product)))
    });
    self.table.insert(name.into(), erased);
    self
  }
}

/// Describes one registration: what id it answers to, how it is built and how
/// long its instance lives.
///
/// ```
/// use fibre_inject::{Container, Service};
///
/// let container = Container::new();
/// container.register(Service::<u64>::new().id("answer").transient().factory(|_| Ok(42)));
/// assert_eq!(*container.resolve::<u64>("answer").unwrap(), 42);
/// ```
pub struct Service<T: ?Sized> {
  id: ServiceId,
  transient: bool,
  global: bool,
  provider: Provider,
  dependencies: Vec<ServiceId>,
  methods: HashMap<String, MethodFn>,
  _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Any + Send + Sync> Default for Service<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: ?Sized + Any + Send + Sync> Service<T> {
  /// Starts a registration keyed by `T` with no provider yet.
  pub fn new() -> Self {
    Self {
      id: ServiceId::of::<T>(),
      transient: false,
      global: false,
      provider: Provider::Unspecified,
      dependencies: Vec::new(),
      methods: HashMap::new(),
      _marker: PhantomData,
    }
  }

  /// Registers under `id` instead of the type.
  pub fn id(mut self, id: impl Into<ServiceId>) -> Self {
    self.id = id.into();
    self
  }

  /// Never cache: every resolution builds a new instance.
  pub fn transient(mut self) -> Self {
    self.transient = true;
    self
  }

  /// Share one instance between the default container and every scope.
  pub fn global(mut self) -> Self {
    self.global = true;
    self
  }

  pub fn options(mut self, options: ServiceOptions) -> Self {
    if let Some(transient) = options.transient {
      self.transient = transient;
    }
    if let Some(global) = options.global {
      self.global = global;
    }
    self
  }

  /// Appends services to resolve, in order, before construction.
  pub fn depends_on<I>(mut self, dependencies: I) -> Self
  where
    I: IntoIterator,
    I::Item: Into<ServiceId>,
  {
    self.dependencies.extend(dependencies.into_iter().map(Into::into));
    self
  }

  /// Provides an already shared instance, e.g. an `Arc<dyn Trait>`.
  pub fn shared(mut self, value: Arc<T>) -> Self {
    self.provider = Provider::Value(Instance::new(value));
    self
  }

  /// Builds through a function that resolves its own dependencies from the
  /// container it is given.
  pub fn factory_shared<F>(mut self, factory: F) -> Self
  where
    F: Fn(&Container) -> Result<Arc<T>, ConstructError> + Send + Sync + 'static,
  {
    let erased: FactoryFn = Arc::new(move |container: &Container| factory(container).map(Instance::new));
    self.provider = Provider::Function(erased);
    self
  }

  /// Builds by resolving `factory` and calling its method `method` with this
  /// service's dependencies.
  pub fn factory_method(mut self, factory: impl Into<ServiceId>, method: impl Into<String>) -> Self {
    self.provider = Provider::FactoryMethod {
      factory: factory.into(),
      method: method.into(),
    };
    self
  }

  pub(crate) fn into_definition(self) -> ServiceDefinition {
    ServiceDefinition {
      id: self.id,
      produces: type_name::<T>(),
      transient: self.transient,
      global: self.global,
      provider: self.provider,
      dependencies: self.dependencies,
      methods: self.methods,
    }
  }
}

impl<T: Any + Send + Sync> Service<T> {
  pub fn value(self, value: T) -> Self {
    self.shared(Arc::new(value))
  }

  pub fn factory<F>(self, factory: F) -> Self
  where
    F: Fn(&Container) -> Result<T, ConstructError> + Send + Sync + 'static,
  {
    self.factory_shared(move |container| factory(container).map(Arc::new))
  }

  /// Builds from the resolved `depends_on` list.
  pub fn constructor<F>(mut self, constructor: F) -> Self
  where
    F: Fn(&mut Arguments) -> Result<T, ConstructError> + Send + Sync + 'static,
  {
    let erased: ConstructorFn =
      Arc::new(move |args: &mut Arguments| constructor(args).map(|value| Instance::new(Arc::new(value))));
    self.provider = Provider::Constructor(erased);
    self
  }

  /// Exposes a factory method other registrations can name in `factory_method`.
  pub fn method<U, F>(mut self, name: impl Into<String>, method: F) -> Self
  where
    U: Any + Send + Sync,
    F: Fn(&T, &mut Arguments) -> Result<U, ConstructError> + Send + Sync + 'static,
  {
    let mut methods = Methods::<T>::new();
    methods.add(name, method);
    self.methods.extend(methods.table);
    self
  }
}

impl<T: Injectable> Service<T> {
  /// A registration built from `T`'s `Injectable` implementation.
  pub fn injectable() -> Self {
    let mut methods = Methods::<T>::new();
    T::methods(&mut methods);
    let mut service = Self::new()
      .options(T::options())
      .depends_on(T::dependencies())
      .constructor(T::construct);
    service.methods = methods.table;
    service
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn arguments_are_taken_in_order_and_typed() {
    let mut args = Arguments::new(vec![
      (ServiceId::token("name"), Instance::new(Arc::new(String::from("fibre")))),
      (ServiceId::token("port"), Instance::new(Arc::new(8080_u16))),
    ]);

    assert_eq!(args.len(), 2);
    assert_eq!(*args.take::<String>().unwrap(), "fibre");
    assert!(matches!(
      args.take::<u32>(),
      Err(ConstructError::ArgumentType { position: 1, .. })
    ));
    assert_eq!(args.remaining(), 1);
    assert_eq!(*args.take::<u16>().unwrap(), 8080);
    assert!(matches!(
      args.take_instance(),
      Err(ConstructError::MissingArgument { position: 2, available: 2 })
    ));
  }

  #[test]
  fn builder_collects_registration_options() {
    let definition = Service::<u8>::new()
      .id("byte")
      .options(ServiceOptions {
        transient: Some(true),
        global: None,
      })
      .global()
      .depends_on(["a", "b"])
      .value(7)
      .into_definition();

    assert_eq!(definition.id, ServiceId::token("byte"));
    assert!(definition.transient);
    assert!(definition.global);
    assert_eq!(definition.dependencies, vec![ServiceId::token("a"), ServiceId::token("b")]);
    assert!(matches!(definition.provider, Provider::Value(_)));
  }
}
