//! Core data structures shared by the registry and the resolver.

use crate::container::Container;
use crate::error::{ConstructError, ResolveError};
use crate::id::ServiceId;
use crate::service::Arguments;
use once_cell::sync::OnceCell;
use std::any::{type_name, Any};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

thread_local! {
  // Records currently being constructed on this thread, outermost first, as
  // (address of the owning registry, id). Registry names are not unique: every
  // container family has a "default", and a scope may reuse any name.
  static RESOLVING_STACK: RefCell<Vec<(usize, ServiceId)>> = const { RefCell::new(Vec::new()) };
}

/// An RAII guard that detects circular dependencies.
///
/// Entering pushes the record onto the thread-local resolution stack and fails if
/// it is already there. Dropping the guard pops it again.
///
/// Only cycles on the current thread are seen. Two threads first-building
/// singletons that need each other wait on each other's cells instead.
pub(crate) struct ResolutionGuard {
  _private: (),
}

impl ResolutionGuard {
  pub(crate) fn enter(registry: usize, id: &ServiceId) -> Result<Self, ResolveError> {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if let Some(start) = stack.iter().position(|(r, k)| *r == registry && k == id) {
        let mut path: Vec<ServiceId> = stack[start..].iter().map(|(_, k)| k.clone()).collect();
        path.push(id.clone());
        return Err(ResolveError::Circular { path });
      }
      stack.push((registry, id.clone()));
      Ok(Self { _private: () })
    })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      stack.borrow_mut().pop();
    });
  }
}

/// A resolved service with its type erased.
///
/// Holds an `Arc<T>` so that unsized services such as trait objects can be
/// handed back out as `Arc<dyn Trait>`. Cloning is cheap and shares the service.
#[derive(Clone)]
pub struct Instance {
  value: Arc<dyn Any + Send + Sync>,
  // Address of the service itself, shared by every `Arc<T>` pointing at it.
  addr: usize,
  type_name: &'static str,
}

impl Instance {
  pub fn new<T: ?Sized + Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      addr: Arc::as_ptr(&value) as *const () as usize,
      value: Arc::new(value),
      type_name: type_name::<T>(),
    }
  }

  /// Recovers the typed handle, or `None` if the instance holds another type.
  pub fn downcast<T: ?Sized + Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.value.downcast_ref::<Arc<T>>().cloned()
  }

  pub fn is<T: ?Sized + Any + Send + Sync>(&self) -> bool {
    self.value.is::<Arc<T>>()
  }

  /// Name of the type the instance was created as.
  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  /// Whether both handles point at the same service object.
  pub fn ptr_eq(&self, other: &Instance) -> bool {
    self.addr == other.addr
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Instance({})", self.type_name)
  }
}

pub(crate) type ConstructorFn =
  Arc<dyn Fn(&mut Arguments) -> Result<Instance, ConstructError> + Send + Sync>;
pub(crate) type FactoryFn =
  Arc<dyn Fn(&Container) -> Result<Instance, ConstructError> + Send + Sync>;
pub(crate) type MethodFn =
  Arc<dyn Fn(&Instance, &mut Arguments) -> Result<Instance, ConstructError> + Send + Sync>;

/// How a record produces its instance.
#[derive(Clone)]
pub(crate) enum Provider {
  Value(Instance),
  Constructor(ConstructorFn),
  Function(FactoryFn),
  FactoryMethod { factory: ServiceId, method: String },
  Unspecified,
}

impl Provider {
  fn kind(&self) -> &'static str {
    match self {
      Provider::Value(_) => "value",
      Provider::Constructor(_) => "constructor",
      Provider::Function(_) => "factory",
      Provider::FactoryMethod { .. } => "factory method",
      Provider::Unspecified => "unspecified",
    }
  }
}

/// Everything a registration says about a service, minus its cached instance.
///
/// Definitions are immutable once registered and shared between the record in
/// the default container and any scoped copies of it.
#[derive(Clone)]
pub(crate) struct ServiceDefinition {
  pub(crate) id: ServiceId,
  pub(crate) produces: &'static str,
  pub(crate) transient: bool,
  pub(crate) global: bool,
  pub(crate) provider: Provider,
  pub(crate) dependencies: Vec<ServiceId>,
  pub(crate) methods: HashMap<String, MethodFn>,
}

impl fmt::Debug for ServiceDefinition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
    methods.sort_unstable();
    f.debug_struct("ServiceDefinition")
      .field("id", &self.id)
      .field("produces", &self.produces)
      .field("transient", &self.transient)
      .field("global", &self.global)
      .field("provider", &self.provider.kind())
      .field("dependencies", &self.dependencies)
      .field("methods", &methods)
      .finish()
  }
}

/// A registry entry: a shared definition plus this registry's cached instance.
pub(crate) struct ProviderRecord {
  pub(crate) definition: Arc<ServiceDefinition>,
  pub(crate) cached: OnceCell<Instance>,
}

impl ProviderRecord {
  pub(crate) fn new(definition: Arc<ServiceDefinition>) -> Self {
    let cached = match &definition.provider {
      Provider::Value(value) => OnceCell::with_value(value.clone()),
      _ => OnceCell::new(),
    };
    Self { definition, cached }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  trait Shape: Send + Sync {
    fn sides(&self) -> u32;
  }

  struct Square;

  impl Shape for Square {
    fn sides(&self) -> u32 {
      4
    }
  }

  #[test]
  fn instance_round_trips_trait_objects() {
    let shape: Arc<dyn Shape> = Arc::new(Square);
    let instance = Instance::new(shape);

    assert!(instance.is::<dyn Shape>());
    assert!(instance.downcast::<Square>().is_none());
    assert_eq!(instance.downcast::<dyn Shape>().unwrap().sides(), 4);
    assert!(instance.type_name().contains("Shape"));
  }

  #[test]
  fn instances_of_one_service_are_ptr_eq() {
    let square = Arc::new(Square);
    let first = Instance::new(Arc::clone(&square));
    let second = Instance::new(square);

    assert!(first.ptr_eq(&second));
    assert!(!first.ptr_eq(&Instance::new(Arc::new(Square))));
  }

  #[test]
  fn guard_reports_the_cycle_path() {
    let a = ServiceId::token("a");
    let b = ServiceId::token("b");

    let _outer = ResolutionGuard::enter(1, &a).unwrap();
    let _inner = ResolutionGuard::enter(1, &b).unwrap();
    match ResolutionGuard::enter(1, &a) {
      Err(ResolveError::Circular { path }) => assert_eq!(path, vec![a.clone(), b.clone(), a.clone()]),
      other => panic!("expected a cycle, got {:?}", other.map(|_| ())),
    }
  }

  #[test]
  fn guard_distinguishes_registries_and_pops_on_drop() {
    let a = ServiceId::token("a");
    {
      let _first = ResolutionGuard::enter(1, &a).unwrap();
      assert!(ResolutionGuard::enter(2, &a).is_ok());
    }
    assert!(ResolutionGuard::enter(1, &a).is_ok());
  }
}
