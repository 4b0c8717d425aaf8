//! Named scopes and the lookup rules that tie them to the default container.

use crate::container::{Container, Registry};
use crate::core::ProviderRecord;
use crate::error::{ResolveError, Result};
use crate::id::ServiceId;
use std::sync::Arc;
use tracing::{debug, trace};

impl Container {
  /// Returns the scope called `name`, creating it on first use.
  ///
  /// Scopes share the default container of the handle they were reached from.
  /// Non-global services resolved through a scope are cached in that scope only;
  /// global services are always resolved by, and cached in, the default container.
  pub fn of(&self, name: &str) -> Container {
    let registry = self
      .root
      .scopes
      .entry(name.to_owned())
      .or_insert_with(|| {
        debug!(scope = name, "created scope");
        Arc::new(Registry::new(Some(name.to_owned())))
      })
      .value()
      .clone();
    Container {
      root: Arc::clone(&self.root),
      registry,
    }
  }

  /// A handle to the default container of this family.
  pub fn default_container(&self) -> Container {
    Container {
      root: Arc::clone(&self.root),
      registry: Arc::clone(&self.root.default),
    }
  }

  /// The scope name, or `None` for the default container.
  pub fn scope_name(&self) -> Option<&str> {
    self.registry.name.as_deref()
  }

  pub fn is_default(&self) -> bool {
    Arc::ptr_eq(&self.registry, &self.root.default)
  }

  /// Names of the scopes currently known to this family, sorted.
  pub fn scope_names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.root.scopes.iter().map(|entry| entry.key().clone()).collect();
    names.sort_unstable();
    names
  }

  /// Forgets the scope called `name`. Handles already obtained keep working, but
  /// the next `of(name)` starts from an empty scope.
  pub fn dispose_scope(&self, name: &str) -> bool {
    let disposed = self.root.scopes.remove(name).is_some();
    if disposed {
      debug!(scope = name, "disposed scope");
    }
    disposed
  }

  /// Finds the record `id` resolves to from this container, and the container
  /// that owns (and caches for) it.
  pub(crate) fn locate(&self, id: &ServiceId) -> Result<(Container, Arc<ProviderRecord>)> {
    let default = self.default_container();
    let shared = self.root.default.record(id);

    if let Some(record) = &shared {
      if record.definition.global || self.is_default() {
        return Ok((default, Arc::clone(record)));
      }
    }

    if !self.is_default() {
      if let Some(record) = self.registry.record(id) {
        return Ok((self.clone(), record));
      }
      if let Some(record) = shared {
        trace!(service = %id, scope = self.registry.label(), "copied default registration into scope");
        let record = self.registry.adopt(id, Arc::clone(&record.definition));
        return Ok((self.clone(), record));
      }
    }

    self.register_default(id)
  }

  fn register_default(&self, id: &ServiceId) -> Result<(Container, Arc<ProviderRecord>)> {
    let ServiceId::Type(key) = id else {
      return Err(ResolveError::NotFound(id.clone()));
    };
    let Some(mut definition) = key.default_definition() else {
      return Err(ResolveError::NotFound(id.clone()));
    };
    self.root.config.apply(&mut definition);

    let owner = if definition.global {
      self.default_container()
    } else {
      self.clone()
    };
    debug!(
      service = %id,
      scope = owner.registry.label(),
      transient = definition.transient,
      global = definition.global,
      "registered default provider"
    );
    let record = owner.registry.adopt(id, Arc::new(definition));
    Ok((owner, record))
  }
}
