//! Service identifiers: type keys, string tokens and typed tokens.

use crate::core::ServiceDefinition;
use crate::service::{default_definition, Injectable};
use std::any::{type_name, Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// Identifies a service by its Rust type.
///
/// Two keys are equal when they name the same type. A key created through
/// [`ServiceId::injectable`] additionally knows how to build a default provider
/// for its type, which lets the container register it on first use.
#[derive(Clone, Copy)]
pub struct TypeKey {
  id: TypeId,
  name: &'static str,
  default: Option<fn() -> ServiceDefinition>,
}

impl TypeKey {
  /// Creates a key for `T` without a default provider.
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: type_name::<T>(),
      default: None,
    }
  }

  pub(crate) fn injectable<T: Injectable>() -> Self {
    Self {
      default: Some(default_definition::<T>),
      ..Self::of::<T>()
    }
  }

  /// The `TypeId` of the keyed type.
  pub fn type_id(&self) -> TypeId {
    self.id
  }

  /// The name of the keyed type, as reported by `std::any::type_name`.
  pub fn name(&self) -> &'static str {
    self.name
  }

  /// Whether the container can register this type on its own when asked for it.
  pub fn is_constructible(&self) -> bool {
    self.default.is_some()
  }

  pub(crate) fn default_definition(&self) -> Option<ServiceDefinition> {
    self.default.map(|build| build())
  }
}

impl PartialEq for TypeKey {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Debug for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TypeKey({})", self.name)
  }
}

/// The key a service is registered and resolved under.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum ServiceId {
  /// A service keyed by its type.
  Type(TypeKey),
  /// A service keyed by a string token.
  Token(Cow<'static, str>),
}

impl ServiceId {
  /// A type key for `T`. Resolving it fails if `T` was never registered.
  pub fn of<T: ?Sized + Any>() -> Self {
    ServiceId::Type(TypeKey::of::<T>())
  }

  /// A type key for `T` that lets the container build `T` through its
  /// [`Injectable`] implementation when nothing was registered for it.
  pub fn injectable<T: Injectable>() -> Self {
    ServiceId::Type(TypeKey::injectable::<T>())
  }

  /// A string token.
  pub fn token(name: impl Into<Cow<'static, str>>) -> Self {
    ServiceId::Token(name.into())
  }

  /// The text configuration entries are matched against: the token itself, or
  /// the full type name.
  pub fn key(&self) -> &str {
    match self {
      ServiceId::Type(key) => key.name(),
      ServiceId::Token(name) => name,
    }
  }

  pub fn is_token(&self) -> bool {
    matches!(self, ServiceId::Token(_))
  }
}

impl fmt::Debug for ServiceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ServiceId::Type(key) => write!(f, "Type({})", key.name()),
      ServiceId::Token(name) => write!(f, "Token({:?})", name),
    }
  }
}

impl fmt::Display for ServiceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ServiceId::Type(key) => f.write_str(key.name()),
      ServiceId::Token(name) => write!(f, "'{}'", name),
    }
  }
}

impl From<TypeKey> for ServiceId {
  fn from(key: TypeKey) -> Self {
    ServiceId::Type(key)
  }
}

impl From<&ServiceId> for ServiceId {
  fn from(id: &ServiceId) -> Self {
    id.clone()
  }
}

impl From<&str> for ServiceId {
  fn from(name: &str) -> Self {
    ServiceId::Token(Cow::Owned(name.to_owned()))
  }
}

impl From<String> for ServiceId {
  fn from(name: String) -> Self {
    ServiceId::Token(Cow::Owned(name))
  }
}

impl From<&String> for ServiceId {
  fn from(name: &String) -> Self {
    ServiceId::Token(Cow::Owned(name.clone()))
  }
}

impl<T: ?Sized> From<&Token<T>> for ServiceId {
  fn from(token: &Token<T>) -> Self {
    token.id()
  }
}

/// A string token that remembers the type registered under it.
///
/// ```
/// use fibre_inject::{Container, Service, Token};
///
/// static GREETING: Token<String> = Token::new("greeting");
///
/// let container = Container::new();
/// container.register(Service::<String>::new().id(&GREETING).value("hi".to_string()));
/// assert_eq!(*container.get_token(&GREETING).unwrap(), "hi");
/// ```
pub struct Token<T: ?Sized> {
  name: Cow<'static, str>,
  _marker: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized> Token<T> {
  pub const fn new(name: &'static str) -> Self {
    Self {
      name: Cow::Borrowed(name),
      _marker: PhantomData,
    }
  }

  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name: Cow::Owned(name.into()),
      _marker: PhantomData,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn id(&self) -> ServiceId {
    ServiceId::Token(self.name.clone())
  }
}

impl<T: ?Sized> Clone for Token<T> {
  fn clone(&self) -> Self {
    Self {
      name: self.name.clone(),
      _marker: PhantomData,
    }
  }
}

impl<T: ?Sized> fmt::Debug for Token<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Token<{}>({:?})", type_name::<T>(), self.name)
  }
}
