//! Public macros for ergonomic service resolution.
//!
//! The macros resolve registered services only. Use [`Container::get`](crate::Container::get)
//! to build an unregistered [`Injectable`](crate::Injectable) type on demand.

/// Resolves a service from a given container, returning `None` on failure.
///
/// ```
/// use fibre_inject::{maybe_resolve_from, Container};
///
/// let container = Container::new();
/// container.add_instance(7_u8);
/// assert_eq!(*maybe_resolve_from!(&container, u8).unwrap(), 7);
/// assert!(maybe_resolve_from!(&container, u16).is_none());
/// ```
#[macro_export]
macro_rules! maybe_resolve_from {
  ($container:expr, trait $trait_ident:ident) => {
    $container
      .resolve::<dyn $trait_ident>($crate::ServiceId::of::<dyn $trait_ident>())
      .ok()
  };

  ($container:expr, trait $trait_ident:ident, $name:expr) => {
    $container.resolve::<dyn $trait_ident>($name).ok()
  };

  ($container:expr, $type:ty) => {
    $container
      .resolve::<$type>($crate::ServiceId::of::<$type>())
      .ok()
  };

  ($container:expr, $type:ty, $name:expr) => {
    $container.resolve::<$type>($name).ok()
  };
}

/// Resolves a service from a given container.
///
/// # Panics
///
/// Panics with the resolution error if the service cannot be resolved.
#[macro_export]
macro_rules! resolve_from {
  ($container:expr, trait $trait_ident:ident) => {
    $container
      .resolve::<dyn $trait_ident>($crate::ServiceId::of::<dyn $trait_ident>())
      .unwrap_or_else(|err| {
        panic!(
          "Failed to resolve required trait service: {}: {}",
          std::any::type_name::<dyn $trait_ident>(),
          err
        )
      })
  };

  ($container:expr, trait $trait_ident:ident, $name:expr) => {
    $container
      .resolve::<dyn $trait_ident>($name)
      .unwrap_or_else(|err| {
        panic!(
          "Failed to resolve required trait service with name '{}': {}: {}",
          $name,
          std::any::type_name::<dyn $trait_ident>(),
          err
        )
      })
  };

  ($container:expr, $type:ty) => {
    $container
      .resolve::<$type>($crate::ServiceId::of::<$type>())
      .unwrap_or_else(|err| {
        panic!(
          "Failed to resolve required service: {}: {}",
          std::any::type_name::<$type>(),
          err
        )
      })
  };

  ($container:expr, $type:ty, $name:expr) => {
    $container.resolve::<$type>($name).unwrap_or_else(|err| {
      panic!(
        "Failed to resolve required service with name '{}': {}: {}",
        $name,
        std::any::type_name::<$type>(),
        err
      )
    })
  };
}

/// Resolves a service from the global container, returning `None` on failure.
#[macro_export]
macro_rules! maybe_resolve {
  (trait $trait_ident:ident) => {
    $crate::maybe_resolve_from!($crate::global(), trait $trait_ident)
  };

  (trait $trait_ident:ident, $name:expr) => {
    $crate::maybe_resolve_from!($crate::global(), trait $trait_ident, $name)
  };

  ($type:ty) => {
    $crate::maybe_resolve_from!($crate::global(), $type)
  };

  ($type:ty, $name:expr) => {
    $crate::maybe_resolve_from!($crate::global(), $type, $name)
  };
}

/// Resolves a service from the global container.
///
/// # Panics
///
/// This macro will panic if the service cannot be resolved. For a non-panicking
/// version, use `maybe_resolve!` or `global().resolve(...)` directly.
///
/// # Examples
///
/// ```
/// use fibre_inject::{global, resolve, Service};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// global().register(Service::<dyn Greeter>::new().factory_shared(|_| Ok(Arc::new(EnglishGreeter))));
///
/// let greeter = resolve!(trait Greeter);
/// assert_eq!(greeter.greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! resolve {
  (trait $trait_ident:ident) => {
    $crate::resolve_from!($crate::global(), trait $trait_ident)
  };

  (trait $trait_ident:ident, $name:expr) => {
    $crate::resolve_from!($crate::global(), trait $trait_ident, $name)
  };

  ($type:ty) => {
    $crate::resolve_from!($crate::global(), $type)
  };

  ($type:ty, $name:expr) => {
    $crate::resolve_from!($crate::global(), $type, $name)
  };
}
