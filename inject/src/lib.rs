//! # Fibre Inject
//!
//! A scoped, thread-safe dependency-injection container for Rust.
//!
//! Services are registered under an identifier, either their Rust type or a
//! string token, together with a way to build them: a ready value, a
//! constructor fed with resolved dependencies, a factory function, or a method
//! of another registered service. Resolution builds dependencies transitively.
//!
//! ## Core Concepts
//!
//! - **Container**: a registry of services. The process-wide one is `global()`;
//!   `Container::new()` creates isolated ones, which is what tests want.
//! - **Lifecycles**: services are cached singletons unless registered as
//!   *transient*, in which case every resolution builds a new instance.
//! - **Scopes**: `container.of("request")` returns a named sub-container with
//!   its own cache. Services registered as *global* are shared by the default
//!   container and every scope.
//! - **Injectable**: types that declare their dependencies and how to build
//!   themselves can be resolved without registering them first.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_inject::{Arguments, ConstructError, Container, Injectable, Service, ServiceId};
//! use std::sync::{Arc, Mutex};
//!
//! struct Settings {
//!   greeting: String,
//! }
//!
//! // Counts greetings across every scope.
//! #[derive(Default)]
//! struct Stats {
//!   greeted: Mutex<u32>,
//! }
//!
//! struct Greeter {
//!   settings: Arc<Settings>,
//!   stats: Arc<Stats>,
//! }
//!
//! impl Injectable for Greeter {
//!   fn dependencies() -> Vec<ServiceId> {
//!     vec![ServiceId::token("settings"), ServiceId::of::<Stats>()]
//!   }
//!
//!   fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
//!     Ok(Greeter { settings: args.take()?, stats: args.take()? })
//!   }
//! }
//!
//! impl Greeter {
//!   fn greet(&self, name: &str) -> String {
//!     *self.stats.greeted.lock().unwrap() += 1;
//!     format!("{}, {}!", self.settings.greeting, name)
//!   }
//! }
//!
//! let container = Container::new();
//! container.register(
//!   Service::<Settings>::new().id("settings").value(Settings { greeting: "Hello".into() }),
//! );
//! container.register(Service::<Stats>::new().global().factory(|_| Ok(Stats::default())));
//!
//! let alice = container.of("alice").get::<Greeter>().unwrap();
//! let bob = container.of("bob").get::<Greeter>().unwrap();
//! assert_eq!(alice.greet("Alice"), "Hello, Alice!");
//! assert_eq!(bob.greet("Bob"), "Hello, Bob!");
//!
//! // Each scope built its own greeter, but they share the global stats.
//! assert!(!Arc::ptr_eq(&alice, &bob));
//! let stats = container.resolve::<Stats>(ServiceId::of::<Stats>()).unwrap();
//! assert_eq!(*stats.greeted.lock().unwrap(), 2);
//! ```

mod config;
mod container;
mod core;
mod error;
mod global;
mod id;
mod macros;
mod scope;
mod service;

pub use config::{ContainerConfig, ServiceOptions};
pub use container::{Container, ResetStrategy};
pub use core::Instance;
pub use error::{ConfigError, ConstructError, ResolveError, Result};
pub use global::{global, init_global, of};
pub use id::{ServiceId, Token, TypeKey};
pub use service::{Arguments, Injectable, Methods, Service};
