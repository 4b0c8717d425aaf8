//! The global container instance and access functions.

use crate::config::ContainerConfig;
use crate::container::Container;
use once_cell::sync::OnceCell;

// The one and only global container instance.
// It will be created on its first access in a thread-safe manner.
static GLOBAL_CONTAINER: OnceCell<Container> = OnceCell::new();

/// Provides a reference to the global default container.
///
/// This function allows for direct interaction with the container, such as
/// registering services from anywhere in an application.
///
/// # Examples
///
/// ```
/// use fibre_inject::{global, Service};
///
/// fn register_services() {
///   global().register(Service::<String>::new().id("motd").value("Hello from global!".into()));
/// }
/// # register_services();
/// # assert_eq!(*global().resolve::<String>("motd").unwrap(), "Hello from global!");
/// ```
pub fn global() -> &'static Container {
  GLOBAL_CONTAINER.get_or_init(Container::new)
}

/// Configures the global container. Only the first call before any use of
/// [`global`] takes effect; later calls hand the configuration back.
pub fn init_global(config: ContainerConfig) -> Result<&'static Container, ContainerConfig> {
  let mut config = Some(config);
  let container = GLOBAL_CONTAINER.get_or_init(|| Container::with_config(config.take().unwrap_or_default()));
  match config {
    Some(rejected) => Err(rejected),
    None => Ok(container),
  }
}

/// Returns the scope called `name` of the global container.
pub fn of(name: &str) -> Container {
  global().of(name)
}
