//! Error types for resolution, construction and configuration.

use crate::id::ServiceId;
use thiserror::Error;

/// Errors returned when a service cannot be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
  #[error("service {0} is not registered")]
  NotFound(ServiceId),

  #[error("circular dependency detected: {}", display_path(.path))]
  Circular { path: Vec<ServiceId> },

  #[error("failed to construct {id}: {source}")]
  Construct {
    id: ServiceId,
    #[source]
    source: Box<ConstructError>,
  },

  #[error("service {id} is a {actual}, not a {expected}")]
  TypeMismatch {
    id: ServiceId,
    expected: &'static str,
    actual: &'static str,
  },
}

impl ResolveError {
  /// Follows construction failures caused by dependencies down to the error
  /// that started them.
  pub fn root_cause(&self) -> &ResolveError {
    let mut current = self;
    while let ResolveError::Construct { source, .. } = current {
      match source.as_ref() {
        ConstructError::Dependency(inner) => current = inner.as_ref(),
        _ => break,
      }
    }
    current
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self.root_cause(), ResolveError::NotFound(_))
  }

  pub fn is_circular(&self) -> bool {
    matches!(self.root_cause(), ResolveError::Circular { .. })
  }
}

fn display_path(path: &[ServiceId]) -> String {
  path
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join(" -> ")
}

/// Errors raised while building an instance from its provider.
#[derive(Debug, Error)]
pub enum ConstructError {
  #[error("no value, constructor or factory was provided")]
  MissingProvider,

  #[error("malformed factory method `{method}` on {factory}: {reason}")]
  MalformedFactory {
    factory: ServiceId,
    method: String,
    reason: &'static str,
  },

  #[error("factory method receiver is a {actual}, not a {expected}")]
  ReceiverType {
    expected: &'static str,
    actual: &'static str,
  },

  #[error("argument {position} was requested but only {available} were declared")]
  MissingArgument { position: usize, available: usize },

  #[error("argument {position} ({id}) is a {actual}, not a {expected}")]
  ArgumentType {
    position: usize,
    id: ServiceId,
    expected: &'static str,
    actual: &'static str,
  },

  #[error(transparent)]
  Dependency(Box<ResolveError>),

  #[error("{0}")]
  Failed(Box<dyn std::error::Error + Send + Sync>),
}

impl ConstructError {
  /// Wraps an error raised by user construction code.
  pub fn failed(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
    ConstructError::Failed(error.into())
  }
}

impl From<ResolveError> for ConstructError {
  fn from(error: ResolveError) -> Self {
    ConstructError::Dependency(Box::new(error))
  }
}

/// Errors raised while loading a [`ContainerConfig`](crate::ContainerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read configuration file: {0}")]
  Read(#[from] std::io::Error),

  #[error("Failed to parse configuration: {0}")]
  Parse(#[from] serde_yaml::Error),
}

/// A specialized `Result` type for container operations.
pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
