//! Container configuration, usually loaded from YAML.
//!
//! ```yaml
//! scopes: [request]
//! services:
//!   mailer: { global: true }
//!   "my_app::Clock": { transient: true }
//! ```
//!
//! Entries under `services` are matched against a registration's token, or its
//! full type name for type-keyed services, and override that registration's
//! lifecycle options.

use crate::core::ServiceDefinition;
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Lifecycle options for a registration. `None` leaves the registration's own
/// choice in place.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServiceOptions {
  #[serde(default)]
  pub transient: Option<bool>,
  #[serde(default)]
  pub global: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ContainerConfig {
  /// Scopes created together with the container.
  #[serde(default)]
  pub scopes: Vec<String>,
  #[serde(default)]
  pub services: HashMap<String, ServiceOptions>,
}

impl ContainerConfig {
  pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
    Ok(serde_yaml::from_str(source)?)
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let source = fs::read_to_string(path)?;
    Self::from_yaml_str(&source)
  }

  pub fn options_for(&self, key: &str) -> Option<ServiceOptions> {
    self.services.get(key).copied()
  }

  pub(crate) fn apply(&self, definition: &mut ServiceDefinition) {
    let Some(options) = self.options_for(definition.id.key()) else {
      return;
    };
    if let Some(transient) = options.transient {
      definition.transient = transient;
    }
    if let Some(global) = options.global {
      definition.global = global;
    }
  }
}
