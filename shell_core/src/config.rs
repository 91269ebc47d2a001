//! # Registry Configuration
//!
//! Settings that shape how the [`InstanceRegistry`](crate::registry::InstanceRegistry)
//! behaves. Stored as JSON; every field has a default so partial files load.
//!
//! ```rust
//! use shell_core::config::{DuplicatePolicy, RegistryConfig};
//!
//! let config = RegistryConfig::from_json_str(r#"{ "duplicate_policy": "Reject" }"#).unwrap();
//! assert_eq!(config.duplicate_policy, DuplicatePolicy::Reject);
//! assert!(config.emit_events);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ShellError, ShellResult};

/// What happens when a second instance of a shell type is constructed while
/// the first is still alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DuplicatePolicy {
    /// The newer instance replaces the older one in the registry. The older
    /// instance stays alive but is no longer reachable by type.
    #[default]
    LastWins,
    /// The older instance stays registered; the newer one is constructed but
    /// never becomes reachable by type.
    FirstWins,
    /// Construction of the newer instance fails with
    /// [`ShellError::DuplicateRegistration`].
    Reject,
}

impl DuplicatePolicy {
    pub fn display_name(&self) -> &'static str {
        match self {
            DuplicatePolicy::LastWins => "last-wins",
            DuplicatePolicy::FirstWins => "first-wins",
            DuplicatePolicy::Reject => "reject",
        }
    }
}

/// Registry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Policy for simultaneously live instances of one type
    pub duplicate_policy: DuplicatePolicy,

    /// Deliver [`RegistryEvent`](crate::registry::RegistryEvent)s to the
    /// registry observer
    pub emit_events: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            duplicate_policy: DuplicatePolicy::default(),
            emit_events: true,
        }
    }
}

impl RegistryConfig {
    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> ShellResult<Self> {
        serde_json::from_str(json).map_err(|e| ShellError::invalid_config("registry", e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> ShellResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| ShellError::file_error("read", path.display().to_string(), e.to_string()))?;
        let config = Self::from_json_str(&text)?;
        log::debug!(
            "loaded registry config from {} (policy: {})",
            path.display(),
            config.duplicate_policy.display_name()
        );
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> ShellResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
