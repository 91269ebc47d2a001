//! # Session
//!
//! Owns the [`InstanceRegistry`] for the lifetime of an application run.
//! Shell constructors take the registry from here; dropping the session
//! clears it so no lookup outlives the application.
//!
//! ```rust
//! use shell_core::session::Session;
//! use shell_core::shells::{OutputLog, ShellKind};
//!
//! let session = Session::with_defaults();
//! assert!(session.shell(ShellKind::OutputLog).is_none());
//!
//! let log = OutputLog::new(session.registry()).unwrap();
//! assert!(session.shell(ShellKind::OutputLog).is_some());
//! # drop(log);
//! ```

use std::path::Path;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::RegistryConfig;
use crate::errors::ShellResult;
use crate::registry::InstanceRegistry;
use crate::shells::{self, ShellKind, ShellRef};

pub struct Session {
    id: Uuid,
    started: DateTime<Utc>,
    registry: Rc<InstanceRegistry>,
}

impl Session {
    pub fn new(config: RegistryConfig) -> Self {
        let session = Session {
            id: Uuid::new_v4(),
            started: Utc::now(),
            registry: Rc::new(InstanceRegistry::new(config)),
        };
        log::info!(
            "session {} started (duplicate policy: {})",
            session.id,
            session.registry.policy().display_name()
        );
        session
    }

    pub fn with_defaults() -> Self {
        Session::new(RegistryConfig::default())
    }

    /// Start a session from a JSON configuration file.
    pub fn load(config_path: &Path) -> ShellResult<Self> {
        Ok(Session::new(RegistryConfig::load(config_path)?))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }

    pub fn registry(&self) -> &Rc<InstanceRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &RegistryConfig {
        self.registry.config()
    }

    /// The live top-level shell of `kind`.
    pub fn shell(&self, kind: ShellKind) -> Option<ShellRef> {
        shells::find_shell(&self.registry, kind)
    }

    pub fn open_shells(&self) -> Vec<ShellRef> {
        shells::open_shells(&self.registry)
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::with_defaults()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let remaining = self.registry.len();
        self.registry.clear();
        log::info!("session {} ended ({} shells still open)", self.id, remaining);
    }
}
