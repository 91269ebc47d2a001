//! # shell_core - Typed Callbacks and Shell Registry
//!
//! `shell_core` is the infrastructure layer shared by toolkit-agnostic UI
//! components: a typed callback value components fire from their event
//! handlers, and a type-identity registry that lets code find the single live
//! instance of a top-level window without holding a handle to it.
//!
//! ## Design Philosophy
//!
//! - **Optional observers**: An unbound callback is a silent no-op, never an error
//! - **Weak targets**: Callbacks and registry entries never own the instances they point at
//! - **Explicit ownership**: The registry belongs to a [`Session`], not to a static
//! - **Closed kinds**: Singleton shells are an enum, so lookups match exhaustively
//!
//! Everything here is single-threaded and synchronous; it runs on the UI
//! event loop and completes before the triggering handler returns.
//!
//! ## Quick Start
//!
//! ```rust
//! use shell_core::callback::Callback;
//! use shell_core::session::Session;
//! use shell_core::shells::{find_shell, OutputLog, ShellKind, ShellRef};
//!
//! let session = Session::with_defaults();
//! let log = OutputLog::new(session.registry()).unwrap();
//!
//! let append: Callback<str> = Callback::method(&log, OutputLog::append);
//! append.invoke("hello");
//!
//! if let Some(ShellRef::OutputLog(found)) = find_shell(session.registry(), ShellKind::OutputLog) {
//!     assert_eq!(found.text(), "hello");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`callback`] - Typed callbacks of arity 0 to 4
//! - [`types`] - Type tags and the is-a lattice
//! - [`registry`] - Live instance lookup by type
//! - [`shells`] - Capability traits and the top-level shells
//! - [`session`] - Registry ownership
//! - [`config`] - Registry configuration
//! - [`errors`] - Structured error types

pub mod callback;
pub mod config;
pub mod errors;
pub mod registry;
pub mod session;
pub mod shells;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use callback::{Callback, Delivery, TargetKind};
pub use config::{DuplicatePolicy, RegistryConfig};
pub use errors::{ShellError, ShellResult};
pub use registry::{InstanceRegistry, Registration, RegistryEvent};
pub use session::Session;
pub use types::{register_type, TypeTag, Typed};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
