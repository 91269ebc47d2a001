//! # Instance Registry
//!
//! Maps a [`TypeTag`] to the single live instance of that type, so code with
//! no handle in hand can still reach a top-level shell ("find the output log
//! if one is open and append to it").
//!
//! The registry is an explicitly owned object, normally created by a
//! [`Session`](crate::session::Session) and passed to every shell constructor.
//! Entries hold [`Weak`] references; the registry never keeps an instance
//! alive.
//!
//! ## Lifecycle
//!
//! ```text
//! construct ─► Registration ─► build ─► Rc<T> ─► entry inserted ─► event
//!                   │ (guard stored in the instance)
//! instance dropped ─┴► guard dropped ─► on_destruct (removes only its own entry)
//! ```
//!
//! Removal is keyed by the per-registration instance id, so a guard belonging
//! to an instance that has since been replaced never removes the newer entry.
//!
//! ## Example
//!
//! ```rust
//! use std::rc::Rc;
//! use shell_core::registry::{InstanceRegistry, Registration};
//! use shell_core::types::Typed;
//!
//! struct Inspector {
//!     _registration: Registration,
//! }
//! impl Typed for Inspector {}
//!
//! let registry = Rc::new(InstanceRegistry::default());
//! assert!(registry.instance::<Inspector>().is_none());
//!
//! let inspector = registry
//!     .construct(|registration| Inspector { _registration: registration })
//!     .unwrap();
//! assert!(Rc::ptr_eq(&registry.instance::<Inspector>().unwrap(), &inspector));
//!
//! drop(inspector);
//! assert!(registry.instance::<Inspector>().is_none());
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::callback::Callback;
use crate::config::{DuplicatePolicy, RegistryConfig};
use crate::errors::{ShellError, ShellResult};
use crate::types::{self, register_type, TypeTag, Typed};

/// Registry mutations, delivered to the observer after they take effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum RegistryEvent {
    /// First live instance of a type registered
    Registered {
        tag: TypeTag,
        type_name: &'static str,
        instance: Uuid,
    },
    /// A newer instance took over the entry (last-wins)
    Replaced {
        tag: TypeTag,
        type_name: &'static str,
        previous: Uuid,
        instance: Uuid,
    },
    /// A newer instance was left unregistered (first-wins)
    Ignored {
        tag: TypeTag,
        type_name: &'static str,
        existing: Uuid,
    },
    /// A newer instance was refused (reject)
    Rejected {
        tag: TypeTag,
        type_name: &'static str,
        existing: Uuid,
    },
    /// An instance removed its own entry
    Unregistered {
        tag: TypeTag,
        type_name: &'static str,
        instance: Uuid,
    },
    /// An instance tried to remove an entry that now belongs to another
    /// instance; nothing was removed
    StaleUnregister {
        tag: TypeTag,
        type_name: &'static str,
        instance: Uuid,
    },
}

impl RegistryEvent {
    pub fn tag(&self) -> TypeTag {
        match self {
            RegistryEvent::Registered { tag, .. }
            | RegistryEvent::Replaced { tag, .. }
            | RegistryEvent::Ignored { tag, .. }
            | RegistryEvent::Rejected { tag, .. }
            | RegistryEvent::Unregistered { tag, .. }
            | RegistryEvent::StaleUnregister { tag, .. } => *tag,
        }
    }
}

impl fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEvent::Registered { tag, type_name, .. } => write!(f, "registered {type_name} {tag}"),
            RegistryEvent::Replaced { tag, type_name, .. } => write!(f, "replaced {type_name} {tag}"),
            RegistryEvent::Ignored { tag, type_name, .. } => write!(f, "ignored duplicate {type_name} {tag}"),
            RegistryEvent::Rejected { tag, type_name, .. } => write!(f, "rejected duplicate {type_name} {tag}"),
            RegistryEvent::Unregistered { tag, type_name, .. } => write!(f, "unregistered {type_name} {tag}"),
            RegistryEvent::StaleUnregister { tag, type_name, .. } => {
                write!(f, "stale unregister of {type_name} {tag} ignored")
            }
        }
    }
}

/// A serializable view of one live registry entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrySnapshot {
    pub tag: TypeTag,
    pub type_name: &'static str,
    pub instance: Uuid,
    pub registered_at: DateTime<Utc>,
}

struct Entry {
    instance: Weak<dyn Any>,
    id: Uuid,
    type_name: &'static str,
    registered_at: DateTime<Utc>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.instance.strong_count() > 0
    }
}

/// Guard tying a registry entry to its instance's lifetime.
///
/// Store it inside the instance; dropping it removes the entry, but only if
/// the entry still belongs to this registration.
#[must_use = "dropping the registration unregisters the instance immediately"]
pub struct Registration {
    registry: Weak<InstanceRegistry>,
    tag: TypeTag,
    id: Uuid,
}

impl Registration {
    /// False for the inert guard handed to a first-wins duplicate.
    fn is_claimed(&self) -> bool {
        self.registry.strong_count() > 0
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Identity of this registration
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether the registry currently resolves this type to this registration.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.current_id(self.tag) == Some(self.id))
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        // A registry torn down before its instances has nothing to clean up.
        if let Some(registry) = self.registry.upgrade() {
            registry.on_destruct(self.tag, self.id);
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("tag", &self.tag)
            .field("id", &self.id)
            .finish()
    }
}

/// Process-wide lookup of the live instance of each registered type.
///
/// Single-threaded by construction (`Rc`/`RefCell`); mutations are visible to
/// the very next lookup.
pub struct InstanceRegistry {
    config: RegistryConfig,
    entries: RefCell<HashMap<TypeTag, Entry>>,
    observer: RefCell<Callback<RegistryEvent>>,
}

impl Default for InstanceRegistry {
    fn default() -> Self {
        InstanceRegistry::new(RegistryConfig::default())
    }
}

impl InstanceRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        InstanceRegistry {
            config,
            entries: RefCell::new(HashMap::new()),
            observer: RefCell::new(Callback::empty()),
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.config.duplicate_policy
    }

    /// Receive every [`RegistryEvent`]. Replaces any previous observer.
    pub fn set_observer(&self, observer: Callback<RegistryEvent>) {
        self.observer.borrow_mut().bind(observer);
    }

    /// Build an `Rc<T>` and register it as soon as it exists.
    ///
    /// `build` receives the [`Registration`] guard to store in the new value.
    /// Any previous instance of `T` stays reachable while `build` runs; the
    /// entry is inserted before the observer hears about it.
    ///
    /// Fails only under [`DuplicatePolicy::Reject`] when another instance of
    /// `T` is alive.
    pub fn construct<T, F>(self: &Rc<Self>, build: F) -> ShellResult<Rc<T>>
    where
        T: Typed,
        F: FnOnce(Registration) -> T,
    {
        let tag = register_type::<T>();
        let type_name = T::display_name();
        self.admit(tag, type_name)?;

        let registration = self.claim(tag, type_name);
        let claimed = registration.is_claimed().then_some(registration.id);
        let instance = Rc::new(build(registration));
        if let Some(id) = claimed {
            self.insert(tag, type_name, id, Rc::downgrade(&instance));
        }
        Ok(instance)
    }

    /// Register `instance` as the live instance of `T`.
    ///
    /// For values already inside an `Rc`; [`construct`](Self::construct) is
    /// the usual entry point.
    pub fn on_construct<T: Typed>(self: &Rc<Self>, instance: Weak<T>) -> ShellResult<Registration> {
        let tag = register_type::<T>();
        let type_name = T::display_name();
        self.admit(tag, type_name)?;

        let registration = self.claim(tag, type_name);
        if registration.is_claimed() {
            self.insert(tag, type_name, registration.id, instance);
        }
        Ok(registration)
    }

    /// Remove the entry for `tag` if it still belongs to registration `id`.
    ///
    /// Returns whether an entry was removed. Called by [`Registration`]'s
    /// drop; a mismatch is a stale unregister and leaves the entry in place.
    /// A missing entry (the registry was cleared) is ignored without an event.
    pub fn on_destruct(&self, tag: TypeTag, id: Uuid) -> bool {
        let event = {
            let mut entries = self.entries.borrow_mut();
            match entries.get(&tag) {
                Some(entry) if entry.id == id => {
                    let type_name = entry.type_name;
                    entries.remove(&tag);
                    log::debug!("unregistered {} {} ({})", type_name, tag, id);
                    RegistryEvent::Unregistered {
                        tag,
                        type_name,
                        instance: id,
                    }
                }
                Some(entry) => {
                    log::debug!(
                        "stale unregister of {} {} ignored; entry belongs to {}",
                        entry.type_name,
                        tag,
                        entry.id
                    );
                    RegistryEvent::StaleUnregister {
                        tag,
                        type_name: entry.type_name,
                        instance: id,
                    }
                }
                None => {
                    log::trace!("unregister of {} ({}) after clear", tag, id);
                    return false;
                }
            }
        };
        let removed = matches!(event, RegistryEvent::Unregistered { .. });
        self.emit(event);
        removed
    }

    /// The live instance registered under `tag`.
    pub fn get_instance_by_type(&self, tag: TypeTag) -> Option<Rc<dyn Any>> {
        self.entries
            .borrow()
            .get(&tag)
            .and_then(|entry| entry.instance.upgrade())
    }

    /// The live instance of `T`.
    pub fn instance<T: Typed>(&self) -> Option<Rc<T>> {
        self.get_instance_by_type(register_type::<T>())?
            .downcast::<T>()
            .ok()
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.get_instance_by_type(tag).is_some()
    }

    /// Every live registered instance whose type is-a `tag`, in tag order.
    pub fn instances_of(&self, tag: TypeTag) -> Vec<(TypeTag, Rc<dyn Any>)> {
        let entries = self.entries.borrow();
        let mut found: Vec<_> = entries
            .iter()
            .filter(|(entry_tag, _)| types::is_a(**entry_tag, tag))
            .filter_map(|(entry_tag, entry)| entry.instance.upgrade().map(|rc| (*entry_tag, rc)))
            .collect();
        found.sort_by_key(|(entry_tag, _)| *entry_tag);
        found
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.borrow().values().filter(|entry| entry.is_live()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. Outstanding registrations become no-ops.
    pub fn clear(&self) {
        let removed = {
            let mut entries = self.entries.borrow_mut();
            let count = entries.len();
            entries.clear();
            count
        };
        if removed > 0 {
            log::debug!("cleared {} registry entries", removed);
        }
    }

    /// Live entries in tag order.
    pub fn snapshot(&self) -> Vec<EntrySnapshot> {
        let entries = self.entries.borrow();
        let mut snapshot: Vec<_> = entries
            .iter()
            .filter(|(_, entry)| entry.is_live())
            .map(|(tag, entry)| EntrySnapshot {
                tag: *tag,
                type_name: entry.type_name,
                instance: entry.id,
                registered_at: entry.registered_at,
            })
            .collect();
        snapshot.sort_by_key(|entry| entry.tag);
        snapshot
    }

    fn current_id(&self, tag: TypeTag) -> Option<Uuid> {
        self.entries.borrow().get(&tag).map(|entry| entry.id)
    }

    fn live_id(&self, tag: TypeTag) -> Option<Uuid> {
        self.entries
            .borrow()
            .get(&tag)
            .filter(|entry| entry.is_live())
            .map(|entry| entry.id)
    }

    /// Apply the reject policy before anything is constructed.
    fn admit(&self, tag: TypeTag, type_name: &'static str) -> ShellResult<()> {
        if self.policy() != DuplicatePolicy::Reject {
            return Ok(());
        }
        match self.live_id(tag) {
            Some(existing) => {
                log::warn!("rejected duplicate {} {}; {} is still alive", type_name, tag, existing);
                self.emit(RegistryEvent::Rejected {
                    tag,
                    type_name,
                    existing,
                });
                Err(ShellError::duplicate_registration(type_name, tag))
            }
            None => Ok(()),
        }
    }

    /// Issue the guard for a new instance. Under first-wins with a live
    /// incumbent the guard is inert and never touches the registry.
    fn claim(self: &Rc<Self>, tag: TypeTag, type_name: &'static str) -> Registration {
        let id = Uuid::new_v4();
        if let (Some(existing), DuplicatePolicy::FirstWins) = (self.live_id(tag), self.policy()) {
            log::warn!("duplicate {} {} left unregistered; {} stays", type_name, tag, existing);
            self.emit(RegistryEvent::Ignored {
                tag,
                type_name,
                existing,
            });
            return Registration {
                registry: Weak::new(),
                tag,
                id,
            };
        }
        Registration {
            registry: Rc::downgrade(self),
            tag,
            id,
        }
    }

    fn insert<T: Any>(&self, tag: TypeTag, type_name: &'static str, id: Uuid, instance: Weak<T>) {
        let instance: Weak<dyn Any> = instance;
        let previous = self
            .entries
            .borrow_mut()
            .insert(
                tag,
                Entry {
                    instance,
                    id,
                    type_name,
                    registered_at: Utc::now(),
                },
            )
            .filter(|entry| entry.is_live() && entry.id != id)
            .map(|entry| entry.id);

        let event = match previous {
            Some(previous) => {
                log::warn!("{} {} replaced; {} is no longer reachable by type", type_name, tag, previous);
                RegistryEvent::Replaced {
                    tag,
                    type_name,
                    previous,
                    instance: id,
                }
            }
            None => {
                log::debug!("registered {} {} ({})", type_name, tag, id);
                RegistryEvent::Registered {
                    tag,
                    type_name,
                    instance: id,
                }
            }
        };
        self.emit(event);
    }

    fn emit(&self, event: RegistryEvent) {
        if !self.config.emit_events {
            return;
        }
        // Clone out so the observer may query the registry.
        let observer = self.observer.borrow().clone();
        observer.invoke(&event);
    }
}

impl fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("policy", &self.policy())
            .field("entries", &self.len())
            .finish()
    }
}
