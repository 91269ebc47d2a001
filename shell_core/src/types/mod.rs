//! # Type Identity
//!
//! Every participating type gets a [`TypeTag`]: a small, process-stable number
//! assigned the first time the type is registered. Alongside the tag the table
//! records the type's is-a closure, built from the supertypes the type names in
//! [`Typed::declare`]. Instance-of checks then reduce to a set lookup instead
//! of walking the capability lattice at runtime.
//!
//! Capabilities are registered through their trait objects, so a concrete
//! shell can declare `dyn Resizable` as a supertype and a capability trait can
//! declare another capability beneath it.
//!
//! ## Example
//!
//! ```rust
//! use shell_core::types::{is_a, register_type, Lineage, Typed};
//!
//! trait Scrollable {}
//! impl Typed for dyn Scrollable {}
//!
//! struct Console;
//! impl Typed for Console {
//!     fn declare(lineage: &mut Lineage) {
//!         lineage.inherits::<dyn Scrollable>();
//!     }
//! }
//!
//! let console = register_type::<Console>();
//! assert_eq!(console, register_type::<Console>());
//! assert!(is_a(console, register_type::<dyn Scrollable>()));
//! ```

mod identity;

pub use identity::{downcast, is_instance_of, safe_cast, Identify};

use std::any::{type_name as rust_type_name, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Stable identity of a registered type.
///
/// Tags start at 1 and are never reused for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(u32);

impl TypeTag {
    /// Tag of `T`, registering it on first use.
    pub fn of<T: ?Sized + Typed>() -> TypeTag {
        register_type::<T>()
    }

    /// Raw numeric value
    pub fn get(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        (self.0 - 1) as usize
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A type that takes part in tag-based identity.
///
/// Implemented by concrete component types and by capability trait objects
/// (`impl Typed for dyn Resizable {}`). The lattice must be acyclic.
pub trait Typed: 'static {
    /// Name the direct supertypes of this type.
    fn declare(lineage: &mut Lineage) {
        let _ = lineage;
    }

    /// Human-readable name used in logs and snapshots.
    fn display_name() -> &'static str {
        short_name(rust_type_name::<Self>())
    }
}

/// Collects the direct supertypes named by [`Typed::declare`].
#[derive(Debug, Default)]
pub struct Lineage {
    parents: Vec<TypeTag>,
}

impl Lineage {
    /// Declare `P` as a direct supertype. `P` is registered first if needed.
    pub fn inherits<P: ?Sized + Typed>(&mut self) -> &mut Self {
        let tag = register_type::<P>();
        if !self.parents.contains(&tag) {
            self.parents.push(tag);
        }
        self
    }

    /// Direct supertypes declared so far
    pub fn parents(&self) -> &[TypeTag] {
        &self.parents
    }
}

/// Metadata recorded for each registered type.
#[derive(Debug, Clone)]
struct TypeInfo {
    name: &'static str,
    parents: Vec<TypeTag>,
    /// The type itself plus every transitive supertype
    closure: BTreeSet<TypeTag>,
}

#[derive(Default)]
struct TypeTable {
    by_id: HashMap<TypeId, TypeTag>,
    infos: Vec<TypeInfo>,
}

static TYPES: Lazy<RwLock<TypeTable>> = Lazy::new(|| RwLock::new(TypeTable::default()));

fn with_table<R>(f: impl FnOnce(&TypeTable) -> R) -> R {
    let table = TYPES.read().unwrap_or_else(PoisonError::into_inner);
    f(&table)
}

/// Register `T` and return its tag.
///
/// Idempotent: every call for the same type returns the same tag. Supertypes
/// named in [`Typed::declare`] are registered before `T` so that its is-a
/// closure is complete at the moment the tag is handed out.
pub fn register_type<T: ?Sized + Typed>() -> TypeTag {
    let id = TypeId::of::<T>();
    if let Some(tag) = with_table(|table| table.by_id.get(&id).copied()) {
        return tag;
    }

    // Parents register themselves through the lineage; no lock is held here.
    let mut lineage = Lineage::default();
    T::declare(&mut lineage);

    let mut table = TYPES.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(tag) = table.by_id.get(&id) {
        return *tag;
    }

    let tag = TypeTag(table.infos.len() as u32 + 1);
    let mut closure = BTreeSet::new();
    closure.insert(tag);
    for parent in &lineage.parents {
        closure.extend(table.infos[parent.index()].closure.iter().copied());
    }

    let name = T::display_name();
    log::debug!("registered type {} as {} (parents: {:?})", name, tag, lineage.parents);
    table.infos.push(TypeInfo {
        name,
        parents: lineage.parents,
        closure,
    });
    table.by_id.insert(id, tag);
    tag
}

/// Name recorded for `tag`, if it was handed out by this process.
pub fn type_name(tag: TypeTag) -> Option<&'static str> {
    with_table(|table| table.infos.get(tag.index()).map(|info| info.name))
}

/// Direct supertypes declared for `tag`
pub fn parents(tag: TypeTag) -> Vec<TypeTag> {
    with_table(|table| {
        table
            .infos
            .get(tag.index())
            .map(|info| info.parents.clone())
            .unwrap_or_default()
    })
}

/// Every transitive supertype of `tag`, excluding `tag` itself, in tag order.
pub fn ancestors(tag: TypeTag) -> Vec<TypeTag> {
    with_table(|table| {
        table
            .infos
            .get(tag.index())
            .map(|info| info.closure.iter().copied().filter(|t| *t != tag).collect())
            .unwrap_or_default()
    })
}

/// Whether a value tagged `tag` is-a `ancestor`. Reflexive.
pub fn is_a(tag: TypeTag, ancestor: TypeTag) -> bool {
    with_table(|table| {
        table
            .infos
            .get(tag.index())
            .is_some_and(|info| info.closure.contains(&ancestor))
    })
}

/// Strip module paths (and a leading `dyn `) from a Rust type name.
/// Generic names are returned untouched.
fn short_name(full: &'static str) -> &'static str {
    if full.contains('<') {
        return full;
    }
    match full.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full.trim_start_matches("dyn "),
    }
}
