//! Instance-level identity checks built on the tag table.

use std::any::Any;

use super::{is_a, register_type, TypeTag, Typed};

/// Object-safe access to a value's recorded identity.
///
/// Implemented for every sized [`Typed`] type; component traits extend it so
/// that a `&dyn Component` can be identified and downcast.
pub trait Identify: Any {
    /// Tag of the concrete type this value was constructed as
    fn type_tag(&self) -> TypeTag;

    fn as_any(&self) -> &dyn Any;
}

impl<T: Typed> Identify for T {
    fn type_tag(&self) -> TypeTag {
        register_type::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Whether `value` was constructed as `tag` or as a type that declares `tag`
/// somewhere in its lineage.
pub fn is_instance_of(value: &dyn Identify, tag: TypeTag) -> bool {
    is_a(value.type_tag(), tag)
}

/// Returns `value` back when it is an instance of `tag`.
pub fn safe_cast(value: &dyn Identify, tag: TypeTag) -> Option<&dyn Identify> {
    is_instance_of(value, tag).then_some(value)
}

/// Downcast to the concrete type `T`.
pub fn downcast<T: Typed>(value: &dyn Identify) -> Option<&T> {
    if !is_instance_of(value, register_type::<T>()) {
        return None;
    }
    value.as_any().downcast_ref::<T>()
}
