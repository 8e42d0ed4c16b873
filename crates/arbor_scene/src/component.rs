//! Component payloads carried by attachments.
//!
//! Any `'static` type can be attached to a node. The scene stores the value
//! type-erased and remembers its runtime [`TypeId`], which is what the
//! resolver matches against.

use core::any::TypeId;
use downcast_rs::{Downcast, impl_downcast};

/// A value that can be attached to a scene node.
///
/// Every `'static` type implements `Component` automatically. Downcasting
/// from `dyn Component` back to the concrete type is provided by
/// [`downcast_rs`].
///
/// # Example
///
/// ```
/// use arbor_scene::Component;
///
/// struct Health(u32);
///
/// let boxed: Box<dyn Component> = Box::new(Health(10));
/// assert_eq!(boxed.downcast_ref::<Health>().map(|h| h.0), Some(10));
/// ```
pub trait Component: Downcast + 'static {}

impl_downcast!(Component);

// Blanket implementation for all compatible types
impl<T: 'static> Component for T {}

/// A type-erased component together with its runtime type.
///
/// Used wherever a component has to be created without the concrete type
/// being known to the caller (for example by a registered factory).
pub struct BoxedComponent {
    type_id: TypeId,
    type_name: &'static str,
    value: Box<dyn Component>,
}

impl BoxedComponent {
    /// Boxes a concrete component.
    #[must_use]
    pub fn new<T: Component>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: core::any::type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Returns the runtime type of the boxed value.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the type name for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn into_parts(self) -> (TypeId, &'static str, Box<dyn Component>) {
        (self.type_id, self.type_name, self.value)
    }
}

impl core::fmt::Debug for BoxedComponent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoxedComponent")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
