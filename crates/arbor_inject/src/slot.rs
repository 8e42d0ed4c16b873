//! Typed member slots that receive resolved attachments.
//!
//! A component declares an injectable member by giving it a slot type:
//!
//! - [`Ref<T>`] holds a single resolved attachment
//! - [`Refs<T>`] holds an ordered collection of resolved attachments
//!
//! `T` is either a concrete component type or a capability (a `dyn Trait`
//! registered with [`capability!`](crate::capability)). The slot's target
//! type drives matching; the slot itself only stores handles.

use core::fmt;
use core::marker::PhantomData;

use arbor_scene::{AttachmentId, Component, Scene};

use crate::error::AssignError;

/// Whether a declared type names a concrete component or a capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TargetKind {
    /// A concrete, instantiable component type.
    Component,
    /// An abstract capability that several component types may implement.
    Capability,
}

/// A type that injectable members may point at.
///
/// Every component type is a target of kind [`TargetKind::Component`].
/// Capabilities opt in through the [`capability!`](crate::capability) macro.
pub trait Target: 'static {
    /// The kind of this target.
    const KIND: TargetKind;
}

impl<T: Component> Target for T {
    const KIND: TargetKind = TargetKind::Component;
}

/// Declares one or more trait-object types as capabilities.
///
/// ```
/// use arbor_inject::capability;
///
/// trait Damageable {
///     fn health(&self) -> u32;
/// }
///
/// capability!(dyn Damageable);
/// ```
#[macro_export]
macro_rules! capability {
    ($($cap:ty),+ $(,)?) => {
        $(
            impl $crate::slot::Target for $cap {
                const KIND: $crate::slot::TargetKind = $crate::slot::TargetKind::Capability;
            }
        )+
    };
}

/// A member storage type that can receive resolved attachments.
pub trait Slot: 'static {
    /// The declared element type.
    type Target: Target + ?Sized;

    /// `true` for collection slots.
    const COLLECTION: bool;

    /// Stores the resolved attachments.
    ///
    /// # Errors
    ///
    /// Single-valued slots return [`AssignError::CardinalityMismatch`] unless
    /// exactly one value is supplied.
    fn assign(&mut self, values: &[AttachmentId]) -> Result<(), AssignError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Ref
// ─────────────────────────────────────────────────────────────────────────────

/// A single injected attachment.
pub struct Ref<T: ?Sized> {
    id: Option<AttachmentId>,
    _marker: PhantomData<fn() -> *const T>,
}

impl<T: ?Sized> Ref<T> {
    /// Creates an unresolved reference.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            id: None,
            _marker: PhantomData,
        }
    }

    /// Creates a reference already pointing at `id`.
    #[must_use]
    pub const fn to(id: AttachmentId) -> Self {
        Self {
            id: Some(id),
            _marker: PhantomData,
        }
    }

    /// Returns the resolved attachment, if any.
    #[must_use]
    pub fn id(&self) -> Option<AttachmentId> {
        self.id
    }

    /// Returns `true` once a value has been injected.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.id.is_some()
    }
}

impl<T: Component> Ref<T> {
    /// Looks up the referenced component in `scene`.
    #[must_use]
    pub fn get<'s>(&self, scene: &'s Scene) -> Option<&'s T> {
        scene.get::<T>(self.id?)
    }
}

impl<T: ?Sized> Default for Ref<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized> Clone for Ref<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Ref<T> {}

impl<T: ?Sized> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: ?Sized> Eq for Ref<T> {}

impl<T: ?Sized> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ref")
            .field(&core::any::type_name::<T>())
            .field(&self.id)
            .finish()
    }
}

impl<T: Target + ?Sized> Slot for Ref<T> {
    type Target = T;
    const COLLECTION: bool = false;

    fn assign(&mut self, values: &[AttachmentId]) -> Result<(), AssignError> {
        match values {
            [id] => {
                self.id = Some(*id);
                Ok(())
            }
            _ => Err(AssignError::CardinalityMismatch {
                expected: 1,
                found: values.len(),
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Refs
// ─────────────────────────────────────────────────────────────────────────────

/// An ordered collection of injected attachments.
///
/// Each assignment replaces the whole collection.
pub struct Refs<T: ?Sized> {
    ids: Vec<AttachmentId>,
    _marker: PhantomData<fn() -> *const T>,
}

impl<T: ?Sized> Refs<T> {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ids: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Returns the injected attachments in resolution order.
    #[must_use]
    pub fn ids(&self) -> &[AttachmentId] {
        &self.ids
    }

    /// Returns the number of injected attachments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if nothing has been injected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterates over the injected attachments.
    pub fn iter(&self) -> impl Iterator<Item = AttachmentId> + '_ {
        self.ids.iter().copied()
    }
}

impl<T: Component> Refs<T> {
    /// Looks up every referenced component in `scene`, skipping stale handles.
    pub fn get<'s>(&'s self, scene: &'s Scene) -> impl Iterator<Item = &'s T> + 's {
        self.ids.iter().filter_map(move |id| scene.get::<T>(*id))
    }
}

impl<T: ?Sized> Default for Refs<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for Refs<T> {
    fn clone(&self) -> Self {
        Self {
            ids: self.ids.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: ?Sized> PartialEq for Refs<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ids == other.ids
    }
}

impl<T: ?Sized> Eq for Refs<T> {}

impl<T: ?Sized> fmt::Debug for Refs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Refs")
            .field(&core::any::type_name::<T>())
            .field(&self.ids)
            .finish()
    }
}

impl<T: Target + ?Sized> Slot for Refs<T> {
    type Target = T;
    const COLLECTION: bool = true;

    fn assign(&mut self, values: &[AttachmentId]) -> Result<(), AssignError> {
        self.ids = values.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Weapon;

    trait Targetable {}
    crate::capability!(dyn Targetable);

    fn ids(scene: &mut Scene, count: usize) -> Vec<AttachmentId> {
        let node = scene.spawn("Node");
        (0..count)
            .map(|_| scene.attach(node, Weapon).unwrap())
            .collect()
    }

    #[test]
    fn single_slot_requires_exactly_one_value() {
        let mut scene = Scene::new();
        let values = ids(&mut scene, 2);
        let mut slot = Ref::<Weapon>::empty();

        assert_eq!(
            slot.assign(&values),
            Err(AssignError::CardinalityMismatch {
                expected: 1,
                found: 2
            })
        );
        assert_eq!(
            slot.assign(&[]),
            Err(AssignError::CardinalityMismatch {
                expected: 1,
                found: 0
            })
        );
        assert!(!slot.is_resolved());

        slot.assign(&values[..1]).unwrap();
        assert_eq!(slot.id(), Some(values[0]));
        assert!(slot.get(&scene).is_some());
    }

    #[test]
    fn collection_slot_replaces_contents() {
        let mut scene = Scene::new();
        let values = ids(&mut scene, 3);
        let mut slot = Refs::<Weapon>::new();

        slot.assign(&values).unwrap();
        assert_eq!(slot.ids(), values.as_slice());

        slot.assign(&values[2..]).unwrap();
        assert_eq!(slot.ids(), &values[2..]);
        assert_eq!(slot.get(&scene).count(), 1);
    }

    #[test]
    fn target_kinds() {
        assert_eq!(<Weapon as Target>::KIND, TargetKind::Component);
        assert_eq!(<dyn Targetable as Target>::KIND, TargetKind::Capability);
        assert!(!<Ref<dyn Targetable> as Slot>::COLLECTION);
        assert!(<Refs<Weapon> as Slot>::COLLECTION);
    }
}
