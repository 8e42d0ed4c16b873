//! Explicit registration of component types and their injectable members.
//!
//! Rust has no runtime reflection, so every type that wants injection is
//! described once through a [`ComponentType`] builder and stored in a
//! [`ComponentRegistry`]. The registry answers every type question the
//! resolver asks: which members a type declares, which capabilities it
//! implements, how to construct it, and which callbacks it exposes.
//!
//! # Example
//!
//! ```
//! use arbor_inject::{ComponentRegistry, ComponentType, Inject, Ref};
//!
//! #[derive(Default)]
//! struct Body;
//!
//! #[derive(Default)]
//! struct Wheel {
//!     body: Ref<Body>,
//! }
//!
//! let mut registry = ComponentRegistry::new();
//! registry.register(ComponentType::<Body>::new().with_default_factory());
//! registry.register(
//!     ComponentType::<Wheel>::new()
//!         .field("body", |w: &mut Wheel| &mut w.body, Inject::above())
//!         .unwrap(),
//! );
//!
//! assert!(registry.contains::<Wheel>());
//! ```

use core::any::{Any, TypeId, type_name};
use core::fmt;
use core::marker::PhantomData;

use arbor_scene::{AttachmentId, BoxedComponent, Component};
use hashbrown::HashMap;

use crate::descriptor::{DeclaredType, Inject, MemberDescriptor, MemberKind, Setter};
use crate::error::{AssignError, CallbackError, DescriptorError};
use crate::slot::{Slot, Target, TargetKind};

type Factory = Box<dyn Fn() -> BoxedComponent>;
type CallbackFn =
    Box<dyn Fn(&mut dyn Component, &[AttachmentId]) -> Result<(), CallbackError>>;

// ─────────────────────────────────────────────────────────────────────────────
// Capability casts
// ─────────────────────────────────────────────────────────────────────────────

trait ErasedCast<C: ?Sized> {
    fn cast<'a>(&self, component: &'a dyn Component) -> Option<&'a C>;
}

struct TypedCast<T, C: ?Sized> {
    cast: fn(&T) -> &C,
}

impl<T: Component, C: ?Sized> ErasedCast<C> for TypedCast<T, C> {
    fn cast<'a>(&self, component: &'a dyn Component) -> Option<&'a C> {
        component.downcast_ref::<T>().map(self.cast)
    }
}

struct CapabilityEntry {
    name: &'static str,
    // Holds a `Box<dyn ErasedCast<C>>` for the capability `C`.
    cast: Box<dyn Any>,
}

// ─────────────────────────────────────────────────────────────────────────────
// ComponentInfo
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the resolver knows about one registered component type.
pub struct ComponentInfo {
    type_id: TypeId,
    type_name: &'static str,
    members: Vec<MemberDescriptor>,
    capabilities: HashMap<TypeId, CapabilityEntry>,
    factory: Option<Factory>,
    callbacks: HashMap<String, CallbackFn>,
}

impl ComponentInfo {
    /// Returns the registered type id.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the registered type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the declared members in registration order.
    #[must_use]
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Returns `true` if the type declares the capability `capability`.
    #[must_use]
    pub fn implements(&self, capability: TypeId) -> bool {
        self.capabilities.contains_key(&capability)
    }

    /// Returns the names of every declared capability.
    pub fn capability_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.capabilities.values().map(|entry| entry.name)
    }

    /// Returns `true` if the type can be instantiated by fallback creation.
    #[must_use]
    pub fn has_factory(&self) -> bool {
        self.factory.is_some()
    }

    /// Returns `true` if a completion callback named `name` exists.
    #[must_use]
    pub fn has_callback(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    /// Returns `true` if any member requests force-creation.
    ///
    /// Only such types may trigger fallback creation at all.
    #[must_use]
    pub fn is_force_eligible(&self) -> bool {
        self.members.iter().any(MemberDescriptor::force_create)
    }

    pub(crate) fn instantiate(&self) -> Option<BoxedComponent> {
        self.factory.as_ref().map(|factory| factory())
    }

    pub(crate) fn invoke_callback(
        &self,
        name: &str,
        owner: &mut dyn Component,
        values: &[AttachmentId],
    ) -> Result<(), CallbackError> {
        let callback = self
            .callbacks
            .get(name)
            .ok_or_else(|| CallbackError::Missing {
                name: name.to_string(),
            })?;
        callback(owner, values)
    }
}

impl fmt::Debug for ComponentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInfo")
            .field("type_name", &self.type_name)
            .field("members", &self.members)
            .field(
                "capabilities",
                &self.capability_names().collect::<Vec<_>>(),
            )
            .field("factory", &self.factory.is_some())
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ComponentType builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builder describing a component type `T` to the registry.
pub struct ComponentType<T: Component> {
    info: ComponentInfo,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component> ComponentType<T> {
    /// Starts describing `T` with no members.
    #[must_use]
    pub fn new() -> Self {
        Self {
            info: ComponentInfo {
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                members: Vec::new(),
                capabilities: HashMap::new(),
                factory: None,
                callbacks: HashMap::new(),
            },
            _marker: PhantomData,
        }
    }

    /// Declares a slot member written in place through `access`.
    ///
    /// # Errors
    ///
    /// Returns a [`DescriptorError`] if `inject` is an illegal combination
    /// or the name is already taken.
    pub fn field<S, F>(self, name: &str, access: F, inject: Inject) -> Result<Self, DescriptorError>
    where
        S: Slot,
        F: Fn(&mut T) -> &mut S + 'static,
    {
        let setter: Setter = Box::new(move |owner: &mut dyn Component, values: &[AttachmentId]| {
            let owner = downcast_owner::<T>(owner)?;
            access(owner).assign(values)
        });
        self.member::<S>(name, MemberKind::Field, Some(setter), inject)
    }

    /// Declares a member written through a setter.
    ///
    /// The resolver fills a fresh `S` and hands it to `set`.
    ///
    /// # Errors
    ///
    /// Returns a [`DescriptorError`] if `inject` is an illegal combination
    /// or the name is already taken.
    pub fn property<S, F>(self, name: &str, set: F, inject: Inject) -> Result<Self, DescriptorError>
    where
        S: Slot + Default,
        F: Fn(&mut T, S) + 'static,
    {
        let setter: Setter = Box::new(move |owner: &mut dyn Component, values: &[AttachmentId]| {
            let owner = downcast_owner::<T>(owner)?;
            let mut slot = S::default();
            slot.assign(values)?;
            set(owner, slot);
            Ok(())
        });
        self.member::<S>(name, MemberKind::Property, Some(setter), inject)
    }

    /// Declares a read-only property.
    ///
    /// The member is reported during discovery and never resolved.
    ///
    /// # Errors
    ///
    /// Returns a [`DescriptorError`] if `inject` is an illegal combination
    /// or the name is already taken.
    pub fn getter_only<S: Slot>(self, name: &str, inject: Inject) -> Result<Self, DescriptorError> {
        self.member::<S>(name, MemberKind::Property, None, inject)
    }

    fn member<S: Slot>(
        mut self,
        name: &str,
        kind: MemberKind,
        setter: Option<Setter>,
        inject: Inject,
    ) -> Result<Self, DescriptorError> {
        if self.info.members.iter().any(|member| member.name() == name) {
            return Err(DescriptorError::DuplicateMember {
                owner: self.info.type_name,
                member: name.to_string(),
            });
        }
        let descriptor = MemberDescriptor::new(
            name.to_string(),
            DeclaredType::of::<S>(),
            kind,
            setter,
            inject,
        )?;
        self.info.members.push(descriptor);
        Ok(self)
    }

    /// Declares that `T` implements the capability `C`.
    ///
    /// ```
    /// use arbor_inject::{capability, ComponentType};
    ///
    /// trait Damageable { fn health(&self) -> u32; }
    /// capability!(dyn Damageable);
    ///
    /// struct Crate { hp: u32 }
    /// impl Damageable for Crate { fn health(&self) -> u32 { self.hp } }
    ///
    /// let ty = ComponentType::<Crate>::new()
    ///     .implements::<dyn Damageable>(|c| c as &dyn Damageable);
    /// ```
    #[must_use]
    pub fn implements<C: Target + ?Sized>(mut self, cast: fn(&T) -> &C) -> Self {
        let erased: Box<dyn ErasedCast<C>> = Box::new(TypedCast { cast });
        self.info.capabilities.insert(
            TypeId::of::<C>(),
            CapabilityEntry {
                name: type_name::<C>(),
                cast: Box::new(erased),
            },
        );
        self
    }

    /// Lets fallback creation construct `T` with `factory`.
    #[must_use]
    pub fn with_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> T + 'static,
    {
        self.info.factory = Some(Box::new(move || BoxedComponent::new(factory())));
        self
    }

    /// Lets fallback creation construct `T` with [`Default`].
    #[must_use]
    pub fn with_default_factory(self) -> Self
    where
        T: Default,
    {
        self.with_factory(T::default)
    }

    /// Registers a completion callback that takes no arguments.
    #[must_use]
    pub fn on_resolved<F>(self, name: &str, callback: F) -> Self
    where
        F: Fn(&mut T) + 'static,
    {
        self.try_on_resolved_with(name, move |owner: &mut T, _: &[AttachmentId]| {
            callback(owner);
            Ok::<(), core::convert::Infallible>(())
        })
    }

    /// Registers a completion callback that receives the resolved values.
    #[must_use]
    pub fn on_resolved_with<F>(self, name: &str, callback: F) -> Self
    where
        F: Fn(&mut T, &[AttachmentId]) + 'static,
    {
        self.try_on_resolved_with(name, move |owner: &mut T, values: &[AttachmentId]| {
            callback(owner, values);
            Ok::<(), core::convert::Infallible>(())
        })
    }

    /// Registers a fallible completion callback.
    ///
    /// A returned error is reported as a diagnostic; the member stays assigned.
    #[must_use]
    pub fn try_on_resolved_with<F, E>(mut self, name: &str, callback: F) -> Self
    where
        F: Fn(&mut T, &[AttachmentId]) -> Result<(), E> + 'static,
        E: fmt::Display,
    {
        let erased: CallbackFn =
            Box::new(move |owner: &mut dyn Component, values: &[AttachmentId]| {
                let owner = owner
                    .downcast_mut::<T>()
                    .ok_or(CallbackError::OwnerTypeMismatch {
                        expected: type_name::<T>(),
                    })?;
                callback(owner, values).map_err(|error| CallbackError::Failed(error.to_string()))
            });
        self.info.callbacks.insert(name.to_string(), erased);
        self
    }
}

impl<T: Component> Default for ComponentType<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast_owner<T: Component>(owner: &mut dyn Component) -> Result<&mut T, AssignError> {
    owner
        .downcast_mut::<T>()
        .ok_or(AssignError::OwnerTypeMismatch {
            expected: type_name::<T>(),
        })
}

// ─────────────────────────────────────────────────────────────────────────────
// ComponentRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// All registered component types, keyed by [`TypeId`].
#[derive(Default)]
pub struct ComponentRegistry {
    types: HashMap<TypeId, ComponentInfo>,
    implementors: HashMap<TypeId, Vec<TypeId>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T`, replacing any earlier registration.
    pub fn register<T: Component>(&mut self, ty: ComponentType<T>) -> &mut Self {
        let info = ty.info;
        let type_id = info.type_id;

        if self.types.contains_key(&type_id) {
            for implementors in self.implementors.values_mut() {
                implementors.retain(|id| *id != type_id);
            }
        }
        for capability in info.capabilities.keys() {
            self.implementors
                .entry(*capability)
                .or_default()
                .push(type_id);
        }

        tracing::debug!(
            component = info.type_name,
            members = info.members.len(),
            capabilities = info.capabilities.len(),
            "registered component type"
        );
        self.types.insert(type_id, info);
        self
    }

    /// Returns `true` if `T` is registered.
    #[must_use]
    pub fn contains<T: Component>(&self) -> bool {
        self.types.contains_key(&TypeId::of::<T>())
    }

    /// Returns the registration for `type_id`.
    #[must_use]
    pub fn get(&self, type_id: TypeId) -> Option<&ComponentInfo> {
        self.types.get(&type_id)
    }

    /// Returns the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns `true` if an attachment of runtime type `runtime` may be
    /// assigned to a member declaring `declared`.
    ///
    /// Component members accept exactly their type or any registered type
    /// that declares it through [`ComponentType::implements`]. Capability
    /// members accept any registered implementor.
    #[must_use]
    pub fn is_assignable(&self, runtime: TypeId, declared: &DeclaredType) -> bool {
        if declared.kind() == TargetKind::Component && runtime == declared.type_id() {
            return true;
        }
        self.types
            .get(&runtime)
            .is_some_and(|info| info.implements(declared.type_id()))
    }

    /// Returns every runtime type assignable to `declared`.
    #[must_use]
    pub fn assignable_types(&self, declared: &DeclaredType) -> Vec<TypeId> {
        let mut types = Vec::new();
        if declared.kind() == TargetKind::Component {
            types.push(declared.type_id());
        }
        for implementor in self.implementors.get(&declared.type_id()).into_iter().flatten() {
            if !types.contains(implementor) {
                types.push(*implementor);
            }
        }
        types
    }

    /// Views `component` as the capability `C`, if its type declares it.
    #[must_use]
    pub fn cast<'a, C: ?Sized + 'static>(&self, component: &'a dyn Component) -> Option<&'a C> {
        let info = self.types.get(&component.as_any().type_id())?;
        let entry = info.capabilities.get(&TypeId::of::<C>())?;
        entry
            .cast
            .downcast_ref::<Box<dyn ErasedCast<C>>>()?
            .cast(component)
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field(
                "types",
                &self
                    .types
                    .values()
                    .map(ComponentInfo::type_name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
