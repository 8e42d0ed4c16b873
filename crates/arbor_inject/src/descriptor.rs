//! Member descriptors: the resolution metadata carried by an injectable member.
//!
//! A descriptor is built from an [`Inject`] configuration when a member is
//! registered on a [`ComponentType`](crate::registry::ComponentType).
//! Illegal metadata combinations are rejected there, so every descriptor the
//! resolver sees is valid.

use core::any::{TypeId, type_name};
use core::fmt;

use arbor_scene::{AttachmentId, Component};

use crate::error::{AssignError, DescriptorError};
use crate::slot::{Slot, Target, TargetKind};

/// Where the resolver searches for candidates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum SearchScope {
    /// The owner's node and everything below it, matched as one flat set.
    Local,
    /// The owner's ancestors, nearest first.
    Ancestors,
    /// The owner's descendants, nearest generation first.
    Descendants,
    /// Every attachment in the graph.
    Global,
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Local => "local",
            Self::Ancestors => "ancestors",
            Self::Descendants => "descendants",
            Self::Global => "global",
        };
        f.write_str(name)
    }
}

/// The identity filter applied on top of structural matching.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Disambiguation {
    /// No identity filter.
    None,
    /// The owning node's name must equal the member's explicit key.
    ByExplicitKey,
    /// The owning node's name must equal the member's name.
    ByName,
}

/// The type a member declares, as seen by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeclaredType {
    type_id: TypeId,
    type_name: &'static str,
    kind: TargetKind,
    collection: bool,
}

impl DeclaredType {
    /// Describes the element type and cardinality of slot `S`.
    #[must_use]
    pub fn of<S: Slot>() -> Self {
        Self {
            type_id: TypeId::of::<S::Target>(),
            type_name: type_name::<S::Target>(),
            kind: <S::Target as Target>::KIND,
            collection: S::COLLECTION,
        }
    }

    /// Returns the element type id.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the element type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns whether the element type is a component or a capability.
    #[must_use]
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Returns `true` for collection members.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.collection
    }
}

/// Resolution settings for one member.
///
/// ```
/// use arbor_inject::Inject;
///
/// let inject = Inject::above().by_name().on_resolved("on_parent").force_create();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inject {
    scope: SearchScope,
    disambiguation: Disambiguation,
    key: Option<String>,
    callback: Option<String>,
    force_create: bool,
}

impl Inject {
    /// Creates settings for the given scope with no disambiguation.
    #[must_use]
    pub fn new(scope: SearchScope) -> Self {
        Self {
            scope,
            disambiguation: Disambiguation::None,
            key: None,
            callback: None,
            force_create: false,
        }
    }

    /// Searches the owner's node and its subtree.
    #[must_use]
    pub fn here() -> Self {
        Self::new(SearchScope::Local)
    }

    /// Searches the owner's ancestors, nearest first.
    #[must_use]
    pub fn above() -> Self {
        Self::new(SearchScope::Ancestors)
    }

    /// Searches the owner's descendants, nearest generation first.
    #[must_use]
    pub fn below() -> Self {
        Self::new(SearchScope::Descendants)
    }

    /// Searches the whole graph.
    #[must_use]
    pub fn anywhere() -> Self {
        Self::new(SearchScope::Global)
    }

    /// Only accepts candidates whose node is named like the member.
    #[must_use]
    pub fn by_name(mut self) -> Self {
        self.disambiguation = Disambiguation::ByName;
        self.key = None;
        self
    }

    /// Only accepts candidates whose node is named `key`.
    #[must_use]
    pub fn by_key(mut self, key: impl Into<String>) -> Self {
        self.disambiguation = Disambiguation::ByExplicitKey;
        self.key = Some(key.into());
        self
    }

    /// Invokes the named completion callback after a successful assignment.
    #[must_use]
    pub fn on_resolved(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// Creates a new node and component when nothing matches.
    #[must_use]
    pub fn force_create(mut self) -> Self {
        self.force_create = true;
        self
    }
}

/// How a member is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum MemberKind {
    /// A slot the resolver writes in place.
    Field,
    /// A setter that receives a freshly filled slot.
    Property,
}

pub(crate) type Setter =
    Box<dyn Fn(&mut dyn Component, &[AttachmentId]) -> Result<(), AssignError>>;

/// An injectable member of a registered component type.
pub struct MemberDescriptor {
    name: String,
    declared: DeclaredType,
    scope: SearchScope,
    disambiguation: Disambiguation,
    key: Option<String>,
    callback: Option<String>,
    force_create: bool,
    kind: MemberKind,
    setter: Option<Setter>,
}

impl MemberDescriptor {
    /// Validates `inject` against the declared type and builds a descriptor.
    ///
    /// # Errors
    ///
    /// Returns a [`DescriptorError`] for an empty name, an explicit key with
    /// global scope, an empty key, or a force-creation request that can never
    /// be honoured.
    pub(crate) fn new(
        name: String,
        declared: DeclaredType,
        kind: MemberKind,
        setter: Option<Setter>,
        inject: Inject,
    ) -> Result<Self, DescriptorError> {
        if name.is_empty() {
            return Err(DescriptorError::EmptyName);
        }

        if inject.disambiguation == Disambiguation::ByExplicitKey {
            if inject.scope == SearchScope::Global {
                return Err(DescriptorError::KeyWithGlobalScope { member: name });
            }
            if inject.key.as_deref().is_none_or(str::is_empty) {
                return Err(DescriptorError::EmptyKey { member: name });
            }
        }

        if inject.force_create {
            if inject.scope == SearchScope::Local {
                return Err(DescriptorError::ForceCreateScope {
                    member: name,
                    scope: inject.scope,
                });
            }
            if declared.kind == TargetKind::Capability {
                return Err(DescriptorError::ForceCreateCapability {
                    member: name,
                    capability: declared.type_name,
                });
            }
        }

        Ok(Self {
            name,
            declared,
            scope: inject.scope,
            disambiguation: inject.disambiguation,
            key: inject.key,
            callback: inject.callback,
            force_create: inject.force_create,
            kind,
            setter,
        })
    }

    /// Returns the member name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared element type and cardinality.
    #[must_use]
    pub fn declared_type(&self) -> &DeclaredType {
        &self.declared
    }

    /// Returns the search scope.
    #[must_use]
    pub fn search_scope(&self) -> SearchScope {
        self.scope
    }

    /// Returns the identity filter.
    #[must_use]
    pub fn disambiguation(&self) -> Disambiguation {
        self.disambiguation
    }

    /// Returns the explicit key, present only with [`Disambiguation::ByExplicitKey`].
    #[must_use]
    pub fn explicit_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the completion callback name.
    #[must_use]
    pub fn completion_callback(&self) -> Option<&str> {
        self.callback.as_deref()
    }

    /// Returns `true` if the member asks for force-creation.
    #[must_use]
    pub fn force_create(&self) -> bool {
        self.force_create
    }

    /// Returns how the member is written.
    #[must_use]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Returns `true` if the resolver can write this member.
    #[must_use]
    pub fn is_settable(&self) -> bool {
        self.setter.is_some()
    }

    /// The node name candidates must carry, if any.
    pub(crate) fn required_identity(&self) -> Option<&str> {
        match self.disambiguation {
            Disambiguation::None => None,
            Disambiguation::ByName => Some(&self.name),
            Disambiguation::ByExplicitKey => self.key.as_deref(),
        }
    }

    /// Writes `values` into the member on `owner`.
    pub(crate) fn assign(
        &self,
        owner: &mut dyn Component,
        values: &[AttachmentId],
    ) -> Result<(), AssignError> {
        match &self.setter {
            Some(setter) => setter(owner, values),
            None => Err(AssignError::NotSettable),
        }
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("declared", &self.declared)
            .field("scope", &self.scope)
            .field("disambiguation", &self.disambiguation)
            .field("key", &self.key)
            .field("callback", &self.callback)
            .field("force_create", &self.force_create)
            .field("kind", &self.kind)
            .field("settable", &self.is_settable())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{Ref, Refs};

    struct Engine;
    trait Powered {}
    crate::capability!(dyn Powered);

    fn build(
        name: &str,
        declared: DeclaredType,
        inject: Inject,
    ) -> Result<MemberDescriptor, DescriptorError> {
        MemberDescriptor::new(name.to_string(), declared, MemberKind::Field, None, inject)
    }

    #[test]
    fn explicit_key_with_global_scope_is_rejected() {
        let result = build(
            "engine",
            DeclaredType::of::<Ref<Engine>>(),
            Inject::anywhere().by_key("Main"),
        );
        assert_eq!(
            result.unwrap_err(),
            DescriptorError::KeyWithGlobalScope {
                member: "engine".into()
            }
        );
    }

    #[test]
    fn empty_key_is_rejected() {
        let result = build(
            "engine",
            DeclaredType::of::<Ref<Engine>>(),
            Inject::above().by_key(""),
        );
        assert!(matches!(result, Err(DescriptorError::EmptyKey { .. })));
    }

    #[test]
    fn force_create_needs_searchable_scope_and_concrete_type() {
        let local = build(
            "engine",
            DeclaredType::of::<Ref<Engine>>(),
            Inject::here().force_create(),
        );
        assert!(matches!(
            local,
            Err(DescriptorError::ForceCreateScope {
                scope: SearchScope::Local,
                ..
            })
        ));

        let capability = build(
            "power",
            DeclaredType::of::<Ref<dyn Powered>>(),
            Inject::above().force_create(),
        );
        assert!(matches!(
            capability,
            Err(DescriptorError::ForceCreateCapability { .. })
        ));

        let ok = build(
            "engine",
            DeclaredType::of::<Ref<Engine>>(),
            Inject::below().force_create(),
        );
        assert!(ok.unwrap().force_create());
    }

    #[test]
    fn required_identity_follows_disambiguation() {
        let by_name = build(
            "Wheel",
            DeclaredType::of::<Refs<Engine>>(),
            Inject::below().by_name(),
        )
        .unwrap();
        assert_eq!(by_name.required_identity(), Some("Wheel"));
        assert_eq!(by_name.explicit_key(), None);

        let by_key = build(
            "wheel",
            DeclaredType::of::<Ref<Engine>>(),
            Inject::below().by_key("Front"),
        )
        .unwrap();
        assert_eq!(by_key.required_identity(), Some("Front"));

        let plain =
            build("wheel", DeclaredType::of::<Ref<Engine>>(), Inject::below()).unwrap();
        assert_eq!(plain.required_identity(), None);
    }

    #[test]
    fn descriptor_without_setter_is_not_settable() {
        let mut owner = Engine;
        let descriptor =
            build("engine", DeclaredType::of::<Ref<Engine>>(), Inject::above()).unwrap();

        assert!(!descriptor.is_settable());
        assert_eq!(
            descriptor.assign(&mut owner, &[]),
            Err(AssignError::NotSettable)
        );
    }

    #[test]
    fn declared_type_captures_cardinality() {
        let single = DeclaredType::of::<Ref<dyn Powered>>();
        assert_eq!(single.kind(), TargetKind::Capability);
        assert!(!single.is_collection());

        let many = DeclaredType::of::<Refs<Engine>>();
        assert_eq!(many.type_id(), TypeId::of::<Engine>());
        assert!(many.is_collection());
    }
}
