//! Force-injection: creating a missing dependency in the graph.
//!
//! A new node named after the member is created with a fresh component of
//! the declared type, then wired in so the same search would find it:
//!
//! - **Descendants**: the new node becomes a child of the owner's node.
//! - **Ancestors**: the new node takes the owner node's place (same parent,
//!   same position among its siblings) and the owner node moves under it.
//! - **Global**: the new node stays a free root.

use arbor_scene::{AttachmentId, NodeId, SceneError, SceneHost};

use crate::descriptor::{MemberDescriptor, SearchScope};
use crate::registry::ComponentRegistry;
use crate::slot::TargetKind;

/// Why a fallback creation could not be performed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FallbackError {
    /// The declared type is a capability and cannot be instantiated.
    #[error("cannot create an instance of capability `{0}`")]
    CapabilityNotConstructible(&'static str),

    /// The declared type has no registered factory.
    #[error("no factory registered for `{0}`")]
    MissingFactory(&'static str),

    /// Local searches never create dependencies.
    #[error("{0} scope does not support fallback creation")]
    UnsupportedScope(SearchScope),

    /// The host rejected one of the mutations.
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// A dependency created by [`force_inject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Created {
    /// The new node.
    pub node: NodeId,
    /// The new attachment on that node.
    pub attachment: AttachmentId,
}

/// Creates and wires a dependency for `member` of an owner on `owner_node`.
///
/// Nothing is created when the type cannot be instantiated.
///
/// # Errors
///
/// Returns a [`FallbackError`] when the member's type cannot be
/// instantiated or the host rejects a mutation.
pub fn force_inject<H: SceneHost + ?Sized>(
    host: &mut H,
    registry: &ComponentRegistry,
    owner_node: NodeId,
    member: &MemberDescriptor,
) -> Result<Created, FallbackError> {
    let declared = member.declared_type();
    if declared.kind() == TargetKind::Capability {
        return Err(FallbackError::CapabilityNotConstructible(declared.type_name()));
    }
    let scope = member.search_scope();
    if scope == SearchScope::Local {
        return Err(FallbackError::UnsupportedScope(scope));
    }
    let component = registry
        .get(declared.type_id())
        .and_then(|info| info.instantiate())
        .ok_or(FallbackError::MissingFactory(declared.type_name()))?;

    let node = host.create_node(member.name());
    let attachment = host.attach_boxed(node, component)?;

    match scope {
        SearchScope::Descendants => host.reparent(node, Some(owner_node))?,
        SearchScope::Ancestors => host.insert_parent(owner_node, node)?,
        SearchScope::Global | SearchScope::Local => {}
    }

    tracing::debug!(
        member = member.name(),
        declared = declared.type_name(),
        %node,
        %attachment,
        %scope,
        "force-injected missing dependency"
    );
    Ok(Created { node, attachment })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Inject;
    use crate::registry::ComponentType;
    use crate::slot::Ref;
    use arbor_scene::Scene;
    use core::any::TypeId;

    #[derive(Default)]
    struct Rigidbody;
    struct Shape;

    trait Solid {}
    crate::capability!(dyn Solid);

    #[derive(Default)]
    struct Collider {
        body: Ref<Rigidbody>,
        shape: Ref<Shape>,
        solid: Ref<dyn Solid>,
    }

    fn registry(inject: fn() -> Inject) -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.register(ComponentType::<Rigidbody>::new().with_default_factory());
        registry.register(
            ComponentType::<Collider>::new()
                .field("body", |c: &mut Collider| &mut c.body, inject().force_create())
                .unwrap()
                .field("shape", |c: &mut Collider| &mut c.shape, inject().force_create())
                .unwrap()
                .field("solid", |c: &mut Collider| &mut c.solid, inject())
                .unwrap(),
        );
        registry
    }

    fn member<'r>(registry: &'r ComponentRegistry, name: &str) -> &'r MemberDescriptor {
        registry
            .get(TypeId::of::<Collider>())
            .unwrap()
            .members()
            .iter()
            .find(|m| m.name() == name)
            .unwrap()
    }

    #[test]
    fn descendant_fallback_creates_child() {
        let registry = registry(Inject::below);
        let mut scene = Scene::new();
        let owner = scene.spawn("owner");

        let created =
            force_inject(&mut scene, &registry, owner, member(&registry, "body")).unwrap();

        assert_eq!(scene.parent(created.node), Some(owner));
        assert_eq!(scene.name(created.node), Some("body"));
        assert!(scene.get::<Rigidbody>(created.attachment).is_some());
    }

    #[test]
    fn ancestor_fallback_splices_above_owner() {
        let registry = registry(Inject::above);
        let mut scene = Scene::new();
        let world = scene.spawn("world");
        let before = scene.spawn_child(world, "before").unwrap();
        let owner = scene.spawn_child(world, "owner").unwrap();
        let after = scene.spawn_child(world, "after").unwrap();

        let created =
            force_inject(&mut scene, &registry, owner, member(&registry, "body")).unwrap();

        assert_eq!(scene.parent(owner), Some(created.node));
        assert_eq!(scene.parent(created.node), Some(world));
        assert_eq!(scene.children(world), &[before, created.node, after]);
    }

    #[test]
    fn ancestor_fallback_on_root_owner_creates_new_root() {
        let registry = registry(Inject::above);
        let mut scene = Scene::new();
        let owner = scene.spawn("owner");

        let created =
            force_inject(&mut scene, &registry, owner, member(&registry, "body")).unwrap();

        assert_eq!(scene.parent(created.node), None);
        assert_eq!(scene.parent(owner), Some(created.node));
        assert_eq!(scene.roots(), &[created.node]);
    }

    #[test]
    fn global_fallback_creates_free_root() {
        let registry = registry(Inject::anywhere);
        let mut scene = Scene::new();
        let owner = scene.spawn("owner");

        let created =
            force_inject(&mut scene, &registry, owner, member(&registry, "body")).unwrap();

        assert_eq!(scene.parent(created.node), None);
        assert_eq!(scene.parent(owner), None);
    }

    #[test]
    fn uninstantiable_types_create_nothing() {
        let registry = registry(Inject::below);
        let mut scene = Scene::new();
        let owner = scene.spawn("owner");

        assert_eq!(
            force_inject(&mut scene, &registry, owner, member(&registry, "shape")),
            Err(FallbackError::MissingFactory(core::any::type_name::<Shape>()))
        );
        assert!(matches!(
            force_inject(&mut scene, &registry, owner, member(&registry, "solid")),
            Err(FallbackError::CapabilityNotConstructible(_))
        ));
        assert_eq!(scene.node_count(), 1);
    }
}
