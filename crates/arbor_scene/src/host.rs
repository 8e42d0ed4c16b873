//! The boundary between a scene graph host and the resolver.
//!
//! The resolver never assumes a particular scene implementation. Everything
//! it needs from the host, reads during matching and the mutations
//! used by fallback creation, goes through [`SceneHost`].

use core::any::TypeId;

use crate::component::{BoxedComponent, Component};
use crate::id::{AttachmentId, NodeId};
use crate::scene::{AttachmentInfo, Scene, SceneError};

/// A hierarchical graph of nodes carrying attachments.
///
/// Implemented by [`Scene`]; other hosts can implement it to run the
/// resolver over their own node storage.
pub trait SceneHost {
    /// Returns every node, depth-first in a deterministic order.
    fn all_nodes(&self) -> Vec<NodeId>;

    /// Returns the attachments bound to `node`, in declaration order.
    fn attachments_of(&self, node: NodeId) -> &[AttachmentId];

    /// Returns the parent of `node`, or `None` for roots.
    fn parent_of(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the ordered children of `node`.
    fn children_of(&self, node: NodeId) -> &[NodeId];

    /// Returns the identity (name) of `node`.
    fn node_name(&self, node: NodeId) -> Option<&str>;

    /// Returns `true` if `node` exists.
    fn contains_node(&self, node: NodeId) -> bool;

    /// Returns bookkeeping data for an attachment.
    fn attachment_info(&self, attachment: AttachmentId) -> Option<AttachmentInfo>;

    /// Returns every attachment whose runtime type is exactly `type_id`.
    ///
    /// The default implementation scans [`all_nodes`](Self::all_nodes).
    fn attachments_of_type(&self, type_id: TypeId) -> Vec<AttachmentId> {
        self.all_nodes()
            .into_iter()
            .flat_map(|node| self.attachments_of(node).iter().copied())
            .filter(|attachment| {
                self.attachment_info(*attachment)
                    .is_some_and(|info| info.type_id == type_id)
            })
            .collect()
    }

    /// Returns the mutable component behind an attachment.
    fn component_mut(&mut self, attachment: AttachmentId) -> Option<&mut dyn Component>;

    /// Creates a new, unparented node.
    fn create_node(&mut self, name: &str) -> NodeId;

    /// Binds a new attachment to `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownNode`] if `node` does not exist.
    fn attach_boxed(
        &mut self,
        node: NodeId,
        component: BoxedComponent,
    ) -> Result<AttachmentId, SceneError>;

    /// Moves `node` under `new_parent` (or to the top level for `None`).
    ///
    /// # Errors
    ///
    /// Returns an error if a node is unknown or the move would create a cycle.
    fn reparent(&mut self, node: NodeId, new_parent: Option<NodeId>) -> Result<(), SceneError>;

    /// Puts `new_parent` in `node`'s position among its siblings, then moves
    /// `node` under it.
    ///
    /// # Errors
    ///
    /// Returns an error if a node is unknown or the move would create a cycle.
    fn insert_parent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), SceneError>;
}

impl SceneHost for Scene {
    fn all_nodes(&self) -> Vec<NodeId> {
        self.nodes()
    }

    fn attachments_of(&self, node: NodeId) -> &[AttachmentId] {
        self.attachments(node)
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node)
    }

    fn children_of(&self, node: NodeId) -> &[NodeId] {
        self.children(node)
    }

    fn node_name(&self, node: NodeId) -> Option<&str> {
        self.name(node)
    }

    fn contains_node(&self, node: NodeId) -> bool {
        self.contains(node)
    }

    fn attachment_info(&self, attachment: AttachmentId) -> Option<AttachmentInfo> {
        Scene::attachment_info(self, attachment)
    }

    fn attachments_of_type(&self, type_id: TypeId) -> Vec<AttachmentId> {
        Scene::attachments_of_type(self, type_id).to_vec()
    }

    fn component_mut(&mut self, attachment: AttachmentId) -> Option<&mut dyn Component> {
        Scene::component_mut(self, attachment)
    }

    fn create_node(&mut self, name: &str) -> NodeId {
        self.spawn(name)
    }

    fn attach_boxed(
        &mut self,
        node: NodeId,
        component: BoxedComponent,
    ) -> Result<AttachmentId, SceneError> {
        Scene::attach_boxed(self, node, component)
    }

    fn reparent(&mut self, node: NodeId, new_parent: Option<NodeId>) -> Result<(), SceneError> {
        Scene::reparent(self, node, new_parent)
    }

    fn insert_parent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), SceneError> {
        Scene::insert_parent(self, node, new_parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Light;
    struct Mesh;

    #[test]
    fn default_type_lookup_matches_indexed_lookup() {
        struct Wrapper(Scene);

        impl SceneHost for Wrapper {
            fn all_nodes(&self) -> Vec<NodeId> {
                self.0.all_nodes()
            }
            fn attachments_of(&self, node: NodeId) -> &[AttachmentId] {
                self.0.attachments_of(node)
            }
            fn parent_of(&self, node: NodeId) -> Option<NodeId> {
                self.0.parent_of(node)
            }
            fn children_of(&self, node: NodeId) -> &[NodeId] {
                self.0.children_of(node)
            }
            fn node_name(&self, node: NodeId) -> Option<&str> {
                self.0.node_name(node)
            }
            fn contains_node(&self, node: NodeId) -> bool {
                self.0.contains_node(node)
            }
            fn attachment_info(&self, attachment: AttachmentId) -> Option<AttachmentInfo> {
                SceneHost::attachment_info(&self.0, attachment)
            }
            fn component_mut(&mut self, attachment: AttachmentId) -> Option<&mut dyn Component> {
                SceneHost::component_mut(&mut self.0, attachment)
            }
            fn create_node(&mut self, name: &str) -> NodeId {
                self.0.create_node(name)
            }
            fn attach_boxed(
                &mut self,
                node: NodeId,
                component: BoxedComponent,
            ) -> Result<AttachmentId, SceneError> {
                SceneHost::attach_boxed(&mut self.0, node, component)
            }
            fn reparent(
                &mut self,
                node: NodeId,
                new_parent: Option<NodeId>,
            ) -> Result<(), SceneError> {
                SceneHost::reparent(&mut self.0, node, new_parent)
            }
            fn insert_parent(
                &mut self,
                node: NodeId,
                new_parent: NodeId,
            ) -> Result<(), SceneError> {
                SceneHost::insert_parent(&mut self.0, node, new_parent)
            }
        }

        let mut scene = Scene::new();
        let root = scene.spawn("Root");
        let child = scene.spawn_child(root, "Child").unwrap();
        let light_a = scene.attach(root, Light).unwrap();
        scene.attach(child, Mesh).unwrap();
        let light_b = scene.attach(child, Light).unwrap();

        let wrapper = Wrapper(scene);
        assert_eq!(
            wrapper.attachments_of_type(TypeId::of::<Light>()),
            vec![light_a, light_b]
        );
        assert_eq!(
            SceneHost::attachments_of_type(&wrapper.0, TypeId::of::<Light>()),
            vec![light_a, light_b]
        );
    }

    #[test]
    fn created_nodes_start_unparented() {
        let mut scene = Scene::new();
        let node = SceneHost::create_node(&mut scene, "Free");

        assert_eq!(scene.parent_of(node), None);
        assert_eq!(scene.node_name(node), Some("Free"));
        assert!(scene.roots().contains(&node));
    }
}
