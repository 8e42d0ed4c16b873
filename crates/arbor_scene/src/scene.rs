//! The reference scene graph.
//!
//! A [`Scene`] is a forest of named nodes. Each node owns an ordered list of
//! children and an ordered list of attachments. Roots are kept in creation
//! order so that every traversal over the scene is deterministic.

use core::any::TypeId;
use hashbrown::HashMap;

use crate::component::{BoxedComponent, Component};
use crate::id::{AttachmentId, IdAllocator, NodeId};

/// Errors that can occur while mutating a scene.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The node does not exist (never created or already despawned).
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// The attachment does not exist.
    #[error("unknown attachment: {0}")]
    UnknownAttachment(AttachmentId),

    /// Re-parenting would make a node its own ancestor.
    #[error("cannot parent {node} under {parent}: {parent} is {node} or one of its descendants")]
    Cycle {
        /// The node being moved.
        node: NodeId,
        /// The requested new parent.
        parent: NodeId,
    },
}

/// Read-only view of an attachment's bookkeeping data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentInfo {
    /// The attachment handle.
    pub id: AttachmentId,
    /// The node the attachment is bound to.
    pub node: NodeId,
    /// Runtime type of the attached component.
    pub type_id: TypeId,
    /// Type name of the attached component, for diagnostics.
    pub type_name: &'static str,
}

struct NodeEntry {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attachments: Vec<AttachmentId>,
}

struct AttachmentEntry {
    node: NodeId,
    type_id: TypeId,
    type_name: &'static str,
    component: Box<dyn Component>,
}

/// A hierarchical scene of nodes and their attachments.
///
/// # Example
///
/// ```
/// use arbor_scene::Scene;
///
/// struct Camera;
///
/// let mut scene = Scene::new();
/// let root = scene.spawn("World");
/// let player = scene.spawn_child(root, "Player").unwrap();
/// let camera = scene.attach(player, Camera).unwrap();
///
/// assert_eq!(scene.parent(player), Some(root));
/// assert_eq!(scene.owner(camera), Some(player));
/// ```
#[derive(Default)]
pub struct Scene {
    nodes: HashMap<NodeId, NodeEntry>,
    attachments: HashMap<AttachmentId, AttachmentEntry>,
    /// Attachments per runtime type, in attach order.
    by_type: HashMap<TypeId, Vec<AttachmentId>>,
    roots: Vec<NodeId>,
    allocator: IdAllocator,
}

impl Scene {
    /// Creates a new empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Structure
    // ─────────────────────────────────────────────────────────────────────

    /// Creates a new root node.
    pub fn spawn(&mut self, name: impl Into<String>) -> NodeId {
        let id = self.allocator.allocate_node_id();
        self.nodes.insert(
            id,
            NodeEntry {
                name: name.into(),
                parent: None,
                children: Vec::new(),
                attachments: Vec::new(),
            },
        );
        self.roots.push(id);
        id
    }

    /// Creates a new node as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownNode`] if `parent` does not exist.
    pub fn spawn_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
    ) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        let id = self.spawn(name);
        self.reparent(id, Some(parent))?;
        Ok(id)
    }

    /// Moves `node` under `new_parent`, or makes it a root when `None`.
    ///
    /// The node is appended after the new parent's existing children.
    ///
    /// # Errors
    ///
    /// - [`SceneError::UnknownNode`] if either node does not exist
    /// - [`SceneError::Cycle`] if `new_parent` is `node` or one of its descendants
    pub fn reparent(&mut self, node: NodeId, new_parent: Option<NodeId>) -> Result<(), SceneError> {
        if !self.nodes.contains_key(&node) {
            return Err(SceneError::UnknownNode(node));
        }
        if let Some(parent) = new_parent {
            if !self.nodes.contains_key(&parent) {
                return Err(SceneError::UnknownNode(parent));
            }
            if self.is_self_or_ancestor(node, parent) {
                return Err(SceneError::Cycle { node, parent });
            }
        }

        self.detach_from_parent(node);

        match new_parent {
            Some(parent) => {
                if let Some(entry) = self.nodes.get_mut(&parent) {
                    entry.children.push(node);
                }
            }
            None => self.roots.push(node),
        }
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.parent = new_parent;
        }
        Ok(())
    }

    /// Puts `new_parent` in `node`'s place and moves `node` under it.
    ///
    /// `new_parent` takes over `node`'s position among its former siblings
    /// (or among the roots), so the order of the surrounding nodes is
    /// unchanged. `node` becomes the last child of `new_parent`.
    ///
    /// # Errors
    ///
    /// - [`SceneError::UnknownNode`] if either node does not exist
    /// - [`SceneError::Cycle`] if `new_parent` is `node` or one of its descendants
    pub fn insert_parent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), SceneError> {
        for id in [node, new_parent] {
            if !self.nodes.contains_key(&id) {
                return Err(SceneError::UnknownNode(id));
            }
        }
        if self.is_self_or_ancestor(node, new_parent) {
            return Err(SceneError::Cycle {
                node,
                parent: new_parent,
            });
        }

        self.detach_from_parent(new_parent);

        let grandparent = self.parent(node);
        let siblings = match grandparent {
            Some(parent) => match self.nodes.get_mut(&parent) {
                Some(entry) => &mut entry.children,
                None => return Err(SceneError::UnknownNode(parent)),
            },
            None => &mut self.roots,
        };
        match siblings.iter().position(|sibling| *sibling == node) {
            Some(index) => siblings[index] = new_parent,
            None => siblings.push(new_parent),
        }

        if let Some(entry) = self.nodes.get_mut(&new_parent) {
            entry.parent = grandparent;
            entry.children.push(node);
        }
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.parent = Some(new_parent);
        }
        Ok(())
    }

    /// Removes `node`, its whole subtree and every attachment in it.
    ///
    /// Returns the number of nodes removed.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownNode`] if `node` does not exist.
    pub fn despawn(&mut self, node: NodeId) -> Result<usize, SceneError> {
        if !self.nodes.contains_key(&node) {
            return Err(SceneError::UnknownNode(node));
        }
        self.detach_from_parent(node);

        let mut removed = 0;
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(entry) = self.nodes.remove(&current) else {
                continue;
            };
            for attachment in entry.attachments {
                if let Some(removed_entry) = self.attachments.remove(&attachment)
                    && let Some(ids) = self.by_type.get_mut(&removed_entry.type_id)
                {
                    ids.retain(|id| *id != attachment);
                }
            }
            stack.extend(entry.children);
            removed += 1;
        }
        Ok(removed)
    }

    /// Renames a node.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownNode`] if `node` does not exist.
    pub fn rename(&mut self, node: NodeId, name: impl Into<String>) -> Result<(), SceneError> {
        let entry = self
            .nodes
            .get_mut(&node)
            .ok_or(SceneError::UnknownNode(node))?;
        entry.name = name.into();
        Ok(())
    }

    /// Returns `true` if `ancestor` is `node` itself or lies on the path
    /// from `node` up to its root.
    fn is_self_or_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn detach_from_parent(&mut self, node: NodeId) {
        match self.parent(node) {
            Some(parent) => {
                if let Some(entry) = self.nodes.get_mut(&parent) {
                    entry.children.retain(|child| *child != node);
                }
            }
            None => self.roots.retain(|root| *root != node),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    /// Returns `true` if the node exists.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Returns the node's name.
    #[must_use]
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|entry| entry.name.as_str())
    }

    /// Returns the node's parent, or `None` for roots and unknown nodes.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|entry| entry.parent)
    }

    /// Returns the node's children in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|entry| entry.children.as_slice())
            .unwrap_or_default()
    }

    /// Returns the attachments bound to the node, in attach order.
    #[must_use]
    pub fn attachments(&self, node: NodeId) -> &[AttachmentId] {
        self.nodes
            .get(&node)
            .map(|entry| entry.attachments.as_slice())
            .unwrap_or_default()
    }

    /// Returns the root nodes in creation order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Returns every node, depth-first from each root in root order.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Returns every node with the given name, in traversal order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Vec<NodeId> {
        self.nodes()
            .into_iter()
            .filter(|node| self.name(*node) == Some(name))
            .collect()
    }

    /// Returns the number of nodes in the scene.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of attachments in the scene.
    #[must_use]
    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    /// Returns `true` if the scene has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Attachments
    // ─────────────────────────────────────────────────────────────────────

    /// Attaches a component to `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownNode`] if `node` does not exist.
    pub fn attach<T: Component>(
        &mut self,
        node: NodeId,
        component: T,
    ) -> Result<AttachmentId, SceneError> {
        self.attach_boxed(node, BoxedComponent::new(component))
    }

    /// Attaches a type-erased component to `node`.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownNode`] if `node` does not exist.
    pub fn attach_boxed(
        &mut self,
        node: NodeId,
        component: BoxedComponent,
    ) -> Result<AttachmentId, SceneError> {
        if !self.nodes.contains_key(&node) {
            return Err(SceneError::UnknownNode(node));
        }
        let id = self.allocator.allocate_attachment_id();
        let (type_id, type_name, component) = component.into_parts();

        self.attachments.insert(
            id,
            AttachmentEntry {
                node,
                type_id,
                type_name,
                component,
            },
        );
        self.by_type.entry(type_id).or_default().push(id);
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.attachments.push(id);
        }
        Ok(id)
    }

    /// Removes an attachment from its node.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::UnknownAttachment`] if the attachment does not exist.
    pub fn detach(&mut self, attachment: AttachmentId) -> Result<(), SceneError> {
        let entry = self
            .attachments
            .remove(&attachment)
            .ok_or(SceneError::UnknownAttachment(attachment))?;
        if let Some(node) = self.nodes.get_mut(&entry.node) {
            node.attachments.retain(|id| *id != attachment);
        }
        if let Some(ids) = self.by_type.get_mut(&entry.type_id) {
            ids.retain(|id| *id != attachment);
        }
        Ok(())
    }

    /// Returns the node an attachment is bound to.
    #[must_use]
    pub fn owner(&self, attachment: AttachmentId) -> Option<NodeId> {
        self.attachments.get(&attachment).map(|entry| entry.node)
    }

    /// Returns bookkeeping data for an attachment.
    #[must_use]
    pub fn attachment_info(&self, attachment: AttachmentId) -> Option<AttachmentInfo> {
        self.attachments
            .get(&attachment)
            .map(|entry| AttachmentInfo {
                id: attachment,
                node: entry.node,
                type_id: entry.type_id,
                type_name: entry.type_name,
            })
    }

    /// Returns every attachment of exactly the given runtime type, in attach order.
    #[must_use]
    pub fn attachments_of_type(&self, type_id: TypeId) -> &[AttachmentId] {
        self.by_type
            .get(&type_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the type-erased component behind an attachment.
    #[must_use]
    pub fn component(&self, attachment: AttachmentId) -> Option<&dyn Component> {
        self.attachments
            .get(&attachment)
            .map(|entry| &*entry.component)
    }

    /// Returns the mutable type-erased component behind an attachment.
    #[must_use]
    pub fn component_mut(&mut self, attachment: AttachmentId) -> Option<&mut dyn Component> {
        self.attachments
            .get_mut(&attachment)
            .map(|entry| &mut *entry.component)
    }

    /// Returns the component behind an attachment if it has type `T`.
    #[must_use]
    pub fn get<T: Component>(&self, attachment: AttachmentId) -> Option<&T> {
        self.component(attachment)
            .and_then(|component| component.downcast_ref::<T>())
    }

    /// Returns the mutable component behind an attachment if it has type `T`.
    #[must_use]
    pub fn get_mut<T: Component>(&mut self, attachment: AttachmentId) -> Option<&mut T> {
        self.component_mut(attachment)
            .and_then(|component| component.downcast_mut::<T>())
    }
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.len())
            .field("attachments", &self.attachments.len())
            .field("roots", &self.roots)
            .finish()
    }
}
