//! Candidate matching: which attachments satisfy a member.
//!
//! An attachment qualifies when
//!
//! 1. its runtime type is assignable to the member's declared type
//!    (exact type, or a registered implementor), and
//! 2. the node that owns it passes the member's identity filter.

use arbor_scene::{AttachmentId, NodeId, SceneHost};

use crate::descriptor::MemberDescriptor;
use crate::registry::ComponentRegistry;

/// Returns `true` if `node` carries the identity `member` requires.
pub fn identity_matches<H: SceneHost + ?Sized>(
    host: &H,
    node: NodeId,
    member: &MemberDescriptor,
) -> bool {
    match member.required_identity() {
        None => true,
        Some(identity) => host.node_name(node) == Some(identity),
    }
}

/// Returns `true` if `attachment` has a type assignable to `member`.
pub fn type_matches<H: SceneHost + ?Sized>(
    host: &H,
    registry: &ComponentRegistry,
    attachment: AttachmentId,
    member: &MemberDescriptor,
) -> bool {
    host.attachment_info(attachment)
        .is_some_and(|info| registry.is_assignable(info.type_id, member.declared_type()))
}

/// Returns the candidates for `member` among the attachments of `node`, in
/// declaration order.
///
/// The returned iterator is lazy and can be cloned to restart it.
pub fn candidates_at<'a, H: SceneHost + ?Sized>(
    host: &'a H,
    registry: &'a ComponentRegistry,
    node: NodeId,
    member: &'a MemberDescriptor,
) -> impl Iterator<Item = AttachmentId> + Clone + 'a {
    let identity = identity_matches(host, node, member);
    host.attachments_of(node)
        .iter()
        .copied()
        .filter(move |attachment| {
            identity && type_matches(host, registry, *attachment, member)
        })
}
