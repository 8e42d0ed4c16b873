//! The four search strategies and cardinality handling.
//!
//! | Scope | Single-valued | Collection |
//! |-------|---------------|------------|
//! | Local | one match in the owner's node and subtree | every match there |
//! | Ancestors | nearest ancestor with matches | every match on every ancestor |
//! | Descendants | nearest generation with matches | every match below, pre-order |
//! | Global | one match in the whole graph | every match, creation order |
//!
//! A single-valued search that sees several matches at the deciding level
//! reports them all as ambiguous instead of picking one.

use arbor_scene::{AttachmentId, NodeId, SceneHost};

use crate::descriptor::{MemberDescriptor, SearchScope};
use crate::matcher::{candidates_at, identity_matches};
use crate::registry::ComponentRegistry;
use crate::traversal::{ancestors_of, descendants_of, descendants_with_depth};

/// The result of searching for one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Search {
    /// Values to assign; exactly one for single-valued members.
    Found(Vec<AttachmentId>),
    /// Nothing matched.
    NotFound,
    /// Several candidates competed for a single-valued member.
    Ambiguous(Vec<AttachmentId>),
}

impl Search {
    fn single(candidates: Vec<AttachmentId>) -> Self {
        match candidates.len() {
            0 => Self::NotFound,
            1 => Self::Found(candidates),
            _ => Self::Ambiguous(candidates),
        }
    }

    fn all(candidates: Vec<AttachmentId>) -> Self {
        if candidates.is_empty() {
            Self::NotFound
        } else {
            Self::Found(candidates)
        }
    }
}

/// Searches for `member` on behalf of an owner living on `owner_node`.
pub fn search<H: SceneHost + ?Sized>(
    host: &H,
    registry: &ComponentRegistry,
    owner_node: NodeId,
    member: &MemberDescriptor,
) -> Search {
    let collection = member.declared_type().is_collection();
    match member.search_scope() {
        SearchScope::Local => {
            let candidates = local(host, registry, owner_node, member);
            if collection {
                Search::all(candidates)
            } else {
                Search::single(candidates)
            }
        }
        SearchScope::Ancestors if collection => {
            let candidates = ancestors_of(host, owner_node)
                .flat_map(|node| candidates_at(host, registry, node, member))
                .collect();
            Search::all(candidates)
        }
        SearchScope::Ancestors => nearest_ancestor(host, registry, owner_node, member),
        SearchScope::Descendants if collection => {
            let candidates = descendants_of(host, owner_node)
                .flat_map(|node| candidates_at(host, registry, node, member))
                .collect();
            Search::all(candidates)
        }
        SearchScope::Descendants => nearest_generation(host, registry, owner_node, member),
        SearchScope::Global => {
            let candidates = global(host, registry, member);
            if collection {
                Search::all(candidates)
            } else {
                Search::single(candidates)
            }
        }
    }
}

fn local<H: SceneHost + ?Sized>(
    host: &H,
    registry: &ComponentRegistry,
    owner_node: NodeId,
    member: &MemberDescriptor,
) -> Vec<AttachmentId> {
    core::iter::once(owner_node)
        .chain(descendants_of(host, owner_node))
        .flat_map(|node| candidates_at(host, registry, node, member))
        .collect()
}

fn nearest_ancestor<H: SceneHost + ?Sized>(
    host: &H,
    registry: &ComponentRegistry,
    owner_node: NodeId,
    member: &MemberDescriptor,
) -> Search {
    ancestors_of(host, owner_node)
        .map(|node| candidates_at(host, registry, node, member).collect::<Vec<_>>())
        .find(|candidates| !candidates.is_empty())
        .map_or(Search::NotFound, Search::single)
}

fn nearest_generation<H: SceneHost + ?Sized>(
    host: &H,
    registry: &ComponentRegistry,
    owner_node: NodeId,
    member: &MemberDescriptor,
) -> Search {
    // Pre-order does not visit generations contiguously, so keep the
    // shallowest non-empty generation seen so far.
    let mut best: Option<(usize, Vec<AttachmentId>)> = None;
    for (depth, node) in descendants_with_depth(host, owner_node) {
        if best.as_ref().is_some_and(|(best_depth, _)| depth > *best_depth) {
            continue;
        }
        let found: Vec<_> = candidates_at(host, registry, node, member).collect();
        if found.is_empty() {
            continue;
        }
        if let Some((best_depth, candidates)) = &mut best
            && *best_depth == depth
        {
            candidates.extend(found);
        } else {
            best = Some((depth, found));
        }
    }
    best.map_or(Search::NotFound, |(_, candidates)| Search::single(candidates))
}

fn global<H: SceneHost + ?Sized>(
    host: &H,
    registry: &ComponentRegistry,
    member: &MemberDescriptor,
) -> Vec<AttachmentId> {
    let mut candidates: Vec<AttachmentId> = registry
        .assignable_types(member.declared_type())
        .into_iter()
        .flat_map(|type_id| host.attachments_of_type(type_id))
        .filter(|attachment| {
            host.attachment_info(*attachment)
                .is_some_and(|info| identity_matches(host, info.node, member))
        })
        .collect();
    candidates.sort_unstable();
    candidates
}
