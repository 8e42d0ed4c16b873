//! Error types for descriptor construction and resolution.
//!
//! Errors fall into three classes:
//!
//! | Type | When | Effect |
//! |------|------|--------|
//! | [`DescriptorError`] | registering a member | registration is rejected |
//! | [`ResolveError`] | during a pass | the pass aborts |
//! | [`AssignError`], [`CallbackError`] | per member | reported, pass continues |

use arbor_scene::{AttachmentId, NodeId};

use crate::descriptor::SearchScope;

/// An illegal combination of member metadata, detected at registration time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    /// Explicit keys name a node relative to a hierarchy position, which a
    /// global search does not have.
    #[error("member `{member}` combines explicit-key disambiguation with global scope")]
    KeyWithGlobalScope {
        /// The offending member.
        member: String,
    },

    /// Explicit-key disambiguation was requested with an empty key.
    #[error("member `{member}` uses explicit-key disambiguation with an empty key")]
    EmptyKey {
        /// The offending member.
        member: String,
    },

    /// Force-creation is only available to ancestor, descendant and global searches.
    #[error("member `{member}` requests force-creation with {scope} scope")]
    ForceCreateScope {
        /// The offending member.
        member: String,
        /// The declared search scope.
        scope: SearchScope,
    },

    /// Capabilities have no concrete type to instantiate.
    #[error("member `{member}` requests force-creation of capability `{capability}`")]
    ForceCreateCapability {
        /// The offending member.
        member: String,
        /// The capability type name.
        capability: &'static str,
    },

    /// Member names must be non-empty.
    #[error("member name must not be empty")]
    EmptyName,

    /// The same member name was registered twice on one owner type.
    #[error("member `{member}` is declared twice on `{owner}`")]
    DuplicateMember {
        /// The owner type name.
        owner: &'static str,
        /// The duplicated member.
        member: String,
    },
}

/// A failure that aborts a whole resolution pass.
///
/// These indicate a caller error (unknown root) or a host that broke its
/// contract while the pass was running, never bad scene data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The subtree root passed to the resolver does not exist.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// The attachment passed to the resolver does not exist.
    #[error("unknown attachment: {0}")]
    UnknownAttachment(AttachmentId),

    /// The host stopped reporting an entity the pass had already observed.
    #[error("host invariant violated: {0}")]
    HostInvariant(String),
}

/// A failure while writing resolved values into a member.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignError {
    /// A single-valued member received a number of values other than one.
    #[error("expected {expected} value(s), found {found}")]
    CardinalityMismatch {
        /// The number of values the member accepts.
        expected: usize,
        /// The number of values supplied.
        found: usize,
    },

    /// The owner component is not of the type the member was registered on.
    #[error("owner is not a `{expected}`")]
    OwnerTypeMismatch {
        /// The registered owner type name.
        expected: &'static str,
    },

    /// The member has no setter.
    #[error("member is not settable")]
    NotSettable,
}

/// A failure while invoking a completion callback.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallbackError {
    /// No callback with this name is registered on the owner type.
    #[error("no completion callback named `{name}`")]
    Missing {
        /// The requested callback name.
        name: String,
    },

    /// The owner component is not of the type the callback was registered on.
    #[error("owner is not a `{expected}`")]
    OwnerTypeMismatch {
        /// The registered owner type name.
        expected: &'static str,
    },

    /// The owner attachment no longer exists.
    #[error("unknown owner: {0}")]
    UnknownOwner(AttachmentId),

    /// The callback itself reported an error.
    #[error("callback failed: {0}")]
    Failed(String),
}
