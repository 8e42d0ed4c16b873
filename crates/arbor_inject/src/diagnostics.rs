//! Structured diagnostics collected during a resolution pass.
//!
//! Every per-member failure is recorded as a [`Diagnostic`] in the
//! [`ResolutionReport`](crate::resolver::ResolutionReport) and emitted as a
//! `tracing` event at the matching level, so hosts can either inspect the
//! report or route the events through their subscriber.

use core::fmt;

use arbor_scene::{AttachmentId, NodeId};
use serde::Serialize;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational, e.g. a fallback creation.
    Note,
    /// Suspicious configuration that was skipped.
    Warning,
    /// A member that could not be resolved.
    Error,
}

/// What went wrong (or happened).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// No candidate matched and no fallback applied.
    NotFound,
    /// More than one candidate matched where one was required.
    Ambiguous {
        /// Every conflicting candidate.
        candidates: Vec<AttachmentId>,
    },
    /// A member declared injection metadata but has no setter.
    NotSettable,
    /// Fallback creation was requested for a capability.
    CapabilityNotConstructible,
    /// Fallback creation found no factory for the declared type.
    MissingFactory,
    /// The host refused a fallback mutation.
    FallbackRejected,
    /// A completion callback name did not resolve.
    CallbackMissing,
    /// A completion callback ran and failed.
    CallbackFailed,
    /// Writing the resolved values into the member failed.
    AssignmentFailed,
    /// A node and component were created by fallback.
    FallbackCreated {
        /// The created node.
        node: NodeId,
        /// The created attachment.
        attachment: AttachmentId,
    },
}

impl DiagnosticKind {
    /// Returns the default severity for this kind.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::FallbackCreated { .. } => Severity::Note,
            Self::NotSettable => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A single reported event, attributed to a member of an owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Structured kind.
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    /// Human-readable message.
    pub message: String,
    /// The owner's node.
    pub node: NodeId,
    /// The owner node's name at the time of the pass.
    pub node_name: String,
    /// The owner attachment.
    pub owner: AttachmentId,
    /// The owner's type name.
    pub owner_type: &'static str,
    /// The member concerned.
    pub member: String,
    /// The member's declared element type.
    pub declared_type: &'static str,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} on `{}` ({}): {}",
            self.owner_type, self.member, self.node_name, self.node, self.message
        )
    }
}

/// An ordered list of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Records `diagnostic` and emits it as a tracing event.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => tracing::error!(
                owner = diagnostic.owner_type,
                member = %diagnostic.member,
                node = %diagnostic.node,
                node_name = %diagnostic.node_name,
                declared = diagnostic.declared_type,
                "{}",
                diagnostic.message
            ),
            Severity::Warning => tracing::warn!(
                owner = diagnostic.owner_type,
                member = %diagnostic.member,
                node = %diagnostic.node,
                node_name = %diagnostic.node_name,
                declared = diagnostic.declared_type,
                "{}",
                diagnostic.message
            ),
            Severity::Note => tracing::debug!(
                owner = diagnostic.owner_type,
                member = %diagnostic.member,
                node = %diagnostic.node,
                node_name = %diagnostic.node_name,
                declared = diagnostic.declared_type,
                "{}",
                diagnostic.message
            ),
        }
        self.entries.push(diagnostic);
    }

    /// Iterates in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Iterates over diagnostics at exactly `severity`.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.severity == severity)
    }

    /// Iterates over diagnostics concerning `member` of `owner`.
    pub fn for_member<'a>(
        &'a self,
        owner: AttachmentId,
        member: &'a str,
    ) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.entries
            .iter()
            .filter(move |d| d.owner == owner && d.member == member)
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if any warning or error was reported.
    #[must_use]
    pub fn has_problems(&self) -> bool {
        self.entries.iter().any(|d| d.severity > Severity::Note)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = core::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: DiagnosticKind) -> Diagnostic {
        Diagnostic {
            severity: kind.severity(),
            kind,
            message: "nothing matched".into(),
            node: NodeId::new(1),
            node_name: "Front".into(),
            owner: AttachmentId::new(2),
            owner_type: "Wheel",
            member: "body".into(),
            declared_type: "Body",
        }
    }

    #[test]
    fn severities_follow_kind() {
        assert_eq!(DiagnosticKind::NotFound.severity(), Severity::Error);
        assert_eq!(DiagnosticKind::NotSettable.severity(), Severity::Warning);
        assert_eq!(
            DiagnosticKind::FallbackCreated {
                node: NodeId::new(0),
                attachment: AttachmentId::new(0)
            }
            .severity(),
            Severity::Note
        );
    }

    #[test]
    fn notes_are_not_problems() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.push(sample(DiagnosticKind::FallbackCreated {
            node: NodeId::new(3),
            attachment: AttachmentId::new(4),
        }));
        assert!(!diagnostics.has_problems());

        diagnostics.push(sample(DiagnosticKind::NotFound));
        assert!(diagnostics.has_problems());
        assert_eq!(diagnostics.with_severity(Severity::Error).count(), 1);
        assert_eq!(
            diagnostics.for_member(AttachmentId::new(2), "body").count(),
            2
        );
    }

    #[test]
    fn serializes_with_flattened_kind() {
        let diagnostic = sample(DiagnosticKind::Ambiguous {
            candidates: vec![AttachmentId::new(5), AttachmentId::new(6)],
        });
        let json = serde_json::to_value(&diagnostic).unwrap();

        assert_eq!(json["kind"], "ambiguous");
        assert_eq!(json["severity"], "error");
        assert_eq!(json["member"], "body");
        assert_eq!(json["node_name"], "Front");
        assert_eq!(json["candidates"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn display_names_the_member() {
        let diagnostic = sample(DiagnosticKind::NotFound);
        assert_eq!(
            diagnostic.to_string(),
            "Wheel.body on `Front` (node_1): nothing matched"
        );
    }
}
