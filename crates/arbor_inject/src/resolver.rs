//! The resolution orchestrator.
//!
//! A pass snapshots the owners in scope, then for every owner with a
//! registered type:
//!
//! 1. discovers its resolvable members,
//! 2. searches for each member with its strategy,
//! 3. assigns the result, or falls back to creating the dependency,
//! 4. dispatches the member's completion callback.
//!
//! Per-member problems are recorded in the [`ResolutionReport`] and never
//! abort the pass. Nodes created by fallback during a pass are not visited
//! by that same pass.

use core::fmt::Write as _;

use arbor_scene::{AttachmentId, Component, NodeId, SceneHost};
use serde::Serialize;

use crate::completion::dispatch;
use crate::config::ResolverConfig;
use crate::descriptor::{MemberDescriptor, SearchScope};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::discovery::discover;
use crate::error::{CallbackError, ResolveError};
use crate::fallback::{FallbackError, force_inject};
use crate::registry::{ComponentInfo, ComponentRegistry};
use crate::strategy::{Search, search};
use crate::traversal::descendants_of;

// ─────────────────────────────────────────────────────────────────────────────
// Outcomes
// ─────────────────────────────────────────────────────────────────────────────

/// Why a member was left unassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No candidate matched.
    NotFound,
    /// Several candidates matched a single-valued member.
    Ambiguous,
    /// Nothing matched and fallback creation was impossible.
    FallbackFailed,
    /// The values could not be written into the member.
    AssignmentFailed,
}

/// The final state of one member after a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// Assigned from existing attachments.
    Assigned(Vec<AttachmentId>),
    /// Assigned an attachment created by fallback.
    AssignedByFallback(AttachmentId),
    /// Left unassigned.
    Failed(FailureReason),
}

impl ResolutionOutcome {
    /// Returns `true` for either assigned state.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Returns the assigned values; empty when failed.
    #[must_use]
    pub fn values(&self) -> &[AttachmentId] {
        match self {
            Self::Assigned(values) => values,
            Self::AssignedByFallback(value) => core::slice::from_ref(value),
            Self::Failed(_) => &[],
        }
    }

    /// Returns the failure reason, if any.
    #[must_use]
    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            Self::Failed(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// The outcome of one member of one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberResolution {
    /// The owner attachment.
    pub owner: AttachmentId,
    /// The owner's node.
    pub node: NodeId,
    /// The owner's type name.
    pub owner_type: &'static str,
    /// The member name.
    pub member: String,
    /// What happened.
    pub outcome: ResolutionOutcome,
}

/// Everything a pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    resolutions: Vec<MemberResolution>,
    diagnostics: Diagnostics,
    created_nodes: Vec<NodeId>,
}

impl ResolutionReport {
    /// Returns every member outcome in processing order.
    #[must_use]
    pub fn resolutions(&self) -> &[MemberResolution] {
        &self.resolutions
    }

    /// Returns the diagnostics emitted during the pass.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Returns the nodes created by fallback, in creation order.
    #[must_use]
    pub fn created_nodes(&self) -> &[NodeId] {
        &self.created_nodes
    }

    /// Returns the outcome of `member` on `owner`.
    #[must_use]
    pub fn outcome(&self, owner: AttachmentId, member: &str) -> Option<&ResolutionOutcome> {
        self.resolutions
            .iter()
            .find(|resolution| resolution.owner == owner && resolution.member == member)
            .map(|resolution| &resolution.outcome)
    }

    /// Returns the number of assigned members.
    #[must_use]
    pub fn assigned_count(&self) -> usize {
        self.resolutions
            .iter()
            .filter(|resolution| resolution.outcome.is_assigned())
            .count()
    }

    /// Returns the number of failed members.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.resolutions.len() - self.assigned_count()
    }

    /// Returns `true` if no warning or error was reported.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.diagnostics.has_problems()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolver
// ─────────────────────────────────────────────────────────────────────────────

/// Resolves injectable members against a [`SceneHost`].
///
/// ```
/// use arbor_inject::{ComponentRegistry, ComponentType, Inject, Ref, Resolver};
/// use arbor_scene::Scene;
///
/// struct Body;
///
/// #[derive(Default)]
/// struct Wheel {
///     body: Ref<Body>,
/// }
///
/// let mut registry = ComponentRegistry::new();
/// registry.register(
///     ComponentType::<Wheel>::new()
///         .field("body", |w: &mut Wheel| &mut w.body, Inject::above())
///         .unwrap(),
/// );
///
/// let mut scene = Scene::new();
/// let car = scene.spawn("Car");
/// let body = scene.attach(car, Body).unwrap();
/// let front = scene.spawn_child(car, "Front").unwrap();
/// let wheel = scene.attach(front, Wheel::default()).unwrap();
///
/// let report = Resolver::new(&registry).resolve_graph(&mut scene).unwrap();
///
/// assert!(report.is_clean());
/// assert_eq!(scene.get::<Wheel>(wheel).unwrap().body.id(), Some(body));
/// ```
#[derive(Debug, Clone)]
pub struct Resolver<'r> {
    registry: &'r ComponentRegistry,
    config: ResolverConfig,
}

struct Site<'r> {
    owner: AttachmentId,
    node: NodeId,
    node_name: String,
    info: &'r ComponentInfo,
}

impl Site<'_> {
    fn diagnostic(
        &self,
        member: &MemberDescriptor,
        kind: DiagnosticKind,
        message: String,
    ) -> Diagnostic {
        Diagnostic {
            severity: kind.severity(),
            kind,
            message,
            node: self.node,
            node_name: self.node_name.clone(),
            owner: self.owner,
            owner_type: self.info.type_name(),
            member: member.name().to_string(),
            declared_type: member.declared_type().type_name(),
        }
    }
}

impl<'r> Resolver<'r> {
    /// Creates a resolver with the default configuration.
    #[must_use]
    pub fn new(registry: &'r ComponentRegistry) -> Self {
        Self::with_config(registry, ResolverConfig::default())
    }

    /// Creates a resolver with `config`.
    #[must_use]
    pub fn with_config(registry: &'r ComponentRegistry, config: ResolverConfig) -> Self {
        Self { registry, config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves every owner in the graph.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::HostInvariant`] if the host loses an owner
    /// mid-pass.
    pub fn resolve_graph<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
    ) -> Result<ResolutionReport, ResolveError> {
        let _span = tracing::info_span!("resolve_graph").entered();
        let nodes = host.all_nodes();
        self.run(host, &nodes)
    }

    /// Resolves every owner on `root` and its descendants.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownNode`] if `root` does not exist, or
    /// [`ResolveError::HostInvariant`] if the host loses an owner mid-pass.
    pub fn resolve_subtree<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        root: NodeId,
    ) -> Result<ResolutionReport, ResolveError> {
        if !host.contains_node(root) {
            return Err(ResolveError::UnknownNode(root));
        }
        let _span = tracing::info_span!("resolve_subtree", %root).entered();
        let nodes: Vec<NodeId> = core::iter::once(root)
            .chain(descendants_of(&*host, root))
            .collect();
        self.run(host, &nodes)
    }

    /// Resolves the members of a single owner.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownAttachment`] if `owner` does not exist.
    pub fn resolve_attachment<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        owner: AttachmentId,
    ) -> Result<ResolutionReport, ResolveError> {
        if host.attachment_info(owner).is_none() {
            return Err(ResolveError::UnknownAttachment(owner));
        }
        let _span = tracing::info_span!("resolve_attachment", %owner).entered();
        let mut report = ResolutionReport::default();
        self.resolve_owner(host, owner, &mut report)?;
        Ok(report)
    }

    fn run<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        nodes: &[NodeId],
    ) -> Result<ResolutionReport, ResolveError> {
        let owners: Vec<AttachmentId> = nodes
            .iter()
            .flat_map(|node| host.attachments_of(*node).iter().copied())
            .collect();

        let mut report = ResolutionReport::default();
        for owner in &owners {
            self.resolve_owner(host, *owner, &mut report)?;
        }

        tracing::info!(
            owners = owners.len(),
            assigned = report.assigned_count(),
            failed = report.failed_count(),
            created = report.created_nodes.len(),
            "resolution pass complete"
        );
        Ok(report)
    }

    fn resolve_owner<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        owner: AttachmentId,
        report: &mut ResolutionReport,
    ) -> Result<(), ResolveError> {
        let attachment = host.attachment_info(owner).ok_or_else(|| {
            ResolveError::HostInvariant(format!("{owner} disappeared during resolution"))
        })?;
        let Some(info) = self.registry.get(attachment.type_id) else {
            return Ok(());
        };
        let site = Site {
            owner,
            node: attachment.node,
            node_name: host
                .node_name(attachment.node)
                .unwrap_or_default()
                .to_string(),
            info,
        };

        let discovery = discover(info);
        for member in &discovery.rejected {
            report.diagnostics.push(site.diagnostic(
                member,
                DiagnosticKind::NotSettable,
                format!(
                    "member `{}` declares injection but has no setter; skipped",
                    member.name()
                ),
            ));
        }

        tracing::trace!(
            owner = %owner,
            component = info.type_name(),
            members = discovery.members.len(),
            "resolving owner"
        );
        for member in discovery.members {
            let outcome =
                self.resolve_member(host, &site, member, discovery.force_eligible, report)?;
            report.resolutions.push(MemberResolution {
                owner,
                node: site.node,
                owner_type: info.type_name(),
                member: member.name().to_string(),
                outcome,
            });
        }
        Ok(())
    }

    fn resolve_member<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        site: &Site<'_>,
        member: &MemberDescriptor,
        force_eligible: bool,
        report: &mut ResolutionReport,
    ) -> Result<ResolutionOutcome, ResolveError> {
        match search(&*host, self.registry, site.node, member) {
            Search::Found(values) => {
                if !self.assign(host, site, member, &values, report)? {
                    return Ok(ResolutionOutcome::Failed(FailureReason::AssignmentFailed));
                }
                self.complete(host, site, member, &values, report);
                Ok(ResolutionOutcome::Assigned(values))
            }
            Search::Ambiguous(candidates) => {
                let mut message =
                    format!("{} candidates match a single-valued member", candidates.len());
                let listing = self.describe_candidates(&*host, &candidates);
                if !listing.is_empty() {
                    let _ = write!(message, ": {listing}");
                }
                report.diagnostics.push(site.diagnostic(
                    member,
                    DiagnosticKind::Ambiguous { candidates },
                    message,
                ));
                Ok(ResolutionOutcome::Failed(FailureReason::Ambiguous))
            }
            Search::NotFound if self.may_force_inject(member, force_eligible) => {
                self.fall_back(host, site, member, report)
            }
            Search::NotFound => {
                report.diagnostics.push(site.diagnostic(
                    member,
                    DiagnosticKind::NotFound,
                    format!(
                        "no `{}` found in {} scope",
                        member.declared_type().type_name(),
                        member.search_scope()
                    ),
                ));
                Ok(ResolutionOutcome::Failed(FailureReason::NotFound))
            }
        }
    }

    fn may_force_inject(&self, member: &MemberDescriptor, force_eligible: bool) -> bool {
        self.config.force_injection
            && force_eligible
            && !member.declared_type().is_collection()
            && member.search_scope() != SearchScope::Local
    }

    fn fall_back<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        site: &Site<'_>,
        member: &MemberDescriptor,
        report: &mut ResolutionReport,
    ) -> Result<ResolutionOutcome, ResolveError> {
        let created = match force_inject(host, self.registry, site.node, member) {
            Ok(created) => created,
            Err(error) => {
                let kind = match error {
                    FallbackError::CapabilityNotConstructible(_) => {
                        DiagnosticKind::CapabilityNotConstructible
                    }
                    FallbackError::MissingFactory(_) => DiagnosticKind::MissingFactory,
                    FallbackError::UnsupportedScope(_) | FallbackError::Scene(_) => {
                        DiagnosticKind::FallbackRejected
                    }
                };
                report.diagnostics.push(site.diagnostic(
                    member,
                    kind,
                    format!("nothing matched and fallback creation failed: {error}"),
                ));
                return Ok(ResolutionOutcome::Failed(FailureReason::FallbackFailed));
            }
        };

        report.created_nodes.push(created.node);
        report.diagnostics.push(site.diagnostic(
            member,
            DiagnosticKind::FallbackCreated {
                node: created.node,
                attachment: created.attachment,
            },
            format!(
                "created `{}` on new node {}",
                member.declared_type().type_name(),
                created.node
            ),
        ));

        let values = [created.attachment];
        if !self.assign(host, site, member, &values, report)? {
            return Ok(ResolutionOutcome::Failed(FailureReason::AssignmentFailed));
        }
        self.complete(host, site, member, &values, report);
        Ok(ResolutionOutcome::AssignedByFallback(created.attachment))
    }

    /// Writes `values` into the member; returns `false` after reporting a failure.
    fn assign<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        site: &Site<'_>,
        member: &MemberDescriptor,
        values: &[AttachmentId],
        report: &mut ResolutionReport,
    ) -> Result<bool, ResolveError> {
        let owner = owner_mut(host, site.owner)?;
        match member.assign(owner, values) {
            Ok(()) => Ok(true),
            Err(error) => {
                report.diagnostics.push(site.diagnostic(
                    member,
                    DiagnosticKind::AssignmentFailed,
                    format!("could not assign resolved values: {error}"),
                ));
                Ok(false)
            }
        }
    }

    fn complete<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        site: &Site<'_>,
        member: &MemberDescriptor,
        values: &[AttachmentId],
        report: &mut ResolutionReport,
    ) {
        if !self.config.completion_callbacks {
            return;
        }
        let Some(callback) = member.completion_callback() else {
            return;
        };
        if let Err(error) = dispatch(host, site.info, site.owner, callback, values) {
            let kind = match error {
                CallbackError::Missing { .. } => DiagnosticKind::CallbackMissing,
                _ => DiagnosticKind::CallbackFailed,
            };
            report.diagnostics.push(site.diagnostic(
                member,
                kind,
                format!("completion callback `{callback}`: {error}"),
            ));
        }
    }

    fn describe_candidates<H: SceneHost + ?Sized>(
        &self,
        host: &H,
        candidates: &[AttachmentId],
    ) -> String {
        let limit = self.config.ambiguity_listing_limit;
        let mut listing = String::new();
        for (index, candidate) in candidates.iter().take(limit).enumerate() {
            let separator = if index == 0 { "" } else { ", " };
            let name = host
                .attachment_info(*candidate)
                .and_then(|info| host.node_name(info.node))
                .unwrap_or("?");
            let _ = write!(listing, "{separator}{candidate} on `{name}`");
        }
        let hidden = candidates.len().saturating_sub(limit);
        if hidden > 0 && !listing.is_empty() {
            let _ = write!(listing, " and {hidden} more");
        }
        listing
    }
}

fn owner_mut<H: SceneHost + ?Sized>(
    host: &mut H,
    owner: AttachmentId,
) -> Result<&mut dyn Component, ResolveError> {
    host.component_mut(owner).ok_or_else(|| {
        ResolveError::HostInvariant(format!("{owner} disappeared during resolution"))
    })
}
