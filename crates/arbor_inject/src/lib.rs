//! Declarative dependency resolution for Arbor scenes (Layer 2).
//!
//! Components declare injectable members once, in a [`ComponentRegistry`].
//! A [`Resolver`] then walks a [`SceneHost`](arbor_scene::SceneHost) and
//! fills every member from the graph:
//!
//! - **where** to look: [`SearchScope`] (local, ancestors, descendants, global)
//! - **what** matches: the member's declared type, a concrete component or a
//!   capability declared with [`capability!`]
//! - **which** node: an optional identity filter ([`Disambiguation`])
//! - **how many**: [`Ref`] for one value, [`Refs`] for all of them
//!
//! When nothing matches, owners that opt in get the dependency created for
//! them ([`Inject::force_create`]). Members can name a completion callback
//! that runs right after assignment.
//!
//! # Example
//!
//! ```
//! use arbor_inject::prelude::*;
//! use arbor_scene::Scene;
//!
//! #[derive(Default)]
//! struct Rigidbody;
//!
//! #[derive(Default)]
//! struct Collider {
//!     body: Ref<Rigidbody>,
//! }
//!
//! let mut registry = ComponentRegistry::new();
//! registry.register(ComponentType::<Rigidbody>::new().with_default_factory());
//! registry.register(
//!     ComponentType::<Collider>::new()
//!         .field("body", |c: &mut Collider| &mut c.body, Inject::above().force_create())
//!         .unwrap(),
//! );
//!
//! let mut scene = Scene::new();
//! let crate_node = scene.spawn("Crate");
//! let collider = scene.attach(crate_node, Collider::default()).unwrap();
//!
//! let report = Resolver::new(&registry).resolve_graph(&mut scene).unwrap();
//!
//! let body = scene.get::<Collider>(collider).unwrap().body;
//! assert!(body.get(&scene).is_some());
//! assert_eq!(report.created_nodes().len(), 1);
//! ```

/// Completion callback dispatch.
pub mod completion;

/// Resolver configuration.
pub mod config;

/// Member descriptors and injection settings.
pub mod descriptor;

/// Structured diagnostics.
pub mod diagnostics;

/// Member discovery.
pub mod discovery;

/// Error types.
pub mod error;

/// Force-injection of missing dependencies.
pub mod fallback;

/// Candidate matching.
pub mod matcher;

/// Component type registration.
pub mod registry;

/// The resolution orchestrator.
pub mod resolver;

/// Member slot types.
pub mod slot;

/// Search strategies.
pub mod strategy;

/// Hierarchy traversal.
pub mod traversal;

pub use config::ResolverConfig;
pub use descriptor::{
    DeclaredType, Disambiguation, Inject, MemberDescriptor, MemberKind, SearchScope,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{AssignError, CallbackError, DescriptorError, ResolveError};
pub use registry::{ComponentInfo, ComponentRegistry, ComponentType};
pub use resolver::{
    FailureReason, MemberResolution, ResolutionOutcome, ResolutionReport, Resolver,
};
pub use slot::{Ref, Refs, Slot, Target, TargetKind};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::capability;
    pub use crate::config::ResolverConfig;
    pub use crate::descriptor::{Inject, SearchScope};
    pub use crate::diagnostics::{DiagnosticKind, Severity};
    pub use crate::registry::{ComponentRegistry, ComponentType};
    pub use crate::resolver::{FailureReason, ResolutionOutcome, ResolutionReport, Resolver};
    pub use crate::slot::{Ref, Refs};
}
