//! Shared test utilities for `arbor_inject` integration tests.
//!
//! This module provides fixture component types and a registry describing
//! them. Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities: not all items used in every test binary"
)]

use arbor_inject::prelude::*;
use arbor_scene::{AttachmentId, Component, NodeId, Scene};
use tracing_subscriber::EnvFilter;

// ═══════════════════════════════════════════════════════════════════════════════
// TRACING
// ═══════════════════════════════════════════════════════════════════════════════

/// Routes resolver events to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// FIXTURE COMPONENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// A capability implemented by several unrelated components.
pub trait Damageable {
    fn health(&self) -> u32;
}

capability!(dyn Damageable);

/// A plain dependency target.
#[derive(Debug, Default)]
pub struct Beacon;

/// A dependency target with a factory, used by fallback tests.
#[derive(Debug, Default)]
pub struct Rigidbody {
    pub mass: f32,
}

/// A dependency target without a factory.
#[derive(Debug)]
pub struct Joint;

#[derive(Debug, Default)]
pub struct Armor {
    pub plates: u32,
}

impl Damageable for Armor {
    fn health(&self) -> u32 {
        self.plates * 10
    }
}

#[derive(Debug, Default)]
pub struct Barrel;

impl Damageable for Barrel {
    fn health(&self) -> u32 {
        5
    }
}

/// Looks for the one beacon anywhere in the scene.
#[derive(Debug, Default)]
pub struct Tracker {
    pub beacon: Ref<Beacon>,
}

/// Looks below itself for a node called `ChildGO`.
#[derive(Debug, Default)]
pub struct Spawner {
    pub child: Ref<Beacon>,
}

/// Collects every damageable thing in the scene.
#[derive(Debug, Default)]
pub struct Radar {
    pub targets: Refs<dyn Damageable>,
    pub scans: Vec<usize>,
}

/// Requires a rigidbody above it, creating one if needed.
#[derive(Debug, Default)]
pub struct Collider {
    pub body: Ref<Rigidbody>,
    pub attached: Vec<AttachmentId>,
}

/// Force-eligible owner with members that can never be created.
#[derive(Debug, Default)]
pub struct Hinge {
    pub body: Ref<Rigidbody>,
    pub joint: Ref<Joint>,
    pub shield: Ref<dyn Damageable>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Registers every fixture type.
pub fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry
        .register(ComponentType::<Beacon>::new())
        .register(ComponentType::<Rigidbody>::new().with_default_factory())
        .register(
            ComponentType::<Armor>::new().implements::<dyn Damageable>(|a| a as &dyn Damageable),
        )
        .register(
            ComponentType::<Barrel>::new().implements::<dyn Damageable>(|b| b as &dyn Damageable),
        )
        .register(
            ComponentType::<Tracker>::new()
                .field("beacon", |t: &mut Tracker| &mut t.beacon, Inject::anywhere())
                .expect("valid member"),
        )
        .register(
            ComponentType::<Spawner>::new()
                .field("ChildGO", |s: &mut Spawner| &mut s.child, Inject::below().by_name())
                .expect("valid member"),
        )
        .register(
            ComponentType::<Radar>::new()
                .field(
                    "targets",
                    |r: &mut Radar| &mut r.targets,
                    Inject::anywhere().on_resolved("scan"),
                )
                .expect("valid member")
                .on_resolved_with("scan", |r: &mut Radar, values| r.scans.push(values.len())),
        )
        .register(
            ComponentType::<Collider>::new()
                .field(
                    "body",
                    |c: &mut Collider| &mut c.body,
                    Inject::above().force_create().on_resolved("attached"),
                )
                .expect("valid member")
                .on_resolved_with("attached", |c: &mut Collider, values| {
                    c.attached.extend_from_slice(values);
                }),
        )
        .register(
            ComponentType::<Hinge>::new()
                .field("body", |h: &mut Hinge| &mut h.body, Inject::below().force_create())
                .expect("valid member")
                .field("joint", |h: &mut Hinge| &mut h.joint, Inject::below())
                .expect("valid member")
                .field("shield", |h: &mut Hinge| &mut h.shield, Inject::above())
                .expect("valid member"),
        );
    registry
}

// ═══════════════════════════════════════════════════════════════════════════════
// ASSERTION HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Returns the outcome of `member` on `owner`, panicking if it was not resolved.
pub fn outcome<'r>(
    report: &'r ResolutionReport,
    owner: AttachmentId,
    member: &str,
) -> &'r ResolutionOutcome {
    report
        .outcome(owner, member)
        .unwrap_or_else(|| panic!("no outcome for {owner}.{member}"))
}

/// Spawns a root node named `name` carrying `component`.
pub fn spawn_with<T: Component>(scene: &mut Scene, name: &str, component: T) -> AttachmentId {
    let node = scene.spawn(name);
    scene.attach(node, component).expect("node exists")
}

/// Spawns a chain `names[0] > names[1] > ...` and returns the node ids.
pub fn chain(scene: &mut Scene, names: &[&str]) -> Vec<NodeId> {
    let mut nodes: Vec<NodeId> = Vec::with_capacity(names.len());
    for name in names {
        let node = match nodes.last() {
            Some(parent) => scene.spawn_child(*parent, *name).expect("parent exists"),
            None => scene.spawn(*name),
        };
        nodes.push(node);
    }
    nodes
}
