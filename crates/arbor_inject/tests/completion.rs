//! Integration tests for completion callbacks and member discovery.

mod test_utils;

use arbor_inject::prelude::*;
use arbor_scene::{AttachmentId, Scene};
use test_utils::*;

#[derive(Debug, Default)]
struct Turret {
    target: Ref<Beacon>,
    spotters: Refs<Beacon>,
    readout: Ref<Beacon>,
    armed: u32,
    received: Vec<AttachmentId>,
}

impl Turret {
    fn set_readout(&mut self, readout: Ref<Beacon>) {
        self.readout = readout;
    }
}

fn turret_registry(
    extra: impl FnOnce(ComponentType<Turret>) -> ComponentType<Turret>,
) -> ComponentRegistry {
    let mut registry = registry();
    let turret = ComponentType::<Turret>::new()
        .field(
            "target",
            |t: &mut Turret| &mut t.target,
            Inject::above().on_resolved("arm"),
        )
        .expect("valid member")
        .field(
            "spotters",
            |t: &mut Turret| &mut t.spotters,
            Inject::below().on_resolved("receive"),
        )
        .expect("valid member")
        .property(
            "readout",
            Turret::set_readout,
            Inject::above().on_resolved("missing"),
        )
        .expect("valid member")
        .getter_only::<Ref<Beacon>>("status", Inject::above())
        .expect("valid member")
        .on_resolved("arm", |t| t.armed += 1)
        .on_resolved_with("receive", |t, values| t.received = values.to_vec());
    registry.register(extra(turret));
    registry
}

fn scene_with_turret() -> (Scene, AttachmentId, AttachmentId, Vec<AttachmentId>) {
    let mut scene = Scene::new();
    let base = scene.spawn("Base");
    let beacon = scene.attach(base, Beacon).unwrap();
    let turret_node = scene.spawn_child(base, "Turret").unwrap();
    let turret = scene.attach(turret_node, Turret::default()).unwrap();
    let spotters = (0..2)
        .map(|i| {
            let node = scene.spawn_child(turret_node, format!("Spotter{i}")).unwrap();
            scene.attach(node, Beacon).unwrap()
        })
        .collect();
    (scene, turret, beacon, spotters)
}

#[test]
fn callbacks_run_after_assignment() {
    let registry = turret_registry(|t| t);
    let (mut scene, turret, beacon, spotters) = scene_with_turret();

    let report = Resolver::new(&registry).resolve_graph(&mut scene).unwrap();

    let state = scene.get::<Turret>(turret).unwrap();
    assert_eq!(state.target.id(), Some(beacon));
    assert_eq!(state.readout.id(), Some(beacon));
    assert_eq!(state.armed, 1);
    assert_eq!(state.received, spotters);
    assert_eq!(
        outcome(&report, turret, "spotters").values(),
        spotters.as_slice()
    );
}

#[test]
fn missing_callback_is_reported_but_value_stays_assigned() {
    let registry = turret_registry(|t| t);
    let (mut scene, turret, beacon, _) = scene_with_turret();

    let report = Resolver::new(&registry).resolve_graph(&mut scene).unwrap();

    assert_eq!(
        outcome(&report, turret, "readout"),
        &ResolutionOutcome::Assigned(vec![beacon])
    );
    let diagnostic = report
        .diagnostics()
        .for_member(turret, "readout")
        .next()
        .unwrap();
    assert_eq!(diagnostic.kind, DiagnosticKind::CallbackMissing);
    assert_eq!(diagnostic.severity, Severity::Error);
}

#[test]
fn failing_callback_is_reported() {
    let registry = turret_registry(|t| {
        t.try_on_resolved_with("missing", |_, _| Err("readout offline"))
    });
    let (mut scene, turret, _, _) = scene_with_turret();

    let report = Resolver::new(&registry).resolve_graph(&mut scene).unwrap();

    let diagnostic = report
        .diagnostics()
        .for_member(turret, "readout")
        .next()
        .unwrap();
    assert_eq!(diagnostic.kind, DiagnosticKind::CallbackFailed);
    assert!(diagnostic.message.contains("readout offline"));
    assert!(outcome(&report, turret, "readout").is_assigned());
}

#[test]
fn callbacks_can_be_disabled() {
    let registry = turret_registry(|t| t);
    let (mut scene, turret, _, _) = scene_with_turret();

    let config = ResolverConfig::default().with_completion_callbacks(false);
    Resolver::with_config(&registry, config)
        .resolve_graph(&mut scene)
        .unwrap();

    let state = scene.get::<Turret>(turret).unwrap();
    assert!(state.target.is_resolved());
    assert_eq!(state.armed, 0);
    assert!(state.received.is_empty());
}

#[test]
fn getter_only_member_is_reported_and_skipped() {
    let registry = turret_registry(|t| t);
    let (mut scene, turret, _, _) = scene_with_turret();

    let report = Resolver::new(&registry).resolve_graph(&mut scene).unwrap();

    assert!(report.outcome(turret, "status").is_none());
    let warnings: Vec<_> = report
        .diagnostics()
        .with_severity(Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].member, "status");
    assert_eq!(warnings[0].kind, DiagnosticKind::NotSettable);
}
