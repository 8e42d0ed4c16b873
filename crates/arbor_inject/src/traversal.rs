//! Hierarchy walks used by the search strategies.
//!
//! Both walks are lazy and recomputed on every call; they read the host as it
//! is when iteration happens.

use arbor_scene::{NodeId, SceneHost};

/// Walks from a node's parent up to its root, nearest first.
///
/// The starting node itself is not yielded.
pub struct Ancestors<'h, H: ?Sized> {
    host: &'h H,
    next: Option<NodeId>,
}

impl<H: SceneHost + ?Sized> Iterator for Ancestors<'_, H> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.host.parent_of(current);
        Some(current)
    }
}

/// Returns the ancestors of `node`, nearest first.
pub fn ancestors_of<H: SceneHost + ?Sized>(host: &H, node: NodeId) -> Ancestors<'_, H> {
    Ancestors {
        host,
        next: host.parent_of(node),
    }
}

/// Depth-first pre-order walk below a node, yielding `(depth, node)`.
///
/// Direct children have depth 1. Children are visited in host order, and
/// every node is visited before its own children.
pub struct Descendants<'h, H: ?Sized> {
    host: &'h H,
    stack: Vec<(usize, NodeId)>,
}

impl<H: SceneHost + ?Sized> Iterator for Descendants<'_, H> {
    type Item = (usize, NodeId);

    fn next(&mut self) -> Option<(usize, NodeId)> {
        let (depth, node) = self.stack.pop()?;
        self.stack.extend(
            self.host
                .children_of(node)
                .iter()
                .rev()
                .map(|child| (depth + 1, *child)),
        );
        Some((depth, node))
    }
}

/// Returns every descendant of `node` with its depth below `node`.
pub fn descendants_with_depth<H: SceneHost + ?Sized>(host: &H, node: NodeId) -> Descendants<'_, H> {
    let stack = host
        .children_of(node)
        .iter()
        .rev()
        .map(|child| (1, *child))
        .collect();
    Descendants { host, stack }
}

/// Returns every descendant of `node` in depth-first pre-order.
pub fn descendants_of<H: SceneHost + ?Sized>(
    host: &H,
    node: NodeId,
) -> impl Iterator<Item = NodeId> + '_ {
    descendants_with_depth(host, node).map(|(_, node)| node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_scene::Scene;

    //   root
    //   ├── a
    //   │   ├── a1
    //   │   └── a2
    //   │       └── a2x
    //   └── b
    fn tree() -> (Scene, [NodeId; 6]) {
        let mut scene = Scene::new();
        let root = scene.spawn("root");
        let a = scene.spawn_child(root, "a").unwrap();
        let a1 = scene.spawn_child(a, "a1").unwrap();
        let a2 = scene.spawn_child(a, "a2").unwrap();
        let a2x = scene.spawn_child(a2, "a2x").unwrap();
        let b = scene.spawn_child(root, "b").unwrap();
        (scene, [root, a, a1, a2, a2x, b])
    }

    #[test]
    fn ancestors_are_nearest_first() {
        let (scene, [root, a, _, a2, a2x, _]) = tree();

        assert_eq!(ancestors_of(&scene, a2x).collect::<Vec<_>>(), vec![a2, a, root]);
        assert_eq!(ancestors_of(&scene, root).count(), 0);
    }

    #[test]
    fn descendants_are_pre_order() {
        let (scene, [root, a, a1, a2, a2x, b]) = tree();

        assert_eq!(
            descendants_of(&scene, root).collect::<Vec<_>>(),
            vec![a, a1, a2, a2x, b]
        );
        assert_eq!(
            descendants_with_depth(&scene, root).collect::<Vec<_>>(),
            vec![(1, a), (2, a1), (2, a2), (3, a2x), (1, b)]
        );
        assert_eq!(descendants_of(&scene, b).count(), 0);
    }

    #[test]
    fn walks_observe_current_structure() {
        let (mut scene, [root, a, _, a2, a2x, b]) = tree();
        scene.reparent(a2, Some(b)).unwrap();

        assert_eq!(ancestors_of(&scene, a2x).collect::<Vec<_>>(), vec![a2, b, root]);
        assert!(!descendants_of(&scene, a).any(|n| n == a2x));
    }
}
