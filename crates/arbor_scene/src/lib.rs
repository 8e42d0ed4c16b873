//! The scene graph layer of Arbor (Layer 1).
//!
//! `arbor_scene` provides the hierarchy the resolver works on:
//!
//! - [`Scene`] - a forest of named nodes with ordered children and attachments
//! - [`Component`] - payload carried by an attachment (any `'static` type)
//! - [`NodeId`] / [`AttachmentId`] - copyable handles; equal handles mean the
//!   same entity
//! - [`SceneHost`] - the boundary trait the resolver consumes, so hosts other
//!   than [`Scene`] can be plugged in
//!
//! # Architecture
//!
//! - **Layer 1** (`arbor_scene`): scene storage and the host boundary (this crate)
//! - **Layer 2** (`arbor_inject`): member discovery, matching and resolution
//!
//! # Example
//!
//! ```
//! use arbor_scene::{Scene, SceneHost};
//!
//! struct Transform { x: f32 }
//!
//! let mut scene = Scene::new();
//! let world = scene.spawn("World");
//! let player = scene.spawn_child(world, "Player").unwrap();
//! let transform = scene.attach(player, Transform { x: 1.0 }).unwrap();
//!
//! assert_eq!(scene.all_nodes(), vec![world, player]);
//! assert_eq!(scene.get::<Transform>(transform).map(|t| t.x), Some(1.0));
//! ```

/// Component trait and type-erased component boxes.
pub mod component;

/// The host boundary trait.
pub mod host;

/// Node and attachment handles.
pub mod id;

/// The reference scene implementation.
pub mod scene;

pub use component::{BoxedComponent, Component};
pub use host::SceneHost;
pub use id::{AttachmentId, IdAllocator, NodeId};
pub use scene::{AttachmentInfo, Scene, SceneError};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::component::{BoxedComponent, Component};
    pub use crate::host::SceneHost;
    pub use crate::id::{AttachmentId, NodeId};
    pub use crate::scene::{AttachmentInfo, Scene, SceneError};
}
