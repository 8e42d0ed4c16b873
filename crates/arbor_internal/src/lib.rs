//! # Arbor Internal Library
//!
//! Re-exports the core Arbor crates for convenience.

/// Layer 1: scene graph host and component storage.
pub use arbor_scene;

/// Layer 2: dependency resolution engine.
pub use arbor_inject;

/// Infrastructure: tracing subscriber setup.
#[cfg(feature = "tracing-setup")]
pub use arbor_core;

/// Re-export all common types for easy access.
pub mod prelude {
    #[cfg(feature = "tracing-setup")]
    pub use arbor_core::{TracingConfig, TracingFormat};
    pub use arbor_inject::prelude::*;
    pub use arbor_scene::prelude::*;
}
