//! Declarative dependency resolution for components in a scene graph.
//!

pub use arbor_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use arbor_internal::prelude::*;
}
