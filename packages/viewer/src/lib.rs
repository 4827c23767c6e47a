//! Client-side mesh visualization state.
//!
//! The [`model::ModelStore`] owns the user-facing list of meshes (category,
//! color, opacity, visibility) independent of how each mesh was obtained;
//! the [`scene::SceneRenderer`] keeps loaded geometry consistent with that
//! state, fetching and parsing each mesh at most once per source URL.

pub mod color;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod model;
pub mod scene;
pub mod stl;

pub use color::Color;
pub use error::LoadError;
pub use geometry::Geometry;
pub use model::{ModelEntry, ModelId, ModelStore};
pub use scene::SceneRenderer;
