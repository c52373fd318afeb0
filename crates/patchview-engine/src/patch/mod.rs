//! Patch plots: scalar data on a flattened 2D grid, rendered as colored triangles.
//!
//! Pipeline:
//! - [`BufferLayout`] fixes vertex capacity and index connectivity once per surface
//! - [`Normalizer`] rewrites the value channel for every new field
//! - [`PatchSurface`] owns the GPU buffers and uploads lazily under a dirty flag

mod config;
mod layout;
mod normalize;
mod surface;
mod vertex;

pub use config::PatchConfig;
pub use layout::BufferLayout;
pub use normalize::{min_max, FieldBounds, Normalizer};
pub use surface::{PatchSurface, SurfaceState};
pub use vertex::PatchVertex;
