//! Coordinate spaces shared by the patch surface, the colorbar and the backend.
//!
//! Three spaces are in play:
//! - world space: grid coordinates as delivered by the mesh flattener (`f64`)
//! - normalized device coordinates: `[-1, 1] x [-1, 1]`, +Y up, what the shader consumes
//! - physical pixels: widget/viewport sizes and draw regions (top-left origin, +Y down)

mod bbox;
mod region;
mod viewport;

pub use bbox::{BoundingBox, NdcTransform};
pub use region::PixelRect;
pub use viewport::Viewport;
