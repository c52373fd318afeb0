//! GPU rendering subsystem.
//!
//! Surfaces talk to the GPU only through [`RenderBackend`] (allocation and
//! uploads) and [`DrawTarget`] (draw calls). [`WgpuBackend`] with
//! [`RenderTarget`] is the wgpu implementation.
//!
//! Convention:
//! - mesh positions arrive in NDC; the target maps NDC onto the surface's pixel region
//! - label positions are in surface pixels (top-left origin, +Y down)

mod backend;
mod ctx;
mod labels;
mod wgpu_backend;

#[cfg(test)]
pub(crate) mod recording;

pub use backend::{BufferUsage, DrawTarget, GpuMesh, MeshDraw, RenderBackend, TextRun};
pub use ctx::{RenderCtx, RenderTarget};
pub use labels::LabelRenderer;
pub use wgpu_backend::{ColormapTexture, WgpuBackend};
