//! Patchview engine crate.
//!
//! Turns 2D triangle/quad grids carrying scalar fields into colormapped GPU
//! buffers, and lays out the matching colorbar.
//!
//! Layers, leaf first:
//! - [`grid`], [`colormap`], [`coords`]: plain data, no GPU
//! - [`patch`], [`colorbar`]: surfaces with a dirty-flag upload protocol
//! - [`render`]: backend seam and its wgpu implementation
//! - [`device`], [`window`], [`core`]: winit/wgpu runtime for binaries

pub mod error;

pub mod colormap;
pub mod coords;
pub mod grid;

pub mod colorbar;
pub mod patch;

pub mod render;
pub mod text;

pub mod core;
pub mod device;
pub mod logging;
pub mod window;

pub use error::PatchError;
