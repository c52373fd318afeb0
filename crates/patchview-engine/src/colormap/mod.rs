//! Colormap lookup tables.
//!
//! A [`ColorTable`] turns a palette name into `resolution` evenly spaced RGBA
//! samples over `[0, 1]`. Surfaces upload the samples as a 1D texture and the
//! shader indexes it with the normalized scalar.

mod color;
mod palettes;

pub use color::Rgba;
pub use palettes::{Palette, Palettes, DEFAULT_PALETTE};

use crate::error::PatchError;

/// Upper bound for lookup texture resolution; backends may lower it further.
pub const MAX_TABLE_RESOLUTION: u32 = 1024;

/// Source of colormap lookup tables.
pub trait ColorTable {
    /// Returns `resolution` samples of palette `name`, first sample at 0, last at 1.
    fn table(&self, name: &str, resolution: usize) -> Result<Vec<Rgba>, PatchError>;
}

/// Resolution to request for a backend whose textures may be at most `max_texture_size` wide.
#[inline]
pub fn table_resolution(max_texture_size: u32) -> usize {
    max_texture_size.min(MAX_TABLE_RESOLUTION).max(1) as usize
}
