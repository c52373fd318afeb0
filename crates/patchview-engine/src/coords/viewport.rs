/// Drawable size of a render surface in physical pixels.
///
/// Set through `resize(w, h)` by the hosting toolkit. A zero-sized viewport is
/// legal (minimized window) and simply skips drawing.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Converts a pixel length along Y into an NDC length (NDC spans 2 units).
    #[inline]
    pub fn px_to_ndc_y(self, px: f32) -> f32 {
        if self.height == 0 { 0.0 } else { px / self.height as f32 * 2.0 }
    }
}
