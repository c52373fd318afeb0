/// Axis-aligned rectangle in physical pixels (top-left origin).
///
/// Used to place a surface inside a larger render target, e.g. the patch plot
/// on the left and the colorbar on the right of one window.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clamps the rectangle so it lies within a `width` x `height` target.
    ///
    /// Returns `None` when nothing of the rectangle remains visible.
    pub fn clamped_to(self, width: u32, height: u32) -> Option<PixelRect> {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        let x1 = self.x.saturating_add(self.width).min(width);
        let y1 = self.y.saturating_add(self.height).min(height);

        let r = PixelRect::new(x0, y0, x1 - x0, y1 - y0);
        if r.is_empty() { None } else { Some(r) }
    }

    /// Splits off a column of `right_width` pixels on the right side.
    ///
    /// Returns `(left, right)`. The right column is narrowed when the rectangle
    /// is not wide enough to hold it.
    pub fn split_right(self, right_width: u32) -> (PixelRect, PixelRect) {
        let rw = right_width.min(self.width);
        let lw = self.width - rw;
        (
            PixelRect::new(self.x, self.y, lw, self.height),
            PixelRect::new(self.x + lw, self.y, rw, self.height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── clamped_to ────────────────────────────────────────────────────────

    #[test]
    fn clamped_inside_is_identity() {
        let r = PixelRect::new(10, 10, 50, 50);
        assert_eq!(r.clamped_to(100, 100), Some(r));
    }

    #[test]
    fn clamped_overhang_is_cut() {
        let r = PixelRect::new(80, 0, 50, 50);
        assert_eq!(r.clamped_to(100, 100), Some(PixelRect::new(80, 0, 20, 50)));
    }

    #[test]
    fn clamped_outside_returns_none() {
        assert!(PixelRect::new(120, 0, 10, 10).clamped_to(100, 100).is_none());
    }

    // ── split_right ───────────────────────────────────────────────────────

    #[test]
    fn split_right_partitions_width() {
        let (l, r) = PixelRect::new(0, 0, 800, 600).split_right(120);
        assert_eq!(l, PixelRect::new(0, 0, 680, 600));
        assert_eq!(r, PixelRect::new(680, 0, 120, 600));
    }

    #[test]
    fn split_right_wider_than_rect() {
        let (l, r) = PixelRect::new(0, 0, 100, 50).split_right(300);
        assert!(l.is_empty());
        assert_eq!(r.width, 100);
    }
}
