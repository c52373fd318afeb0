use crate::colormap::Rgba;
use crate::patch::FieldBounds;
use crate::render::TextRun;

use super::format::{format_label, label_precision};

/// Vertical metrics of one text line, in pixels.
///
/// `descent` is the positive distance from the baseline down to the lowest glyph.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub height: f32,
}

impl LineMetrics {
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            ascent: self.ascent * factor,
            descent: self.descent * factor,
            height: self.height * factor,
        }
    }
}

/// Text measurement for the label font.
pub trait TextMetrics {
    fn text_width(&self, text: &str) -> f32;
    fn line_metrics(&self) -> LineMetrics;
}

/// Monospace approximation used when no font is available.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FixedMetrics {
    pub advance: f32,
    pub line: LineMetrics,
}

impl FixedMetrics {
    /// Proportions of a typical sans-serif face at `size` pixels.
    pub fn for_size(size: f32) -> Self {
        Self {
            advance: size * 0.6,
            line: LineMetrics {
                ascent: size * 0.8,
                descent: size * 0.2,
                height: size,
            },
        }
    }
}

impl TextMetrics for FixedMetrics {
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance
    }

    fn line_metrics(&self) -> LineMetrics {
        self.line
    }
}

/// Labels are laid out in a line box this much taller than the font's.
pub const TEXT_PADDING: f32 = 1.5;
/// Horizontal room added around the wider label.
pub const MIN_WIDTH_MARGIN: u32 = 20;
pub const MIN_HEIGHT: u32 = 300;

/// Everything a colorbar needs to know about its bounds and labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorbarLayout {
    pub vmin: f64,
    pub vmax: f64,
    pub precision: usize,
    pub vmin_label: String,
    pub vmax_label: String,
    pub vmin_width: f32,
    pub vmax_width: f32,
    /// Font line metrics scaled by [`TEXT_PADDING`].
    pub text: LineMetrics,
    /// Unscaled font ascent, used to place label boxes.
    pub font_ascent: f32,
    /// `(width, height)` in pixels.
    pub min_size: (u32, u32),
}

impl ColorbarLayout {
    /// Resolves the bounds (override, else data, else `(0, 1)`) and measures
    /// both labels.
    pub fn compute(values: &[f64], vmin: Option<f64>, vmax: Option<f64>, metrics: &dyn TextMetrics) -> Self {
        let (vmin, vmax) = FieldBounds::new(vmin, vmax).resolve_or_unit(values);
        let precision = label_precision(vmin, vmax);

        let vmin_label = format_label(vmin, precision);
        let vmax_label = format_label(vmax, precision);
        let vmin_width = metrics.text_width(&vmin_label);
        let vmax_width = metrics.text_width(&vmax_label);

        let line = metrics.line_metrics();
        let widest = vmin_width.max(vmax_width).ceil().max(0.0) as u32;

        Self {
            vmin,
            vmax,
            precision,
            vmin_label,
            vmax_label,
            vmin_width,
            vmax_width,
            text: line.scaled(TEXT_PADDING),
            font_ascent: line.ascent,
            min_size: (widest + MIN_WIDTH_MARGIN, MIN_HEIGHT),
        }
    }

    /// Baselines of the vmax (top) and vmin (bottom) labels for a bar `height` pixels tall.
    pub fn baselines(&self, height: f32) -> (f32, f32) {
        (self.text.ascent, height - self.text.height + self.text.ascent)
    }

    /// Text runs for a `width` x `height` bar: vmax centered on top, vmin at the bottom.
    pub fn label_runs(&self, width: f32, height: f32, color: Rgba) -> [TextRun; 2] {
        let (top, bottom) = self.baselines(height);
        let run = |text: &str, text_width: f32, baseline: f32| TextRun {
            text: text.to_string(),
            origin: [(width - text_width) / 2.0, baseline - self.font_ascent],
            color,
        };
        [
            run(&self.vmax_label, self.vmax_width, top),
            run(&self.vmin_label, self.vmin_width, bottom),
        ]
    }
}
