use std::fmt;
use std::path::Path;

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

use crate::colorbar::{LineMetrics, TextMetrics};

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// Owns the fonts used for colorbar labels.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        Ok(id)
    }

    /// Loads the first readable font among `candidates`.
    pub fn load_first<P: AsRef<Path>>(&mut self, candidates: &[P]) -> Option<FontId> {
        candidates.iter().find_map(|path| {
            let path = path.as_ref();
            let bytes = std::fs::read(path).ok()?;
            match self.load_font(&bytes) {
                Ok(id) => {
                    log::info!("loaded label font {}", path.display());
                    Some(id)
                }
                Err(e) => {
                    log::warn!("{}: {e}", path.display());
                    None
                }
            }
        })
    }

    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    /// Advance width of `text` laid out on one line at `size` pixels.
    pub fn measure_width(&self, text: &str, id: FontId, size: f32) -> f32 {
        let Some(font) = self.get(id) else {
            return 0.0;
        };

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[font], &TextStyle::new(text, size, 0));

        // Pen position after each glyph, not the bitmap edge.
        layout
            .glyphs()
            .iter()
            .map(|g| {
                let m = font.metrics_indexed(g.key.glyph_index, size);
                (g.x - m.xmin as f32 + m.advance_width).max(0.0)
            })
            .fold(0.0f32, f32::max)
    }

    pub fn line_metrics(&self, id: FontId, size: f32) -> Option<LineMetrics> {
        let m = self.get(id)?.horizontal_line_metrics(size)?;
        Some(LineMetrics {
            ascent: m.ascent,
            descent: -m.descent,
            height: m.ascent - m.descent,
        })
    }

    /// [`TextMetrics`] view of one font at one size.
    pub fn metrics(&self, id: FontId, size: f32) -> FontMetrics<'_> {
        FontMetrics { fonts: self, id, size }
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Measures text with a loaded font.
pub struct FontMetrics<'a> {
    fonts: &'a FontSystem,
    id: FontId,
    size: f32,
}

impl TextMetrics for FontMetrics<'_> {
    fn text_width(&self, text: &str) -> f32 {
        self.fonts.measure_width(text, self.id, self.size)
    }

    fn line_metrics(&self) -> LineMetrics {
        self.fonts.line_metrics(self.id, self.size).unwrap_or(LineMetrics {
            ascent: self.size * 0.8,
            descent: self.size * 0.2,
            height: self.size,
        })
    }
}
