//! Fonts for colorbar labels (fontdue).

mod font_system;

pub use font_system::{FontId, FontLoadError, FontMetrics, FontSystem};
