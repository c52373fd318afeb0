use crate::colormap::DEFAULT_PALETTE;
use crate::coords::BoundingBox;
use crate::error::PatchError;
use crate::grid::Placement;

/// Construction parameters of a [`PatchSurface`](super::PatchSurface).
///
/// `vmin`/`vmax` override the normalization bounds; `None` means "derive from
/// each field". `codim` is 2 for per-vertex and 0 for per-cell data.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchConfig {
    pub bounding_box: BoundingBox,
    pub vmin: Option<f64>,
    pub vmax: Option<f64>,
    pub codim: u8,
    pub palette: String,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            bounding_box: BoundingBox::unit(),
            vmin: None,
            vmax: None,
            codim: 2,
            palette: DEFAULT_PALETTE.to_string(),
        }
    }
}

impl PatchConfig {
    #[inline]
    pub fn placement(&self) -> Result<Placement, PatchError> {
        Placement::from_codim(self.codim)
    }

    pub fn with_codim(mut self, codim: u8) -> Self {
        self.codim = codim;
        self
    }

    pub fn with_bounds(mut self, vmin: Option<f64>, vmax: Option<f64>) -> Self {
        self.vmin = vmin;
        self.vmax = vmax;
        self
    }

    pub fn with_palette(mut self, palette: impl Into<String>) -> Self {
        self.palette = palette.into();
        self
    }
}
