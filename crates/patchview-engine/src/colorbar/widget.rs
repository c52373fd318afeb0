use crate::colormap::{ColorTable, Rgba, DEFAULT_PALETTE};
use crate::coords::Viewport;
use crate::error::PatchError;
use crate::patch::{PatchVertex, SurfaceState};
use crate::render::{DrawTarget, GpuMesh, RenderBackend};

use super::layout::{ColorbarLayout, TextMetrics};

/// Segments the color strip is divided into.
pub const STRIP_STEPS: u32 = 40;

/// Vertical color strip with its vmin/vmax labels.
///
/// Shares the vertex format and shader with the patch surface: every strip
/// vertex carries its normalized position along the bar as value.
pub struct Colorbar<B: RenderBackend> {
    palette: String,
    layout: ColorbarLayout,
    label_color: Rgba,
    viewport: Viewport,
    records: Vec<PatchVertex>,
    indices: Vec<u32>,
    gpu: Option<GpuMesh<B>>,
    dirty: bool,
}

impl<B: RenderBackend> Colorbar<B> {
    pub fn new(palette: impl Into<String>, metrics: &dyn TextMetrics) -> Self {
        let layout = ColorbarLayout::compute(&[], None, None, metrics);
        let mut bar = Self {
            palette: palette.into(),
            layout,
            label_color: Rgba::black(),
            viewport: Viewport::default(),
            records: Vec::new(),
            indices: strip_indices(STRIP_STEPS),
            gpu: None,
            dirty: false,
        };
        bar.rebuild_strip();
        bar
    }

    pub fn with_default_palette(metrics: &dyn TextMetrics) -> Self {
        Self::new(DEFAULT_PALETTE, metrics)
    }

    pub fn with_label_color(mut self, color: Rgba) -> Self {
        self.label_color = color;
        self
    }

    pub fn state(&self) -> SurfaceState {
        match (&self.gpu, self.dirty) {
            (None, _) => SurfaceState::Uninitialized,
            (Some(_), true) => SurfaceState::Dirty,
            (Some(_), false) => SurfaceState::Ready,
        }
    }

    #[inline]
    pub fn layout(&self) -> &ColorbarLayout {
        &self.layout
    }

    /// `(width, height)` the hosting layout should reserve at least.
    #[inline]
    pub fn minimum_size(&self) -> (u32, u32) {
        self.layout.min_size
    }

    #[inline]
    pub fn records(&self) -> &[PatchVertex] {
        &self.records
    }

    /// Recomputes bounds, precision and labels.
    pub fn set(&mut self, values: &[f64], vmin: Option<f64>, vmax: Option<f64>, metrics: &dyn TextMetrics) {
        self.layout = ColorbarLayout::compute(values, vmin, vmax, metrics);
        log::debug!(
            "colorbar: [{}, {}] at {} digits",
            self.layout.vmin_label,
            self.layout.vmax_label,
            self.layout.precision
        );
        self.rebuild_strip();
    }

    /// Rebuilds the strip for a new drawable size. Same size is a no-op.
    pub fn resize(&mut self, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.rebuild_strip();
    }

    pub fn initialize(&mut self, backend: &mut B, colors: &dyn ColorTable) -> Result<(), PatchError> {
        self.gpu = None;
        let mesh = GpuMesh::create(backend, "colorbar", &self.records, &self.indices, colors, &self.palette)?;
        self.gpu = Some(mesh);
        self.dirty = false;
        Ok(())
    }

    pub fn draw<T>(&mut self, backend: &mut B, target: &mut T) -> Result<(), PatchError>
    where
        T: DrawTarget<B>,
    {
        let Some(gpu) = self.gpu.as_ref() else {
            return Err(PatchError::Uninitialized);
        };
        if self.viewport.is_empty() {
            return Ok(());
        }

        if self.dirty {
            backend.upload_vertices(&gpu.vertices, &self.records)?;
            self.dirty = false;
        }

        target.draw_mesh(backend, gpu.draw_call(self.viewport))?;
        let runs = self.layout.label_runs(
            self.viewport.width as f32,
            self.viewport.height as f32,
            self.label_color,
        );
        target.draw_labels(backend, &runs)
    }

    pub fn release(&mut self) {
        self.gpu = None;
    }

    fn rebuild_strip(&mut self) {
        let (start, height) = bar_extent(self.layout.text.height, self.viewport);
        self.records = strip_records(STRIP_STEPS, start, height);
        self.dirty = true;
    }
}

/// Bottom edge and height of the color strip in NDC, leaving one padded text
/// line free at the top and at the bottom.
pub fn bar_extent(text_height: f32, viewport: Viewport) -> (f32, f32) {
    let line = viewport.px_to_ndc_y(text_height) / 2.0;
    (-1.0 + 2.0 * line, (1.0 - 2.0 * line) * 2.0)
}

/// Two vertices (x = -0.5 and x = 0.5) per step boundary, bottom to top.
fn strip_records(steps: u32, start: f32, height: f32) -> Vec<PatchVertex> {
    (0..=steps)
        .flat_map(|i| {
            let t = i as f32 / steps as f32;
            let y = start + height * t;
            [PatchVertex::new([-0.5, y], t), PatchVertex::new([0.5, y], t)]
        })
        .collect()
}

fn strip_indices(steps: u32) -> Vec<u32> {
    (0..steps)
        .flat_map(|i| {
            let (bl, br, tl, tr) = (2 * i, 2 * i + 1, 2 * i + 2, 2 * i + 3);
            [bl, br, tr, bl, tr, tl]
        })
        .collect()
}
