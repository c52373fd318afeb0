use crate::colormap::ColorTable;
use crate::coords::{BoundingBox, NdcTransform, Viewport};
use crate::error::PatchError;
use crate::grid::{FlatGrid, Placement, Topology};
use crate::render::{DrawTarget, GpuMesh, RenderBackend};

use super::{BufferLayout, FieldBounds, Normalizer, PatchConfig, PatchVertex};

/// Observable lifecycle of a surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceState {
    /// No GPU resources.
    Uninitialized,
    /// GPU buffers match the CPU records.
    Ready,
    /// CPU records changed since the last upload.
    Dirty,
}

/// Patch plot of one scalar field on one grid.
///
/// CPU records are rewritten synchronously by [`set_field`](Self::set_field)
/// and friends; the GPU vertex buffer is refreshed lazily, once, by the next
/// [`draw`](Self::draw).
pub struct PatchSurface<B: RenderBackend> {
    palette: String,
    layout: BufferLayout,
    normalizer: Normalizer,
    transform: NdcTransform,
    coords: Vec<[f64; 2]>,
    records: Vec<PatchVertex>,
    field_bounds: Option<(f64, f64)>,
    viewport: Viewport,
    gpu: Option<GpuMesh<B>>,
    dirty: bool,
}

impl<B: RenderBackend> PatchSurface<B> {
    /// Builds the index layout and the CPU records: projected positions and an
    /// all-zero field normalized with the configured bounds.
    pub fn new(grid: &FlatGrid, config: PatchConfig) -> Result<Self, PatchError> {
        let placement = config.placement()?;
        let transform = NdcTransform::from_bbox(config.bounding_box)?;
        let layout = BufferLayout::for_grid(grid, placement)?;

        let mut records = vec![PatchVertex::default(); layout.vertex_capacity()];
        layout.write_positions(grid.coordinates(), &transform, &mut records)?;

        let normalizer = Normalizer::new(grid, placement, FieldBounds::new(config.vmin, config.vmax));

        let mut surface = Self {
            palette: config.palette,
            layout,
            normalizer,
            transform,
            coords: grid.coordinates().to_vec(),
            records,
            field_bounds: None,
            viewport: Viewport::default(),
            gpu: None,
            dirty: false,
        };

        let zeros = vec![0.0; surface.field_len()];
        surface.set_field(&zeros)?;
        surface.dirty = false;
        Ok(surface)
    }

    pub fn state(&self) -> SurfaceState {
        match (&self.gpu, self.dirty) {
            (None, _) => SurfaceState::Uninitialized,
            (Some(_), true) => SurfaceState::Dirty,
            (Some(_), false) => SurfaceState::Ready,
        }
    }

    #[inline]
    pub fn topology(&self) -> Topology {
        self.layout.topology()
    }

    #[inline]
    pub fn placement(&self) -> Placement {
        self.layout.placement()
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Values a field passed to [`set_field`](Self::set_field) must carry.
    #[inline]
    pub fn field_len(&self) -> usize {
        self.normalizer.field_len()
    }

    /// `(vmin, vmax)` used for the last field, for syncing a colorbar.
    #[inline]
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.field_bounds
    }

    /// CPU-side vertex records in upload order.
    #[inline]
    pub fn records(&self) -> &[PatchVertex] {
        &self.records
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        self.layout.indices()
    }

    /// Allocates the vertex/index buffers and the colormap texture.
    ///
    /// Buffers are created from the current records, so the surface starts out
    /// clean. On failure the surface stays uninitialized.
    pub fn initialize(&mut self, backend: &mut B, colors: &dyn ColorTable) -> Result<(), PatchError> {
        self.gpu = None;
        let mesh = GpuMesh::create(
            backend,
            "patch surface",
            &self.records,
            self.layout.indices(),
            colors,
            &self.palette,
        )?;
        self.gpu = Some(mesh);
        self.dirty = false;
        Ok(())
    }

    /// Records the drawable size in physical pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
    }

    /// Replaces the vertex coordinates (same grid, moved points).
    pub fn set_geometry(&mut self, coords: &[[f64; 2]]) -> Result<(), PatchError> {
        self.layout.write_positions(coords, &self.transform, &mut self.records)?;
        self.coords.clear();
        self.coords.extend_from_slice(coords);
        self.dirty = true;
        Ok(())
    }

    /// Maps a new world rectangle onto the viewport and re-projects the points.
    pub fn set_bounding_box(&mut self, bbox: BoundingBox) -> Result<(), PatchError> {
        let transform = NdcTransform::from_bbox(bbox)?;
        self.layout.write_positions(&self.coords, &transform, &mut self.records)?;
        self.transform = transform;
        self.dirty = true;
        Ok(())
    }

    /// Replaces the normalization overrides; takes effect with the next field.
    pub fn set_value_range(&mut self, vmin: Option<f64>, vmax: Option<f64>) {
        self.normalizer.set_bounds(FieldBounds::new(vmin, vmax));
    }

    /// Normalizes `values` into the records and returns the `(vmin, vmax)` used.
    ///
    /// On error the records and the dirty flag are unchanged.
    pub fn set_field(&mut self, values: &[f64]) -> Result<(f64, f64), PatchError> {
        let bounds = self.normalizer.apply(values, &mut self.records)?;
        self.field_bounds = Some(bounds);
        self.dirty = true;
        Ok(bounds)
    }

    /// Uploads pending records (once) and issues the draw.
    ///
    /// A zero-sized viewport draws nothing and keeps pending records pending.
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
            log::trace!("patch surface: uploaded {} records", self.records.len());
            self.dirty = false;
        }

        target.draw_mesh(backend, gpu.draw_call(self.viewport))
    }

    /// Drops the GPU handles; the CPU records are kept.
    pub fn release(&mut self) {
        if self.gpu.take().is_some() {
            log::debug!("patch surface: released GPU resources");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::Palettes;
    use crate::grid::{MeshFlattener, StructuredGrid};
    use crate::render::recording::{RecordingBackend, RecordingTarget};

    fn quad_grid() -> FlatGrid {
        StructuredGrid::new(Topology::Quad, BoundingBox::unit(), [2, 2])
            .unwrap()
            .flatten()
            .unwrap()
    }

    fn ready(config: PatchConfig) -> (PatchSurface<RecordingBackend>, RecordingBackend) {
        let mut backend = RecordingBackend::default();
        let mut s = PatchSurface::new(&quad_grid(), config).unwrap();
        s.initialize(&mut backend, &Palettes::new()).unwrap();
        s.resize(640, 480);
        (s, backend)
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn new_surface_is_uninitialized() {
        let s: PatchSurface<RecordingBackend> =
            PatchSurface::new(&quad_grid(), PatchConfig::default()).unwrap();
        assert_eq!(s.state(), SurfaceState::Uninitialized);
        assert_eq!(s.records().len(), 9);
        assert_eq!(s.indices().len(), 24);
    }

    #[test]
    fn draw_before_initialize_fails() {
        let mut backend = RecordingBackend::default();
        let mut s = PatchSurface::new(&quad_grid(), PatchConfig::default()).unwrap();
        s.resize(100, 100);
        let err = s.draw(&mut backend, &mut RecordingTarget::default()).unwrap_err();
        assert_eq!(err, PatchError::Uninitialized);
    }

    #[test]
    fn initialize_allocates_buffers_and_clamped_colormap() {
        let (s, backend) = ready(PatchConfig::default());
        assert_eq!(s.state(), SurfaceState::Ready);
        assert_eq!(backend.buffers_created, 2);
        assert_eq!(backend.textures_created, 1);
        assert_eq!(backend.texture_widths, vec![1024]);
    }

    #[test]
    fn colormap_follows_small_texture_limit() {
        let mut backend = RecordingBackend::with_max_texture(256);
        let mut s = PatchSurface::new(&quad_grid(), PatchConfig::default()).unwrap();
        s.initialize(&mut backend, &Palettes::new()).unwrap();
        s.resize(10, 10);
        let mut target = RecordingTarget::default();
        s.draw(&mut backend, &mut target).unwrap();
        assert_eq!(backend.texture_widths, vec![256]);
        assert_eq!(target.draws.len(), 1);
        assert_eq!(target.draws[0].index_count, 24);
    }

    #[test]
    fn failed_allocation_leaves_surface_uninitialized() {
        let mut backend = RecordingBackend::failing_textures();
        let mut s = PatchSurface::new(&quad_grid(), PatchConfig::default()).unwrap();
        let err = s.initialize(&mut backend, &Palettes::new()).unwrap_err();
        assert!(matches!(err, PatchError::BackendResource(_)));
        assert_eq!(s.state(), SurfaceState::Uninitialized);
    }

    #[test]
    fn unknown_palette_is_reported_at_initialize() {
        let mut backend = RecordingBackend::default();
        let config = PatchConfig::default().with_palette("nope");
        let mut s = PatchSurface::new(&quad_grid(), config).unwrap();
        let err = s.initialize(&mut backend, &Palettes::new()).unwrap_err();
        assert!(matches!(err, PatchError::Configuration(_)));
    }

    #[test]
    fn release_then_initialize_starts_clean() {
        let (mut s, mut backend) = ready(PatchConfig::default());
        s.set_field(&[0.0; 9]).unwrap();
        s.release();
        assert_eq!(s.state(), SurfaceState::Uninitialized);
        s.initialize(&mut backend, &Palettes::new()).unwrap();
        assert_eq!(s.state(), SurfaceState::Ready);
    }

    #[test]
    fn codim_one_is_rejected() {
        let r = PatchSurface::<RecordingBackend>::new(&quad_grid(), PatchConfig::default().with_codim(1));
        assert!(matches!(r, Err(PatchError::Configuration(_))));
    }

    // ── dirty protocol ────────────────────────────────────────────────────

    #[test]
    fn two_updates_one_upload_with_latest_values() {
        let (mut s, mut backend) = ready(PatchConfig::default());
        let mut target = RecordingTarget::default();

        let first: Vec<f64> = (0..9).map(f64::from).collect();
        let second: Vec<f64> = (0..9).rev().map(f64::from).collect();
        s.set_field(&first).unwrap();
        s.set_field(&second).unwrap();
        assert_eq!(s.state(), SurfaceState::Dirty);

        s.draw(&mut backend, &mut target).unwrap();
        assert_eq!(backend.uploads, 1);
        assert_eq!(backend.last_upload[0].value, 1.0);
        assert_eq!(backend.last_upload[8].value, 0.0);
        assert_eq!(s.state(), SurfaceState::Ready);
    }

    #[test]
    fn clean_redraw_does_not_upload() {
        let (mut s, mut backend) = ready(PatchConfig::default());
        let mut target = RecordingTarget::default();
        s.set_field(&[1.0; 9]).unwrap();
        s.draw(&mut backend, &mut target).unwrap();
        s.draw(&mut backend, &mut target).unwrap();
        s.draw(&mut backend, &mut target).unwrap();
        assert_eq!(backend.uploads, 1);
        assert_eq!(target.draws.len(), 3);
    }

    #[test]
    fn shape_error_keeps_records_and_flag() {
        let (mut s, _backend) = ready(PatchConfig::default());
        let before = s.records().to_vec();
        let err = s.set_field(&[1.0; 4]).unwrap_err();
        assert_eq!(err, PatchError::shape("scalar field", 9, 4));
        assert_eq!(s.records(), &before[..]);
        assert_eq!(s.state(), SurfaceState::Ready);

        assert!(s.set_geometry(&[[0.0, 0.0]; 3]).is_err());
        assert_eq!(s.state(), SurfaceState::Ready);
    }

    #[test]
    fn empty_field_is_a_configuration_error() {
        let (mut s, _backend) = ready(PatchConfig::default());
        assert!(matches!(s.set_field(&[]), Err(PatchError::Configuration(_))));
        assert_eq!(s.state(), SurfaceState::Ready);
    }

    #[test]
    fn zero_viewport_defers_upload() {
        let (mut s, mut backend) = ready(PatchConfig::default());
        let mut target = RecordingTarget::default();
        s.set_field(&[2.0; 9]).unwrap();
        s.resize(0, 480);
        s.draw(&mut backend, &mut target).unwrap();
        assert_eq!(backend.uploads, 0);
        assert!(target.draws.is_empty());
        assert_eq!(s.state(), SurfaceState::Dirty);
    }

    // ── fields and geometry ───────────────────────────────────────────────

    #[test]
    fn cell_field_colors_both_halves() {
        let (mut s, _backend) = ready(PatchConfig::default().with_codim(0));
        assert_eq!(s.field_len(), 4);
        assert_eq!(s.records().len(), 24);
        s.set_field(&[0.0, 1.0, 2.0, 3.0]).unwrap();
        let v: Vec<f32> = s.records().iter().map(|r| r.value).collect();
        assert_eq!(&v[..3], &[0.0; 3]);
        assert_eq!(&v[9..12], &[1.0; 3]);
        assert_eq!(&v[12..15], &[0.0; 3]);
    }

    #[test]
    fn set_field_reports_bounds() {
        let config = PatchConfig::default().with_bounds(None, Some(100.0));
        let (mut s, _backend) = ready(config);
        let values: Vec<f64> = (1..=9).map(f64::from).collect();
        assert_eq!(s.set_field(&values).unwrap(), (1.0, 100.0));
        assert_eq!(s.bounds(), Some((1.0, 100.0)));
    }

    #[test]
    fn bounding_box_change_reprojects() {
        let (mut s, _backend) = ready(PatchConfig::default());
        assert_eq!(s.records()[0].position, [-1.0, -1.0]);
        s.set_bounding_box(BoundingBox::new([-1.0, -1.0], [1.0, 1.0])).unwrap();
        assert_eq!(s.records()[0].position, [0.0, 0.0]);
        assert_eq!(s.records()[8].position, [1.0, 1.0]);
        assert_eq!(s.state(), SurfaceState::Dirty);
    }

    #[test]
    fn set_geometry_moves_points() {
        let (mut s, _backend) = ready(PatchConfig::default());
        let mut coords = quad_grid().coordinates().to_vec();
        coords[4] = [1.0, 1.0];
        s.set_geometry(&coords).unwrap();
        assert_eq!(s.records()[4].position, [1.0, 1.0]);
        assert_eq!(s.state(), SurfaceState::Dirty);
    }

    #[test]
    fn construction_normalizes_a_zero_field() {
        let grid = StructuredGrid::new(Topology::Quad, BoundingBox::unit(), [1, 1])
            .unwrap()
            .flatten()
            .unwrap();
        let config = PatchConfig::default().with_bounds(Some(-1.0), Some(1.0));
        let mut s: PatchSurface<RecordingBackend> = PatchSurface::new(&grid, config).unwrap();
        let values: Vec<f32> = s.records().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![0.5; 4]);
        assert_eq!(s.bounds(), Some((-1.0, 1.0)));

        let mut backend = RecordingBackend::default();
        s.initialize(&mut backend, &Palettes::new()).unwrap();
        assert_eq!(s.state(), SurfaceState::Ready);
    }

    #[test]
    fn default_construction_has_zero_bounds() {
        let s: PatchSurface<RecordingBackend> =
            PatchSurface::new(&quad_grid(), PatchConfig::default()).unwrap();
        assert_eq!(s.bounds(), Some((0.0, 0.0)));
        assert!(s.records().iter().all(|r| r.value == 0.0));
    }

    #[test]
    fn value_range_applies_to_the_next_field() {
        let (mut s, mut backend) = ready(PatchConfig::default());
        let values: Vec<f64> = (0..9).map(f64::from).collect();
        s.set_field(&values).unwrap();
        s.draw(&mut backend, &mut RecordingTarget::default()).unwrap();
        let before = s.records().to_vec();

        s.set_value_range(Some(-8.0), Some(8.0));
        assert_eq!(s.records(), &before[..]);
        assert_eq!(s.state(), SurfaceState::Ready);
        assert_eq!(s.bounds(), Some((0.0, 8.0)));

        assert_eq!(s.set_field(&values).unwrap(), (-8.0, 8.0));
        assert_eq!(s.records()[0].value, 0.5);
        assert_eq!(s.records()[8].value, 1.0);
        assert_eq!(s.state(), SurfaceState::Dirty);
    }
}
