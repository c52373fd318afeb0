use crate::colormap::{table_resolution, ColorTable, Rgba};
use crate::coords::Viewport;
use crate::error::PatchError;
use crate::patch::PatchVertex;

/// How often a vertex buffer is expected to be rewritten.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferUsage {
    /// Rewritten on every data update.
    Dynamic,
    /// Written once at creation.
    Static,
}

/// Graphics-API capability used by the surfaces.
///
/// Implementations allocate and fill GPU objects; they never see grid or field
/// semantics. Allocation failures are reported as
/// [`PatchError::BackendResource`].
pub trait RenderBackend {
    type Buffer;
    type Texture;

    /// Widest 1D texture the backend can create.
    fn max_texture_size(&self) -> u32;

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        records: &[PatchVertex],
        usage: BufferUsage,
    ) -> Result<Self::Buffer, PatchError>;

    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> Result<Self::Buffer, PatchError>;

    /// Creates a 1D lookup texture sampled with nearest filtering and
    /// clamp-to-edge addressing.
    fn create_colormap_texture(&mut self, label: &str, colors: &[Rgba]) -> Result<Self::Texture, PatchError>;

    /// Replaces the whole content of a vertex buffer.
    fn upload_vertices(&mut self, buffer: &Self::Buffer, records: &[PatchVertex]) -> Result<(), PatchError>;
}

/// One indexed triangle-list draw.
pub struct MeshDraw<'a, B: RenderBackend> {
    pub vertices: &'a B::Buffer,
    pub indices: &'a B::Buffer,
    pub index_count: u32,
    pub colormap: &'a B::Texture,
    /// Size of the drawing surface in physical pixels.
    pub viewport: Viewport,
}

/// A line of text positioned in surface pixels (top-left of the line box).
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub origin: [f32; 2],
    pub color: Rgba,
}

/// Where surfaces put their pixels.
pub trait DrawTarget<B: RenderBackend> {
    fn draw_mesh(&mut self, backend: &mut B, mesh: MeshDraw<'_, B>) -> Result<(), PatchError>;

    fn draw_labels(&mut self, backend: &mut B, runs: &[TextRun]) -> Result<(), PatchError>;
}

/// GPU handles of one colormapped triangle mesh.
pub struct GpuMesh<B: RenderBackend> {
    pub vertices: B::Buffer,
    pub indices: B::Buffer,
    pub index_count: u32,
    pub colormap: B::Texture,
}

impl<B: RenderBackend> GpuMesh<B> {
    /// Allocates the dynamic vertex buffer, the static index buffer and the
    /// colormap texture for `palette`.
    ///
    /// Nothing is kept when any allocation fails.
    pub fn create(
        backend: &mut B,
        label: &str,
        records: &[PatchVertex],
        indices: &[u32],
        colors: &dyn ColorTable,
        palette: &str,
    ) -> Result<Self, PatchError> {
        let resolution = table_resolution(backend.max_texture_size());
        let table = colors.table(palette, resolution)?;

        let vertices = backend.create_vertex_buffer(label, records, BufferUsage::Dynamic)?;
        let index_buf = backend.create_index_buffer(label, indices)?;
        let colormap = backend.create_colormap_texture(label, &table)?;

        log::info!(
            "{label}: allocated {} vertices, {} indices, colormap '{palette}' at {resolution} texels",
            records.len(),
            indices.len()
        );

        Ok(Self {
            vertices,
            indices: index_buf,
            index_count: indices.len() as u32,
            colormap,
        })
    }

    pub fn draw_call(&self, viewport: Viewport) -> MeshDraw<'_, B> {
        MeshDraw {
            vertices: &self.vertices,
            indices: &self.indices,
            index_count: self.index_count,
            colormap: &self.colormap,
            viewport,
        }
    }
}

/// Rejects zero-sized or oversized allocations before they reach the device.
pub(crate) fn check_allocation(what: &str, bytes: u64, max_bytes: u64) -> Result<(), PatchError> {
    if bytes == 0 {
        return Err(PatchError::backend(format!("{what} would be empty")));
    }
    if bytes > max_bytes {
        return Err(PatchError::backend(format!(
            "{what} needs {bytes} bytes, device allows {max_bytes}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_oversized_allocations_are_backend_errors() {
        assert!(check_allocation("vertex buffer", 12, 1024).is_ok());
        assert!(matches!(
            check_allocation("vertex buffer", 0, 1024),
            Err(PatchError::BackendResource(_))
        ));
        let err = check_allocation("index buffer", 4096, 1024).unwrap_err();
        assert_eq!(
            err.to_string(),
            "render backend error: index buffer needs 4096 bytes, device allows 1024"
        );
    }
}
