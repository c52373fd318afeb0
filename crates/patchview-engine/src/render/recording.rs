//! In-memory backend that records what the surfaces ask of the GPU.

use crate::colormap::Rgba;
use crate::error::PatchError;
use crate::patch::PatchVertex;

use super::backend::{check_allocation, BufferUsage, DrawTarget, MeshDraw, RenderBackend, TextRun};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedBuffer {
    pub id: usize,
    pub len: usize,
    pub usage: BufferUsage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTexture {
    pub id: usize,
    pub colors: Vec<Rgba>,
}

#[derive(Debug)]
pub struct RecordingBackend {
    pub max_texture: u32,
    pub max_buffer_bytes: u64,
    pub buffers_created: usize,
    pub textures_created: usize,
    pub uploads: usize,
    pub last_upload: Vec<PatchVertex>,
    pub fail_textures: bool,
    /// Width of every colormap texture created, in creation order.
    pub texture_widths: Vec<usize>,
    next_id: usize,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self {
            max_texture: 8192,
            max_buffer_bytes: 1 << 28,
            buffers_created: 0,
            textures_created: 0,
            uploads: 0,
            last_upload: Vec::new(),
            fail_textures: false,
            texture_widths: Vec::new(),
            next_id: 0,
        }
    }
}

impl RecordingBackend {
    /// Backend whose 1D textures may be at most `max_texture` texels wide.
    pub fn with_max_texture(max_texture: u32) -> Self {
        Self { max_texture, ..Self::default() }
    }

    /// Backend that refuses every colormap texture allocation.
    pub fn failing_textures() -> Self {
        Self { fail_textures: true, ..Self::default() }
    }

    fn next(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderBackend for RecordingBackend {
    type Buffer = RecordedBuffer;
    type Texture = RecordedTexture;

    fn max_texture_size(&self) -> u32 {
        self.max_texture
    }

    fn create_vertex_buffer(
        &mut self,
        _label: &str,
        records: &[PatchVertex],
        usage: BufferUsage,
    ) -> Result<RecordedBuffer, PatchError> {
        let bytes = std::mem::size_of_val(records) as u64;
        check_allocation("vertex buffer", bytes, self.max_buffer_bytes)?;
        self.buffers_created += 1;
        Ok(RecordedBuffer { id: self.next(), len: records.len(), usage })
    }

    fn create_index_buffer(&mut self, _label: &str, indices: &[u32]) -> Result<RecordedBuffer, PatchError> {
        let bytes = std::mem::size_of_val(indices) as u64;
        check_allocation("index buffer", bytes, self.max_buffer_bytes)?;
        self.buffers_created += 1;
        Ok(RecordedBuffer { id: self.next(), len: indices.len(), usage: BufferUsage::Static })
    }

    fn create_colormap_texture(&mut self, _label: &str, colors: &[Rgba]) -> Result<RecordedTexture, PatchError> {
        if self.fail_textures {
            return Err(PatchError::backend("texture allocation refused"));
        }
        check_allocation("colormap texture", colors.len() as u64, self.max_texture as u64)?;
        self.textures_created += 1;
        self.texture_widths.push(colors.len());
        Ok(RecordedTexture { id: self.next(), colors: colors.to_vec() })
    }

    fn upload_vertices(&mut self, buffer: &RecordedBuffer, records: &[PatchVertex]) -> Result<(), PatchError> {
        if records.len() != buffer.len {
            return Err(PatchError::shape("vertex upload", buffer.len, records.len()));
        }
        self.uploads += 1;
        self.last_upload = records.to_vec();
        Ok(())
    }
}

/// One recorded `draw_mesh` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub vertex_buffer: usize,
    pub index_count: u32,
    pub colormap: usize,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub draws: Vec<RecordedDraw>,
    pub labels: Vec<TextRun>,
}

impl DrawTarget<RecordingBackend> for RecordingTarget {
    fn draw_mesh(
        &mut self,
        _backend: &mut RecordingBackend,
        mesh: MeshDraw<'_, RecordingBackend>,
    ) -> Result<(), PatchError> {
        self.draws.push(RecordedDraw {
            vertex_buffer: mesh.vertices.id,
            index_count: mesh.index_count,
            colormap: mesh.colormap.id,
            width: mesh.viewport.width,
            height: mesh.viewport.height,
        });
        Ok(())
    }

    fn draw_labels(&mut self, _backend: &mut RecordingBackend, runs: &[TextRun]) -> Result<(), PatchError> {
        self.labels.extend_from_slice(runs);
        Ok(())
    }
}
