use bytemuck::{Pod, Zeroable};

/// One render vertex: NDC position plus the scalar value sampled in the colormap.
///
/// Layout (12 bytes):
///
///  offset 0  position  [f32; 2]  loc 0
///  offset 8  value     f32       loc 1
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct PatchVertex {
    pub position: [f32; 2],
    pub value: f32,
}

impl PatchVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32    // value
    ];

    #[inline]
    pub const fn new(position: [f32; 2], value: f32) -> Self {
        Self { position, value }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PatchVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}
