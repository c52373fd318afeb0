use wgpu::util::DeviceExt;

use crate::colormap::Rgba;
use crate::error::PatchError;
use crate::patch::PatchVertex;
use crate::text::{FontId, FontMetrics, FontSystem};

use super::backend::{check_allocation, BufferUsage, DrawTarget, MeshDraw, RenderBackend, TextRun};
use super::labels::LabelRenderer;
use super::{RenderCtx, RenderTarget};

/// Bind group through which the patch pipeline samples a 1D palette texture.
///
/// The bind group holds the texture view, which keeps the texture alive.
pub struct ColormapTexture {
    bind_group: wgpu::BindGroup,
}

struct LabelFont {
    fonts: FontSystem,
    id: FontId,
    size: f32,
}

/// [`RenderBackend`] on wgpu.
///
/// Owns the patch pipeline (shared by patch surfaces and colorbars) and the
/// label renderer. Allocation sizes are checked against the device limits up
/// front so oversized grids fail with [`PatchError::BackendResource`] instead
/// of a device validation error.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    limits: wgpu::Limits,
    colormap_format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    colormap_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    labels: LabelRenderer,
    font: Option<LabelFont>,
    warned_no_font: bool,
}

impl WgpuBackend {
    pub fn new(ctx: &RenderCtx<'_>) -> Self {
        let device = ctx.device.clone();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("patchview patch shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/patch.wgsl").into()),
        });

        let colormap_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("patchview colormap bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D1,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("patchview patch pipeline layout"),
            bind_group_layouts: &[&colormap_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("patchview patch pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[PatchVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        // Nearest lookup, clamped: values outside [0, 1] take the end colors.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("patchview colormap sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        // Palettes are sRGB-encoded; let the sampler decode them when the
        // surface encodes on write.
        let colormap_format = if ctx.surface_format.is_srgb() {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let labels = LabelRenderer::new(&device, ctx.surface_format);
        let limits = device.limits();

        log::info!(
            "wgpu backend ready: {:?}, max 1D texture {}, max buffer {} bytes",
            ctx.surface_format,
            limits.max_texture_dimension_1d,
            limits.max_buffer_size
        );

        Self {
            device,
            queue: ctx.queue.clone(),
            limits,
            colormap_format,
            pipeline,
            colormap_layout,
            sampler,
            labels,
            font: None,
            warned_no_font: false,
        }
    }

    /// Uses font `id` of `fonts` at `size` pixels for labels.
    pub fn with_font(mut self, fonts: FontSystem, id: FontId, size: f32) -> Self {
        self.font = Some(LabelFont { fonts, id, size });
        self
    }

    /// Metrics of the label font, if one is set.
    pub fn text_metrics(&self) -> Option<FontMetrics<'_>> {
        self.font.as_ref().map(|f| f.fonts.metrics(f.id, f.size))
    }

    fn check_buffer(&self, what: &str, bytes: u64) -> Result<(), PatchError> {
        check_allocation(what, bytes, self.limits.max_buffer_size)
    }
}

impl RenderBackend for WgpuBackend {
    type Buffer = wgpu::Buffer;
    type Texture = ColormapTexture;

    fn max_texture_size(&self) -> u32 {
        self.limits.max_texture_dimension_1d
    }

    fn create_vertex_buffer(
        &mut self,
        label: &str,
        records: &[PatchVertex],
        usage: BufferUsage,
    ) -> Result<wgpu::Buffer, PatchError> {
        self.check_buffer("vertex buffer", std::mem::size_of_val(records) as u64)?;
        let usage = match usage {
            BufferUsage::Dynamic => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            BufferUsage::Static => wgpu::BufferUsages::VERTEX,
        };
        Ok(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} vbo")),
            contents: bytemuck::cast_slice(records),
            usage,
        }))
    }

    fn create_index_buffer(&mut self, label: &str, indices: &[u32]) -> Result<wgpu::Buffer, PatchError> {
        self.check_buffer("index buffer", std::mem::size_of_val(indices) as u64)?;
        Ok(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} ibo")),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        }))
    }

    fn create_colormap_texture(&mut self, label: &str, colors: &[Rgba]) -> Result<ColormapTexture, PatchError> {
        let width = u32::try_from(colors.len())
            .map_err(|_| PatchError::backend(format!("colormap of {} texels", colors.len())))?;
        check_allocation("colormap texture", width as u64, self.limits.max_texture_dimension_1d as u64)?;

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label} colormap")),
            size: wgpu::Extent3d {
                width,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D1,
            format: self.colormap_format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let texels: Vec<[u8; 4]> = colors.iter().map(|c| c.to_rgba8()).collect();
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width,
                height: 1,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::D1),
            ..Default::default()
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} colormap bind group")),
            layout: &self.colormap_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        Ok(ColormapTexture { bind_group })
    }

    fn upload_vertices(&mut self, buffer: &wgpu::Buffer, records: &[PatchVertex]) -> Result<(), PatchError> {
        let bytes = std::mem::size_of_val(records) as u64;
        if bytes > buffer.size() {
            return Err(PatchError::backend(format!(
                "upload of {bytes} bytes into a {} byte buffer",
                buffer.size()
            )));
        }
        self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(records));
        Ok(())
    }
}

impl DrawTarget<WgpuBackend> for RenderTarget<'_> {
    fn draw_mesh(&mut self, backend: &mut WgpuBackend, mesh: MeshDraw<'_, WgpuBackend>) -> Result<(), PatchError> {
        let Some(rect) = self.draw_rect(mesh.viewport) else {
            return Ok(());
        };

        let mut rpass = self.begin_pass("patchview mesh pass");
        rpass.set_viewport(rect.x as f32, rect.y as f32, rect.width as f32, rect.height as f32, 0.0, 1.0);
        rpass.set_scissor_rect(rect.x, rect.y, rect.width, rect.height);
        rpass.set_pipeline(&backend.pipeline);
        rpass.set_bind_group(0, &mesh.colormap.bind_group, &[]);
        rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
        rpass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        Ok(())
    }

    fn draw_labels(&mut self, backend: &mut WgpuBackend, runs: &[TextRun]) -> Result<(), PatchError> {
        let WgpuBackend { device, queue, labels, font, warned_no_font, .. } = backend;
        let Some(label_font) = font.as_ref() else {
            if !*warned_no_font {
                log::warn!("no label font loaded; colorbar labels are not drawn");
                *warned_no_font = true;
            }
            return Ok(());
        };
        let Some(face) = label_font.fonts.get(label_font.id) else {
            log::warn!("label font {:?} is not loaded", label_font.id);
            return Ok(());
        };

        let size = self.size;
        let Some(rect) = self.draw_rect(size) else {
            return Ok(());
        };

        let mut rpass = self.begin_pass("patchview label pass");
        rpass.set_scissor_rect(rect.x, rect.y, rect.width, rect.height);
        labels.render(device, queue, &mut rpass, size, rect, face, label_font.size, runs);
        Ok(())
    }
}
