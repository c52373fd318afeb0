use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};
use wgpu::util::DeviceExt;

use crate::coords::{PixelRect, Viewport};

use super::TextRun;

const ATLAS_SIZE: u32 = 512;
const GLYPH_GAP: u32 = 1;

/// Shelf-packed R8 coverage atlas; glyphs stay cached until the renderer is dropped.
struct GlyphAtlas {
    texture: wgpu::Texture,
    cursor: [u32; 2],
    shelf_height: u32,
    full: bool,
    uvs: HashMap<GlyphRasterConfig, [f32; 4]>,
}

impl GlyphAtlas {
    fn new(device: &wgpu::Device) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("patchview label atlas"),
            size: wgpu::Extent3d {
                width: ATLAS_SIZE,
                height: ATLAS_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        Self {
            texture,
            cursor: [GLYPH_GAP, GLYPH_GAP],
            shelf_height: 0,
            full: false,
            uvs: HashMap::new(),
        }
    }

    /// UV rectangle `[u0, v0, u1, v1]` of `key`, rasterizing it on first use.
    fn lookup(&mut self, queue: &wgpu::Queue, font: &fontdue::Font, key: GlyphRasterConfig) -> Option<[f32; 4]> {
        if let Some(&uv) = self.uvs.get(&key) {
            return Some(uv);
        }
        let (metrics, bitmap) = font.rasterize_config(key);
        let uv = self.insert(queue, &bitmap, metrics.width as u32, metrics.height as u32)?;
        self.uvs.insert(key, uv);
        Some(uv)
    }

    fn insert(&mut self, queue: &wgpu::Queue, bitmap: &[u8], w: u32, h: u32) -> Option<[f32; 4]> {
        if self.full || w == 0 || h == 0 {
            return None;
        }
        if self.cursor[0] + w + GLYPH_GAP > ATLAS_SIZE {
            self.cursor = [GLYPH_GAP, self.cursor[1] + self.shelf_height + GLYPH_GAP];
            self.shelf_height = 0;
        }
        if self.cursor[1] + h + GLYPH_GAP > ATLAS_SIZE {
            log::warn!("label atlas full ({ATLAS_SIZE}x{ATLAS_SIZE}); further glyphs are skipped");
            self.full = true;
            return None;
        }

        let [x, y] = self.cursor;
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            bitmap,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );
        self.cursor[0] += w + GLYPH_GAP;
        self.shelf_height = self.shelf_height.max(h);

        let s = ATLAS_SIZE as f32;
        Some([x as f32 / s, y as f32 / s, (x + w) as f32 / s, (y + h) as f32 / s])
    }
}

/// Draws short text runs (colorbar labels) as instanced glyph quads.
///
/// One instance per glyph; the quad corners come from the vertex index so no
/// vertex or index buffer is bound besides the instances. Glyph rectangles are
/// converted to NDC on the CPU and every `render` call gets its own instance
/// buffer, so several label draws may share one encoder.
pub struct LabelRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    atlas: GlyphAtlas,
    layout: Layout<()>,
}

impl LabelRenderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("patchview label shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/label.wgsl").into()),
        });

        let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("patchview label bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
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
            label: Some("patchview label pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("patchview label pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[GlyphInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let atlas = GlyphAtlas::new(device);
        let atlas_view = atlas.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("patchview label sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("patchview label bind group"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            pipeline,
            bind_group,
            atlas,
            layout: Layout::new(CoordinateSystem::PositiveYDown),
        }
    }

    /// Records `runs` into `pass`. Run origins are relative to `region`.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        target_size: Viewport,
        region: PixelRect,
        font: &fontdue::Font,
        size: f32,
        runs: &[TextRun],
    ) {
        let glyphs = self.collect_glyphs(queue, target_size, region, font, size, runs);
        if glyphs.is_empty() {
            return;
        }

        let instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("patchview label instances"),
            contents: bytemuck::cast_slice(&glyphs),
            usage: wgpu::BufferUsages::VERTEX,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, instances.slice(..));
        pass.draw(0..4, 0..glyphs.len() as u32);
    }

    fn collect_glyphs(
        &mut self,
        queue: &wgpu::Queue,
        target_size: Viewport,
        region: PixelRect,
        font: &fontdue::Font,
        size: f32,
        runs: &[TextRun],
    ) -> Vec<GlyphInstance> {
        let mut out = Vec::new();
        for run in runs {
            self.layout.reset(&LayoutSettings {
                x: region.x as f32 + run.origin[0],
                y: region.y as f32 + run.origin[1],
                ..LayoutSettings::default()
            });
            self.layout.append(&[font], &TextStyle::new(&run.text, size, 0));

            let color = [run.color.r, run.color.g, run.color.b, run.color.a];
            for g in self.layout.glyphs() {
                if !g.char_data.rasterize() || g.width == 0 || g.height == 0 {
                    continue;
                }
                let Some(uv) = self.atlas.lookup(queue, font, g.key) else {
                    continue;
                };
                out.push(GlyphInstance {
                    rect: pixel_rect_to_ndc(
                        [g.x, g.y, g.x + g.width as f32, g.y + g.height as f32],
                        target_size,
                    ),
                    uv,
                    color,
                });
            }
        }
        out
    }
}

/// Maps a pixel rectangle `[x0, y0, x1, y1]` (top-left origin, +Y down) of a
/// `target` sized surface to NDC corners.
fn pixel_rect_to_ndc(rect: [f32; 4], target: Viewport) -> [f32; 4] {
    let w = target.width.max(1) as f32;
    let h = target.height.max(1) as f32;
    [
        rect[0] / w * 2.0 - 1.0,
        1.0 - rect[1] / h * 2.0,
        rect[2] / w * 2.0 - 1.0,
        1.0 - rect[3] / h * 2.0,
    ]
}

/// NDC rectangle `[x0, y0, x1, y1]`, atlas rectangle and straight-alpha color.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlyphInstance {
    rect: [f32; 4],
    uv: [f32; 4],
    color: [f32; 4],
}

impl GlyphInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32x4, 2 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
