use crate::coords::{PixelRect, Viewport};

/// Renderer-facing context (device/queue + surface format + drawable size).
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub viewport: Viewport, // physical px
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            viewport,
        }
    }
}

/// Target for drawing (encoder + color view), optionally restricted to a region.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
    /// Size of `color_view` in physical pixels.
    pub size: Viewport,
    /// Sub-rectangle surfaces draw into; `None` is the whole target.
    pub region: Option<PixelRect>,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(
        encoder: &'a mut wgpu::CommandEncoder,
        color_view: &'a wgpu::TextureView,
        size: Viewport,
    ) -> Self {
        Self {
            encoder,
            color_view,
            size,
            region: None,
        }
    }

    /// Restricts subsequent draws to `region`.
    pub fn set_region(&mut self, region: Option<PixelRect>) {
        self.region = region;
    }

    /// Visible pixel rectangle for a surface of `viewport` size.
    pub(crate) fn draw_rect(&self, viewport: Viewport) -> Option<PixelRect> {
        self.region
            .unwrap_or(PixelRect::new(0, 0, viewport.width, viewport.height))
            .clamped_to(self.size.width, self.size.height)
    }

    pub(crate) fn begin_pass(&mut self, label: &str) -> wgpu::RenderPass<'_> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}
