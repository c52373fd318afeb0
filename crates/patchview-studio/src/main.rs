use anyhow::{bail, Context, Result};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use patchview_engine::colorbar::{Colorbar, FixedMetrics, TextMetrics};
use patchview_engine::colormap::{Palettes, Rgba, DEFAULT_PALETTE};
use patchview_engine::coords::{BoundingBox, PixelRect};
use patchview_engine::core::{App, AppControl, FrameCtx};
use patchview_engine::device::GpuInit;
use patchview_engine::grid::{MeshFlattener, StructuredGrid, Topology};
use patchview_engine::logging::{init_logging, LoggingConfig};
use patchview_engine::patch::{PatchConfig, PatchSurface};
use patchview_engine::render::{RenderCtx, RenderTarget, WgpuBackend};
use patchview_engine::text::{FontId, FontSystem};
use patchview_engine::window::{Runtime, RuntimeConfig};
use patchview_engine::PatchError;

const FONT_PATHS: [&str; 5] = [
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
];

const LABEL_SIZE: f32 = 14.0;
const LABEL_COLOR: Rgba = Rgba::opaque(0.15, 0.15, 0.15);
const INTERVALS: [usize; 2] = [24, 24];

/// Demo settings read from `PATCHVIEW_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
struct StudioConfig {
    topology: Topology,
    codim: u8,
    palette: String,
}

impl StudioConfig {
    fn from_env() -> Result<Self> {
        Self::parse(
            std::env::var("PATCHVIEW_TOPOLOGY").ok().as_deref(),
            std::env::var("PATCHVIEW_CODIM").ok().as_deref(),
            std::env::var("PATCHVIEW_PALETTE").ok(),
        )
    }

    fn parse(topology: Option<&str>, codim: Option<&str>, palette: Option<String>) -> Result<Self> {
        let topology = match topology.map(str::to_ascii_lowercase).as_deref() {
            None | Some("quad") => Topology::Quad,
            Some("tri") | Some("triangle") => Topology::Triangle,
            Some(other) => bail!("PATCHVIEW_TOPOLOGY must be 'tri' or 'quad', got '{other}'"),
        };
        let codim = match codim {
            None => 2,
            Some(s) => s
                .trim()
                .parse::<u8>()
                .with_context(|| format!("PATCHVIEW_CODIM is not a number: '{s}'"))?,
        };
        Ok(Self {
            topology,
            codim,
            palette: palette.unwrap_or_else(|| DEFAULT_PALETTE.to_string()),
        })
    }
}

/// Test field: a saddle-shaped wave over the unit square.
fn wave([x, y]: [f64; 2]) -> f64 {
    use std::f64::consts::PI;
    (2.0 * PI * x).sin() * (PI * y).cos() + 0.5 * x
}

struct Studio {
    surface: PatchSurface<WgpuBackend>,
    colorbar: Colorbar<WgpuBackend>,
    palettes: Palettes,
    field: Vec<f64>,
    bounds: (f64, f64),
    fonts: Option<(FontSystem, FontId)>,
    backend: Option<WgpuBackend>,
}

impl Studio {
    fn new(config: &StudioConfig, fonts: Option<(FontSystem, FontId)>) -> Result<Self> {
        let grid = StructuredGrid::new(config.topology, BoundingBox::unit(), INTERVALS)?;
        let patch_config = PatchConfig::default()
            .with_codim(config.codim)
            .with_palette(config.palette.clone());
        let placement = patch_config.placement()?;

        let flat = grid.flatten()?;
        let field = grid.sample(placement, wave);

        let mut surface = PatchSurface::new(&flat, patch_config)?;
        let bounds = surface.set_field(&field)?;
        log::info!(
            "{:?} grid, {} cells, {} values on {placement:?}, range [{:.4}, {:.4}]",
            config.topology,
            flat.cell_count(),
            field.len(),
            bounds.0,
            bounds.1
        );

        let fallback = FixedMetrics::for_size(LABEL_SIZE);
        let mut colorbar = Colorbar::new(config.palette.clone(), &fallback).with_label_color(LABEL_COLOR);
        colorbar.set(&field, Some(bounds.0), Some(bounds.1), &fallback);

        Ok(Self {
            surface,
            colorbar,
            palettes: Palettes::new(),
            field,
            bounds,
            fonts,
            backend: None,
        })
    }

    /// Creates the backend on the first frame and allocates both surfaces.
    fn ensure_backend(&mut self, rctx: &RenderCtx<'_>) -> Result<(), PatchError> {
        if self.backend.is_some() {
            return Ok(());
        }

        let mut backend = WgpuBackend::new(rctx);
        if let Some((fonts, id)) = self.fonts.take() {
            backend = backend.with_font(fonts, id, LABEL_SIZE);
        }

        // Re-measure labels with the real font.
        if let Some(metrics) = backend.text_metrics() {
            self.relayout_colorbar(&metrics);
        }

        self.surface.initialize(&mut backend, &self.palettes)?;
        self.colorbar.initialize(&mut backend, &self.palettes)?;
        self.backend = Some(backend);
        Ok(())
    }

    fn relayout_colorbar(&mut self, metrics: &dyn TextMetrics) {
        let (vmin, vmax) = self.bounds;
        self.colorbar.set(&self.field, Some(vmin), Some(vmax), metrics);
    }

    fn draw(&mut self, rctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) -> Result<(), PatchError> {
        self.ensure_backend(rctx)?;
        let Some(backend) = self.backend.as_mut() else {
            return Ok(());
        };

        let full = PixelRect::new(0, 0, rctx.viewport.width, rctx.viewport.height);
        let (bar_width, _) = self.colorbar.minimum_size();
        let (plot, bar) = full.split_right(bar_width);

        self.surface.resize(plot.width, plot.height);
        self.colorbar.resize(bar.width, bar.height);

        target.set_region(Some(plot));
        self.surface.draw(backend, target)?;

        target.set_region(Some(bar));
        self.colorbar.draw(backend, target)?;

        target.set_region(None);
        Ok(())
    }
}

impl App for Studio {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput { event, .. } = event {
            if event.state == ElementState::Pressed && event.logical_key == Key::Named(NamedKey::Escape) {
                return AppControl::Exit;
            }
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let mut result = Ok(());
        let control = ctx.render(Rgba::white(), |rctx, target| {
            result = self.draw(rctx, target);
        });

        if let Err(e) = result {
            ctx.runtime.fail(anyhow::Error::new(e).context("frame failed"));
        }
        control
    }

    fn on_exit(&mut self) {
        self.surface.release();
        self.colorbar.release();
        self.backend = None;
    }
}

fn load_fonts() -> Option<(FontSystem, FontId)> {
    let mut fonts = FontSystem::new();
    match fonts.load_first(&FONT_PATHS) {
        Some(id) => Some((fonts, id)),
        None => {
            log::warn!("no system font found; colorbar labels are disabled");
            None
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = StudioConfig::from_env()?;
    log::info!("starting patchview studio: {config:?}");

    let studio = Studio::new(&config, load_fonts()).context("failed to set up the patch plot")?;

    Runtime::run(
        RuntimeConfig {
            title: format!("patchview - {:?} / codim {}", config.topology, config.codim),
            ..Default::default()
        },
        GpuInit::default(),
        studio,
    )
}
