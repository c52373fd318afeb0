use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};

/// Plot window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "patchview".to_string(),
            initial_size: LogicalSize::new(960.0, 640.0),
        }
    }
}

/// Requests an app can make from inside a frame.
///
/// Applied after `on_frame` returns.
#[derive(Debug, Default)]
pub struct RuntimeCtx {
    redraw: bool,
    exit: bool,
    failure: Option<anyhow::Error>,
}

impl RuntimeCtx {
    /// Asks for another frame, e.g. after the data changed.
    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn exit(&mut self) {
        self.exit = true;
    }

    /// Stops the loop and makes [`Runtime::run`] return `err`.
    pub fn fail(&mut self, err: anyhow::Error) {
        self.failure = Some(err);
        self.exit = true;
    }
}

/// Single-window event loop driving an [`App`].
///
/// Frames are only produced on demand (first show, resize, scale change or an
/// explicit redraw request); the loop sleeps otherwise.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut viewer = Viewer {
            config,
            gpu_init,
            app,
            window: None,
            exiting: false,
            failure: None,
        };
        event_loop
            .run_app(&mut viewer)
            .context("event loop terminated with error")?;

        match viewer.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct PlotWindow {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl PlotWindow {
    fn open(event_loop: &ActiveEventLoop, config: &RuntimeConfig, gpu_init: GpuInit) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        PlotWindowTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")
    }

    fn redraw(&self) {
        self.with_window(|w| w.request_redraw());
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.with_gpu_mut(|gpu| gpu.resize(size));
        self.redraw();
    }
}

struct Viewer<A: App> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,
    window: Option<PlotWindow>,
    exiting: bool,
    failure: Option<anyhow::Error>,
}

impl<A: App> Viewer<A> {
    /// Lets the app drop its GPU handles, then tears down the window and device.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if !self.exiting {
            self.exiting = true;
            self.app.on_exit();
            self.window = None;
        }
        event_loop.exit();
    }

    fn frame(&mut self) -> RuntimeCtx {
        let mut runtime = RuntimeCtx::default();
        let Some(entry) = self.window.as_mut() else {
            return runtime;
        };

        let app = &mut self.app;
        let control = entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: WindowCtx { window: fields.window },
                gpu: fields.gpu,
                runtime: &mut runtime,
            };
            app.on_frame(&mut ctx)
        });

        if control == AppControl::Exit {
            runtime.exit();
        }
        runtime
    }
}

impl<A: App> ApplicationHandler for Viewer<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exiting {
            return;
        }

        match PlotWindow::open(event_loop, &self.config, self.gpu_init.clone()) {
            Ok(entry) => {
                entry.redraw();
                self.window = Some(entry);
            }
            Err(e) => {
                log::error!("failed to open plot window: {e:#}");
                self.failure = Some(e);
                self.shutdown(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exiting {
            return;
        }
        if self.app.on_window_event(&event) == AppControl::Exit {
            self.shutdown(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(size) => {
                if let Some(entry) = self.window.as_mut() {
                    entry.resize(size);
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let size = entry.with_window(|w| w.inner_size());
                    entry.resize(size);
                }
            }

            WindowEvent::RedrawRequested => {
                let mut runtime = self.frame();
                if let Some(err) = runtime.failure.take() {
                    log::error!("{err:#}");
                    self.failure = Some(err);
                }
                if runtime.exit {
                    self.shutdown(event_loop);
                } else if runtime.redraw {
                    if let Some(entry) = self.window.as_ref() {
                        entry.redraw();
                    }
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_requests_exit_and_keeps_the_error() {
        let mut rt = RuntimeCtx::default();
        rt.request_redraw();
        rt.fail(anyhow::anyhow!("backend lost"));

        assert!(rt.exit);
        assert!(rt.redraw);
        let err = rt.failure.take().unwrap();
        assert_eq!(err.to_string(), "backend lost");
    }

    #[test]
    fn plain_exit_carries_no_error() {
        let mut rt = RuntimeCtx::default();
        rt.exit();
        assert!(rt.exit);
        assert!(rt.failure.is_none());
    }
}
