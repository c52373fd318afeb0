use winit::event::WindowEvent;

use super::ctx::FrameCtx;

/// Returned by app callbacks to keep the window open or close it.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// What a plot viewer binary implements.
pub trait App {
    /// Sees every window event before the runtime does.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Renders one frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called once before the window and its GPU device go away.
    fn on_exit(&mut self) {}
}
