use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::render::WindowRenderer;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by games and tools built on the runtime.
pub trait App {
    /// Called for every window event, before the runtime handles it.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per window after its sprite renderer initialized.
    ///
    /// Register textures here. An error closes the window.
    fn on_renderer_ready(&mut self, window_id: WindowId, renderer: &mut WindowRenderer<'_>) -> anyhow::Result<()> {
        let _ = (window_id, renderer);
        Ok(())
    }

    /// Called once per redraw per window.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
