use winit::window::{Window, WindowId};

use crate::coords::Vec2;
use crate::render::{FrameStats, WindowRenderer};
use crate::time::FrameTime;
use crate::window::RuntimeCtx;

use super::app::AppControl;

/// Per-window handles.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Drawable size in physical pixels, which is also the world-unit extent
    /// the renderer's projection covers.
    pub fn size(&self) -> (f32, f32) {
        let size = self.window.inner_size();
        (size.width as f32, size.height as f32)
    }
}

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// `'a` is the callback borrow; `'w` is the window borrow carried by the
/// renderer's wgpu backend.
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub renderer: &'a mut WindowRenderer<'w>,
    pub time: FrameTime,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'w> FrameCtx<'_, 'w> {
    /// Runs one `begin_frame → draw → end_frame` cycle with `camera` at the
    /// viewport centre and returns the frame's stats.
    ///
    /// Returns `Err(AppControl::Exit)` once the window surface is lost.
    pub fn render<F>(&mut self, camera: Vec2, draw: F) -> Result<FrameStats, AppControl>
    where
        F: FnOnce(&mut WindowRenderer<'w>),
    {
        self.renderer.begin_frame(camera);
        draw(&mut *self.renderer);

        self.window.window.pre_present_notify();
        self.renderer.end_frame();

        if self
            .renderer
            .backend()
            .is_some_and(|backend| backend.is_surface_lost())
        {
            return Err(AppControl::Exit);
        }
        Ok(self.renderer.stats())
    }
}
