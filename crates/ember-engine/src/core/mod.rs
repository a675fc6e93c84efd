//! Contract between the window runtime and the application.
//!
//! The runtime owns windows and their sprite renderers; applications see them
//! only through [`App`] callbacks and the per-frame [`FrameCtx`].

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
