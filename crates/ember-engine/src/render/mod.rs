//! Sprite batch rendering.
//!
//! [`SpriteBatchRenderer`] accumulates per-frame sprite submissions into a
//! fixed-capacity instance buffer and issues one instanced draw call per
//! texture group. GPU specifics live behind [`RenderBackend`]; the batching
//! policy (capacity, grouping, projection) lives here.
//!
//! Frame protocol:
//!
//! ```text
//! begin_frame(camera)
//!   submit(..)*  flush("player")
//!   submit(..)*  flush("coins")
//! end_frame()
//! ```
//!
//! Convention:
//! - world units, +Y down
//! - `Sprite::position` is the sprite centre; rotation is about that centre

mod batch;
mod error;
mod projection;
mod sprite;
mod texture;

pub mod backend;

pub use backend::{HeadlessBackend, HeadlessSurface, RenderBackend, WgpuBackend, WgpuSurface};
pub use batch::{FrameStats, RendererConfig, RendererState, SpriteBatchRenderer};
pub use error::{BackendError, RenderError};
pub use projection::orthographic;
pub use sprite::{QuadVertex, Sprite, SpriteInstance, QUAD_VERTICES};
pub use texture::{TextureId, TextureImage};

/// Renderer bound to a window surface.
pub type WindowRenderer<'w> = SpriteBatchRenderer<WgpuBackend<'w>>;
