//! Geometry types shared by the renderer and its callers.
//!
//! Canonical CPU space:
//! - world units (one unit per pixel at the default projection)
//! - +X right, +Y down
//!
//! Texture regions are expressed in normalized atlas coordinates (`0..1`).

mod rect;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
