//! Colour model shared by the renderer and its callers.
//!
//! Sprite tints and the frame clear colour are straight-alpha RGBA in `[0, 1]`;
//! the sprite pipeline blends with standard source-over compositing.

pub mod color;

pub use color::Color;
