//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and one sprite renderer per window.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig, RuntimeCtx};
