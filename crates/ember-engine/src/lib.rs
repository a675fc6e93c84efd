//! Ember engine crate.
//!
//! Instanced 2D sprite batching on wgpu, object pooling for transient
//! gameplay records, and the window runtime that ties them to a `winit` loop.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod pool;
