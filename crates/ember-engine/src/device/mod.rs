//! wgpu device and window surface.
//!
//! [`Gpu`] owns the adapter, device, queue and the configured swapchain for
//! one window. The sprite renderer's wgpu backend is its only consumer; it
//! acquires a [`GpuFrame`] in `begin_frame` and presents it in `end_frame`.

mod frame;
mod gpu;
mod init;
mod surface;

pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
