/// Surface texture acquired for one frame.
///
/// Held by the sprite backend from `begin_frame` to `end_frame`; every flush in
/// between renders into `view`. Holding it prevents acquiring the next frame,
/// so it must be presented promptly.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}
