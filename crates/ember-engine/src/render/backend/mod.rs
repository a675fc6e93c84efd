//! Rendering-backend capability interface.
//!
//! The batch renderer only needs a handful of capabilities from a graphics
//! API: allocate buffers, describe instanced attribute streams, build the
//! sprite program, upload textures and issue instanced draws. Everything else
//! (grouping, capacity policy, projection math) stays backend-agnostic.
//!
//! Call order during setup is fixed:
//! `connect → allocate_buffer* → bind_instanced_attributes → compile_program`.

mod headless;
mod wgpu_backend;

pub use headless::{BackendCall, CallLog, FailurePoint, HeadlessBackend, HeadlessSurface};
pub use wgpu_backend::{WgpuBackend, WgpuSurface};

use crate::paint::Color;

use super::{BackendError, TextureId, TextureImage};

/// Dense handle to a backend-owned buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) u32);

impl BufferId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferKind {
    /// Immutable per-vertex data, uploaded once at allocation.
    StaticVertex,
    /// Per-instance data rewritten on every flush.
    DynamicInstance,
}

#[derive(Debug, Clone, Copy)]
pub struct BufferDesc<'a> {
    pub label: &'a str,
    pub kind: BufferKind,
    pub size: u64,
    /// Initial contents; required for [`BufferKind::StaticVertex`].
    pub contents: Option<&'a [u8]>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttrFormat {
    Float32,
    Float32x2,
    Float32x4,
}

impl AttrFormat {
    /// Size in bytes.
    #[inline]
    pub const fn size(self) -> u64 {
        match self {
            AttrFormat::Float32 => 4,
            AttrFormat::Float32x2 => 8,
            AttrFormat::Float32x4 => 16,
        }
    }
}

/// One shader input inside a vertex stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexAttr {
    pub location: u32,
    pub offset: u64,
    pub format: AttrFormat,
}

impl VertexAttr {
    #[inline]
    pub const fn new(location: u32, offset: u64, format: AttrFormat) -> Self {
        Self { location, offset, format }
    }
}

/// How often a stream advances.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepMode {
    PerVertex,
    /// Advanced once per instance: the sprite records.
    PerInstance,
}

/// A buffer bound to a vertex input slot; slot index is the position in the
/// slice passed to [`RenderBackend::bind_instanced_attributes`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexStream {
    pub buffer: BufferId,
    pub stride: u64,
    pub step: StepMode,
    pub attributes: &'static [VertexAttr],
}

/// Per-frame uniforms.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameParams {
    /// Column-major world → NDC matrix.
    pub projection: [[f32; 4]; 4],
    pub clear: Color,
    /// Fragments with alpha below this are discarded.
    pub alpha_cutoff: f32,
}

/// One instanced draw over the bound streams.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub texture: TextureId,
    pub vertex_count: u32,
    pub instance_count: u32,
}

/// Minimal graphics capabilities required by the sprite batch renderer.
///
/// Per-frame methods are infallible: a backend that cannot honour one (lost
/// surface, missing resource) skips it and logs.
pub trait RenderBackend: Sized {
    /// Whatever the backend needs to acquire a GPU context.
    type Surface;

    fn connect(surface: Self::Surface) -> Result<Self, BackendError>;

    fn allocate_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<BufferId, BackendError>;

    /// Declares the vertex streams consumed by the program, per-vertex and
    /// per-instance alike.
    fn bind_instanced_attributes(&mut self, streams: &[VertexStream]) -> Result<(), BackendError>;

    /// Compiles and links the sprite program against the bound streams.
    fn compile_program(&mut self) -> Result<(), BackendError>;

    fn upload_texture(&mut self, image: &TextureImage) -> Result<TextureId, BackendError>;

    /// Replaces the leading bytes of `buffer` in one transfer.
    fn write_buffer(&mut self, buffer: BufferId, bytes: &[u8]);

    /// Acquires the frame target, clears it and uploads `params`.
    fn begin_frame(&mut self, params: &FrameParams);

    /// Returns `false` if nothing was drawn, for example when the frame
    /// target could not be acquired.
    fn draw_instanced(&mut self, call: &DrawCall) -> bool;

    /// Releases per-frame bindings and presents.
    fn end_frame(&mut self);

    fn resize(&mut self, width: u32, height: u32);

    fn destroy_buffer(&mut self, buffer: BufferId);

    fn destroy_texture(&mut self, texture: TextureId);

    fn destroy_program(&mut self);
}
