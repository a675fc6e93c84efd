use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::paint::Color;
use crate::render::{BackendError, SpriteInstance, TextureId, TextureImage};

use super::{
    BufferDesc, BufferId, BufferKind, DrawCall, FrameParams, RenderBackend, StepMode, VertexStream,
};

/// One observed backend operation.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    Connect { width: u32, height: u32 },
    AllocateBuffer { id: BufferId, kind: BufferKind, size: u64 },
    BindAttributes { streams: usize, instanced: usize },
    CompileProgram,
    UploadTexture { id: TextureId, width: u32, height: u32 },
    WriteBuffer { id: BufferId, bytes: usize },
    BeginFrame {
        projection: [[f32; 4]; 4],
        clear: Color,
        alpha_cutoff: f32,
    },
    /// Instanced draw with the instance records visible to it.
    Draw { call: DrawCall, instances: Vec<SpriteInstance> },
    EndFrame,
    Resize { width: u32, height: u32 },
    DestroyBuffer(BufferId),
    DestroyTexture(TextureId),
    DestroyProgram,
}

/// Shared, append-only record of backend calls.
///
/// Cloning shares the log, so a caller can keep a handle while the backend is
/// owned by the renderer (and after it has been torn down).
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<BackendCall>>>);

impl CallLog {
    fn push(&self, call: BackendCall) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.0.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.0.borrow().iter().filter(|c| pred(c)).count()
    }

    /// Draw calls in issue order.
    pub fn draws(&self) -> Vec<(DrawCall, Vec<SpriteInstance>)> {
        self.0
            .borrow()
            .iter()
            .filter_map(|c| match c {
                BackendCall::Draw { call, instances } => Some((*call, instances.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// Step at which a [`HeadlessBackend`] should report failure.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FailurePoint {
    Connect,
    InstanceAllocation,
    Compile,
    /// Every `begin_frame` fails to acquire a target, so draws are skipped.
    FrameAcquire,
}

/// Surface description for [`HeadlessBackend`].
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    pub width: u32,
    pub height: u32,
    pub fail_at: Option<FailurePoint>,
    log: CallLog,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fail_at: None,
            log: CallLog::default(),
        }
    }

    pub fn failing_at(mut self, point: FailurePoint) -> Self {
        self.fail_at = Some(point);
        self
    }

    /// Handle to the log the connected backend will write to.
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

/// Backend that performs no GPU work and records every call.
///
/// Used to verify batching behaviour (draw counts, instance contents, texture
/// uploads) without a device, and to dry-run frames on machines without one.
#[derive(Debug)]
pub struct HeadlessBackend {
    log: CallLog,
    fail_at: Option<FailurePoint>,
    buffers: HashMap<BufferId, Vec<u8>>,
    instance_stream: Option<BufferId>,
    textures: HashMap<TextureId, (u32, u32)>,
    next_buffer: u32,
    next_texture: u32,
    program: bool,
    frame_open: bool,
}

impl HeadlessBackend {
    pub fn log(&self) -> &CallLog {
        &self.log
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    fn fails_at(&self, point: FailurePoint) -> bool {
        self.fail_at == Some(point)
    }
}

impl RenderBackend for HeadlessBackend {
    type Surface = HeadlessSurface;

    fn connect(surface: HeadlessSurface) -> Result<Self, BackendError> {
        if surface.fail_at == Some(FailurePoint::Connect) {
            return Err(BackendError::Context("headless surface configured to fail".into()));
        }
        surface.log.push(BackendCall::Connect {
            width: surface.width,
            height: surface.height,
        });
        Ok(Self {
            log: surface.log,
            fail_at: surface.fail_at,
            buffers: HashMap::new(),
            instance_stream: None,
            textures: HashMap::new(),
            next_buffer: 0,
            next_texture: 0,
            program: false,
            frame_open: false,
        })
    }

    fn allocate_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<BufferId, BackendError> {
        if desc.kind == BufferKind::DynamicInstance && self.fails_at(FailurePoint::InstanceAllocation) {
            return Err(BackendError::Allocation(format!("{}: out of memory", desc.label)));
        }

        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;

        let mut storage = vec![0u8; desc.size as usize];
        if let Some(contents) = desc.contents {
            let n = contents.len().min(storage.len());
            storage[..n].copy_from_slice(&contents[..n]);
        }
        self.buffers.insert(id, storage);
        self.log.push(BackendCall::AllocateBuffer {
            id,
            kind: desc.kind,
            size: desc.size,
        });
        Ok(id)
    }

    fn bind_instanced_attributes(&mut self, streams: &[VertexStream]) -> Result<(), BackendError> {
        if let Some(missing) = streams.iter().find(|s| !self.buffers.contains_key(&s.buffer)) {
            return Err(BackendError::Binding(format!("unknown buffer {:?}", missing.buffer)));
        }
        self.instance_stream = streams
            .iter()
            .find(|s| s.step == StepMode::PerInstance)
            .map(|s| s.buffer);
        self.log.push(BackendCall::BindAttributes {
            streams: streams.len(),
            instanced: streams.iter().filter(|s| s.step == StepMode::PerInstance).count(),
        });
        Ok(())
    }

    fn compile_program(&mut self) -> Result<(), BackendError> {
        if self.fails_at(FailurePoint::Compile) {
            return Err(BackendError::ShaderCompile("headless surface configured to fail".into()));
        }
        self.program = true;
        self.log.push(BackendCall::CompileProgram);
        Ok(())
    }

    fn upload_texture(&mut self, image: &TextureImage) -> Result<TextureId, BackendError> {
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, (image.width(), image.height()));
        self.log.push(BackendCall::UploadTexture {
            id,
            width: image.width(),
            height: image.height(),
        });
        Ok(id)
    }

    fn write_buffer(&mut self, buffer: BufferId, bytes: &[u8]) {
        let Some(storage) = self.buffers.get_mut(&buffer) else { return };
        let n = bytes.len().min(storage.len());
        storage[..n].copy_from_slice(&bytes[..n]);
        self.log.push(BackendCall::WriteBuffer { id: buffer, bytes: bytes.len() });
    }

    fn begin_frame(&mut self, params: &FrameParams) {
        self.frame_open = !self.fails_at(FailurePoint::FrameAcquire);
        self.log.push(BackendCall::BeginFrame {
            projection: params.projection,
            clear: params.clear,
            alpha_cutoff: params.alpha_cutoff,
        });
    }

    fn draw_instanced(&mut self, call: &DrawCall) -> bool {
        if !self.frame_open || !self.program || !self.textures.contains_key(&call.texture) {
            return false;
        }
        let instances = self
            .instance_stream
            .and_then(|id| self.buffers.get(&id))
            .map(|bytes| {
                let stride = SpriteInstance::STRIDE as usize;
                let visible = (call.instance_count as usize * stride).min(bytes.len());
                bytes[..visible]
                    .chunks_exact(stride)
                    .map(bytemuck::pod_read_unaligned::<SpriteInstance>)
                    .collect()
            })
            .unwrap_or_default();
        self.log.push(BackendCall::Draw { call: *call, instances });
        true
    }

    fn end_frame(&mut self) {
        self.frame_open = false;
        self.log.push(BackendCall::EndFrame);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.log.push(BackendCall::Resize { width, height });
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        if self.buffers.remove(&buffer).is_some() {
            if self.instance_stream == Some(buffer) {
                self.instance_stream = None;
            }
            self.log.push(BackendCall::DestroyBuffer(buffer));
        }
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if self.textures.remove(&texture).is_some() {
            self.log.push(BackendCall::DestroyTexture(texture));
        }
    }

    fn destroy_program(&mut self) {
        if std::mem::take(&mut self.program) {
            self.log.push(BackendCall::DestroyProgram);
        }
    }
}
