use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::device::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
use crate::render::{BackendError, TextureId, TextureImage};

use super::{
    AttrFormat, BufferDesc, BufferId, BufferKind, DrawCall, FrameParams, RenderBackend, StepMode,
    VertexStream,
};

/// Window plus GPU initialization parameters.
#[derive(Debug, Clone)]
pub struct WgpuSurface<'w> {
    pub window: &'w Window,
    pub init: GpuInit,
}

impl<'w> WgpuSurface<'w> {
    pub fn new(window: &'w Window, init: GpuInit) -> Self {
        Self { window, init }
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Per-frame uniform block (80 bytes, matches `Globals` in sprite.wgsl).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Globals {
    projection: [[f32; 4]; 4],
    alpha_cutoff: f32,
    _pad: [f32; 3], // 16-byte struct alignment
}

struct BoundStream {
    buffer: BufferId,
    stride: u64,
    step_mode: wgpu::VertexStepMode,
    attributes: Vec<wgpu::VertexAttribute>,
}

impl BoundStream {
    fn layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: self.step_mode,
            attributes: &self.attributes,
        }
    }
}

struct Program {
    pipeline: wgpu::RenderPipeline,
    globals_ubo: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
}

struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

// ── backend ───────────────────────────────────────────────────────────────

/// wgpu implementation of [`RenderBackend`].
///
/// Each flush records its own command encoder and submits it immediately, so
/// the instance upload preceding it is the one the draw sees even when several
/// flushes share the instance buffer within a frame.
pub struct WgpuBackend<'w> {
    gpu: Gpu<'w>,

    globals_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    buffers: Vec<Option<wgpu::Buffer>>,
    textures: Vec<Option<GpuTexture>>,
    streams: Vec<BoundStream>,
    program: Option<Program>,

    frame: Option<GpuFrame>,
    surface_lost: bool,
}

impl<'w> WgpuBackend<'w> {
    /// `true` once the surface failed in a way reconfiguration cannot fix.
    pub fn is_surface_lost(&self) -> bool {
        self.surface_lost
    }

    fn buffer(&self, id: BufferId) -> Option<&wgpu::Buffer> {
        self.buffers.get(id.index()).and_then(Option::as_ref)
    }
}

impl<'w> RenderBackend for WgpuBackend<'w> {
    type Surface = WgpuSurface<'w>;

    fn connect(surface: WgpuSurface<'w>) -> Result<Self, BackendError> {
        let gpu = pollster::block_on(Gpu::new(surface.window, surface.init))
            .map_err(|e| BackendError::Context(format!("{e:#}")))?;

        let info = gpu.adapter_info();
        log::info!("sprite backend on {} ({:?})", info.name, info.backend);

        let device = gpu.device();

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ember sprite globals bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<Globals>() as u64),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("ember sprite texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ember sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            gpu,
            globals_layout,
            texture_layout,
            sampler,
            buffers: Vec::new(),
            textures: Vec::new(),
            streams: Vec::new(),
            program: None,
            frame: None,
            surface_lost: false,
        })
    }

    fn allocate_buffer(&mut self, desc: &BufferDesc<'_>) -> Result<BufferId, BackendError> {
        let max = self.gpu.device().limits().max_buffer_size;
        if desc.size == 0 || desc.size > max {
            return Err(BackendError::Allocation(format!(
                "{}: {} bytes outside 1..={max}",
                desc.label, desc.size
            )));
        }

        let device = self.gpu.device();
        let buffer = match (desc.kind, desc.contents) {
            (BufferKind::StaticVertex, Some(contents)) => guarded(device, || {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(desc.label),
                    contents,
                    usage: wgpu::BufferUsages::VERTEX,
                })
            }),
            (BufferKind::StaticVertex, None) => {
                return Err(BackendError::Allocation(format!(
                    "{}: static vertex buffer without contents",
                    desc.label
                )));
            }
            (BufferKind::DynamicInstance, _) => guarded(device, || {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(desc.label),
                    size: desc.size,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            }),
        }
        .map_err(|e| BackendError::Allocation(format!("{}: {e}", desc.label)))?;

        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(Some(buffer));
        Ok(id)
    }

    fn bind_instanced_attributes(&mut self, streams: &[VertexStream]) -> Result<(), BackendError> {
        let mut bound = Vec::with_capacity(streams.len());
        for stream in streams {
            if self.buffer(stream.buffer).is_none() {
                return Err(BackendError::Binding(format!("unknown buffer {:?}", stream.buffer)));
            }
            bound.push(BoundStream {
                buffer: stream.buffer,
                stride: stream.stride,
                step_mode: match stream.step {
                    StepMode::PerVertex => wgpu::VertexStepMode::Vertex,
                    StepMode::PerInstance => wgpu::VertexStepMode::Instance,
                },
                attributes: stream
                    .attributes
                    .iter()
                    .map(|a| wgpu::VertexAttribute {
                        format: vertex_format(a.format),
                        offset: a.offset,
                        shader_location: a.location,
                    })
                    .collect(),
            });
        }
        self.streams = bound;
        Ok(())
    }

    fn compile_program(&mut self) -> Result<(), BackendError> {
        if self.streams.is_empty() {
            return Err(BackendError::Binding("no vertex streams bound".into()));
        }

        let device = self.gpu.device();
        let color_format = self.gpu.surface_format();
        let layouts: Vec<wgpu::VertexBufferLayout<'_>> =
            self.streams.iter().map(BoundStream::layout).collect();

        let program = guarded(device, || {
            let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("ember sprite shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/sprite.wgsl").into()),
            });

            let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("ember sprite pipeline layout"),
                bind_group_layouts: &[&self.globals_layout, &self.texture_layout],
                immediate_size: 0,
            });

            let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("ember sprite pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &layouts,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(source_over_blend()),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            });

            let globals_ubo = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("ember sprite globals ubo"),
                size: std::mem::size_of::<Globals>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("ember sprite globals bind group"),
                layout: &self.globals_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_ubo.as_entire_binding(),
                }],
            });

            Program {
                pipeline,
                globals_ubo,
                globals_bind_group,
            }
        })
        .map_err(|e| BackendError::ShaderCompile(e.to_string()))?;

        self.program = Some(program);
        Ok(())
    }

    fn upload_texture(&mut self, image: &TextureImage) -> Result<TextureId, BackendError> {
        let max = self.gpu.device().limits().max_texture_dimension_2d;
        if image.width() > max || image.height() > max {
            return Err(BackendError::Texture(format!(
                "{}x{} exceeds the {max}px device limit",
                image.width(),
                image.height()
            )));
        }

        let device = self.gpu.device();
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };

        let texture = guarded(device, || {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("ember sprite texture"),
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            })
        })
        .map_err(|e| BackendError::Texture(e.to_string()))?;

        self.gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width()),
                rows_per_image: Some(image.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("ember sprite texture bind group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let id = TextureId(self.textures.len() as u32);
        self.textures.push(Some(GpuTexture {
            texture,
            bind_group,
        }));
        Ok(id)
    }

    fn write_buffer(&mut self, buffer: BufferId, bytes: &[u8]) {
        let Some(target) = self.buffer(buffer) else { return };
        self.gpu.queue().write_buffer(target, 0, bytes);
    }

    fn begin_frame(&mut self, params: &FrameParams) {
        // A frame abandoned without `end_frame` is presented as-is.
        self.end_frame();

        let frame = match self.gpu.acquire_frame() {
            Ok(frame) => frame,
            Err(err) => {
                match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface lost beyond recovery");
                        self.surface_lost = true;
                    }
                    action => log::debug!("skipping frame: {action:?}"),
                }
                return;
            }
        };

        if let Some(program) = self.program.as_ref() {
            let globals = Globals {
                projection: params.projection,
                alpha_cutoff: params.alpha_cutoff,
                _pad: [0.0; 3],
            };
            self.gpu
                .queue()
                .write_buffer(&program.globals_ubo, 0, bytemuck::bytes_of(&globals));
        }

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("ember clear encoder"),
            });
        {
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ember clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(params.clear.into()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }
        self.gpu.queue().submit(std::iter::once(encoder.finish()));

        self.frame = Some(frame);
    }

    fn draw_instanced(&mut self, call: &DrawCall) -> bool {
        let Some(frame) = self.frame.as_ref() else { return false };
        let Some(program) = self.program.as_ref() else { return false };
        let Some(texture) = self.textures.get(call.texture.index()).and_then(Option::as_ref) else {
            return false;
        };

        if self.streams.iter().any(|s| self.buffer(s.buffer).is_none()) {
            return false;
        }

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("ember sprite flush encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("ember sprite pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&program.pipeline);
            rpass.set_bind_group(0, &program.globals_bind_group, &[]);
            rpass.set_bind_group(1, &texture.bind_group, &[]);
            for (slot, stream) in self.streams.iter().enumerate() {
                if let Some(buffer) = self.buffer(stream.buffer) {
                    rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }
            }
            rpass.draw(0..call.vertex_count, 0..call.instance_count);
        }
        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        true
    }

    fn end_frame(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.gpu.present(frame);
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(PhysicalSize::new(width, height));
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        if let Some(slot) = self.buffers.get_mut(buffer.index()) {
            if let Some(b) = slot.take() {
                b.destroy();
            }
        }
        self.streams.retain(|s| s.buffer != buffer);
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if let Some(slot) = self.textures.get_mut(texture.index()) {
            if let Some(t) = slot.take() {
                t.texture.destroy();
            }
        }
    }

    fn destroy_program(&mut self) {
        self.program = None;
    }
}

impl Drop for WgpuBackend<'_> {
    fn drop(&mut self) {
        self.end_frame();
    }
}

/// Runs `f` with validation and out-of-memory errors captured instead of
/// reaching the device's uncaptured-error handler, which panics.
fn guarded<R>(device: &wgpu::Device, f: impl FnOnce() -> R) -> Result<R, wgpu::Error> {
    let oom = device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    let validation = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    let invalid = pollster::block_on(validation.pop());
    let exhausted = pollster::block_on(oom.pop());
    match invalid.or(exhausted) {
        Some(err) => Err(err),
        None => Ok(value),
    }
}

fn vertex_format(format: AttrFormat) -> wgpu::VertexFormat {
    match format {
        AttrFormat::Float32 => wgpu::VertexFormat::Float32,
        AttrFormat::Float32x2 => wgpu::VertexFormat::Float32x2,
        AttrFormat::Float32x4 => wgpu::VertexFormat::Float32x4,
    }
}

/// Straight-alpha "source over".
fn source_over_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::SrcAlpha,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A device without a window, or `None` on machines with no adapter.
    fn device() -> Option<wgpu::Device> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
                .ok()?;
        let (device, _queue) =
            pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default())).ok()?;
        Some(device)
    }

    fn shader(device: &wgpu::Device, source: &'static str) -> wgpu::ShaderModule {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ember test shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    }

    // ── error capture ─────────────────────────────────────────────────────

    #[test]
    fn broken_shader_is_reported_not_raised() {
        let Some(device) = device() else {
            eprintln!("no GPU adapter, skipping");
            return;
        };

        let result = guarded(&device, || shader(&device, "fn vs_main( -> {"));
        assert!(result.is_err());

        // The device stays usable after a captured failure.
        let again = guarded(&device, || shader(&device, include_str!("../shaders/sprite.wgsl")));
        assert!(again.is_ok());
    }

    #[test]
    fn oversized_buffer_is_reported() {
        let Some(device) = device() else {
            eprintln!("no GPU adapter, skipping");
            return;
        };

        let result = guarded(&device, || {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("ember test buffer"),
                size: device.limits().max_buffer_size + 4,
                usage: wgpu::BufferUsages::VERTEX,
                mapped_at_creation: false,
            })
        });
        assert!(result.is_err());
    }
}
