use std::collections::{HashMap, HashSet};

use crate::coords::{Vec2, Viewport};
use crate::paint::Color;

use super::backend::{
    BufferDesc, BufferId, BufferKind, DrawCall, FrameParams, RenderBackend, StepMode, VertexStream,
};
use super::projection::orthographic;
use super::sprite::{QuadVertex, Sprite, SpriteInstance, QUAD_VERTICES};
use super::{BackendError, RenderError, TextureId, TextureImage};

/// Renderer configuration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RendererConfig {
    /// Instance buffer capacity; submissions beyond it are dropped until the
    /// next flush.
    pub max_sprites: usize,

    /// Colour the target is cleared to by `begin_frame`.
    pub clear_color: Color,

    /// Fragments whose alpha falls below this are discarded.
    pub alpha_cutoff: f32,

    /// Initial viewport, until the first `resize`.
    pub viewport: Viewport,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_sprites: 10_000,
            clear_color: Color::BLACK,
            alpha_cutoff: 0.01,
            viewport: Viewport::new(1280.0, 720.0),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RendererState {
    Uninitialized,
    Ready,
    InFrame,
}

/// Per-frame counters, reset by `begin_frame`.
///
/// Dropped sprites are never reported as errors; these counters are the only
/// place they surface.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub draw_calls: u32,
    pub sprites_drawn: u32,
    /// Submissions past `max_sprites`.
    pub dropped_overflow: u32,
    /// Sprites discarded because their flush named an unregistered texture.
    pub dropped_unknown_texture: u32,
}

/// Backend plus the resources allocated on it during `initialize`.
struct Resources<B> {
    backend: B,
    quad: BufferId,
    instances: BufferId,
}

/// Accumulates sprites and draws each texture group with one instanced call.
///
/// Callers group submissions by texture and call [`flush`](Self::flush) at
/// each group boundary; the renderer never reorders or sorts. Nothing on the
/// per-frame path allocates once the instance buffer has been reserved.
pub struct SpriteBatchRenderer<B: RenderBackend> {
    config: RendererConfig,
    resources: Option<Resources<B>>,
    in_frame: bool,

    /// CPU mirror of the instance buffer; `len()` is the sprite counter.
    instances: Vec<SpriteInstance>,

    textures: HashMap<String, TextureId>,
    live_textures: HashSet<TextureId>,

    viewport: Viewport,
    stats: FrameStats,
}

impl<B: RenderBackend> SpriteBatchRenderer<B> {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            resources: None,
            in_frame: false,
            instances: Vec::new(),
            textures: HashMap::new(),
            live_textures: HashSet::new(),
            viewport: config.viewport,
            stats: FrameStats::default(),
        }
    }

    // ── lifecycle ──────────────────────────────────────────────────────────

    /// Acquires a GPU context from `surface` and builds every GPU resource.
    ///
    /// On failure the renderer stays [`RendererState::Uninitialized`], whatever
    /// was allocated is released, and the call may be retried. Callers are
    /// expected to fall back to another rendering path.
    pub fn initialize(&mut self, surface: B::Surface) -> Result<(), RenderError> {
        if self.resources.is_some() {
            return Ok(());
        }

        let backend = B::connect(surface).inspect_err(|e| {
            log::error!("sprite renderer initialization failed: {e}");
        })?;

        match Self::build_resources(backend, self.config.max_sprites) {
            Ok(resources) => {
                self.resources = Some(resources);
                self.instances = Vec::with_capacity(self.config.max_sprites);
                log::info!(
                    "sprite renderer ready (max_sprites = {})",
                    self.config.max_sprites
                );
                Ok(())
            }
            Err(e) => {
                log::error!("sprite renderer initialization failed: {e}");
                Err(e.into())
            }
        }
    }

    fn build_resources(mut backend: B, max_sprites: usize) -> Result<Resources<B>, BackendError> {
        let quad = backend.allocate_buffer(&BufferDesc {
            label: "ember sprite quad vbo",
            kind: BufferKind::StaticVertex,
            size: std::mem::size_of_val(&QUAD_VERTICES) as u64,
            contents: Some(bytemuck::cast_slice(&QUAD_VERTICES)),
        })?;

        let instances = match backend.allocate_buffer(&BufferDesc {
            label: "ember sprite instance vbo",
            kind: BufferKind::DynamicInstance,
            size: max_sprites.max(1) as u64 * SpriteInstance::STRIDE,
            contents: None,
        }) {
            Ok(id) => id,
            Err(e) => {
                backend.destroy_buffer(quad);
                return Err(e);
            }
        };

        let streams = [
            VertexStream {
                buffer: quad,
                stride: QuadVertex::STRIDE,
                step: StepMode::PerVertex,
                attributes: &QuadVertex::ATTRIBUTES,
            },
            VertexStream {
                buffer: instances,
                stride: SpriteInstance::STRIDE,
                step: StepMode::PerInstance,
                attributes: &SpriteInstance::ATTRIBUTES,
            },
        ];

        let linked = backend
            .bind_instanced_attributes(&streams)
            .and_then(|()| backend.compile_program());

        if let Err(e) = linked {
            backend.destroy_program();
            backend.destroy_buffer(instances);
            backend.destroy_buffer(quad);
            return Err(e);
        }

        Ok(Resources {
            backend,
            quad,
            instances,
        })
    }

    /// Releases textures, program and buffers and clears the registry.
    ///
    /// Safe to call in any state, any number of times.
    pub fn teardown(&mut self) {
        let Some(mut res) = self.resources.take() else { return };

        if self.in_frame {
            res.backend.end_frame();
        }
        for &texture in &self.live_textures {
            res.backend.destroy_texture(texture);
        }
        res.backend.destroy_program();
        res.backend.destroy_buffer(res.instances);
        res.backend.destroy_buffer(res.quad);

        self.textures.clear();
        self.live_textures.clear();
        self.instances.clear();
        self.in_frame = false;

        log::debug!("sprite renderer torn down");
    }

    // ── observation ────────────────────────────────────────────────────────

    pub fn state(&self) -> RendererState {
        match (&self.resources, self.in_frame) {
            (None, _) => RendererState::Uninitialized,
            (Some(_), false) => RendererState::Ready,
            (Some(_), true) => RendererState::InFrame,
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.resources.is_some()
    }

    /// Sprites accumulated since the last flush.
    #[inline]
    pub fn pending(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    #[inline]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn texture_id(&self, id: &str) -> Option<TextureId> {
        self.textures.get(id).copied()
    }

    pub fn backend(&self) -> Option<&B> {
        self.resources.as_ref().map(|r| &r.backend)
    }

    // ── auxiliary ──────────────────────────────────────────────────────────

    /// Uploads `image` under `id`. A second registration under the same id
    /// keeps the first texture and uploads nothing.
    pub fn register_texture(&mut self, id: &str, image: &TextureImage) -> Result<TextureId, RenderError> {
        if let Some(&existing) = self.textures.get(id) {
            return Ok(existing);
        }
        let res = self.resources.as_mut().ok_or(RenderError::NotInitialized)?;

        let texture = res.backend.upload_texture(image)?;
        self.textures.insert(id.to_owned(), texture);
        self.live_textures.insert(texture);

        log::debug!(
            "registered texture {id:?} ({}x{})",
            image.width(),
            image.height()
        );
        Ok(texture)
    }

    /// Updates the viewport used by the next `begin_frame`. Buffers are kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::from_pixels(width, height);
        if let Some(res) = self.resources.as_mut() {
            res.backend.resize(width, height);
        }
    }

    // ── frame protocol ─────────────────────────────────────────────────────

    /// Starts a frame with `camera` at the viewport centre.
    ///
    /// Anything left from an abandoned frame is discarded.
    pub fn begin_frame(&mut self, camera: Vec2) {
        let Some(res) = self.resources.as_mut() else { return };

        self.instances.clear();
        self.stats = FrameStats::default();

        let projection = orthographic(self.viewport, camera);
        res.backend.begin_frame(&FrameParams {
            projection: projection.to_cols_array_2d(),
            clear: self.config.clear_color,
            alpha_cutoff: self.config.alpha_cutoff,
        });
        self.in_frame = true;
    }

    /// Appends one sprite; dropped silently once `max_sprites` are pending.
    #[inline]
    pub fn submit(&mut self, sprite: &Sprite) {
        self.push_instance(SpriteInstance::from(sprite));
    }

    /// [`submit`](Self::submit) taking the thirteen raw sprite fields.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn submit_raw(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        rotation: f32,
        u: f32,
        v: f32,
        uw: f32,
        vh: f32,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    ) {
        self.push_instance(SpriteInstance::from_fields(
            x, y, w, h, rotation, u, v, uw, vh, r, g, b, a,
        ));
    }

    fn push_instance(&mut self, instance: SpriteInstance) {
        if !self.in_frame {
            return;
        }
        if self.instances.len() >= self.config.max_sprites {
            self.stats.dropped_overflow += 1;
            return;
        }
        self.instances.push(instance);
    }

    /// Draws everything pending with the texture registered as `texture_id`.
    ///
    /// One upload and one instanced draw; nothing happens if no sprites are
    /// pending, and pending sprites are discarded if `texture_id` is unknown.
    /// The sprite counter is zero afterwards.
    pub fn flush(&mut self, texture_id: &str) {
        let texture = self.textures.get(texture_id).copied();
        self.flush_texture(texture);
    }

    /// [`flush`](Self::flush) by handle.
    pub fn flush_id(&mut self, texture: TextureId) {
        let texture = self.live_textures.contains(&texture).then_some(texture);
        self.flush_texture(texture);
    }

    fn flush_texture(&mut self, texture: Option<TextureId>) {
        let pending = self.instances.len();
        if pending == 0 {
            return;
        }

        match (texture, self.resources.as_mut()) {
            (Some(texture), Some(res)) if self.in_frame => {
                res.backend
                    .write_buffer(res.instances, bytemuck::cast_slice(&self.instances));
                let drawn = res.backend.draw_instanced(&DrawCall {
                    texture,
                    vertex_count: QUAD_VERTICES.len() as u32,
                    instance_count: pending as u32,
                });
                if drawn {
                    self.stats.draw_calls += 1;
                    self.stats.sprites_drawn += pending as u32;
                }
            }
            (None, _) => self.stats.dropped_unknown_texture += pending as u32,
            _ => {}
        }

        self.instances.clear();
    }

    /// Ends the frame and presents. Sprites not flushed are discarded.
    pub fn end_frame(&mut self) {
        if !self.in_frame {
            return;
        }
        self.instances.clear();
        if let Some(res) = self.resources.as_mut() {
            res.backend.end_frame();
        }
        self.in_frame = false;
    }
}

impl<B: RenderBackend> Drop for SpriteBatchRenderer<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::{BackendCall, CallLog, FailurePoint, HeadlessBackend, HeadlessSurface};

    type Renderer = SpriteBatchRenderer<HeadlessBackend>;

    fn ready(config: RendererConfig) -> (Renderer, CallLog) {
        let surface = HeadlessSurface::new(800, 600);
        let log = surface.log();
        let mut renderer = Renderer::new(config);
        renderer.initialize(surface).unwrap();
        (renderer, log)
    }

    fn image() -> TextureImage {
        TextureImage::solid(4, 4, [255, 255, 255, 255]).unwrap()
    }

    fn sprite(x: f32, y: f32) -> Sprite {
        Sprite::new(Vec2::new(x, y), Vec2::new(32.0, 32.0))
    }

    fn is_draw(c: &BackendCall) -> bool {
        matches!(c, BackendCall::Draw { .. })
    }

    // ── initialization ────────────────────────────────────────────────────

    #[test]
    fn initialize_builds_resources_in_order() {
        let (renderer, log) = ready(RendererConfig::default());
        assert_eq!(renderer.state(), RendererState::Ready);

        let calls = log.calls();
        assert!(matches!(calls[0], BackendCall::Connect { width: 800, height: 600 }));
        assert!(matches!(
            calls[1],
            BackendCall::AllocateBuffer { kind: BufferKind::StaticVertex, size: 48, .. }
        ));
        assert!(matches!(
            calls[2],
            BackendCall::AllocateBuffer { kind: BufferKind::DynamicInstance, size: 640_000, .. }
        ));
        assert!(matches!(calls[3], BackendCall::BindAttributes { streams: 2, instanced: 1 }));
        assert_eq!(calls[4], BackendCall::CompileProgram);
    }

    #[test]
    fn compile_failure_leaves_renderer_uninitialized_and_releases_buffers() {
        let surface = HeadlessSurface::new(800, 600).failing_at(FailurePoint::Compile);
        let log = surface.log();
        let mut renderer = Renderer::new(RendererConfig::default());

        let err = renderer.initialize(surface).unwrap_err();
        assert!(matches!(err, RenderError::Backend(BackendError::ShaderCompile(_))));
        assert_eq!(renderer.state(), RendererState::Uninitialized);
        assert_eq!(log.count(|c| matches!(c, BackendCall::DestroyBuffer(_))), 2);

        // Retry against a healthy surface.
        renderer.initialize(HeadlessSurface::new(800, 600)).unwrap();
        assert_eq!(renderer.state(), RendererState::Ready);
    }

    #[test]
    fn allocation_failure_releases_quad() {
        let surface = HeadlessSurface::new(800, 600).failing_at(FailurePoint::InstanceAllocation);
        let log = surface.log();
        let mut renderer = Renderer::new(RendererConfig::default());

        assert!(renderer.initialize(surface).is_err());
        assert_eq!(log.count(|c| matches!(c, BackendCall::DestroyBuffer(_))), 1);
        assert!(!renderer.is_initialized());
    }

    #[test]
    fn connect_failure_is_reported() {
        let surface = HeadlessSurface::new(800, 600).failing_at(FailurePoint::Connect);
        let mut renderer = Renderer::new(RendererConfig::default());
        let err = renderer.initialize(surface).unwrap_err();
        assert!(matches!(err, RenderError::Backend(BackendError::Context(_))));
    }

    #[test]
    fn operations_before_initialize_are_inert() {
        let mut renderer = Renderer::new(RendererConfig::default());
        renderer.begin_frame(Vec2::ZERO);
        renderer.submit(&sprite(0.0, 0.0));
        renderer.flush("tex1");
        renderer.end_frame();
        assert_eq!(renderer.pending(), 0);
        assert!(matches!(
            renderer.register_texture("tex1", &image()),
            Err(RenderError::NotInitialized)
        ));
    }

    // ── flush ─────────────────────────────────────────────────────────────

    #[test]
    fn single_sprite_issues_one_instanced_draw() {
        let (mut renderer, log) = ready(RendererConfig::default());
        let tex = renderer.register_texture("tex1", &image()).unwrap();

        renderer.begin_frame(Vec2::ZERO);
        renderer.submit_raw(10.0, 10.0, 32.0, 32.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0);
        renderer.flush("tex1");

        let draws = log.draws();
        assert_eq!(draws.len(), 1);
        let (call, instances) = &draws[0];
        assert_eq!(call.texture, tex);
        assert_eq!(call.vertex_count, 6);
        assert_eq!(call.instance_count, 1);
        assert_eq!(instances[0].position, [10.0, 10.0]);
        assert_eq!(instances[0].size, [32.0, 32.0]);
        assert_eq!(renderer.pending(), 0);
    }

    #[test]
    fn overflow_is_dropped_and_counted() {
        let (mut renderer, log) = ready(RendererConfig::default());
        renderer.register_texture("tex1", &image()).unwrap();

        renderer.begin_frame(Vec2::ZERO);
        for i in 0..10_005 {
            renderer.submit(&sprite(i as f32, 0.0));
        }
        assert_eq!(renderer.pending(), 10_000);
        renderer.flush("tex1");

        let draws = log.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].0.instance_count, 10_000);
        assert_eq!(renderer.pending(), 0);
        assert_eq!(renderer.stats().dropped_overflow, 5);
    }

    #[test]
    fn flush_with_nothing_pending_is_a_noop() {
        let (mut renderer, log) = ready(RendererConfig::default());
        renderer.register_texture("tex1", &image()).unwrap();

        renderer.begin_frame(Vec2::ZERO);
        renderer.flush("tex1");

        assert_eq!(log.count(is_draw), 0);
        assert_eq!(log.count(|c| matches!(c, BackendCall::WriteBuffer { .. })), 0);
    }

    #[test]
    fn unknown_texture_discards_pending() {
        let (mut renderer, log) = ready(RendererConfig::default());

        renderer.begin_frame(Vec2::ZERO);
        renderer.submit(&sprite(0.0, 0.0));
        renderer.submit(&sprite(1.0, 0.0));
        renderer.flush("missing");

        assert_eq!(log.count(is_draw), 0);
        assert_eq!(renderer.pending(), 0);
        assert_eq!(renderer.stats().dropped_unknown_texture, 2);
    }

    #[test]
    fn each_texture_group_gets_its_own_draw() {
        let (mut renderer, log) = ready(RendererConfig::default());
        let a = renderer.register_texture("a", &image()).unwrap();
        let b = renderer.register_texture("b", &image()).unwrap();

        renderer.begin_frame(Vec2::ZERO);
        for i in 0..3 {
            renderer.submit(&sprite(i as f32, 0.0));
        }
        renderer.flush("a");
        for i in 0..2 {
            renderer.submit(&sprite(0.0, 100.0 + i as f32));
        }
        renderer.flush_id(b);
        renderer.end_frame();

        let draws = log.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!((draws[0].0.texture, draws[0].0.instance_count), (a, 3));
        assert_eq!((draws[1].0.texture, draws[1].0.instance_count), (b, 2));
        // Second group sees only its own records.
        assert_eq!(draws[1].1[0].position, [0.0, 100.0]);

        let stats = renderer.stats();
        assert_eq!(stats.draw_calls, 2);
        assert_eq!(stats.sprites_drawn, 5);
    }

    #[test]
    fn skipped_frame_counts_no_draws() {
        let surface = HeadlessSurface::new(800, 600).failing_at(FailurePoint::FrameAcquire);
        let log = surface.log();
        let mut renderer = Renderer::new(RendererConfig::default());
        renderer.initialize(surface).unwrap();
        renderer.register_texture("a", &image()).unwrap();

        renderer.begin_frame(Vec2::ZERO);
        renderer.submit(&sprite(0.0, 0.0));
        renderer.submit(&sprite(1.0, 0.0));
        renderer.flush("a");

        assert_eq!(log.count(is_draw), 0);
        assert_eq!(renderer.pending(), 0);
        let stats = renderer.stats();
        assert_eq!((stats.draw_calls, stats.sprites_drawn), (0, 0));
        renderer.end_frame();
    }

    #[test]
    fn insertion_order_is_preserved() {
        let (mut renderer, log) = ready(RendererConfig::default());
        renderer.register_texture("tex1", &image()).unwrap();

        renderer.begin_frame(Vec2::ZERO);
        for i in 0..5 {
            renderer.submit(&sprite(i as f32, 0.0));
        }
        renderer.flush("tex1");

        let xs: Vec<f32> = log.draws()[0].1.iter().map(|s| s.position[0]).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn submissions_outside_a_frame_are_ignored() {
        let (mut renderer, log) = ready(RendererConfig::default());
        renderer.register_texture("tex1", &image()).unwrap();

        renderer.submit(&sprite(0.0, 0.0));
        renderer.flush("tex1");
        assert_eq!(renderer.pending(), 0);
        assert_eq!(log.count(is_draw), 0);
    }

    #[test]
    fn begin_frame_discards_abandoned_sprites() {
        let (mut renderer, log) = ready(RendererConfig::default());
        renderer.register_texture("tex1", &image()).unwrap();

        renderer.begin_frame(Vec2::ZERO);
        renderer.submit(&sprite(0.0, 0.0));
        renderer.begin_frame(Vec2::ZERO);
        renderer.submit(&sprite(5.0, 0.0));
        renderer.flush("tex1");

        let draws = log.draws();
        assert_eq!(draws[0].0.instance_count, 1);
        assert_eq!(draws[0].1[0].position, [5.0, 0.0]);
    }

    // ── textures ──────────────────────────────────────────────────────────

    #[test]
    fn duplicate_registration_keeps_first() {
        let (mut renderer, log) = ready(RendererConfig::default());
        let first = renderer.register_texture("tex1", &image()).unwrap();
        let other = TextureImage::solid(8, 8, [0, 0, 0, 255]).unwrap();
        let second = renderer.register_texture("tex1", &other).unwrap();

        assert_eq!(first, second);
        assert_eq!(log.count(|c| matches!(c, BackendCall::UploadTexture { .. })), 1);
        assert!(matches!(
            log.calls().iter().find(|c| matches!(c, BackendCall::UploadTexture { .. })),
            Some(BackendCall::UploadTexture { width: 4, height: 4, .. })
        ));
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn begin_frame_centres_camera() {
        let (mut renderer, log) = ready(RendererConfig::default());
        renderer.resize(800, 600);
        renderer.begin_frame(Vec2::new(100.0, 50.0));

        let projection = log
            .calls()
            .into_iter()
            .find_map(|c| match c {
                BackendCall::BeginFrame { projection, .. } => Some(projection),
                _ => None,
            })
            .unwrap();

        let m = glam::Mat4::from_cols_array_2d(&projection);
        let p = m * glam::Vec4::new(100.0, 50.0, 0.0, 1.0);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
    }

    #[test]
    fn configured_alpha_cutoff_reaches_backend() {
        let config = RendererConfig {
            alpha_cutoff: 0.2,
            ..RendererConfig::default()
        };
        let (mut renderer, log) = ready(config);
        renderer.begin_frame(Vec2::ZERO);

        let cutoff = log.calls().into_iter().find_map(|c| match c {
            BackendCall::BeginFrame { alpha_cutoff, .. } => Some(alpha_cutoff),
            _ => None,
        });
        assert_eq!(cutoff, Some(0.2));
    }

    #[test]
    fn default_alpha_cutoff_is_one_percent() {
        let (mut renderer, log) = ready(RendererConfig::default());
        renderer.begin_frame(Vec2::ZERO);
        assert!(log.calls().iter().any(|c| matches!(
            c,
            BackendCall::BeginFrame { alpha_cutoff, .. } if *alpha_cutoff == 0.01
        )));
    }

    #[test]
    fn resize_updates_viewport_without_reallocating() {
        let (mut renderer, log) = ready(RendererConfig::default());
        renderer.resize(1920, 1080);

        assert_eq!(renderer.viewport(), Viewport::new(1920.0, 1080.0));
        assert_eq!(log.count(|c| matches!(c, BackendCall::AllocateBuffer { .. })), 2);
        assert!(log.calls().contains(&BackendCall::Resize { width: 1920, height: 1080 }));
    }

    // ── teardown ──────────────────────────────────────────────────────────

    #[test]
    fn teardown_releases_everything_and_is_idempotent() {
        let (mut renderer, log) = ready(RendererConfig::default());
        renderer.register_texture("a", &image()).unwrap();
        renderer.register_texture("b", &image()).unwrap();

        renderer.teardown();
        renderer.teardown();

        assert_eq!(renderer.state(), RendererState::Uninitialized);
        assert_eq!(renderer.texture_id("a"), None);
        assert_eq!(log.count(|c| matches!(c, BackendCall::DestroyTexture(_))), 2);
        assert_eq!(log.count(|c| matches!(c, BackendCall::DestroyBuffer(_))), 2);
        assert_eq!(log.count(|c| matches!(c, BackendCall::DestroyProgram)), 1);
    }

    #[test]
    fn stale_handle_after_teardown_draws_nothing() {
        let (mut renderer, log) = ready(RendererConfig::default());
        let old = renderer.register_texture("tex1", &image()).unwrap();
        renderer.teardown();

        renderer.initialize(HeadlessSurface::new(800, 600)).unwrap();
        renderer.begin_frame(Vec2::ZERO);
        renderer.submit(&sprite(0.0, 0.0));
        renderer.flush_id(old);

        assert_eq!(log.count(is_draw), 0);
        assert_eq!(renderer.stats().dropped_unknown_texture, 1);
    }

    #[test]
    fn small_capacity_applies_per_flush() {
        let (mut renderer, log) = ready(RendererConfig {
            max_sprites: 4,
            ..RendererConfig::default()
        });
        renderer.register_texture("tex1", &image()).unwrap();

        renderer.begin_frame(Vec2::ZERO);
        for i in 0..6 {
            renderer.submit(&sprite(i as f32, 0.0));
        }
        renderer.flush("tex1");
        for i in 0..3 {
            renderer.submit(&sprite(i as f32, 0.0));
        }
        renderer.flush("tex1");

        let counts: Vec<u32> = log.draws().iter().map(|(c, _)| c.instance_count).collect();
        assert_eq!(counts, vec![4, 3]);
    }
}
