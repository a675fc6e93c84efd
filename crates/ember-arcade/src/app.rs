use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use ember_engine::core::{App, AppControl, FrameCtx};
use ember_engine::coords::Vec2;
use ember_engine::pool::PoolConfig;
use ember_engine::render::WindowRenderer;

use crate::pools::Pools;
use crate::textures;
use crate::world::World;

/// Seconds between stats lines in the log.
const REPORT_INTERVAL: f64 = 2.0;

pub struct Arcade {
    pools: Pools,
    world: World,
    paused: bool,
    next_report: f64,
}

impl Arcade {
    pub fn new(pools: PoolConfig, seed: u64) -> Self {
        Self {
            pools: Pools::new(pools),
            world: World::new(Vec2::ZERO, seed),
            paused: false,
            next_report: REPORT_INTERVAL,
        }
    }
}

impl App for Arcade {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state: ElementState::Pressed,
                    repeat: false,
                    ..
                },
            ..
        } = event
        else {
            return AppControl::Continue;
        };

        match code {
            KeyCode::Escape => AppControl::Exit,
            KeyCode::Space => {
                self.paused = !self.paused;
                log::info!("{}", if self.paused { "paused" } else { "resumed" });
                AppControl::Continue
            }
            KeyCode::KeyC => {
                self.world.clear(&mut self.pools);
                AppControl::Continue
            }
            _ => AppControl::Continue,
        }
    }

    fn on_renderer_ready(&mut self, _window_id: WindowId, renderer: &mut WindowRenderer<'_>) -> anyhow::Result<()> {
        textures::register_all(renderer)?;
        log::info!(
            "arcade ready: {} sprites per flush",
            renderer.config().max_sprites
        );
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let (w, h) = ctx.window.size();
        self.world.set_bounds(Vec2::new(w, h));

        if !self.paused {
            self.world.update(&mut self.pools, ctx.time.dt);
        }

        let world = &mut self.world;
        let camera = world.centre();
        let stats = match ctx.render(camera, |renderer| world.draw(renderer)) {
            Ok(stats) => stats,
            Err(control) => return control,
        };

        if ctx.time.elapsed >= self.next_report {
            self.next_report = ctx.time.elapsed + REPORT_INTERVAL;

            let live = self.world.live();
            let pools = self.pools.report();
            log::info!(
                "frame {}: {} draws, {} sprites, {} dropped | live p{} b{} n{} c{} | idle particles {} (created {}, reused {}, discarded {})",
                ctx.time.frame_index,
                stats.draw_calls,
                stats.sprites_drawn,
                stats.dropped_overflow + stats.dropped_unknown_texture,
                live.particles,
                live.bullets,
                live.numbers,
                live.coins,
                self.pools.particles.size(),
                pools.particles.created,
                pools.particles.reused,
                pools.particles.discarded,
            );
        }

        AppControl::Continue
    }
}
