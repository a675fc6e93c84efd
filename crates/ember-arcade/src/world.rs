use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use ember_engine::coords::Vec2;
use ember_engine::pool::ObjectPool;
use ember_engine::render::{RenderBackend, Sprite, SpriteBatchRenderer};

use crate::entities::{Bullet, Coin, DamageNumber, Element, Particle};
use crate::pools::Pools;
use crate::textures;

const FIRE_INTERVAL: f32 = 0.04;
const BULLET_SPEED: f32 = 900.0;
const BURST_SIZE: usize = 24;
const COIN_CHANCE: f64 = 0.3;

/// Live entities and the auto-firing turret that keeps spawning them.
///
/// Bullets fly from the left edge towards a target band on the right; each
/// impact spawns a particle burst, a damage number and sometimes coins.
/// Everything dead goes straight back to its pool.
pub struct World {
    bounds: Vec2,
    rng: SmallRng,
    fire_timer: f32,

    particles: Vec<Particle>,
    bullets: Vec<Bullet>,
    numbers: Vec<DamageNumber>,
    coins: Vec<Coin>,

    impacts: Vec<Impact>,
    glyphs: Vec<Sprite>,
}

#[derive(Debug, Copy, Clone)]
struct Impact {
    position: Vec2,
    element: Element,
    damage: u32,
}

/// Entity counts, for logging and tests.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LiveCounts {
    pub particles: usize,
    pub bullets: usize,
    pub numbers: usize,
    pub coins: usize,
}

impl World {
    pub fn new(bounds: Vec2, seed: u64) -> Self {
        Self {
            bounds,
            rng: SmallRng::seed_from_u64(seed),
            fire_timer: 0.0,
            particles: Vec::new(),
            bullets: Vec::new(),
            numbers: Vec::new(),
            coins: Vec::new(),
            impacts: Vec::new(),
            glyphs: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Vec2) {
        self.bounds = bounds;
    }

    /// Centre of the play field; the camera looks here.
    pub fn centre(&self) -> Vec2 {
        self.bounds * 0.5
    }

    pub fn live(&self) -> LiveCounts {
        LiveCounts {
            particles: self.particles.len(),
            bullets: self.bullets.len(),
            numbers: self.numbers.len(),
            coins: self.coins.len(),
        }
    }

    // ── spawning ──────────────────────────────────────────────────────────

    pub fn fire(&mut self, pools: &mut Pools, from: Vec2, direction: Vec2, element: Element) {
        let len = (direction.x * direction.x + direction.y * direction.y).sqrt();
        if len <= f32::EPSILON {
            return;
        }

        let mut bullet = pools.bullets.acquire();
        bullet.position = from;
        bullet.velocity = direction * (BULLET_SPEED / len);
        bullet.ttl = 3.0;
        bullet.damage = self.rng.random_range(5..=120);
        bullet.element = element;
        self.bullets.push(bullet);
    }

    pub fn burst(&mut self, pools: &mut Pools, at: Vec2, element: Element, count: usize) {
        let kind = element.particle_kind();
        for _ in 0..count {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.random_range(60.0_f32..320.0);
            let life = self.rng.random_range(0.35_f32..0.9);

            let mut p = pools.particles.acquire();
            p.position = at;
            p.velocity = Vec2::new(angle.cos(), angle.sin()) * speed;
            p.life = life;
            p.max_life = life;
            p.size = self.rng.random_range(6.0_f32..14.0);
            p.spin = self.rng.random_range(-6.0_f32..6.0);
            p.kind = kind;
            p.element = element;
            self.particles.push(p);
        }
    }

    pub fn pop_number(&mut self, pools: &mut Pools, at: Vec2, value: u32, element: Element) {
        let mut n = pools.damage_numbers.acquire();
        n.position = at;
        n.value = value;
        n.life = DamageNumber::LIFETIME;
        n.element = element;
        n.critical = value >= 100;
        self.numbers.push(n);
    }

    pub fn drop_coin(&mut self, pools: &mut Pools, at: Vec2) {
        let mut c = pools.coins.acquire();
        c.position = at;
        c.velocity = Vec2::new(
            self.rng.random_range(-120.0_f32..120.0),
            self.rng.random_range(-380.0_f32..-180.0),
        );
        c.value = self.rng.random_range(1..=5);
        c.life = 4.0;
        c.phase = self.rng.random_range(0.0..std::f32::consts::TAU);
        self.coins.push(c);
    }

    // ── simulation ────────────────────────────────────────────────────────

    /// Runs the turret, moves everything by `dt` and recycles the dead.
    pub fn update(&mut self, pools: &mut Pools, dt: f32) {
        self.run_turret(pools, dt);

        let impact_x = self.bounds.x * 0.8;
        let impacts = &mut self.impacts;
        impacts.clear();
        recycle(&mut self.bullets, &mut pools.bullets, |b| {
            b.update(dt);
            if b.position.x >= impact_x {
                impacts.push(Impact {
                    position: b.position,
                    element: b.element,
                    damage: b.damage,
                });
                return false;
            }
            b.ttl > 0.0
        });

        let floor = self.bounds.y;
        recycle(&mut self.particles, &mut pools.particles, |p| {
            p.update(dt);
            p.is_alive()
        });
        recycle(&mut self.numbers, &mut pools.damage_numbers, |n| {
            n.update(dt);
            n.is_alive()
        });
        recycle(&mut self.coins, &mut pools.coins, |c| {
            c.update(dt, floor);
            c.is_alive()
        });

        // Spawned after recycling, so they first move next frame.
        for i in 0..self.impacts.len() {
            let Impact {
                position,
                element,
                damage,
            } = self.impacts[i];
            self.burst(pools, position, element, BURST_SIZE);
            self.pop_number(pools, position - Vec2::new(0.0, 12.0), damage, element);
            if self.rng.random_bool(COIN_CHANCE) {
                self.drop_coin(pools, position);
            }
        }
    }

    fn run_turret(&mut self, pools: &mut Pools, dt: f32) {
        if self.bounds.x <= 0.0 || self.bounds.y <= 0.0 {
            return;
        }
        self.fire_timer += dt;
        while self.fire_timer >= FIRE_INTERVAL {
            self.fire_timer -= FIRE_INTERVAL;

            let from = Vec2::new(0.0, self.rng.random_range(0.2_f32..0.8) * self.bounds.y);
            let target = Vec2::new(
                self.bounds.x * 0.8,
                self.rng.random_range(0.3_f32..0.7) * self.bounds.y,
            );
            let element = Element::ALL[self.rng.random_range(0..Element::ALL.len())];
            self.fire(pools, from, target - from, element);
        }
    }

    /// Submits everything, one texture group at a time, back to front.
    pub fn draw<B: RenderBackend>(&mut self, renderer: &mut SpriteBatchRenderer<B>) {
        for c in &self.coins {
            renderer.submit(&c.sprite());
        }
        renderer.flush(textures::COIN);

        for b in &self.bullets {
            renderer.submit(&b.sprite());
        }
        renderer.flush(textures::BULLET);

        for p in &self.particles {
            renderer.submit(&p.sprite());
        }
        renderer.flush(textures::PARTICLES);

        for n in &self.numbers {
            n.glyphs(&mut self.glyphs);
            for glyph in &self.glyphs {
                renderer.submit(glyph);
            }
        }
        renderer.flush(textures::DIGITS);
    }

    /// Returns every live entity to its pool.
    pub fn clear(&mut self, pools: &mut Pools) {
        pools.particles.release_all(self.particles.drain(..));
        pools.bullets.release_all(self.bullets.drain(..));
        pools.damage_numbers.release_all(self.numbers.drain(..));
        pools.coins.release_all(self.coins.drain(..));
    }
}

/// Keeps the items for which `alive` returns true and releases the rest.
/// Order is not preserved.
fn recycle<T>(items: &mut Vec<T>, pool: &mut ObjectPool<T>, mut alive: impl FnMut(&mut T) -> bool) {
    let mut i = 0;
    while i < items.len() {
        if alive(&mut items[i]) {
            i += 1;
        } else {
            pool.release(items.swap_remove(i));
        }
    }
}
