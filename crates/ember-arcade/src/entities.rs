//! Pooled gameplay records.
//!
//! Every record is `Default` + `reset`: the default value is the canonical
//! idle state a pool hands out, and `reset` restores it on release.

use ember_engine::coords::{Rect, Vec2};
use ember_engine::paint::Color;
use ember_engine::render::Sprite;

/// Damage element carried by bullets and the effects they spawn.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Element {
    #[default]
    Physical,
    Fire,
    Ice,
    Lightning,
    Poison,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Physical,
        Element::Fire,
        Element::Ice,
        Element::Lightning,
        Element::Poison,
    ];

    pub fn tint(self) -> Color {
        match self {
            Element::Physical => Color::rgb(0.92, 0.92, 0.88),
            Element::Fire => Color::rgb(1.0, 0.45, 0.12),
            Element::Ice => Color::rgb(0.55, 0.85, 1.0),
            Element::Lightning => Color::rgb(1.0, 0.95, 0.35),
            Element::Poison => Color::rgb(0.45, 0.95, 0.3),
        }
    }

    /// Particle look spawned on impact.
    pub fn particle_kind(self) -> ParticleKind {
        match self {
            Element::Fire => ParticleKind::Ember,
            Element::Poison => ParticleKind::Smoke,
            Element::Physical | Element::Ice | Element::Lightning => ParticleKind::Spark,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ParticleKind {
    #[default]
    Spark,
    Smoke,
    Ember,
}

impl ParticleKind {
    /// Cell in the three-cell particle atlas.
    pub fn region(self) -> Rect {
        let col = match self {
            ParticleKind::Spark => 0,
            ParticleKind::Smoke => 1,
            ParticleKind::Ember => 2,
        };
        Rect::grid_cell(col, 0, 3, 1)
    }

    /// Velocity fraction lost per second.
    fn drag(self) -> f32 {
        match self {
            ParticleKind::Spark => 1.5,
            ParticleKind::Smoke => 3.0,
            ParticleKind::Ember => 0.8,
        }
    }

    /// Downward acceleration; smoke rises.
    fn gravity(self) -> f32 {
        match self {
            ParticleKind::Spark => 420.0,
            ParticleKind::Smoke => -60.0,
            ParticleKind::Ember => 180.0,
        }
    }
}

// ── particle ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Seconds left; zero when idle.
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub rotation: f32,
    pub spin: f32,
    pub kind: ParticleKind,
    pub element: Element,
}

impl Particle {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    pub fn update(&mut self, dt: f32) {
        self.life -= dt;
        let damping = (1.0 - self.kind.drag() * dt).max(0.0);
        self.velocity = self.velocity * damping + Vec2::new(0.0, self.kind.gravity() * dt);
        self.position = self.position + self.velocity * dt;
        self.rotation += self.spin * dt;
    }

    pub fn sprite(&self) -> Sprite {
        let t = if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        };
        // Smoke swells as it fades; everything else shrinks.
        let scale = match self.kind {
            ParticleKind::Smoke => 1.0 + (1.0 - t),
            _ => 0.4 + 0.6 * t,
        };
        Sprite::new(self.position, Vec2::splat(self.size * scale))
            .with_rotation(self.rotation)
            .with_region(self.kind.region())
            .with_tint(self.element.tint().with_alpha(t))
    }
}

// ── bullet ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bullet {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Seconds until the bullet expires without hitting anything.
    pub ttl: f32,
    pub damage: u32,
    pub element: Element,
}

impl Bullet {
    pub const SIZE: Vec2 = Vec2::new(18.0, 6.0);

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn update(&mut self, dt: f32) {
        self.ttl -= dt;
        self.position = self.position + self.velocity * dt;
    }

    pub fn sprite(&self) -> Sprite {
        Sprite::new(self.position, Self::SIZE)
            .with_rotation(self.velocity.y.atan2(self.velocity.x))
            .with_tint(self.element.tint())
    }
}

// ── damage number ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DamageNumber {
    pub position: Vec2,
    pub value: u32,
    pub life: f32,
    pub element: Element,
    pub critical: bool,
}

impl DamageNumber {
    pub const LIFETIME: f32 = 0.9;
    const RISE_SPEED: f32 = 48.0;
    const GLYPH: Vec2 = Vec2::new(10.0, 15.0);

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    pub fn update(&mut self, dt: f32) {
        self.life -= dt;
        self.position.y -= Self::RISE_SPEED * dt;
    }

    /// One sprite per decimal digit, centred on `position`, written into
    /// `out` (cleared first).
    pub fn glyphs(&self, out: &mut Vec<Sprite>) {
        out.clear();

        let scale = if self.critical { 1.5 } else { 1.0 };
        let glyph = Self::GLYPH * scale;
        let alpha = (self.life / Self::LIFETIME).clamp(0.0, 1.0);
        let tint = self.element.tint().with_alpha(alpha);

        let mut digits = [0u32; 10];
        let mut n = 0;
        let mut v = self.value;
        loop {
            digits[n] = v % 10;
            n += 1;
            v /= 10;
            if v == 0 {
                break;
            }
        }

        let width = glyph.x * n as f32;
        let left = self.position.x - width * 0.5 + glyph.x * 0.5;
        for (i, &digit) in digits[..n].iter().rev().enumerate() {
            out.push(
                Sprite::new(Vec2::new(left + glyph.x * i as f32, self.position.y), glyph)
                    .with_region(Rect::grid_cell(digit, 0, 10, 1))
                    .with_tint(tint),
            );
        }
    }
}

// ── coin ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coin {
    pub position: Vec2,
    pub velocity: Vec2,
    pub value: u32,
    pub life: f32,
    /// Spin animation phase in radians.
    pub phase: f32,
}

impl Coin {
    pub const SIZE: f32 = 14.0;
    const GRAVITY: f32 = 600.0;
    const BOUNCE: f32 = 0.45;

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Falls and bounces on `floor`.
    pub fn update(&mut self, dt: f32, floor: f32) {
        self.life -= dt;
        self.phase += 6.0 * dt;
        self.velocity.y += Self::GRAVITY * dt;
        self.position = self.position + self.velocity * dt;

        let rest = floor - Self::SIZE * 0.5;
        if self.position.y > rest {
            self.position.y = rest;
            self.velocity = Vec2::new(self.velocity.x * 0.8, -self.velocity.y * Self::BOUNCE);
        }
    }

    pub fn sprite(&self) -> Sprite {
        // Spinning coin: squash horizontally, mirror the back face.
        let c = self.phase.cos();
        let region = if c < 0.0 { Rect::FULL.flipped_x() } else { Rect::FULL };
        Sprite::new(
            self.position,
            Vec2::new(Self::SIZE * c.abs().max(0.15), Self::SIZE),
        )
        .with_region(region)
    }
}
