//! Procedurally generated sprite textures.
//!
//! Everything is drawn white-ish and coloured through the sprite tint, so one
//! texture serves every element.

use ember_engine::render::{RenderBackend, RenderError, SpriteBatchRenderer, TextureImage};

pub const PARTICLES: &str = "particles";
pub const BULLET: &str = "bullet";
pub const COIN: &str = "coin";
pub const DIGITS: &str = "digits";

const PARTICLE_CELL: u32 = 16;

/// Digit cells are 5×7 texels: a 3×5 glyph with a one-texel transparent
/// border so linear filtering doesn't bleed into the neighbour.
const DIGIT_CELL_W: u32 = 5;
const DIGIT_CELL_H: u32 = 7;

/// Rows top to bottom, bit 2 is the leftmost column.
const DIGIT_GLYPHS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b001, 0b001, 0b001],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Uploads every arcade texture.
pub fn register_all<B: RenderBackend>(renderer: &mut SpriteBatchRenderer<B>) -> Result<(), RenderError> {
    renderer.register_texture(PARTICLES, &particles()?)?;
    renderer.register_texture(BULLET, &bullet()?)?;
    renderer.register_texture(COIN, &coin()?)?;
    renderer.register_texture(DIGITS, &digits()?)?;
    Ok(())
}

fn alpha(a: f32) -> [u8; 4] {
    [255, 255, 255, (a.clamp(0.0, 1.0) * 255.0).round() as u8]
}

/// Distance from the texel centre to the cell centre, normalised so the cell
/// edge is 1.
fn radial(x: u32, y: u32, cell: u32) -> f32 {
    let half = cell as f32 * 0.5;
    let dx = (x as f32 + 0.5 - half) / half;
    let dy = (y as f32 + 0.5 - half) / half;
    (dx * dx + dy * dy).sqrt()
}

/// Three cells: hard spark, soft smoke puff, diamond ember.
pub fn particles() -> Result<TextureImage, RenderError> {
    TextureImage::from_fn(PARTICLE_CELL * 3, PARTICLE_CELL, |x, y| {
        let local = x % PARTICLE_CELL;
        let r = radial(local, y, PARTICLE_CELL);
        match x / PARTICLE_CELL {
            0 => alpha(1.0 - ((r - 0.35) / 0.3).max(0.0)),
            1 => alpha((1.0 - r).max(0.0).powf(1.5) * 0.8),
            _ => {
                let half = PARTICLE_CELL as f32 * 0.5;
                let dx = (local as f32 + 0.5 - half).abs() / half;
                let dy = (y as f32 + 0.5 - half).abs() / half;
                alpha(1.0 - ((dx + dy - 0.6) / 0.3).max(0.0))
            }
        }
    })
}

/// Capsule with a fading tail on the left.
pub fn bullet() -> Result<TextureImage, RenderError> {
    const W: u32 = 32;
    const H: u32 = 8;
    TextureImage::from_fn(W, H, |x, y| {
        let cy = (y as f32 + 0.5 - H as f32 * 0.5).abs() / (H as f32 * 0.5);
        let tail = (x as f32 + 0.5) / W as f32;
        alpha((1.0 - cy * cy) * tail.sqrt())
    })
}

/// Gold disc with a darker rim.
pub fn coin() -> Result<TextureImage, RenderError> {
    const SIZE: u32 = 16;
    TextureImage::from_fn(SIZE, SIZE, |x, y| {
        let r = radial(x, y, SIZE);
        if r > 1.0 {
            [0, 0, 0, 0]
        } else if r > 0.75 {
            [176, 120, 24, 255]
        } else {
            [250, 204, 64, 255]
        }
    })
}

/// `0`–`9` in one row.
pub fn digits() -> Result<TextureImage, RenderError> {
    TextureImage::from_fn(DIGIT_CELL_W * 10, DIGIT_CELL_H, |x, y| {
        let glyph = &DIGIT_GLYPHS[(x / DIGIT_CELL_W) as usize];
        let (gx, gy) = (x % DIGIT_CELL_W, y);
        let inside = (1..=3).contains(&gx) && (1..=5).contains(&gy);
        if inside && glyph[(gy - 1) as usize] & (0b100 >> (gx - 1)) != 0 {
            [255, 255, 255, 255]
        } else {
            [255, 255, 255, 0]
        }
    })
}
