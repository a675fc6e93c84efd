use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, Vec2};
use crate::paint::Color;

use super::backend::{AttrFormat, VertexAttr};

// ── caller-facing sprite ──────────────────────────────────────────────────

/// One drawable for the current frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    /// Centre in world units.
    pub position: Vec2,
    pub size: Vec2,
    /// Radians, clockwise on screen (+Y down).
    pub rotation: f32,
    /// Texture sub-region in normalized atlas coordinates.
    pub region: Rect,
    pub tint: Color,
}

impl Sprite {
    /// Untinted, unrotated sprite sampling the whole texture.
    #[inline]
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            rotation: 0.0,
            region: Rect::FULL,
            tint: Color::WHITE,
        }
    }

    #[inline]
    pub fn with_rotation(mut self, radians: f32) -> Self {
        self.rotation = radians;
        self
    }

    #[inline]
    pub fn with_region(mut self, region: Rect) -> Self {
        self.region = region;
        self
    }

    #[inline]
    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }
}

// ── GPU instance record ───────────────────────────────────────────────────

/// Per-instance record, advanced once per sprite (64 bytes):
///
///  offset  0  position  [f32; 2]   loc 1
///  offset  8  size      [f32; 2]   loc 2
///  offset 16  region    [f32; 4]   loc 3
///  offset 32  tint      [f32; 4]   loc 4
///  offset 48  rotation  f32        loc 5
///  offset 52  padding   [f32; 3]
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 2],
    pub size: [f32; 2],
    pub region: [f32; 4],
    pub tint: [f32; 4],
    pub rotation: f32,
    pub _pad: [f32; 3],
}

impl SpriteInstance {
    pub const STRIDE: u64 = std::mem::size_of::<SpriteInstance>() as u64;

    pub const ATTRIBUTES: [VertexAttr; 5] = [
        VertexAttr::new(1, 0, AttrFormat::Float32x2),  // position
        VertexAttr::new(2, 8, AttrFormat::Float32x2),  // size
        VertexAttr::new(3, 16, AttrFormat::Float32x4), // region
        VertexAttr::new(4, 32, AttrFormat::Float32x4), // tint
        VertexAttr::new(5, 48, AttrFormat::Float32),   // rotation
    ];

    /// Packs the thirteen numeric sprite fields in boundary order.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub fn from_fields(
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
    ) -> Self {
        Self {
            position: [x, y],
            size: [w, h],
            region: [u, v, uw, vh],
            tint: [r, g, b, a],
            rotation,
            _pad: [0.0; 3],
        }
    }
}

impl From<&Sprite> for SpriteInstance {
    #[inline]
    fn from(s: &Sprite) -> Self {
        Self {
            position: s.position.to_array(),
            size: s.size.to_array(),
            region: s.region.to_array(),
            tint: s.tint.to_array(),
            rotation: s.rotation,
            _pad: [0.0; 3],
        }
    }
}

// ── shared unit quad ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub corner: [f32; 2], // 0..1
}

impl QuadVertex {
    pub const STRIDE: u64 = std::mem::size_of::<QuadVertex>() as u64;

    pub const ATTRIBUTES: [VertexAttr; 1] = [VertexAttr::new(0, 0, AttrFormat::Float32x2)];
}

/// Two triangles covering `[0, 1]²`; the vertex stage recentres on the sprite.
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { corner: [0.0, 0.0] },
    QuadVertex { corner: [1.0, 0.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [0.0, 0.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [0.0, 1.0] },
];

#[cfg(test)]
mod tests {
    use std::mem::{offset_of, size_of};

    use super::*;

    #[test]
    fn instance_layout_matches_attribute_table() {
        assert_eq!(size_of::<SpriteInstance>(), 64);
        assert_eq!(offset_of!(SpriteInstance, position) as u64, SpriteInstance::ATTRIBUTES[0].offset);
        assert_eq!(offset_of!(SpriteInstance, size) as u64, SpriteInstance::ATTRIBUTES[1].offset);
        assert_eq!(offset_of!(SpriteInstance, region) as u64, SpriteInstance::ATTRIBUTES[2].offset);
        assert_eq!(offset_of!(SpriteInstance, tint) as u64, SpriteInstance::ATTRIBUTES[3].offset);
        assert_eq!(offset_of!(SpriteInstance, rotation) as u64, SpriteInstance::ATTRIBUTES[4].offset);
    }

    #[test]
    fn shader_inputs_match_attribute_table() {
        let wgsl = include_str!("shaders/sprite.wgsl");
        let expected = [
            (QuadVertex::ATTRIBUTES[0], "corner"),
            (SpriteInstance::ATTRIBUTES[0], "position"),
            (SpriteInstance::ATTRIBUTES[1], "size"),
            (SpriteInstance::ATTRIBUTES[2], "region"),
            (SpriteInstance::ATTRIBUTES[3], "tint"),
            (SpriteInstance::ATTRIBUTES[4], "rotation"),
        ];
        for (attr, name) in expected {
            let ty = match attr.format {
                AttrFormat::Float32 => "f32",
                AttrFormat::Float32x2 => "vec2<f32>",
                AttrFormat::Float32x4 => "vec4<f32>",
            };
            let decl = format!("@location({}) {name}: {ty},", attr.location);
            assert!(wgsl.contains(&decl), "missing `{decl}` in sprite.wgsl");
        }

        // Fragments below the cutoff are discarded.
        assert!(wgsl.contains("alpha_cutoff: f32,"));
        let test = wgsl
            .find("if (color.a < globals.alpha_cutoff) {")
            .expect("alpha cutoff test in fs_main");
        let body = wgsl[test..].split_once('{').map(|(_, rest)| rest.trim_start());
        assert!(body.is_some_and(|b| b.starts_with("discard;")));
    }

    #[test]
    fn attributes_fit_inside_stride() {
        for attr in SpriteInstance::ATTRIBUTES {
            assert!(attr.offset + attr.format.size() <= SpriteInstance::STRIDE);
        }
    }

    #[test]
    fn from_fields_matches_sprite_conversion() {
        let sprite = Sprite::new(Vec2::new(10.0, 20.0), Vec2::new(32.0, 16.0))
            .with_rotation(0.5)
            .with_region(Rect::new(0.25, 0.5, 0.25, 0.5))
            .with_tint(Color::rgba(1.0, 0.5, 0.25, 0.75));

        let packed = SpriteInstance::from_fields(
            10.0, 20.0, 32.0, 16.0, 0.5, 0.25, 0.5, 0.25, 0.5, 1.0, 0.5, 0.25, 0.75,
        );
        assert_eq!(SpriteInstance::from(&sprite), packed);
    }

    #[test]
    fn quad_covers_unit_square_with_two_triangles() {
        assert_eq!(QUAD_VERTICES.len(), 6);
        let area: f32 = QUAD_VERTICES
            .chunks(3)
            .map(|t| {
                let [a, b, c] = [t[0].corner, t[1].corner, t[2].corner];
                0.5 * ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])).abs()
            })
            .sum();
        assert!((area - 1.0).abs() < 1e-6);
    }
}
