/// Straight-alpha RGBA color, components in `[0, 1]`.
///
/// Used as the per-sprite tint (multiplied with the sampled texel) and as the
/// frame clear colour.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    /// Opaque white: an untinted sprite.
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Same color with alpha replaced (e.g. fading particles).
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_untinted() {
        assert_eq!(Color::default(), Color::WHITE);
    }

    #[test]
    fn clear_colour_converts_to_wgpu() {
        let c: wgpu::Color = Color::rgba(0.25, 0.5, 1.0, 0.75).into();
        assert_eq!((c.r, c.g, c.b, c.a), (0.25, 0.5, 1.0, 0.75));
    }

    #[test]
    fn with_alpha_keeps_rgb() {
        let c = Color::rgb(0.1, 0.2, 0.3).with_alpha(0.5);
        assert_eq!(c.to_array(), [0.1, 0.2, 0.3, 0.5]);
    }
}
