use super::Vec2;

/// Axis-aligned rectangle.
///
/// Used for texture sub-regions in normalized atlas coordinates, where a
/// negative width or height mirrors the sampled image along that axis.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    /// The whole texture.
    pub const FULL: Rect = Rect::new(0.0, 0.0, 1.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Cell `(col, row)` of a uniform `cols × rows` grid atlas.
    pub fn grid_cell(col: u32, row: u32, cols: u32, rows: u32) -> Self {
        let cols = cols.max(1) as f32;
        let rows = rows.max(1) as f32;
        Rect::new(col as f32 / cols, row as f32 / rows, 1.0 / cols, 1.0 / rows)
    }

    /// Same region sampled right-to-left.
    #[inline]
    pub fn flipped_x(self) -> Self {
        Rect::new(self.origin.x + self.size.x, self.origin.y, -self.size.x, self.size.y)
    }

    /// `[u, v, width, height]`, the order the instance record stores.
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.origin.x, self.origin.y, self.size.x, self.size.y]
    }
}
