use glam::Mat4;

use crate::coords::{Vec2, Viewport};

/// Orthographic world → NDC projection centred on `camera`.
///
/// World point `camera` lands on the viewport centre and +Y points down the
/// screen. Invalid viewports collapse to a 1×1 extent rather than producing
/// non-finite matrices.
pub fn orthographic(viewport: Viewport, camera: Vec2) -> Mat4 {
    let half: glam::Vec2 = if viewport.is_valid() {
        viewport.half_extent()
    } else {
        Vec2::splat(0.5)
    }
    .into();
    let centre: glam::Vec2 = camera.into();

    // Screen top is the smaller world Y.
    let top_left = centre - half;
    let bottom_right = centre + half;

    Mat4::orthographic_rh(top_left.x, bottom_right.x, bottom_right.y, top_left.y, -1.0, 1.0)
}
