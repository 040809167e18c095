//! Pixel-level shape generation shared by the raster canvas and the game

use glam::IVec2;

use super::canvas::{Canvas, Color};

/// Border width of target markers
pub const TARGET_BORDER: u32 = 2;
/// Default target marker radius
pub const TARGET_RADIUS: u32 = 20;

/// Pixels on the segment from `a` to `b` (Bresenham, both ends included)
pub fn line_points(a: IVec2, b: IVec2) -> Vec<IVec2> {
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };

    let mut points = Vec::with_capacity((dx.max(-dy) + 1) as usize);
    let mut p = a;
    let mut err = dx + dy;
    loop {
        points.push(p);
        if p == b {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            p.x += sx;
        }
        if e2 <= dx {
            err += dx;
            p.y += sy;
        }
    }
    points
}

/// Offsets covering a solid disc of the given radius (radius 0 is one pixel)
pub fn disc_offsets(radius: u32) -> Vec<IVec2> {
    let r = radius as i32;
    let r2 = r * r;
    let mut offsets = Vec::with_capacity(((2 * r + 1) * (2 * r + 1)) as usize);
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r2 {
                offsets.push(IVec2::new(dx, dy));
            }
        }
    }
    offsets
}

/// Offsets covering a ring whose stroke of `thickness` is centred on `radius`
pub fn ring_offsets(radius: u32, thickness: u32) -> Vec<IVec2> {
    let half = thickness.max(1) as f32 / 2.0;
    let inner = (radius as f32 - half).max(0.0);
    let outer = radius as f32 + half;
    let (inner2, outer2) = (inner * inner, outer * outer);
    let bound = outer.ceil() as i32;

    let mut offsets = Vec::new();
    for dy in -bound..=bound {
        for dx in -bound..=bound {
            let d2 = (dx * dx + dy * dy) as f32;
            if d2 >= inner2 && d2 < outer2 {
                offsets.push(IVec2::new(dx, dy));
            }
        }
    }
    offsets
}

/// Brush radius that gives a stroke roughly `thickness` pixels wide
#[inline]
pub fn brush_radius(thickness: u32) -> u32 {
    thickness.saturating_sub(1) / 2
}

/// Filled marker with a white border, used for targets and cursors
pub fn draw_target_point(canvas: &mut dyn Canvas, x: i32, y: i32, radius: u32, color: Color) {
    let center = IVec2::new(x, y);
    canvas.filled_circle(center, radius, color);
    canvas.circle(center, radius, Color::WHITE, TARGET_BORDER);
}
