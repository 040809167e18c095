//! Gaze-tracking path patterns
//!
//! Every pattern is one period of a parametric curve centred on the screen.
//! Sampling is even in the curve parameter `t ∈ [0, 2π)`, not in arc length,
//! so "percent traced" in [`Pattern::draw_partial`] means percent of the
//! parameter swept. On the infinity curve the lobes' tips get denser samples
//! than the crossing; that is accepted.

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::consts::PARTIAL_SAMPLES;
use crate::renderer::{Canvas, Color};
use crate::sample_param;

/// Available pattern shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// Lemniscate figure-8
    #[default]
    Infinity,
    /// Archimedean spiral, three turns outward
    Spiral,
    Circle,
    /// Horizontal sine wave, two cycles
    Wave,
    /// 3:2 Lissajous figure
    Lissajous,
}

impl PatternType {
    /// Every pattern in cycling order
    pub const ALL: [PatternType; 5] = [
        PatternType::Infinity,
        PatternType::Spiral,
        PatternType::Circle,
        PatternType::Wave,
        PatternType::Lissajous,
    ];

    /// The pattern after this one, wrapping back to Infinity
    pub fn next(self) -> Self {
        match self {
            PatternType::Infinity => PatternType::Spiral,
            PatternType::Spiral => PatternType::Circle,
            PatternType::Circle => PatternType::Wave,
            PatternType::Wave => PatternType::Lissajous,
            PatternType::Lissajous => PatternType::Infinity,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Infinity => "infinity",
            PatternType::Spiral => "spiral",
            PatternType::Circle => "circle",
            PatternType::Wave => "wave",
            PatternType::Lissajous => "lissajous",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "infinity" => Some(PatternType::Infinity),
            "spiral" => Some(PatternType::Spiral),
            "circle" => Some(PatternType::Circle),
            "wave" => Some(PatternType::Wave),
            "lissajous" => Some(PatternType::Lissajous),
            _ => None,
        }
    }

    /// Whether the curve ends where it starts
    pub fn is_closed(&self) -> bool {
        match self {
            PatternType::Infinity | PatternType::Circle | PatternType::Lissajous => true,
            PatternType::Spiral | PatternType::Wave => false,
        }
    }
}

/// One path bound to a screen size
///
/// Geometry is fixed at construction. Switching shape means building a new
/// pattern, never mutating this one.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    kind: PatternType,
    screen_width: u32,
    screen_height: u32,
    thickness: u32,
    center: IVec2,
}

impl Pattern {
    pub fn new(kind: PatternType, screen_width: u32, screen_height: u32, thickness: u32) -> Self {
        Self {
            kind,
            screen_width,
            screen_height,
            thickness,
            center: IVec2::new((screen_width / 2) as i32, (screen_height / 2) as i32),
        }
    }

    pub fn kind(&self) -> PatternType {
        self.kind
    }

    pub fn screen_width(&self) -> u32 {
        self.screen_width
    }

    pub fn screen_height(&self) -> u32 {
        self.screen_height
    }

    pub fn thickness(&self) -> u32 {
        self.thickness
    }

    pub fn center(&self) -> IVec2 {
        self.center
    }

    /// Offset from the center at curve parameter `t`
    fn offset_at(&self, t: f64) -> (f64, f64) {
        let w = self.screen_width as f64;
        let h = self.screen_height as f64;
        let short_side = w.min(h);

        match self.kind {
            PatternType::Infinity => {
                let (sin, cos) = t.sin_cos();
                let denom = 1.0 + sin * sin;
                (0.3 * w * cos / denom, 0.25 * h * sin * cos / denom)
            }
            PatternType::Spiral => {
                let r = 0.4 * short_side * (t / TAU);
                let angle = 3.0 * t;
                (r * angle.cos(), r * angle.sin())
            }
            PatternType::Circle => {
                let r = 0.35 * short_side;
                (r * t.cos(), r * t.sin())
            }
            PatternType::Wave => (0.8 * w * (t / TAU - 0.5), 0.25 * h * (2.0 * t).sin()),
            PatternType::Lissajous => (
                0.35 * w * (3.0 * t + FRAC_PI_2).sin(),
                0.3 * h * (2.0 * t).sin(),
            ),
        }
    }

    /// Sample `num_points` points evenly over one period of the curve
    pub fn get_points(&self, num_points: usize) -> Vec<IVec2> {
        (0..num_points)
            .map(|i| {
                let (x, y) = self.offset_at(sample_param(i, num_points));
                self.center + IVec2::new(x.round() as i32, y.round() as i32)
            })
            .collect()
    }

    /// Distance from `pos` to the nearest of `num_points` path samples
    ///
    /// Returns infinity when there are no samples.
    pub fn min_distance(&self, pos: Vec2, num_points: usize) -> f32 {
        self.get_points(num_points)
            .into_iter()
            .map(|p| pos.distance(p.as_vec2()))
            .fold(f32::INFINITY, f32::min)
    }

    /// Draw the first `completion_ratio` of the path as a stroke of this
    /// pattern's thickness
    ///
    /// The ratio is clamped to `[0, 1]`. A full ratio draws the whole curve,
    /// including the closing segment on closed shapes.
    pub fn draw_partial(&self, canvas: &mut dyn Canvas, completion_ratio: f32, color: Color) {
        let ratio = completion_ratio.clamp(0.0, 1.0);
        let count = ((ratio * PARTIAL_SAMPLES as f32).floor() as usize).min(PARTIAL_SAMPLES);
        if count < 2 {
            return;
        }

        let mut points = self.get_points(PARTIAL_SAMPLES);
        let full = count == PARTIAL_SAMPLES;
        points.truncate(count);
        canvas.polyline(&points, full && self.kind.is_closed(), color, self.thickness);
    }
}

/// Build a pattern of the given shape for a screen
pub fn create_pattern(
    kind: PatternType,
    screen_width: u32,
    screen_height: u32,
    thickness: u32,
) -> Pattern {
    Pattern::new(kind, screen_width, screen_height, thickness)
}
