//! Drawing seam between the game core and whatever puts pixels on screen
//!
//! The core only ever issues these four primitives. A window backend, an
//! OpenCV bridge or the in-memory [`RasterCanvas`](super::RasterCanvas) can
//! sit behind it.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// 3-channel RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    /// Fill while the gaze is tracking the path
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    /// Fill once the gaze has wandered off for a while
    pub const AMBER: Color = Color::rgb(255, 165, 0);
    /// Unfilled reference path
    pub const GREY: Color = Color::rgb(100, 100, 100);
    /// Canvas background used by the capture loop
    pub const BACKGROUND: Color = Color::rgb(20, 20, 20);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const CYAN: Color = Color::rgb(0, 255, 255);

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels in RGB order
    #[inline]
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// A mutable 2D surface of known size
///
/// Coordinates are screen pixels with the origin at the top-left. Anything
/// that falls outside the surface is clipped by the implementation.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Connected stroke through `points`, closing back to the first point when
    /// `closed` is set. Fewer than two points draws nothing.
    fn polyline(&mut self, points: &[IVec2], closed: bool, color: Color, thickness: u32);

    /// Solid disc
    fn filled_circle(&mut self, center: IVec2, radius: u32, color: Color);

    /// Circle outline of the given stroke width
    fn circle(&mut self, center: IVec2, radius: u32, color: Color, thickness: u32);

    /// Text with its top-left corner at `origin`; `scale` multiplies the glyph cell size
    fn text(&mut self, origin: IVec2, text: &str, scale: u32, color: Color);
}
