//! In-memory RGB8 canvas
//!
//! Reference [`Canvas`] implementation used by the headless demo and tests.
//! Frames can be exported as binary PPM (P6).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use glam::IVec2;

use super::canvas::{Canvas, Color};
use super::font;
use super::shapes::{brush_radius, disc_offsets, line_points, ring_offsets};

/// Row-major RGB8 pixel buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterCanvas {
    /// Black canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::BLACK)
    }

    /// Canvas cleared to `color`
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let mut canvas = Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        };
        canvas.fill(color);
        canvas
    }

    /// Clear the whole canvas
    pub fn fill(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(3) {
            px.copy_from_slice(&color.to_array());
        }
    }

    /// Color at (x, y), `None` outside the canvas
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let i = self.index(x, y)?;
        Some(Color::rgb(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    /// Raw RGB bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Number of pixels currently equal to `color`
    pub fn count_color(&self, color: Color) -> usize {
        let target = color.to_array();
        self.pixels.chunks_exact(3).filter(|px| *px == target).count()
    }

    /// Write the canvas as binary PPM
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        out.write_all(&self.pixels)?;
        out.flush()
    }

    /// Write the canvas to a `.ppm` file
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let file = File::create(path)?;
        self.write_ppm(BufWriter::new(file))
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 3)
    }

    #[inline]
    fn put(&mut self, p: IVec2, color: Color) {
        if let Some(i) = self.index(p.x, p.y) {
            self.pixels[i..i + 3].copy_from_slice(&color.to_array());
        }
    }

    fn stamp(&mut self, center: IVec2, offsets: &[IVec2], color: Color) {
        for &o in offsets {
            self.put(center + o, color);
        }
    }
}

impl Canvas for RasterCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn polyline(&mut self, points: &[IVec2], closed: bool, color: Color, thickness: u32) {
        if points.len() < 2 {
            return;
        }
        let brush = disc_offsets(brush_radius(thickness));

        let closing = closed.then(|| (points[points.len() - 1], points[0]));
        let segments = points.windows(2).map(|w| (w[0], w[1])).chain(closing);
        for (a, b) in segments {
            for p in line_points(a, b) {
                self.stamp(p, &brush, color);
            }
        }
    }

    fn filled_circle(&mut self, center: IVec2, radius: u32, color: Color) {
        self.stamp(center, &disc_offsets(radius), color);
    }

    fn circle(&mut self, center: IVec2, radius: u32, color: Color, thickness: u32) {
        self.stamp(center, &ring_offsets(radius, thickness), color);
    }

    fn text(&mut self, origin: IVec2, text: &str, scale: u32, color: Color) {
        let scale = scale.max(1);
        let cell = font::GLYPH_ADVANCE * scale;
        for (i, c) in text.chars().enumerate() {
            let glyph = font::glyph(c);
            let left = origin.x + (i as u32 * cell) as i32;
            for row in 0..font::GLYPH_HEIGHT {
                for col in 0..font::GLYPH_WIDTH {
                    if !font::is_lit(&glyph, col, row) {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            let p = IVec2::new(
                                left + (col * scale + sx) as i32,
                                origin.y + (row * scale + sy) as i32,
                            );
                            self.put(p, color);
                        }
                    }
                }
            }
        }
    }
}
