//! Rendering module
//!
//! The game draws through the [`Canvas`] trait only. [`RasterCanvas`] is the
//! CPU implementation used headlessly.

pub mod canvas;
pub mod font;
pub mod raster;
pub mod shapes;

pub use canvas::{Canvas, Color};
pub use raster::RasterCanvas;
pub use shapes::draw_target_point;
