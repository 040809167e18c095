//! Gaze Trace - follow the pattern with your eyes
//!
//! Core modules:
//! - `sim`: Game state machine (patterns, smoothing, proximity scoring)
//! - `renderer`: Canvas seam and the in-memory raster canvas
//! - `settings`: Session configuration with documented defaults
//!
//! Gaze estimation, calibration, capture and window management live outside
//! this crate. They talk to it through [`sim::GazeSource`] and
//! [`renderer::Canvas`].

pub mod renderer;
pub mod settings;
pub mod sim;

pub use renderer::{Canvas, Color, RasterCanvas};
pub use settings::{GameSettings, SettingsError};
pub use sim::{
    FrameReport, FrameUpdate, GameSession, GazeObservation, GazeSource, Pattern, PatternType,
    SimulatedGaze, Smoother, SmootherKind,
};

/// Game configuration constants
pub mod consts {
    /// Default screen size when the caller cannot query the display
    pub const DEFAULT_SCREEN_WIDTH: u32 = 1920;
    pub const DEFAULT_SCREEN_HEIGHT: u32 = 1080;

    /// Max distance (pixels) from filtered gaze to the path that counts as on-path
    pub const PROXIMITY_THRESHOLD: f32 = 30.0;
    /// Stroke thickness for every pattern built by the session
    pub const PATTERN_THICKNESS: u32 = 5;

    /// Path samples used for proximity scoring
    pub const SCORING_SAMPLES: usize = 100;
    /// Path samples used for the grey reference stroke
    pub const REFERENCE_SAMPLES: usize = 200;
    /// Path samples used when drawing the completed prefix
    pub const PARTIAL_SAMPLES: usize = 1000;

    /// On-path frames that accrue nothing at the start of a streak
    pub const GUARD_FRAMES: u32 = 5;
    /// Off-path frames before the fill turns amber
    pub const OFF_PATH_WARNING_FRAMES: u32 = 10;
    /// Completion added per frame at zero distance
    pub const BASE_INCREMENT: f32 = 0.001;
    /// Score per level-up is this times the level being completed
    pub const LEVEL_SCORE: u64 = 100;

    /// Raw position the capture layer reports when no face is found
    pub const SENTINEL_GAZE: (f32, f32) = (-1.0, -1.0);

    /// EMA weight of the newest Kalman estimate in the adaptive smoother
    pub const EMA_ALPHA: f32 = 0.9;
    /// Kalman process noise (per frame)
    pub const KALMAN_PROCESS_NOISE: f32 = 1e-2;
    /// Kalman measurement noise (pixels²)
    pub const KALMAN_MEASUREMENT_NOISE: f32 = 1.0;
}

/// Evenly spaced curve parameter for sample `i` of `n` over one period `[0, 2π)`
#[inline]
pub fn sample_param(i: usize, n: usize) -> f64 {
    (i as f64 / n as f64) * std::f64::consts::TAU
}
