//! Gaze sources
//!
//! The real estimator lives outside this crate; it only has to hand over one
//! [`GazeObservation`] per frame. [`SimulatedGaze`] is a seeded stand-in that
//! walks a pattern's path with jitter, blinks and face dropouts.

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::pattern::Pattern;
use super::state::GazeObservation;
use crate::consts::PARTIAL_SAMPLES;

/// Anything that yields one gaze observation per frame
pub trait GazeSource {
    fn next_observation(&mut self) -> GazeObservation;
}

/// Tuning for [`SimulatedGaze`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedGazeConfig {
    /// RNG seed; the same seed replays the same run
    pub seed: u64,
    /// Frames to go once around the path
    pub frames_per_lap: u32,
    /// Uniform noise added to each axis, ± pixels
    pub jitter_px: f32,
    /// Chance a frame is flagged as a blink
    pub blink_chance: f64,
    /// Chance a frame has no face at all
    pub dropout_chance: f64,
}

impl Default for SimulatedGazeConfig {
    fn default() -> Self {
        Self {
            seed: 0x6a7e,
            frames_per_lap: 600,
            jitter_px: 8.0,
            blink_chance: 0.02,
            dropout_chance: 0.01,
        }
    }
}

/// Synthetic gaze that follows a pattern
#[derive(Debug, Clone)]
pub struct SimulatedGaze {
    config: SimulatedGazeConfig,
    path: Vec<IVec2>,
    frame: u64,
    rng: Pcg32,
}

impl SimulatedGaze {
    pub fn new(pattern: &Pattern, config: SimulatedGazeConfig) -> Self {
        let rng = Pcg32::seed_from_u64(config.seed);
        Self {
            path: pattern.get_points(PARTIAL_SAMPLES),
            config,
            frame: 0,
            rng,
        }
    }

    /// Follow a different pattern from its start
    pub fn retarget(&mut self, pattern: &Pattern) {
        self.path = pattern.get_points(PARTIAL_SAMPLES);
        self.frame = 0;
    }

    /// Path point the gaze is aiming for this frame
    fn target(&self) -> Option<IVec2> {
        if self.path.is_empty() {
            return None;
        }
        let lap = self.config.frames_per_lap.max(1) as u64;
        let idx = (self.frame % lap) * self.path.len() as u64 / lap;
        self.path.get(idx as usize).copied()
    }

    fn jitter(&mut self) -> f32 {
        let j = self.config.jitter_px;
        if j > 0.0 {
            self.rng.random_range(-j..=j)
        } else {
            0.0
        }
    }
}

impl GazeSource for SimulatedGaze {
    fn next_observation(&mut self) -> GazeObservation {
        let target = self.target();
        self.frame += 1;

        let dropout = self.rng.random_bool(self.config.dropout_chance.clamp(0.0, 1.0));
        let Some(target) = target.filter(|_| !dropout) else {
            return GazeObservation::Unavailable;
        };

        let x = target.x as f32 + self.jitter();
        let y = target.y as f32 + self.jitter();
        let blink = self.rng.random_bool(self.config.blink_chance.clamp(0.0, 1.0));
        GazeObservation::sample(x, y, blink)
    }
}
