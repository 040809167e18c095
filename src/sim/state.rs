//! Per-frame input and output records of the game session

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::SENTINEL_GAZE;

/// One frame's gaze input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GazeObservation {
    /// Estimated gaze point in screen pixels
    Sample { x: f32, y: f32, blink: bool },
    /// No face found this frame
    Unavailable,
}

impl GazeObservation {
    pub fn sample(x: f32, y: f32, blink: bool) -> Self {
        GazeObservation::Sample { x, y, blink }
    }

    /// Raw position, or the sentinel for unavailable frames
    pub fn position(&self) -> Vec2 {
        match *self {
            GazeObservation::Sample { x, y, .. } => Vec2::new(x, y),
            GazeObservation::Unavailable => Vec2::new(SENTINEL_GAZE.0, SENTINEL_GAZE.1),
        }
    }

    /// Unavailable frames count as blinks
    pub fn is_blink(&self) -> bool {
        match *self {
            GazeObservation::Sample { blink, .. } => blink,
            GazeObservation::Unavailable => true,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, GazeObservation::Sample { .. })
    }
}

/// State after a tracked frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub completion: f32,
    pub score: u64,
    pub level: u32,
    /// Smoothed gaze used for scoring
    pub gaze_x: f32,
    pub gaze_y: f32,
    /// Distance to the nearest scoring sample of the path
    pub min_distance: f32,
    pub on_path: bool,
    /// Blink flag as observed (not used for scoring)
    pub blink: bool,
    /// This frame completed the pattern
    pub leveled_up: bool,
}

/// Result of [`GameSession::update`](super::GameSession::update)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FrameUpdate {
    /// No pattern is set; nothing was scored
    NoPattern,
    Tracked(FrameReport),
}

impl FrameUpdate {
    pub fn completion(&self) -> f32 {
        match self {
            FrameUpdate::NoPattern => 0.0,
            FrameUpdate::Tracked(report) => report.completion,
        }
    }

    /// Session score, or 0 when nothing is being tracked
    pub fn score(&self) -> u64 {
        match self {
            FrameUpdate::NoPattern => 0,
            FrameUpdate::Tracked(report) => report.score,
        }
    }

    pub fn report(&self) -> Option<&FrameReport> {
        match self {
            FrameUpdate::NoPattern => None,
            FrameUpdate::Tracked(report) => Some(report),
        }
    }
}

/// End-of-run totals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub score: u64,
    pub level: u32,
    pub elapsed_secs: f32,
}
