//! Session settings
//!
//! Everything a [`GameSession`](crate::GameSession) needs at construction.
//! Loaded from JSON; missing fields fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{PatternType, SmootherKind};

/// Errors loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Game session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    // === Screen ===
    /// Screen width in pixels (default 1920)
    pub screen_width: u32,
    /// Screen height in pixels (default 1080)
    pub screen_height: u32,

    // === Patterns ===
    /// Pattern the caller starts on (default infinity)
    pub starting_pattern: PatternType,
    /// Stroke thickness of the completed path (default 5)
    pub pattern_thickness: u32,

    // === Smoothing ===
    /// Filter strategy, fixed for the session (default kalman-ema)
    pub smoother: SmootherKind,
    /// EMA weight for kalman-ema (default 0.9)
    pub ema_alpha: f32,

    // === Scoring ===
    /// On-path distance in pixels (default 30)
    pub proximity_threshold: f32,
    /// Path samples checked per frame (default 100)
    pub scoring_samples: usize,
    /// On-path frames before completion accrues (default 5)
    pub guard_frames: u32,
    /// Completion per frame at zero distance (default 0.001)
    pub base_increment: f32,

    // === HUD ===
    /// Off-path frames before the fill turns amber (default 10)
    pub off_path_warning_frames: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            screen_width: DEFAULT_SCREEN_WIDTH,
            screen_height: DEFAULT_SCREEN_HEIGHT,

            starting_pattern: PatternType::Infinity,
            pattern_thickness: PATTERN_THICKNESS,

            smoother: SmootherKind::KalmanEma,
            ema_alpha: EMA_ALPHA,

            proximity_threshold: PROXIMITY_THRESHOLD,
            scoring_samples: SCORING_SAMPLES,
            guard_frames: GUARD_FRAMES,
            base_increment: BASE_INCREMENT,

            off_path_warning_frames: OFF_PATH_WARNING_FRAMES,
        }
    }
}

impl GameSettings {
    /// Defaults for a given screen size
    pub fn for_screen(screen_width: u32, screen_height: u32) -> Self {
        Self {
            screen_width,
            screen_height,
            ..Self::default()
        }
    }

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the session cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(SettingsError::Invalid(format!(
                "screen size must be non-zero, got {}x{}",
                self.screen_width, self.screen_height
            )));
        }
        if !self.proximity_threshold.is_finite() || self.proximity_threshold <= 0.0 {
            return Err(SettingsError::Invalid(format!(
                "proximity_threshold must be positive, got {}",
                self.proximity_threshold
            )));
        }
        if self.scoring_samples == 0 {
            return Err(SettingsError::Invalid("scoring_samples must be at least 1".into()));
        }
        if !(self.ema_alpha > 0.0 && self.ema_alpha <= 1.0) {
            return Err(SettingsError::Invalid(format!(
                "ema_alpha must be in (0, 1], got {}",
                self.ema_alpha
            )));
        }
        if !self.base_increment.is_finite() || self.base_increment < 0.0 {
            return Err(SettingsError::Invalid(format!(
                "base_increment must be non-negative, got {}",
                self.base_increment
            )));
        }
        Ok(())
    }
}
