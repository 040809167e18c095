//! Gaze position smoothing
//!
//! The session owns one boxed [`Smoother`] chosen at construction. The two
//! built-in filters mirror the estimator's own: a constant-velocity Kalman
//! filter, and the same filter followed by an exponential moving average.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{EMA_ALPHA, KALMAN_MEASUREMENT_NOISE, KALMAN_PROCESS_NOISE};

/// Stateful 2D position filter
pub trait Smoother: std::fmt::Debug {
    /// Feed one raw sample, get the smoothed estimate back
    fn step(&mut self, raw: Vec2) -> Vec2;

    /// Forget all history (e.g., on gaze source change)
    fn reset(&mut self);
}

/// Which built-in filter a session uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmootherKind {
    /// Fixed-gain Kalman filter
    Kalman,
    /// Kalman filter followed by an EMA (adaptive gain)
    #[default]
    KalmanEma,
}

impl SmootherKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmootherKind::Kalman => "kalman",
            SmootherKind::KalmanEma => "kalman-ema",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "kalman" => Some(SmootherKind::Kalman),
            "kalman-ema" | "adaptive" => Some(SmootherKind::KalmanEma),
            _ => None,
        }
    }

    /// Build a fresh filter of this kind
    pub fn build(self, ema_alpha: f32) -> Box<dyn Smoother> {
        match self {
            SmootherKind::Kalman => Box::new(KalmanSmoother::new()),
            SmootherKind::KalmanEma => Box::new(KalmanEmaSmoother::new(ema_alpha)),
        }
    }
}

/// One axis of a constant-velocity Kalman filter: state (position, velocity)
#[derive(Debug, Clone)]
struct AxisKalman {
    pos: f32,
    vel: f32,
    /// Error covariance, row-major
    cov: [[f32; 2]; 2],
}

impl AxisKalman {
    fn seeded(pos: f32) -> Self {
        Self {
            pos,
            vel: 0.0,
            cov: [[1.0, 0.0], [0.0, 1.0]],
        }
    }

    fn step(&mut self, measured: f32, q: f32, r: f32) -> f32 {
        // Predict with dt = 1 frame
        let [[p00, p01], [p10, p11]] = self.cov;
        self.pos += self.vel;
        let p00 = p00 + p01 + p10 + p11 + q;
        let p01 = p01 + p11;
        let p10 = p10 + p11;
        let p11 = p11 + q;

        // Correct with a position-only measurement
        let innovation = measured - self.pos;
        let s = p00 + r;
        let k0 = p00 / s;
        let k1 = p10 / s;
        self.pos += k0 * innovation;
        self.vel += k1 * innovation;
        self.cov = [
            [(1.0 - k0) * p00, (1.0 - k0) * p01],
            [p10 - k1 * p00, p11 - k1 * p01],
        ];
        self.pos
    }
}

/// Constant-velocity Kalman filter over (x, y)
///
/// The axes are independent, so each runs its own 2-state filter. The first
/// sample seeds the state and is returned unchanged.
#[derive(Debug, Clone)]
pub struct KalmanSmoother {
    process_noise: f32,
    measurement_noise: f32,
    axes: Option<(AxisKalman, AxisKalman)>,
}

impl KalmanSmoother {
    pub fn new() -> Self {
        Self::with_noise(KALMAN_PROCESS_NOISE, KALMAN_MEASUREMENT_NOISE)
    }

    pub fn with_noise(process_noise: f32, measurement_noise: f32) -> Self {
        Self {
            process_noise,
            measurement_noise,
            axes: None,
        }
    }
}

impl Default for KalmanSmoother {
    fn default() -> Self {
        Self::new()
    }
}

impl Smoother for KalmanSmoother {
    fn step(&mut self, raw: Vec2) -> Vec2 {
        let (q, r) = (self.process_noise, self.measurement_noise);
        match &mut self.axes {
            Some((ax, ay)) => Vec2::new(ax.step(raw.x, q, r), ay.step(raw.y, q, r)),
            None => {
                self.axes = Some((AxisKalman::seeded(raw.x), AxisKalman::seeded(raw.y)));
                raw
            }
        }
    }

    fn reset(&mut self) {
        self.axes = None;
    }
}

/// Kalman filter followed by an EMA
///
/// `alpha` is the weight of the newest Kalman estimate: 1 disables the EMA,
/// smaller values smooth harder.
#[derive(Debug, Clone)]
pub struct KalmanEmaSmoother {
    kalman: KalmanSmoother,
    alpha: f32,
    last: Option<Vec2>,
}

impl KalmanEmaSmoother {
    pub fn new(alpha: f32) -> Self {
        Self {
            kalman: KalmanSmoother::new(),
            alpha: alpha.clamp(0.0, 1.0),
            last: None,
        }
    }
}

impl Default for KalmanEmaSmoother {
    fn default() -> Self {
        Self::new(EMA_ALPHA)
    }
}

impl Smoother for KalmanEmaSmoother {
    fn step(&mut self, raw: Vec2) -> Vec2 {
        let estimate = self.kalman.step(raw);
        let smoothed = match self.last {
            Some(last) => last + self.alpha * (estimate - last),
            None => estimate,
        };
        self.last = Some(smoothed);
        smoothed
    }

    fn reset(&mut self) {
        self.kalman.reset();
        self.last = None;
    }
}
