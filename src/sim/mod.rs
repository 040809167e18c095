//! Game simulation module
//!
//! All gameplay logic lives here and is deterministic given its inputs:
//! - Patterns are pure functions of screen size and sample count
//! - Session time comes from the caller (`update_at`) or the wall clock
//! - Rendering goes through the `Canvas` trait only

pub mod gaze;
pub mod pattern;
pub mod session;
pub mod smoother;
pub mod state;

pub use gaze::{GazeSource, SimulatedGaze, SimulatedGazeConfig};
pub use pattern::{Pattern, PatternType, create_pattern};
pub use session::{GameSession, TrackingState};
pub use smoother::{KalmanEmaSmoother, KalmanSmoother, Smoother, SmootherKind};
pub use state::{FrameReport, FrameUpdate, GazeObservation, SessionSummary};
