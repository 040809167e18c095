//! Gaze Trace entry point
//!
//! Headless run: a simulated gaze follows the pattern for a fixed number of
//! frames at 30 fps, then the last frame is written out as a PPM image.
//!
//! Usage: `gaze-trace [--settings settings.json] [--frames N] [--out out.ppm]
//! [--pattern NAME] [--no-adaptive]`

use std::error::Error;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use gaze_trace::sim::{
    GameSession, GazeObservation, GazeSource, SimulatedGaze, SimulatedGazeConfig,
};
use gaze_trace::{Color, GameSettings, PatternType, RasterCanvas, SmootherKind};

const FRAME_TIME: Duration = Duration::from_nanos(1_000_000_000 / 30);
const PROGRESS_EVERY: u32 = 300;

#[derive(Debug, Parser)]
#[command(name = "gaze-trace", version, about = "Headless gaze-trace session")]
struct Args {
    /// JSON settings file (defaults are used when omitted)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Number of 30 fps frames to simulate
    #[arg(long, default_value_t = 3000)]
    frames: u32,

    /// Where the last frame is written
    #[arg(long, value_name = "PATH", default_value = "gaze-trace.ppm")]
    out: PathBuf,

    /// Starting pattern: infinity, spiral, circle, wave or lissajous
    #[arg(long, value_parser = parse_pattern)]
    pattern: Option<PatternType>,

    /// Use the plain Kalman filter instead of Kalman + EMA
    #[arg(long)]
    no_adaptive: bool,
}

impl Args {
    /// Apply the command line overrides on top of loaded settings
    fn apply(&self, mut settings: GameSettings) -> GameSettings {
        if let Some(kind) = self.pattern {
            settings.starting_pattern = kind;
        }
        if self.no_adaptive {
            settings.smoother = SmootherKind::Kalman;
        }
        settings
    }
}

fn parse_pattern(s: &str) -> Result<PatternType, String> {
    PatternType::from_str(s).ok_or_else(|| {
        let names: Vec<_> = PatternType::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown pattern '{}' (expected one of: {})", s, names.join(", "))
    })
}

/// Blink samples reach the session as frames without a sample, the way the
/// interactive game loop feeds them. The session itself still scores blink
/// samples that carry coordinates (see the blink-frame decision in DESIGN.md).
fn demo_observation(observation: GazeObservation) -> GazeObservation {
    match observation {
        GazeObservation::Sample { blink: true, .. } => GazeObservation::Unavailable,
        other => other,
    }
}

fn main() {
    env_logger::init();
    log::info!("Gaze Trace (headless) starting...");

    if let Err(e) = run(Args::parse()) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let loaded = match &args.settings {
        Some(path) => GameSettings::load(path)?,
        None => GameSettings::default(),
    };
    let settings = args.apply(loaded);
    settings.validate()?;
    log::info!(
        "Pattern {}, filter {:?}, {} frames",
        settings.starting_pattern.as_str(),
        settings.smoother,
        args.frames
    );

    let (width, height) = (settings.screen_width, settings.screen_height);
    let mut session = GameSession::new(settings.clone());
    session.set_pattern(settings.starting_pattern);

    let Some(pattern) = session.pattern() else {
        return Err("session has no pattern after set_pattern".into());
    };
    let mut gaze = SimulatedGaze::new(pattern, SimulatedGazeConfig::default());
    let mut canvas = RasterCanvas::filled(width, height, Color::BACKGROUND);

    let start = Instant::now();
    for frame in 0..args.frames {
        let observation = demo_observation(gaze.next_observation());
        let update = session.update_at(observation, start + FRAME_TIME * frame);

        canvas.fill(Color::BACKGROUND);
        match update.report() {
            Some(report) if observation.is_available() && !report.blink => {
                session.draw_gaze_cursor(&mut canvas, observation.position());
            }
            _ => session.draw_waiting_banner(&mut canvas),
        }
        session.draw(&mut canvas);

        if update.report().is_some_and(|r| r.leveled_up) {
            if let Some(pattern) = session.pattern() {
                gaze.retarget(pattern);
            }
        }
        if (frame + 1) % PROGRESS_EVERY == 0 {
            log::info!(
                "Frame {}: level {} completion {:.1}% score {}",
                frame + 1,
                session.level(),
                session.completion() * 100.0,
                session.score()
            );
        }
    }

    canvas.save_ppm(&args.out)?;
    log::info!("Last frame written to {}", args.out.display());
    println!("{}", serde_json::to_string_pretty(&session.summary())?);
    Ok(())
}
