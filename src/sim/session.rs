//! Gaze-driven game state machine
//!
//! One [`GameSession::update`] per captured frame, followed by one
//! [`GameSession::draw`]. Completion only accrues after a streak of guard
//! frames on the path, and never decays; leaving the path just stops the
//! accrual and restarts the streak.

use std::time::{Duration, Instant};

use glam::{IVec2, Vec2};

use super::pattern::{Pattern, PatternType, create_pattern};
use super::smoother::Smoother;
use super::state::{FrameReport, FrameUpdate, GazeObservation, SessionSummary};
use crate::consts::{LEVEL_SCORE, REFERENCE_SAMPLES};
use crate::renderer::{Canvas, Color};
use crate::settings::GameSettings;

/// Gaze cursor radius
const CURSOR_RADIUS: u32 = 15;

/// HUD layout (top-left of each line)
const HUD_LEVEL_POS: IVec2 = IVec2::new(50, 50);
const HUD_COMPLETION_POS: IVec2 = IVec2::new(50, 150);
const HUD_TIME_POS: IVec2 = IVec2::new(50, 200);
const HUD_TITLE_SCALE: u32 = 4;
const HUD_TEXT_SCALE: u32 = 3;

/// Whether a pattern is active
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingState {
    /// Nothing to follow yet; updates do no work
    NoPattern,
    /// Following the given pattern
    Tracking(Pattern),
}

/// Mutable run state of one game
#[derive(Debug)]
pub struct GameSession {
    settings: GameSettings,
    smoother: Box<dyn Smoother>,
    state: TrackingState,
    /// Fraction of the current pattern traced, `[0, 1]`
    completion: f32,
    score: u64,
    level: u32,
    /// Latched on the first update
    start_time: Option<Instant>,
    elapsed: Duration,
    on_path_frames: u32,
    off_path_frames: u32,
}

impl GameSession {
    /// Session using the smoother named in `settings`
    pub fn new(settings: GameSettings) -> Self {
        debug_assert!(
            settings.validate().is_ok(),
            "invalid settings: {:?}",
            settings.validate()
        );
        let smoother = settings.smoother.build(settings.ema_alpha);
        Self::with_smoother(settings, smoother)
    }

    /// Session with a caller-supplied filter
    pub fn with_smoother(settings: GameSettings, smoother: Box<dyn Smoother>) -> Self {
        Self {
            settings,
            smoother,
            state: TrackingState::NoPattern,
            completion: 0.0,
            score: 0,
            level: 1,
            start_time: None,
            elapsed: Duration::ZERO,
            on_path_frames: 0,
            off_path_frames: 0,
        }
    }

    /// Replace the active pattern and restart its progress
    ///
    /// Score, level and elapsed time carry over.
    pub fn set_pattern(&mut self, kind: PatternType) {
        let pattern = create_pattern(
            kind,
            self.settings.screen_width,
            self.settings.screen_height,
            self.settings.pattern_thickness,
        );
        log::info!("Pattern set: {} (level {})", kind.as_str(), self.level);
        self.state = TrackingState::Tracking(pattern);
        self.completion = 0.0;
        self.on_path_frames = 0;
        self.off_path_frames = 0;
    }

    /// Start the infinity pattern over
    pub fn reset_pattern(&mut self) {
        self.set_pattern(PatternType::Infinity);
    }

    /// Switch to the next pattern in cycling order
    pub fn next_pattern(&mut self) {
        let next = match self.pattern_type() {
            Some(kind) => kind.next(),
            None => PatternType::Infinity,
        };
        self.set_pattern(next);
    }

    /// Process one frame's gaze at the current wall-clock time
    pub fn update(&mut self, observation: GazeObservation) -> FrameUpdate {
        self.update_at(observation, Instant::now())
    }

    /// Process one frame's gaze observed at `now`
    pub fn update_at(&mut self, observation: GazeObservation, now: Instant) -> FrameUpdate {
        let start = *self.start_time.get_or_insert(now);
        self.elapsed = now.saturating_duration_since(start);

        let TrackingState::Tracking(pattern) = &self.state else {
            return FrameUpdate::NoPattern;
        };

        let threshold = self.settings.proximity_threshold;
        let samples = self.settings.scoring_samples;

        // A sample with a NaN or infinite coordinate counts as no sample, so
        // it never reaches the filter state.
        let observation = match observation {
            GazeObservation::Sample { x, y, .. } if !(x.is_finite() && y.is_finite()) => {
                log::debug!("Dropping non-finite gaze sample ({}, {})", x, y);
                GazeObservation::Unavailable
            }
            other => other,
        };

        // Blink frames are filtered and scored like any other sample. Only
        // frames with no sample at all skip the filter and count as off-path.
        let (gaze, min_distance, on_path) = match observation {
            GazeObservation::Sample { x, y, .. } => {
                let gaze = self.smoother.step(Vec2::new(x, y));
                let min_distance = pattern.min_distance(gaze, samples);
                (gaze, min_distance, min_distance < threshold)
            }
            GazeObservation::Unavailable => {
                let gaze = observation.position();
                (gaze, pattern.min_distance(gaze, samples), false)
            }
        };

        if on_path {
            self.on_path_frames += 1;
            self.off_path_frames = 0;
        } else {
            self.off_path_frames += 1;
            self.on_path_frames = 0;
        }

        if self.on_path_frames > self.settings.guard_frames {
            let increment =
                (self.settings.base_increment * (1.0 - min_distance / threshold)).max(0.0);
            self.completion = (self.completion + increment).min(1.0);
        }

        let leveled_up = self.completion >= 1.0;
        if leveled_up {
            let award = LEVEL_SCORE * self.level as u64;
            self.score += award;
            log::info!(
                "Level {} complete: +{} (score {})",
                self.level,
                award,
                self.score
            );
            self.level += 1;
            self.reset_pattern();
        }

        log::trace!(
            "gaze=({:.1}, {:.1}) dist={:.1} on={} completion={:.4}",
            gaze.x,
            gaze.y,
            min_distance,
            on_path,
            self.completion
        );

        FrameUpdate::Tracked(FrameReport {
            completion: self.completion,
            score: self.score,
            level: self.level,
            gaze_x: gaze.x,
            gaze_y: gaze.y,
            min_distance,
            on_path,
            blink: observation.is_blink(),
            leveled_up,
        })
    }

    /// Color of the completed stroke: amber once the gaze has been off the
    /// path for longer than the warning streak, green otherwise
    pub fn fill_color(&self) -> Color {
        if self.off_path_frames > self.settings.off_path_warning_frames {
            Color::AMBER
        } else {
            Color::GREEN
        }
    }

    /// Draw the reference path, the traced prefix and the HUD
    ///
    /// Does nothing while no pattern is set.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let TrackingState::Tracking(pattern) = &self.state else {
            return;
        };

        canvas.polyline(&pattern.get_points(REFERENCE_SAMPLES), false, Color::GREY, 1);
        pattern.draw_partial(canvas, self.completion, self.fill_color());

        canvas.text(
            HUD_LEVEL_POS,
            &format!("Level: {}", self.level),
            HUD_TITLE_SCALE,
            Color::GREEN,
        );
        canvas.text(
            HUD_COMPLETION_POS,
            &format!("Completion: {:.1}%", self.completion * 100.0),
            HUD_TEXT_SCALE,
            Color::GREEN,
        );
        canvas.text(
            HUD_TIME_POS,
            &format!("Time: {:.1}s", self.elapsed.as_secs_f32()),
            HUD_TEXT_SCALE,
            Color::GREEN,
        );
    }

    /// Gaze cursor: yellow dot with a cyan ring
    pub fn draw_gaze_cursor(&self, canvas: &mut dyn Canvas, gaze: Vec2) {
        let center = gaze.round().as_ivec2();
        canvas.filled_circle(center, CURSOR_RADIUS, Color::YELLOW);
        canvas.circle(center, CURSOR_RADIUS, Color::CYAN, 2);
    }

    /// Banner shown while no face is found
    pub fn draw_waiting_banner(&self, canvas: &mut dyn Canvas) {
        let origin = IVec2::new(
            (canvas.width() / 2) as i32 - 200,
            (canvas.height() / 2) as i32,
        );
        canvas.text(origin, "Waiting for face detection...", 2, Color::RED);
    }

    pub fn state(&self) -> &TrackingState {
        &self.state
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        match &self.state {
            TrackingState::NoPattern => None,
            TrackingState::Tracking(pattern) => Some(pattern),
        }
    }

    pub fn pattern_type(&self) -> Option<PatternType> {
        self.pattern().map(Pattern::kind)
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn completion(&self) -> f32 {
        self.completion
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Time since the first update
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn on_path_frames(&self) -> u32 {
        self.on_path_frames
    }

    pub fn off_path_frames(&self) -> u32 {
        self.off_path_frames
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            level: self.level,
            elapsed_secs: self.elapsed.as_secs_f32(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RasterCanvas;

    /// Filter that returns its input, so tests control the scored position
    #[derive(Debug)]
    struct PassThrough;

    impl Smoother for PassThrough {
        fn step(&mut self, raw: Vec2) -> Vec2 {
            raw
        }

        fn reset(&mut self) {}
    }

    const FRAME: Duration = Duration::from_millis(33);

    fn session(kind: PatternType) -> GameSession {
        let mut s = GameSession::with_smoother(GameSettings::default(), Box::new(PassThrough));
        s.set_pattern(kind);
        s
    }

    /// A point exactly on the scoring sample of the active pattern
    fn on_path_point(s: &GameSession) -> GazeObservation {
        let p = s.pattern().unwrap().get_points(100)[7];
        GazeObservation::sample(p.x as f32, p.y as f32, false)
    }

    fn off_path_point() -> GazeObservation {
        GazeObservation::sample(5.0, 5.0, false)
    }

    fn feed(s: &mut GameSession, obs: GazeObservation, frames: usize) -> Vec<FrameUpdate> {
        let start = Instant::now();
        (0..frames).map(|i| s.update_at(obs, start + FRAME * i as u32)).collect()
    }

    #[test]
    fn test_no_pattern_returns_placeholder() {
        let mut s = GameSession::new(GameSettings::default());
        let start = Instant::now();
        let update = s.update_at(GazeObservation::sample(960.0, 540.0, false), start);
        assert_eq!(update, FrameUpdate::NoPattern);
        assert_eq!(update.completion(), 0.0);
        assert_eq!(update.score(), 0);
        assert_eq!(s.on_path_frames(), 0);
        assert_eq!(s.off_path_frames(), 0);

        // Clock still latched on that first call
        s.update_at(GazeObservation::Unavailable, start + Duration::from_secs(3));
        assert_eq!(s.elapsed(), Duration::from_secs(3));
    }

    #[test]
    fn test_guard_frames_keep_completion_zero() {
        let mut s = session(PatternType::Infinity);
        let obs = on_path_point(&s);
        for (i, update) in feed(&mut s, obs, 5).iter().enumerate() {
            let report = update.report().unwrap();
            assert!(report.on_path);
            assert_eq!(report.completion, 0.0, "frame {} accrued", i + 1);
        }
        assert_eq!(s.on_path_frames(), 5);
    }

    #[test]
    fn test_sixth_on_path_frame_accrues() {
        let mut s = session(PatternType::Infinity);
        let obs = on_path_point(&s);
        let updates = feed(&mut s, obs, 6);
        assert!(updates[5].completion() > updates[4].completion());
    }

    #[test]
    fn test_ten_frames_at_zero_distance() {
        // Default Kalman-EMA filter: a constant input comes back unchanged
        let mut s = GameSession::new(GameSettings::for_screen(1920, 1080));
        s.set_pattern(PatternType::Infinity);
        let obs = on_path_point(&s);
        let updates = feed(&mut s, obs, 10);

        let mut expected = 0.0f32;
        for _ in 6..=10 {
            expected = (expected + 0.001 * (1.0 - 0.0 / 30.0)).min(1.0);
        }
        let report = updates[9].report().unwrap();
        assert_eq!(report.min_distance, 0.0);
        assert_eq!(report.completion, expected);
        assert!((report.completion - 0.005).abs() < 1e-6);
    }

    #[test]
    fn test_increment_scales_with_distance() {
        let mut s = session(PatternType::Infinity);
        let p = s.pattern().unwrap().get_points(100)[0];
        // 15 px right of the rightmost tip: half the threshold
        let obs = GazeObservation::sample(p.x as f32 + 15.0, p.y as f32, false);
        let updates = feed(&mut s, obs, 6);
        let report = updates[5].report().unwrap();
        assert_eq!(report.min_distance, 15.0);
        assert!((report.completion - 0.0005).abs() < 1e-7);
    }

    #[test]
    fn test_off_path_breaks_streak_without_decay() {
        let mut s = session(PatternType::Infinity);
        let on = on_path_point(&s);
        feed(&mut s, on, 20);
        let before = s.completion();
        assert!(before > 0.0);

        feed(&mut s, off_path_point(), 3);
        assert_eq!(s.completion(), before);
        assert_eq!(s.on_path_frames(), 0);
        assert_eq!(s.off_path_frames(), 3);

        // Back on path: guard frames apply again
        feed(&mut s, on, 5);
        assert_eq!(s.completion(), before);
        assert_eq!(s.off_path_frames(), 0);
    }

    #[test]
    fn test_completion_monotonic_and_clamped() {
        let mut s = session(PatternType::Lissajous);
        let path = s.pattern().unwrap().get_points(100);
        let start = Instant::now();
        let mut last = 0.0;
        for frame in 0..3000u32 {
            let obs = if frame % 17 < 3 {
                off_path_point()
            } else {
                let p = path[(frame as usize / 4) % path.len()];
                GazeObservation::sample(p.x as f32 + (frame % 7) as f32, p.y as f32, false)
            };
            let update = s.update_at(obs, start + FRAME * frame);
            let report = update.report().unwrap();
            assert!(report.completion <= 1.0);
            if !report.leveled_up {
                assert!(report.completion >= last, "completion fell at frame {}", frame);
            }
            last = report.completion;
        }
    }

    #[test]
    fn test_level_up_awards_score_and_resets_to_infinity() {
        let mut s = session(PatternType::Circle);
        let obs = on_path_point(&s);
        feed(&mut s, obs, 6);
        s.completion = 0.9995;

        let report = *feed(&mut s, obs, 1)[0].report().unwrap();
        assert!(report.leveled_up);
        assert_eq!(report.score, 100);
        assert_eq!(report.level, 2);
        assert_eq!(report.completion, 0.0);
        assert_eq!(s.pattern_type(), Some(PatternType::Infinity));
        assert_eq!(s.on_path_frames(), 0);
        assert_eq!(s.off_path_frames(), 0);

        // Second completion awards at level 2
        let obs = on_path_point(&s);
        feed(&mut s, obs, 6);
        s.completion = 0.9999;
        let report = *feed(&mut s, obs, 1)[0].report().unwrap();
        assert!(report.leveled_up);
        assert_eq!(report.score, 100 + 200);
        assert_eq!(report.level, 3);
    }

    #[test]
    fn test_full_trace_from_zero_levels_up() {
        let mut s = session(PatternType::Infinity);
        let obs = on_path_point(&s);
        let updates = feed(&mut s, obs, 1200);
        let first = updates
            .iter()
            .position(|u| u.report().unwrap().leveled_up)
            .expect("never leveled up");
        // Five guard frames then roughly a thousand increments
        assert!((1000..=1010).contains(&first), "leveled up at frame {}", first);
        assert_eq!(s.level(), 2);
        assert_eq!(s.score(), 100);
    }

    #[test]
    fn test_set_pattern_resets_progress_only() {
        let mut s = session(PatternType::Infinity);
        let on = on_path_point(&s);
        feed(&mut s, on, 30);
        s.score = 700;
        s.level = 4;
        let elapsed = s.elapsed();

        s.set_pattern(PatternType::Spiral);
        assert_eq!(s.completion(), 0.0);
        assert_eq!(s.on_path_frames(), 0);
        assert_eq!(s.off_path_frames(), 0);
        assert_eq!(s.score(), 700);
        assert_eq!(s.level(), 4);
        assert_eq!(s.elapsed(), elapsed);
        assert_eq!(s.pattern_type(), Some(PatternType::Spiral));

        feed(&mut s, off_path_point(), 4);
        s.set_pattern(PatternType::Spiral);
        assert_eq!(s.off_path_frames(), 0);
    }

    #[test]
    fn test_blink_frames_are_still_scored() {
        // Blink is informational only: filtering and scoring run regardless
        let mut s = session(PatternType::Infinity);
        let p = s.pattern().unwrap().get_points(100)[7];
        let blink = GazeObservation::sample(p.x as f32, p.y as f32, true);
        let updates = feed(&mut s, blink, 8);
        let report = updates[7].report().unwrap();
        assert!(report.blink);
        assert!(report.on_path);
        assert!(report.completion > 0.0);
    }

    #[test]
    fn test_unavailable_frames_never_credit() {
        let mut s = session(PatternType::Infinity);
        let on = on_path_point(&s);
        feed(&mut s, on, 10);
        let before = s.completion();

        let update = feed(&mut s, GazeObservation::Unavailable, 1)[0];
        let report = update.report().unwrap();
        assert!(!report.on_path);
        assert!(report.blink);
        assert_eq!((report.gaze_x, report.gaze_y), (-1.0, -1.0));
        assert_eq!(report.completion, before);
        assert_eq!(s.on_path_frames(), 0);
        assert_eq!(s.off_path_frames(), 1);
    }

    #[test]
    fn test_unavailable_skips_the_filter() {
        let mut s = GameSession::new(GameSettings::default());
        s.set_pattern(PatternType::Infinity);
        let on = on_path_point(&s);
        feed(&mut s, on, 10);
        feed(&mut s, GazeObservation::Unavailable, 3);

        // The filter never saw the sentinel, so the next sample is exact again
        let report = *feed(&mut s, on, 1)[0].report().unwrap();
        assert_eq!(report.min_distance, 0.0);
    }

    #[test]
    fn test_non_finite_sample_does_not_poison_filter() {
        let mut s = GameSession::new(GameSettings::default());
        s.set_pattern(PatternType::Infinity);
        let on = on_path_point(&s);

        let report = *feed(&mut s, GazeObservation::sample(f32::NAN, 1.0, false), 1)[0]
            .report()
            .unwrap();
        assert!(!report.on_path);
        assert_eq!((report.gaze_x, report.gaze_y), (-1.0, -1.0));
        assert_eq!(s.off_path_frames(), 1);

        feed(&mut s, GazeObservation::sample(0.0, f32::INFINITY, false), 1);
        let updates = feed(&mut s, on, 20);
        let last = updates.last().unwrap().report().unwrap();
        assert!(last.min_distance.is_finite());
        assert!(s.completion() > 0.0);
        assert_eq!(s.on_path_frames(), 20);
    }

    #[test]
    fn test_negative_increment_never_lowers_completion() {
        let settings = GameSettings {
            base_increment: -0.01,
            ..GameSettings::default()
        };
        let mut s = GameSession::with_smoother(settings, Box::new(PassThrough));
        s.set_pattern(PatternType::Infinity);
        let on = on_path_point(&s);
        s.completion = 0.25;

        for update in feed(&mut s, on, 20) {
            assert_eq!(update.completion(), 0.25);
        }
    }

    #[test]
    fn test_amber_after_eleven_off_path_frames() {
        let mut s = session(PatternType::Infinity);
        let on = on_path_point(&s);
        feed(&mut s, on, 8);
        s.completion = 0.5;

        feed(&mut s, off_path_point(), 10);
        assert_eq!(s.fill_color(), Color::GREEN);
        let mut canvas = RasterCanvas::filled(1920, 1080, Color::BACKGROUND);
        s.draw(&mut canvas);
        assert_eq!(canvas.count_color(Color::AMBER), 0);

        feed(&mut s, off_path_point(), 1);
        assert_eq!(s.off_path_frames(), 11);
        assert_eq!(s.on_path_frames(), 0);
        assert_eq!(s.fill_color(), Color::AMBER);
        let mut canvas = RasterCanvas::filled(1920, 1080, Color::BACKGROUND);
        s.draw(&mut canvas);
        assert!(canvas.count_color(Color::AMBER) > 0);
    }

    #[test]
    fn test_draw_without_pattern_is_noop() {
        let s = GameSession::new(GameSettings::for_screen(320, 240));
        let mut canvas = RasterCanvas::filled(320, 240, Color::BACKGROUND);
        let before = canvas.clone();
        s.draw(&mut canvas);
        assert_eq!(canvas, before);
    }

    #[test]
    fn test_draw_reference_path_and_hud() {
        let mut s = GameSession::new(GameSettings::for_screen(640, 480));
        s.set_pattern(PatternType::Circle);
        let mut canvas = RasterCanvas::filled(640, 480, Color::BACKGROUND);
        s.draw(&mut canvas);

        // Grey reference ring at radius 0.35 * 480 from center
        let c = s.pattern().unwrap().center();
        assert_eq!(canvas.pixel(c.x + 168, c.y), Some(Color::GREY));
        // Nothing traced yet, so the only green is HUD text
        assert!(canvas.count_color(Color::GREEN) > 0);
        assert_eq!(canvas.pixel(c.x, c.y), Some(Color::BACKGROUND));
    }

    #[test]
    fn test_elapsed_time_is_monotonic_across_patterns() {
        let mut s = session(PatternType::Wave);
        let start = Instant::now();
        s.update_at(off_path_point(), start);
        s.update_at(off_path_point(), start + Duration::from_millis(2500));
        assert_eq!(s.elapsed(), Duration::from_millis(2500));

        s.next_pattern();
        s.update_at(off_path_point(), start + Duration::from_secs(4));
        assert_eq!(s.elapsed(), Duration::from_secs(4));
        assert_eq!(s.summary().elapsed_secs, 4.0);
    }

    #[test]
    fn test_next_and_reset_pattern() {
        let mut s = GameSession::new(GameSettings::default());
        assert_eq!(s.pattern_type(), None);
        assert_eq!(s.state(), &TrackingState::NoPattern);

        s.next_pattern();
        assert_eq!(s.pattern_type(), Some(PatternType::Infinity));
        s.next_pattern();
        assert_eq!(s.pattern_type(), Some(PatternType::Spiral));
        for _ in 0..4 {
            s.next_pattern();
        }
        assert_eq!(s.pattern_type(), Some(PatternType::Infinity));

        s.set_pattern(PatternType::Wave);
        s.reset_pattern();
        assert_eq!(s.pattern_type(), Some(PatternType::Infinity));
    }

    #[test]
    fn test_cursor_and_banner() {
        let s = session(PatternType::Infinity);
        let mut canvas = RasterCanvas::new(1920, 1080);
        s.draw_gaze_cursor(&mut canvas, Vec2::new(100.0, 100.0));
        assert_eq!(canvas.pixel(100, 100), Some(Color::YELLOW));
        assert_eq!(canvas.pixel(115, 100), Some(Color::CYAN));

        s.draw_waiting_banner(&mut canvas);
        assert!(canvas.count_color(Color::RED) > 0);
    }
}
