//! Per-session orchestration.
//!
//! A [`Session`] owns everything one user's drawing needs: the mode state,
//! the ink canvas, the recognition pipeline and a clock. Each call to
//! [`Session::step`] consumes one frame's worth of hand input. Sessions are
//! never shared between concurrently processed frames; callers hand the
//! whole session to whoever processes the next frame.

pub mod clock;


use std::sync::Arc;

use image::RgbImage;

use crate::compositor::{self, Overlay};
use crate::config::{Config, UiConfig};
use crate::draw::{Canvas, CanvasError};
use crate::input::{HandLandmarks, Mode, SessionState, classify};
use crate::recognition::{RecognitionOutcome, RecognitionPipeline};

pub use clock::{Clock, ManualClock, SystemClock};

/// Externally visible summary of the session after a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub mode: Mode,
    pub detected_text: String,
    pub result: String,
}

impl SessionStatus {
    /// Mode label as shown to the user (e.g. "Invalid Expression").
    pub fn label(&self) -> &'static str {
        self.mode.label()
    }
}

/// Result of processing one frame.
#[derive(Debug)]
pub struct FrameOutput {
    pub composite: cairo::ImageSurface,
    pub status: SessionStatus,
    pub outcome: RecognitionOutcome,
}

/// One drawing session.
pub struct Session {
    state: SessionState,
    canvas: Option<Canvas>,
    pipeline: RecognitionPipeline,
    clock: Arc<dyn Clock>,
    ui: UiConfig,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.state.mode())
            .field("canvas", &self.canvas)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

impl Session {
    /// Session on the wall clock with the OCR command from `config`.
    pub fn new(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self::from_parts(
            state_from_config(config),
            RecognitionPipeline::from_config(&config.recognition),
            clock,
            config.ui.clone(),
        )
    }

    pub fn from_parts(
        state: SessionState,
        pipeline: RecognitionPipeline,
        clock: Arc<dyn Clock>,
        ui: UiConfig,
    ) -> Self {
        Self {
            state,
            canvas: None,
            pipeline,
            clock,
            ui,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The ink canvas, once the first frame has sized it.
    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            mode: self.state.mode(),
            detected_text: self.state.detected_text().to_string(),
            result: self.state.result_text().to_string(),
        }
    }

    /// Fraction of the idle threshold elapsed, if recognition is pending.
    pub fn idle_progress(&self) -> Option<f64> {
        self.pipeline.progress(&self.state, self.clock.now())
    }

    /// Advances the session by one frame of `width × height` pixels.
    ///
    /// Sizes the canvas on first use and recreates it (dropping all ink)
    /// when the frame size changes. Then classifies the hand, applies the
    /// mode transition, renders ink at the fingertip and gives the
    /// recognition pipeline a chance to fire.
    pub fn step(
        &mut self,
        width: u32,
        height: u32,
        hand: Option<&HandLandmarks>,
    ) -> Result<RecognitionOutcome, CanvasError> {
        self.ensure_canvas(width, height)?;

        let now = self.clock.now();
        let pose = classify(hand);
        let fingertip = hand.map(|h| h.index_tip_pixels(width, height));
        log::debug!("Pose {:?}, fingertip {:?}", pose, fingertip);

        self.state.apply_pose(pose, fingertip, now);

        let Some(canvas) = self.canvas.as_mut() else {
            return Ok(RecognitionOutcome::Skipped);
        };

        if let Some(tip) = fingertip {
            if let Err(err) = self.state.render_stroke(canvas, tip) {
                log::warn!("Failed to render stroke at {:?}: {}", tip, err);
            }
        }

        Ok(self.pipeline.run(&mut self.state, canvas, now))
    }

    /// Steps the session with `frame` and renders the response image.
    pub fn process_frame(
        &mut self,
        frame: &RgbImage,
        hand: Option<&HandLandmarks>,
    ) -> Result<FrameOutput, CanvasError> {
        let (width, height) = frame.dimensions();
        let outcome = self.step(width, height, hand)?;
        let composite = self.compose(frame, hand)?;
        Ok(FrameOutput {
            composite,
            status: self.status(),
            outcome,
        })
    }

    /// Renders the current session over `frame` without advancing it.
    pub fn compose(
        &self,
        frame: &RgbImage,
        hand: Option<&HandLandmarks>,
    ) -> Result<cairo::ImageSurface, CanvasError> {
        let overlay = Overlay {
            state: &self.state,
            canvas: self.canvas.as_ref(),
            hand,
            progress: self.idle_progress(),
        };
        compositor::compose(frame, &overlay, &self.ui)
    }

    /// Clears the canvas and restores the initial session state.
    pub fn reset(&mut self) -> Result<(), CanvasError> {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.clear()?;
        }
        self.state.reset();
        log::info!("Session reset");
        Ok(())
    }

    fn ensure_canvas(&mut self, width: u32, height: u32) -> Result<(), CanvasError> {
        if self.canvas.as_ref().is_some_and(|c| c.matches(width, height)) {
            return Ok(());
        }

        match &self.canvas {
            Some(old) => log::info!(
                "Frame size changed from {}x{} to {}x{}; reinitializing canvas",
                old.width(),
                old.height(),
                width,
                height
            ),
            None => log::info!("Initializing {}x{} canvas", width, height),
        }
        self.canvas = Some(Canvas::new(width, height)?);
        Ok(())
    }
}

/// Initial session state from the drawing, palette and recognition settings.
pub fn state_from_config(config: &Config) -> SessionState {
    SessionState::with_defaults(
        config.palette(),
        config.drawing.default_color.to_color(),
        config.drawing.thickness,
        config.drawing.eraser_radius,
        config.recognition.after_result,
    )
}
