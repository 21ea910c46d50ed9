use std::{fmt, time::Duration, time::Instant};

use crate::{
    config::RecognitionConfig,
    draw::Canvas,
    input::{Mode, SessionState},
    recognition::{
        binarize::binarize,
        dependencies::RecognizerHandle,
        expr,
        types::{RecognitionError, RecognitionOutcome},
    },
};

/// Idle-triggered recognition: snapshot, binarize, recognize, evaluate.
///
/// Fires at most once per idle period, as soon as the session has been Idle
/// for at least `idle_threshold` (inclusive).
pub struct RecognitionPipeline {
    recognizer: RecognizerHandle,
    idle_threshold: Duration,
    binarize_threshold: u8,
}

impl fmt::Debug for RecognitionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionPipeline")
            .field("recognizer", &self.recognizer)
            .field("idle_threshold", &self.idle_threshold)
            .field("binarize_threshold", &self.binarize_threshold)
            .finish()
    }
}

impl RecognitionPipeline {
    pub fn new(recognizer: RecognizerHandle, idle_threshold: Duration, binarize_threshold: u8) -> Self {
        Self {
            recognizer,
            idle_threshold,
            binarize_threshold,
        }
    }

    /// Pipeline backed by the OCR command from `config`.
    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self::new(
            RecognizerHandle::from_config(config),
            Duration::from_secs_f64(config.idle_seconds),
            config.threshold,
        )
    }

    pub fn idle_threshold(&self) -> Duration {
        self.idle_threshold
    }

    pub fn recognizer(&self) -> &RecognizerHandle {
        &self.recognizer
    }

    /// True when this idle period has lasted long enough and was not handled yet.
    pub fn is_due(&self, state: &SessionState, now: Instant) -> bool {
        state.mode() == Mode::Idle
            && !state.has_processed_this_idle_period()
            && state
                .idle_elapsed(now)
                .is_some_and(|elapsed| elapsed >= self.idle_threshold)
    }

    /// Fraction of the idle threshold elapsed, while a recognition is pending.
    pub fn progress(&self, state: &SessionState, now: Instant) -> Option<f64> {
        if state.mode() != Mode::Idle || state.has_processed_this_idle_period() {
            return None;
        }
        let elapsed = state.idle_elapsed(now)?;
        if self.idle_threshold.is_zero() {
            return Some(1.0);
        }
        Some((elapsed.as_secs_f64() / self.idle_threshold.as_secs_f64()).min(1.0))
    }

    /// Runs one pipeline tick against the session.
    ///
    /// Recognition and evaluation failures never escape: they leave the
    /// session in [`Mode::InvalidExpression`] with `"Error"` as the result.
    /// The canvas is left untouched.
    pub fn run(&self, state: &mut SessionState, canvas: &Canvas, now: Instant) -> RecognitionOutcome {
        if !self.is_due(state, now) {
            return RecognitionOutcome::Skipped;
        }

        state.mark_processed();

        if canvas.is_blank() {
            log::info!("Idle threshold reached on an empty canvas; skipping recognition");
            state.revert_to_idle();
            return RecognitionOutcome::EmptyCanvas;
        }

        state.begin_processing();
        log::info!(
            "Idle for {:.1}s, recognizing {}x{} canvas",
            self.idle_threshold.as_secs_f64(),
            canvas.width(),
            canvas.height()
        );

        let detected = match self.recognize(canvas) {
            Ok(fragments) => fragments.join(" "),
            Err(err) => {
                log::warn!("Text recognition failed: {}", err);
                state.finish_invalid(String::new());
                return RecognitionOutcome::Invalid {
                    detected: String::new(),
                };
            }
        };
        log::info!("Detected text: {:?}", detected);

        let sanitized = expr::sanitize(&detected);
        if sanitized.trim().is_empty() {
            log::info!("No arithmetic in detected text");
            state.finish_invalid(detected.clone());
            return RecognitionOutcome::Invalid { detected };
        }

        match expr::evaluate(&sanitized) {
            Ok(value) => {
                let result = expr::format_value(value);
                log::info!("Result: {} = {}", sanitized.trim(), result);
                state.finish_result(detected.clone(), result.clone());
                RecognitionOutcome::Evaluated { detected, result }
            }
            Err(err) => {
                log::info!("Invalid expression {:?}: {}", sanitized, err);
                state.finish_invalid(detected.clone());
                RecognitionOutcome::Invalid { detected }
            }
        }
    }

    fn recognize(&self, canvas: &Canvas) -> Result<Vec<String>, RecognitionError> {
        let snapshot = canvas.snapshot()?;
        let binary = binarize(&snapshot, self.binarize_threshold);
        let recognizer = self.recognizer.get()?;
        recognizer.recognize(&binary)
    }
}
