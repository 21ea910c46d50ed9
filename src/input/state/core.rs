//! Session state and the pose-driven mode state machine.

use std::time::{Duration, Instant};

use crate::config::AfterResult;
use crate::draw::{Color, Palette};
use crate::input::{mode::Mode, pose::HandPose};
use crate::util;

/// Mutable state of one drawing session.
///
/// Invariants kept by every method:
/// - `cursor` is `None` whenever `mode` is not [`Mode::Drawing`], so a new
///   stroke never joins the previous one.
/// - `idle_since` is `None` whenever `mode` is not [`Mode::Idle`].
/// - `has_processed_this_idle_period` is cleared on every entry into Idle,
///   Drawing or Erasing from a different mode.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Current interaction mode
    pub(crate) mode: Mode,
    /// Last drawing position, only tracked while Drawing
    pub(crate) cursor: Option<(i32, i32)>,
    /// Current ink color
    pub(crate) active_color: Color,
    /// Palette cell matching `active_color`, if any
    pub(crate) selected_color_index: Option<usize>,
    /// When the current idle period began
    pub(crate) idle_since: Option<Instant>,
    /// Recognition already ran (or was skipped) for this idle period
    pub(crate) has_processed_this_idle_period: bool,
    /// Text returned by the recognizer in the last cycle
    pub(crate) detected_text: String,
    /// Evaluated result or "Error"
    pub(crate) result_text: String,
    /// Stroke width in pixels
    pub thickness: f64,
    /// Eraser disc radius in pixels
    pub eraser_radius: f64,
    /// Palette layout used for hit testing
    pub palette: Palette,
    /// Behaviour of hand-free frames while an outcome is displayed
    pub after_result: AfterResult,
    initial_color: Color,
    initial_color_index: Option<usize>,
}

impl SessionState {
    /// Creates the initial state: Idle, no cursor, no idle timer running.
    ///
    /// # Arguments
    /// * `palette` - Palette used for color selection
    /// * `color` - Initial ink color (pre-selects the matching palette cell)
    /// * `thickness` - Stroke width in pixels
    /// * `eraser_radius` - Eraser disc radius in pixels
    /// * `after_result` - Hand-free behaviour while a result is displayed
    pub fn with_defaults(
        palette: Palette,
        color: Color,
        thickness: f64,
        eraser_radius: f64,
        after_result: AfterResult,
    ) -> Self {
        let color_index = palette.entries().iter().position(|e| e.color == color);
        Self {
            mode: Mode::Idle,
            cursor: None,
            active_color: color,
            selected_color_index: color_index,
            idle_since: None,
            has_processed_this_idle_period: false,
            detected_text: String::new(),
            result_text: String::new(),
            thickness,
            eraser_radius,
            palette,
            after_result,
            initial_color: color,
            initial_color_index: color_index,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn cursor(&self) -> Option<(i32, i32)> {
        self.cursor
    }

    pub fn active_color(&self) -> Color {
        self.active_color
    }

    pub fn selected_color_index(&self) -> Option<usize> {
        self.selected_color_index
    }

    pub fn idle_since(&self) -> Option<Instant> {
        self.idle_since
    }

    pub fn has_processed_this_idle_period(&self) -> bool {
        self.has_processed_this_idle_period
    }

    pub fn detected_text(&self) -> &str {
        &self.detected_text
    }

    pub fn result_text(&self) -> &str {
        &self.result_text
    }

    /// Time spent in the current idle period, if one is running.
    pub fn idle_elapsed(&self, now: Instant) -> Option<Duration> {
        self.idle_since
            .map(|since| now.saturating_duration_since(since))
    }

    /// Applies one frame's hand pose and returns the resulting mode.
    ///
    /// `fingertip` is the index fingertip in pixels when a hand is visible; it
    /// is only consulted for the palette hit test on the Idle-entry edge.
    ///
    /// | Current            | Fist    | Pointing | None / Open                 |
    /// |--------------------|---------|----------|-----------------------------|
    /// | Drawing            | Erasing | Drawing  | Idle                        |
    /// | Erasing            | Erasing | Drawing  | Idle                        |
    /// | Idle               | Erasing | Drawing  | Idle                        |
    /// | Processing         | -       | -        | -                           |
    /// | Result / Invalid   | Erasing | Drawing  | unchanged (hold) / Idle (rearm) |
    pub fn apply_pose(
        &mut self,
        pose: HandPose,
        fingertip: Option<(i32, i32)>,
        now: Instant,
    ) -> Mode {
        let previous = self.mode;
        let next = match (previous, pose) {
            (Mode::Processing, _) => Mode::Processing,
            (_, HandPose::Fist) => Mode::Erasing,
            (_, HandPose::Pointing) => Mode::Drawing,
            (mode, _) if mode.shows_outcome() => match self.after_result {
                AfterResult::Hold => mode,
                AfterResult::Rearm => Mode::Idle,
            },
            _ => Mode::Idle,
        };

        if next != previous {
            log::debug!("Mode {} -> {} on {:?}", previous, next, pose);
        }

        match next {
            Mode::Drawing | Mode::Erasing if next != previous => {
                self.idle_since = None;
                self.has_processed_this_idle_period = false;
            }
            Mode::Idle => self.settle_idle(previous, fingertip, now),
            _ => {}
        }

        self.mode = next;
        if next != Mode::Drawing {
            self.cursor = None;
        }
        next
    }

    /// Starts the idle timer once per idle period and runs the palette check
    /// on that same edge.
    fn settle_idle(&mut self, previous: Mode, fingertip: Option<(i32, i32)>, now: Instant) {
        if previous != Mode::Idle {
            self.has_processed_this_idle_period = false;
        }

        if self.idle_since.is_none() {
            self.idle_since = Some(now);
            if let Some((x, y)) = fingertip {
                self.select_color_at(x, y);
            }
        }
    }

    /// Selects the palette cell under `(x, y)`, if any.
    pub fn select_color_at(&mut self, x: i32, y: i32) -> Option<usize> {
        let index = self.palette.hit_test(x, y)?;
        let entry = self.palette.get(index)?;
        self.active_color = entry.color;
        self.selected_color_index = Some(index);
        log::debug!(
            "Selected palette color {} ({})",
            entry.name,
            util::color_to_name(&entry.color)
        );
        Some(index)
    }

    // ------------------------------------------------------------------
    // Recognition pipeline hooks
    // ------------------------------------------------------------------

    /// Marks the current idle period as handled.
    pub(crate) fn mark_processed(&mut self) {
        self.has_processed_this_idle_period = true;
    }

    /// Returns to a fresh Idle with no timer running (empty-canvas short circuit).
    pub(crate) fn revert_to_idle(&mut self) {
        self.mode = Mode::Idle;
        self.cursor = None;
        self.idle_since = None;
        self.has_processed_this_idle_period = false;
    }

    pub(crate) fn begin_processing(&mut self) {
        self.mode = Mode::Processing;
        self.cursor = None;
        self.idle_since = None;
    }

    pub(crate) fn finish_result(&mut self, detected_text: String, result_text: String) {
        self.detected_text = detected_text;
        self.result_text = result_text;
        self.mode = Mode::Result;
    }

    pub(crate) fn finish_invalid(&mut self, detected_text: String) {
        self.detected_text = detected_text;
        self.result_text = "Error".to_string();
        self.mode = Mode::InvalidExpression;
    }

    /// Restores the initial values (mode Idle, texts cleared, initial color).
    pub fn reset(&mut self) {
        self.revert_to_idle();
        self.detected_text.clear();
        self.result_text.clear();
        self.active_color = self.initial_color;
        self.selected_color_index = self.initial_color_index;
    }
}
