use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use image::GrayImage;

use super::{
    dependencies::{RecognizerHandle, TextRecognizer},
    pipeline::RecognitionPipeline,
    types::{RecognitionError, RecognitionOutcome},
};
use crate::{
    config::AfterResult,
    draw::{BLUE, Canvas, Palette, RED, WHITE},
    input::{HandPose, Mode, SessionState},
};

const THRESHOLD: Duration = Duration::from_secs(7);

#[derive(Clone, Default)]
struct MockRecognizer {
    fragments: Vec<String>,
    error: Arc<Mutex<Option<RecognitionError>>>,
    calls: Arc<Mutex<usize>>,
    last_image: Arc<Mutex<Option<GrayImage>>>,
}

impl MockRecognizer {
    fn returning(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    fn failing(message: &str) -> Self {
        let mock = Self::default();
        *mock.error.lock().unwrap() = Some(RecognitionError::Unavailable(message.to_string()));
        mock
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl TextRecognizer for MockRecognizer {
    fn recognize(&self, image: &GrayImage) -> Result<Vec<String>, RecognitionError> {
        *self.calls.lock().unwrap() += 1;
        *self.last_image.lock().unwrap() = Some(image.clone());
        if let Some(err) = self.error.lock().unwrap().take() {
            Err(err)
        } else {
            Ok(self.fragments.clone())
        }
    }
}

fn pipeline_with(mock: &MockRecognizer) -> RecognitionPipeline {
    RecognitionPipeline::new(
        RecognizerHandle::ready(Arc::new(mock.clone())),
        THRESHOLD,
        127,
    )
}

fn create_test_state(after_result: AfterResult) -> SessionState {
    SessionState::with_defaults(Palette::default(), WHITE, 10.0, 30.0, after_result)
}

/// Session that went idle at `start` over a canvas carrying one stroke.
fn idle_session(start: Instant) -> (SessionState, Canvas) {
    let mut state = create_test_state(AfterResult::Hold);
    let mut canvas = Canvas::new(200, 100).unwrap();
    canvas.draw_line((20, 60), (180, 60), WHITE, 10.0).unwrap();
    state.apply_pose(HandPose::None, None, start);
    (state, canvas)
}

#[test]
fn test_does_not_fire_before_threshold() {
    let mock = MockRecognizer::returning(&["1+1"]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);

    let outcome = pipeline.run(&mut state, &canvas, start + Duration::from_millis(6999));
    assert_eq!(outcome, RecognitionOutcome::Skipped);
    assert_eq!(state.mode(), Mode::Idle);
    assert!(!state.has_processed_this_idle_period());
    assert_eq!(mock.calls(), 0);
}

#[test]
fn test_fires_exactly_at_threshold() {
    let mock = MockRecognizer::returning(&["1+1"]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);

    assert!(pipeline.is_due(&state, start + THRESHOLD));
    let outcome = pipeline.run(&mut state, &canvas, start + THRESHOLD);
    assert_eq!(
        outcome,
        RecognitionOutcome::Evaluated {
            detected: "1+1".to_string(),
            result: "2".to_string(),
        }
    );
    assert_eq!(mock.calls(), 1);
}

#[test]
fn test_fires_once_per_idle_period() {
    let mock = MockRecognizer::returning(&["1+1"]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);

    pipeline.run(&mut state, &canvas, start + THRESHOLD);
    // Hold keeps the result on hand-free frames; nothing re-arms the timer.
    for secs in 8..20 {
        let now = start + Duration::from_secs(secs);
        state.apply_pose(HandPose::None, None, now);
        assert_eq!(pipeline.run(&mut state, &canvas, now), RecognitionOutcome::Skipped);
    }
    assert_eq!(mock.calls(), 1);
    assert_eq!(state.mode(), Mode::Result);
}

#[test]
fn test_rearm_allows_another_cycle() {
    let mock = MockRecognizer::returning(&["1+1"]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);
    state.after_result = AfterResult::Rearm;

    pipeline.run(&mut state, &canvas, start + THRESHOLD);
    let rearmed = start + Duration::from_secs(8);
    state.apply_pose(HandPose::None, None, rearmed);
    assert_eq!(state.mode(), Mode::Idle);

    assert_eq!(
        pipeline.run(&mut state, &canvas, rearmed + Duration::from_secs(6)),
        RecognitionOutcome::Skipped
    );
    assert!(matches!(
        pipeline.run(&mut state, &canvas, rearmed + THRESHOLD),
        RecognitionOutcome::Evaluated { .. }
    ));
    assert_eq!(mock.calls(), 2);
}

#[test]
fn test_empty_canvas_short_circuits_without_oracle() {
    let mock = MockRecognizer::returning(&["1+1"]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let mut state = create_test_state(AfterResult::Hold);
    let canvas = Canvas::new(200, 100).unwrap();
    state.apply_pose(HandPose::None, None, start);

    let outcome = pipeline.run(&mut state, &canvas, start + THRESHOLD);
    assert_eq!(outcome, RecognitionOutcome::EmptyCanvas);
    assert_eq!(mock.calls(), 0);
    assert_eq!(state.mode(), Mode::Idle);
    assert_eq!(state.idle_since(), None);
    assert!(!state.has_processed_this_idle_period());

    // The next hand-free frame restarts the idle timer.
    let later = start + Duration::from_secs(8);
    state.apply_pose(HandPose::None, None, later);
    assert_eq!(state.idle_since(), Some(later));
}

#[test]
fn test_scenario_twelve_times_three() {
    let mock = MockRecognizer::returning(&["12*3"]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);

    pipeline.run(&mut state, &canvas, start + THRESHOLD);
    assert_eq!(state.mode(), Mode::Result);
    assert_eq!(state.detected_text(), "12*3");
    assert_eq!(state.result_text(), "36");
    assert_eq!(state.idle_since(), None);
}

#[test]
fn test_letter_x_is_multiplication() {
    let mock = MockRecognizer::returning(&["2", "x", "3"]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);

    pipeline.run(&mut state, &canvas, start + THRESHOLD);
    assert_eq!(state.detected_text(), "2 x 3");
    assert_eq!(state.result_text(), "6");
    assert_eq!(state.mode(), Mode::Result);
}

#[test]
fn test_division_by_zero_is_invalid() {
    let mock = MockRecognizer::returning(&["5/0"]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);

    let outcome = pipeline.run(&mut state, &canvas, start + THRESHOLD);
    assert_eq!(
        outcome,
        RecognitionOutcome::Invalid {
            detected: "5/0".to_string()
        }
    );
    assert_eq!(state.mode(), Mode::InvalidExpression);
    assert_eq!(state.result_text(), "Error");
}

#[test]
fn test_no_text_is_invalid() {
    let mock = MockRecognizer::returning(&[]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);

    pipeline.run(&mut state, &canvas, start + THRESHOLD);
    assert_eq!(state.mode(), Mode::InvalidExpression);
    assert_eq!(state.detected_text(), "");
    assert_eq!(state.result_text(), "Error");
}

#[test]
fn test_oracle_failure_is_invalid() {
    let mock = MockRecognizer::failing("engine crashed");
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);

    let outcome = pipeline.run(&mut state, &canvas, start + THRESHOLD);
    assert_eq!(
        outcome,
        RecognitionOutcome::Invalid {
            detected: String::new()
        }
    );
    assert_eq!(state.mode(), Mode::InvalidExpression);
    assert_eq!(state.result_text(), "Error");
    assert!(state.has_processed_this_idle_period());
}

#[test]
fn test_canvas_is_not_cleared_after_result() {
    let mock = MockRecognizer::returning(&["1+1"]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);

    pipeline.run(&mut state, &canvas, start + THRESHOLD);
    assert!(!canvas.is_blank());
    assert_eq!(canvas.pixel(100, 60), Some([255, 255, 255]));
}

#[test]
fn test_oracle_receives_binarized_snapshot() {
    let mock = MockRecognizer::returning(&["1"]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);

    pipeline.run(&mut state, &canvas, start + THRESHOLD);
    let image = mock.last_image.lock().unwrap().clone().unwrap();
    assert_eq!(image.dimensions(), (200, 100));
    // Ink becomes black, background white.
    assert_eq!(image.get_pixel(100, 60).0, [0]);
    assert_eq!(image.get_pixel(5, 5).0, [255]);
}

#[test]
fn test_colored_ink_reaches_oracle_as_black() {
    let mock = MockRecognizer::returning(&["1+1"]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let mut state = create_test_state(AfterResult::Hold);
    let mut canvas = Canvas::new(200, 100).unwrap();
    canvas.draw_line((20, 30), (180, 30), RED, 10.0).unwrap();
    canvas.draw_line((20, 70), (180, 70), BLUE, 10.0).unwrap();
    state.apply_pose(HandPose::None, None, start);

    let outcome = pipeline.run(&mut state, &canvas, start + THRESHOLD);
    assert_eq!(
        outcome,
        RecognitionOutcome::Evaluated {
            detected: "1+1".to_string(),
            result: "2".to_string(),
        }
    );
    let image = mock.last_image.lock().unwrap().clone().unwrap();
    assert_eq!(image.get_pixel(100, 30).0, [0]);
    assert_eq!(image.get_pixel(100, 70).0, [0]);
    assert_eq!(image.get_pixel(100, 50).0, [255]);
}

#[test]
fn test_not_due_outside_idle() {
    let mock = MockRecognizer::returning(&["1"]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);
    state.apply_pose(HandPose::Pointing, Some((10, 90)), start);

    let outcome = pipeline.run(&mut state, &canvas, start + Duration::from_secs(30));
    assert_eq!(outcome, RecognitionOutcome::Skipped);
    assert_eq!(mock.calls(), 0);
}

#[test]
fn test_progress_reports_fraction_of_threshold() {
    let mock = MockRecognizer::returning(&["1"]);
    let pipeline = pipeline_with(&mock);
    let start = Instant::now();
    let (state, _canvas) = idle_session(start);

    let half = pipeline.progress(&state, start + Duration::from_millis(3500)).unwrap();
    assert!((half - 0.5).abs() < 1e-9);
    assert_eq!(pipeline.progress(&state, start + Duration::from_secs(60)), Some(1.0));

    let drawing = create_test_state(AfterResult::Hold);
    assert_eq!(pipeline.progress(&drawing, start), None);
}

#[test]
fn test_recognizer_is_constructed_lazily_once() {
    let builds = Arc::new(Mutex::new(0usize));
    let mock = MockRecognizer::returning(&["1+1"]);
    let factory_builds = Arc::clone(&builds);
    let factory_mock = mock.clone();
    let handle = RecognizerHandle::new(Box::new(move || {
        *factory_builds.lock().unwrap() += 1;
        let recognizer: Arc<dyn TextRecognizer> = Arc::new(factory_mock.clone());
        Ok(recognizer)
    }));
    let pipeline = RecognitionPipeline::new(handle, THRESHOLD, 127);
    assert!(!pipeline.recognizer().is_initialized());

    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);
    state.after_result = AfterResult::Rearm;
    pipeline.run(&mut state, &canvas, start + THRESHOLD);
    assert!(pipeline.recognizer().is_initialized());

    let rearmed = start + Duration::from_secs(8);
    state.apply_pose(HandPose::None, None, rearmed);
    pipeline.run(&mut state, &canvas, rearmed + THRESHOLD);

    assert_eq!(*builds.lock().unwrap(), 1);
    assert_eq!(mock.calls(), 2);
}

#[test]
fn test_factory_failure_is_retried_next_cycle() {
    let attempts = Arc::new(Mutex::new(0usize));
    let mock = MockRecognizer::returning(&["4/2"]);
    let factory_attempts = Arc::clone(&attempts);
    let factory_mock = mock.clone();
    let handle = RecognizerHandle::new(Box::new(move || {
        let mut count = factory_attempts.lock().unwrap();
        *count += 1;
        if *count == 1 {
            return Err(RecognitionError::Unavailable("not installed".to_string()));
        }
        let recognizer: Arc<dyn TextRecognizer> = Arc::new(factory_mock.clone());
        Ok(recognizer)
    }));
    let pipeline = RecognitionPipeline::new(handle, THRESHOLD, 127);

    let start = Instant::now();
    let (mut state, canvas) = idle_session(start);
    state.after_result = AfterResult::Rearm;
    pipeline.run(&mut state, &canvas, start + THRESHOLD);
    assert_eq!(state.mode(), Mode::InvalidExpression);
    assert!(!pipeline.recognizer().is_initialized());

    let rearmed = start + Duration::from_secs(8);
    state.apply_pose(HandPose::None, None, rearmed);
    pipeline.run(&mut state, &canvas, rearmed + THRESHOLD);
    assert_eq!(state.mode(), Mode::Result);
    assert_eq!(state.result_text(), "2");
    assert_eq!(*attempts.lock().unwrap(), 2);
}
