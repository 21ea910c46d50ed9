//! Hand landmark detection.
//!
//! The detector is an external collaborator. [`SubprocessTracker`] drives a
//! helper program over pipes: the helper prints `READY` once, then answers
//! every frame (a `width`, `height`, `channels` little-endian `u32` header
//! followed by raw RGB bytes) with a single JSON line:
//!
//! ```json
//! {"hands":[{"score":0.93,"landmarks":[{"x":0.41,"y":0.62}, ...]}],"error":null}
//! ```

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use image::RgbImage;
use serde::Deserialize;
use thiserror::Error;

use crate::config::TrackerConfig;
use crate::input::{HandLandmarks, Landmark};

/// Errors raised by a hand tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Failed to start tracker helper '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Tracker helper I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tracker helper did not signal ready, got: {0:?}")]
    Handshake(String),

    #[error("Tracker helper closed its output")]
    Closed,

    #[error("Malformed tracker response: {0}")]
    Protocol(#[from] serde_json::Error),
}

/// Detects at most one hand per frame.
pub trait HandTracker: Send {
    fn detect(&mut self, frame: &RgbImage) -> Result<Option<HandLandmarks>, TrackerError>;
}

/// Tracker that never sees a hand; landmarks must arrive with each frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTracker;

impl HandTracker for NoTracker {
    fn detect(&mut self, _frame: &RgbImage) -> Result<Option<HandLandmarks>, TrackerError> {
        Ok(None)
    }
}

/// Builds the tracker described by `config`.
pub fn from_config(config: &TrackerConfig) -> Result<Box<dyn HandTracker>, TrackerError> {
    match config.command.as_deref() {
        Some(program) if !program.trim().is_empty() => Ok(Box::new(SubprocessTracker::spawn(
            program,
            &config.args,
            config.min_confidence,
        )?)),
        _ => {
            log::info!("No tracker helper configured; expecting landmarks with each frame");
            Ok(Box::new(NoTracker))
        }
    }
}

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default = "full_score")]
    score: f64,
    landmarks: Vec<Landmark>,
}

#[derive(Deserialize, Debug)]
struct DetectionResult {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

fn full_score() -> f64 {
    1.0
}

/// Tracker backed by a long-running helper process.
pub struct SubprocessTracker {
    process: Child,
    stdin: ChildStdin,
    stdout_reader: BufReader<ChildStdout>,
    min_confidence: f64,
}

impl std::fmt::Debug for SubprocessTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubprocessTracker")
            .field("pid", &self.process.id())
            .field("min_confidence", &self.min_confidence)
            .finish()
    }
}

impl SubprocessTracker {
    /// Starts the helper and waits for its `READY` line.
    pub fn spawn(program: &str, args: &[String], min_confidence: f64) -> Result<Self, TrackerError> {
        log::info!("Starting tracker helper: {} {:?}", program, args);

        let mut process = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| TrackerError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let (Some(stdin), Some(stdout)) = (process.stdin.take(), process.stdout.take()) else {
            let _ = process.kill();
            return Err(TrackerError::Closed);
        };
        let mut stdout_reader = BufReader::new(stdout);

        let mut ready_line = String::new();
        stdout_reader.read_line(&mut ready_line)?;
        if ready_line.trim() != "READY" {
            let _ = process.kill();
            let _ = process.wait();
            return Err(TrackerError::Handshake(ready_line.trim().to_string()));
        }

        log::info!("Tracker helper ready");
        Ok(Self {
            process,
            stdin,
            stdout_reader,
            min_confidence: min_confidence.clamp(0.0, 1.0),
        })
    }
}

impl HandTracker for SubprocessTracker {
    fn detect(&mut self, frame: &RgbImage) -> Result<Option<HandLandmarks>, TrackerError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Ok(None);
        }

        // Header (width, height, channels) + raw RGB data
        self.stdin.write_all(&width.to_le_bytes())?;
        self.stdin.write_all(&height.to_le_bytes())?;
        self.stdin.write_all(&3u32.to_le_bytes())?;
        self.stdin.write_all(frame.as_raw())?;
        self.stdin.flush()?;

        let mut response = String::new();
        if self.stdout_reader.read_line(&mut response)? == 0 {
            return Err(TrackerError::Closed);
        }

        parse_response(&response, self.min_confidence)
    }
}

impl Drop for SubprocessTracker {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

/// Picks the first sufficiently confident 21-point hand from a helper reply.
fn parse_response(line: &str, min_confidence: f64) -> Result<Option<HandLandmarks>, TrackerError> {
    let result: DetectionResult = serde_json::from_str(line.trim())?;

    if let Some(error) = result.error {
        log::warn!("Tracker helper error: {}", error);
        return Ok(None);
    }

    for hand in result.hands {
        if hand.score < min_confidence {
            continue;
        }
        match HandLandmarks::try_from(hand.landmarks) {
            Ok(landmarks) => {
                log::debug!("Hand detected (confidence={:.2})", hand.score);
                return Ok(Some(landmarks));
            }
            Err(err) => log::warn!("Ignoring hand: {}", err),
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::landmarks::LANDMARK_COUNT;

    fn hand_json(score: f64, points: usize) -> String {
        let landmarks: Vec<String> = (0..points)
            .map(|i| format!(r#"{{"x":{},"y":0.5,"z":0.0}}"#, i as f64 / 100.0))
            .collect();
        format!(
            r#"{{"score":{},"handedness":"Right","landmarks":[{}]}}"#,
            score,
            landmarks.join(",")
        )
    }

    #[test]
    fn no_tracker_never_detects() {
        let mut tracker = NoTracker;
        assert!(tracker.detect(&RgbImage::new(4, 4)).unwrap().is_none());
    }

    #[test]
    fn parses_first_confident_hand() {
        let line = format!(
            r#"{{"hands":[{},{}],"error":null}}"#,
            hand_json(0.3, LANDMARK_COUNT),
            hand_json(0.9, LANDMARK_COUNT)
        );
        let hand = parse_response(&line, 0.7).unwrap().unwrap();
        assert_eq!(hand.points().len(), LANDMARK_COUNT);
    }

    #[test]
    fn skips_hands_with_wrong_point_count() {
        let line = format!(r#"{{"hands":[{}]}}"#, hand_json(0.9, 5));
        assert!(parse_response(&line, 0.5).unwrap().is_none());
    }

    #[test]
    fn helper_error_means_no_hand() {
        let line = r#"{"hands":[],"error":"camera busy"}"#;
        assert!(parse_response(line, 0.5).unwrap().is_none());
    }

    #[test]
    fn garbage_is_a_protocol_error() {
        assert!(matches!(
            parse_response("not json", 0.5),
            Err(TrackerError::Protocol(_))
        ));
    }

    #[test]
    fn default_config_uses_no_tracker() {
        let mut tracker = from_config(&TrackerConfig::default()).unwrap();
        assert!(tracker.detect(&RgbImage::new(2, 2)).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn subprocess_handshake_and_reply() {
        // 2x1 RGB frame: 12 header bytes + 6 pixel bytes
        let script = r#"echo READY; head -c 18 >/dev/null; echo '{"hands":[]}'"#;
        let mut tracker =
            SubprocessTracker::spawn("sh", &["-c".to_string(), script.to_string()], 0.5).unwrap();
        assert!(tracker.detect(&RgbImage::new(2, 1)).unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn subprocess_without_ready_is_rejected() {
        let result = SubprocessTracker::spawn("sh", &["-c".to_string(), "echo NOPE".to_string()], 0.5);
        assert!(matches!(result, Err(TrackerError::Handshake(line)) if line == "NOPE"));
    }
}
