//! Hand landmark sets as produced by the hand-tracking collaborator.

use serde::{Deserialize, Serialize};

use crate::util;

/// Number of keypoints in one hand.
pub const LANDMARK_COUNT: usize = 21;

/// Hand landmark indices (MediaPipe hand landmark model convention).
#[allow(dead_code)]
pub mod indices {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_FINGER_PIP: usize = 6;
    pub const INDEX_FINGER_TIP: usize = 8;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_PIP: usize = 14;
    pub const RING_FINGER_TIP: usize = 16;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_TIP: usize = 20;
}

/// A single keypoint in frame-relative units.
///
/// `x` grows to the right and `y` grows downward (top-left origin), both
/// nominally in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Landmark {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

/// One detected hand: exactly 21 ordered keypoints.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; LANDMARK_COUNT],
}

/// Raised when a landmark list does not contain exactly 21 points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Expected {LANDMARK_COUNT} landmarks, got {0}")]
pub struct LandmarkCountError(pub usize);

impl HandLandmarks {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Keypoint `index` (see [`indices`]).
    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// The same hand reflected about the vertical center line (`x -> 1 - x`).
    pub fn mirrored(&self) -> Self {
        Self {
            points: self.points.map(|p| Landmark::new(1.0 - p.x, p.y)),
        }
    }

    /// Index fingertip converted to pixel coordinates for a `width × height` frame.
    pub fn index_tip_pixels(&self, width: u32, height: u32) -> (i32, i32) {
        let tip = self.points[indices::INDEX_FINGER_TIP];
        util::normalized_to_pixel(tip.x, tip.y, width, height)
    }
}

impl TryFrom<Vec<Landmark>> for HandLandmarks {
    type Error = LandmarkCountError;

    fn try_from(points: Vec<Landmark>) -> Result<Self, Self::Error> {
        let len = points.len();
        let points: [Landmark; LANDMARK_COUNT] =
            points.try_into().map_err(|_| LandmarkCountError(len))?;
        Ok(Self { points })
    }
}

impl TryFrom<&[[f64; 2]]> for HandLandmarks {
    type Error = LandmarkCountError;

    fn try_from(pairs: &[[f64; 2]]) -> Result<Self, Self::Error> {
        pairs
            .iter()
            .copied()
            .map(Landmark::from)
            .collect::<Vec<_>>()
            .try_into()
    }
}
