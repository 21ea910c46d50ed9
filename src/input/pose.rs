//! Per-frame hand pose classification.
//!
//! The classifier compares each fingertip's vertical coordinate with its
//! proximal interphalangeal joint. With the top-left image origin a larger `y`
//! means lower on screen, so `tip.y > pip.y` reads as a curled finger.
//!
//! Frames are classified independently with no smoothing or hysteresis, so a
//! jittery hand can flip between poses from one frame to the next.

use super::landmarks::{HandLandmarks, indices};

/// Discrete hand pose derived from one frame's landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPose {
    /// No hand in frame
    None,
    /// Index, middle, ring and pinky all curled (erase)
    Fist,
    /// Only the index finger extended (draw)
    Pointing,
    /// Anything else
    Open,
}

/// Tip/PIP pairs for middle, ring and pinky.
const OTHER_FINGERS: [(usize, usize); 3] = [
    (indices::MIDDLE_FINGER_TIP, indices::MIDDLE_FINGER_PIP),
    (indices::RING_FINGER_TIP, indices::RING_FINGER_PIP),
    (indices::PINKY_TIP, indices::PINKY_PIP),
];

fn is_curled(hand: &HandLandmarks, tip: usize, pip: usize) -> bool {
    hand.point(tip).y > hand.point(pip).y
}

fn is_extended(hand: &HandLandmarks, tip: usize, pip: usize) -> bool {
    hand.point(tip).y < hand.point(pip).y
}

/// Classifies a hand (or its absence) into a [`HandPose`].
pub fn classify(hand: Option<&HandLandmarks>) -> HandPose {
    let Some(hand) = hand else {
        return HandPose::None;
    };

    let others_curled = OTHER_FINGERS
        .iter()
        .all(|&(tip, pip)| is_curled(hand, tip, pip));

    if !others_curled {
        return HandPose::Open;
    }

    if is_curled(hand, indices::INDEX_FINGER_TIP, indices::INDEX_FINGER_PIP) {
        HandPose::Fist
    } else if is_extended(hand, indices::INDEX_FINGER_TIP, indices::INDEX_FINGER_PIP) {
        HandPose::Pointing
    } else {
        HandPose::Open
    }
}
