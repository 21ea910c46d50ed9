//! Hand input and the interaction state machine.
//!
//! This module turns per-frame hand landmarks into drawing actions. It
//! classifies the hand pose, drives the Idle/Drawing/Erasing mode machine and
//! renders strokes onto the session canvas.

pub mod landmarks;
pub mod mode;
pub mod pose;
pub mod state;

// Re-export commonly used types at module level
pub use landmarks::{HandLandmarks, Landmark};
pub use mode::Mode;
pub use pose::{HandPose, classify};
pub use state::SessionState;
