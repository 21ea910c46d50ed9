//! Data types for handwriting recognition.

use std::process::ExitStatus;
use thiserror::Error;

use crate::draw::CanvasError;

/// What a single pipeline tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// Not idle long enough, not idle, or already handled this idle period.
    Skipped,
    /// The threshold elapsed over an empty canvas; back to a fresh Idle.
    EmptyCanvas,
    /// The text evaluated successfully.
    Evaluated { detected: String, result: String },
    /// The oracle failed or the text is not a valid expression.
    Invalid { detected: String },
}

/// Errors that can occur while running the text recognizer.
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Failed to spawn recognizer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Recognizer I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Recognizer exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Canvas error: {0}")]
    Canvas(#[from] CanvasError),

    #[error("Recognizer unavailable: {0}")]
    Unavailable(String),
}
