//! Idle-triggered handwriting recognition for luxdraw.
//!
//! Once the session has been idle long enough, the canvas is snapshotted,
//! binarized and handed to a text recognizer. The recognized text is then
//! sanitized and evaluated as restricted arithmetic.

pub mod binarize;
pub mod expr;
pub mod types;

mod dependencies;
mod pipeline;
#[cfg(test)]
mod tests;

pub use dependencies::{CommandRecognizer, RecognizerFactory, RecognizerHandle, TextRecognizer};
pub use pipeline::RecognitionPipeline;
pub use types::{RecognitionError, RecognitionOutcome};
