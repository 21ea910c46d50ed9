//! Interaction mode shown to the user.

use std::fmt;

/// Current interaction mode.
///
/// `Idle`, `Drawing` and `Erasing` follow the hand pose; `Processing`,
/// `Result` and `InvalidExpression` are only ever set by the recognition
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    Drawing,
    Erasing,
    Processing,
    Result,
    InvalidExpression,
}

impl Mode {
    /// Status label reported to clients.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Idle => "Idle",
            Mode::Drawing => "Drawing",
            Mode::Erasing => "Erasing",
            Mode::Processing => "Processing",
            Mode::Result => "Result",
            Mode::InvalidExpression => "Invalid Expression",
        }
    }

    /// True for the two modes that display a recognition outcome.
    pub fn shows_outcome(self) -> bool {
        matches!(self, Mode::Result | Mode::InvalidExpression)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
