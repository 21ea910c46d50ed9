//! JSON-lines request/response messages.

use serde::{Deserialize, Serialize};

pub const READY_MESSAGE: &str = "LuxDraw backend is running and ready!";
pub const CLEARED_MESSAGE: &str = "Canvas cleared successfully";

/// One request line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Request {
    /// Process a camera frame.
    Frame {
        /// `data:image/...;base64,...`
        image: String,
        /// Index-ordered `[x, y]` keypoints from client-side detection,
        /// in the coordinates of `image` as sent. When present they replace
        /// the tracker, and they are mirrored along with the frame.
        #[serde(default)]
        landmarks: Option<Vec<[f64; 2]>>,
    },
    /// Clear the canvas and reset the session.
    Clear,
    /// Liveness check.
    Ping,
}

/// Output contract for a processed frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameResponse {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<String>,
    pub status: String,
    pub detected_text: String,
    pub result: String,
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Frame(FrameResponse),
    Message { message: String },
    Error { error: String },
}

impl Response {
    pub fn message(message: impl Into<String>) -> Self {
        Response::Message {
            message: message.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Response::Error {
            error: error.into(),
        }
    }
}

/// Parses one request line.
pub fn parse_request(line: &str) -> Result<Request, serde_json::Error> {
    serde_json::from_str(line.trim())
}
