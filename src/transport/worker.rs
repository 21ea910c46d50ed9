use image::RgbImage;

use crate::config::Config;
use crate::input::HandLandmarks;
use crate::session::{Session, SessionStatus};
use crate::tracking::HandTracker;
use crate::transport::codec::{self, CodecError};
use crate::transport::protocol::{CLEARED_MESSAGE, FrameResponse, READY_MESSAGE, Request, Response};

/// Executes requests against one session.
///
/// Owns the session outright, so frames are processed strictly one at a
/// time and no state is shared with other sessions.
pub struct FrameWorker {
    session: Session,
    tracker: Box<dyn HandTracker>,
    mirror: bool,
}

impl FrameWorker {
    pub fn new(session: Session, tracker: Box<dyn HandTracker>, mirror: bool) -> Self {
        Self {
            session,
            tracker,
            mirror,
        }
    }

    pub fn from_config(config: &Config, tracker: Box<dyn HandTracker>) -> Self {
        Self::new(Session::new(config), tracker, config.ui.mirror)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handles one request. Failures become `{"error": ...}` responses.
    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::Ping => Response::message(READY_MESSAGE),
            Request::Clear => match self.session.reset() {
                Ok(()) => Response::message(CLEARED_MESSAGE),
                Err(err) => Response::error(format!("Failed to clear canvas: {}", err)),
            },
            Request::Frame { image, landmarks } => {
                match self.process(&image, landmarks.as_deref()) {
                    Ok(response) => Response::Frame(response),
                    Err(err) => {
                        log::warn!("Rejected frame: {}", err);
                        Response::error(err.to_string())
                    }
                }
            }
        }
    }

    fn process(
        &mut self,
        image_url: &str,
        landmarks: Option<&[[f64; 2]]>,
    ) -> Result<FrameResponse, WorkerError> {
        let mut frame = codec::decode_data_url(image_url)?;
        if self.mirror {
            image::imageops::flip_horizontal_in_place(&mut frame);
        }

        let hand = self.locate_hand(&frame, landmarks);
        let output = self.session.process_frame(&frame, hand.as_ref())?;
        let image = codec::encode_png_data_url(&output.composite)?;
        Ok(frame_response(Some(image), &output.status))
    }

    /// Landmarks sent with the request win over the tracker. They describe
    /// the frame as sent, so they follow it when it is mirrored.
    fn locate_hand(&mut self, frame: &RgbImage, landmarks: Option<&[[f64; 2]]>) -> Option<HandLandmarks> {
        if let Some(points) = landmarks {
            return match HandLandmarks::try_from(points) {
                Ok(hand) if self.mirror => Some(hand.mirrored()),
                Ok(hand) => Some(hand),
                Err(err) => {
                    if !points.is_empty() {
                        log::warn!("Ignoring request landmarks: {}", err);
                    }
                    None
                }
            };
        }

        match self.tracker.detect(frame) {
            Ok(hand) => hand,
            Err(err) => {
                log::warn!("Hand tracking failed, treating frame as empty: {}", err);
                None
            }
        }
    }
}

/// Builds the output contract from a session status.
pub fn frame_response(image: Option<String>, status: &SessionStatus) -> FrameResponse {
    FrameResponse {
        image,
        status: status.label().to_string(),
        detected_text: status.detected_text.clone(),
        result: status.result.clone(),
    }
}

#[derive(Debug, thiserror::Error)]
enum WorkerError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Failed to render frame: {0}")]
    Canvas(#[from] crate::draw::CanvasError),
}
