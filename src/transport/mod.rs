//! Thin I/O around the session: image codec, JSON-lines protocol and the
//! `serve` / `replay` drivers.

pub mod codec;
pub mod protocol;
pub mod replay;
pub mod serve;
pub mod worker;

pub use codec::CodecError;
pub use protocol::{FrameResponse, Request, Response};
pub use worker::FrameWorker;
