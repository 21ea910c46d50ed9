//! Library exports for luxdraw subsystems.
//!
//! Exposes the session core (gesture state machine, ink canvas, recognition
//! pipeline) alongside configuration and the thin transport layer so that
//! other front ends can drive sessions and share validation logic with the
//! main binary.

pub mod compositor;
pub mod config;
pub mod draw;
pub mod input;
pub mod recognition;
pub mod session;
pub mod tracking;
pub mod transport;
pub mod util;

pub use config::Config;
pub use session::Session;
