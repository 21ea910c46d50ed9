mod core;
mod stroke;

pub use core::SessionState;
