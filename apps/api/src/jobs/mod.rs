//! Job description library: parsed JDs stored for reuse.

pub mod handlers;
