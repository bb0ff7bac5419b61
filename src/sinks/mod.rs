//! Sink implementations

pub mod console;
pub mod file;
pub mod memory;

pub use console::ConsoleSink;
pub use file::{FileRotationPolicy, RotatingFileSink};
pub use memory::MemorySink;

pub use crate::core::Sink;
