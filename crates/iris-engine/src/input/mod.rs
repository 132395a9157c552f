//! Pointer input.
//!
//! The public API does not expose winit types. The window backend translates
//! platform events (`platform::winit`) and writes the pointer position into a
//! `SharedPointer`; an `InputTracker` reads it back in normalized coordinates.

pub(crate) mod platform;
mod tracker;

pub use tracker::{normalize, InputTracker, PointerSource, SharedPointer};

/// Pointer event, in logical pixels relative to the window's top-left corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PointerEvent {
    Moved { x: f64, y: f64 },
    Left,
}
