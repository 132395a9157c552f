//! Coordinate and math types shared across the renderer, input and callers.
//!
//! Canonical drawing space (normalized coordinates):
//! - origin at the window center
//! - +X right, +Y up
//! - nominal range [-1, 1] on both axes, not clamped
//!
//! Pointer input arrives in logical pixels (top-left origin, +Y down) and is
//! converted by `input::InputTracker`.

mod color;
mod mat4;
mod norm;
mod viewport;

pub use color::ColorRgba;
pub use mat4::Mat4;
pub use norm::NormPoint;
pub use viewport::Viewport;
