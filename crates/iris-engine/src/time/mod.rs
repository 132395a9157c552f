//! Frame timing.
//!
//! - `FrameClock`: clamped delta time and a frame counter, ticked once per presented frame
//! - `FramePacer`: monotonic per-frame deadline used to cap the loop near a target rate

mod frame_clock;
mod pacer;

pub use frame_clock::{FrameClock, FrameTime};
pub use pacer::{FramePacer, DEFAULT_FRAME_INTERVAL};
