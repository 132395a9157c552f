//! iris engine crate.
//!
//! Window + GPU runtime and a small immediate-mode drawing API: flat circles,
//! textured quads and streamed texture updates, driven one frame at a time by
//! the caller's loop.

pub mod coords;
pub mod device;
pub mod error;
pub mod input;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;

pub use error::RendererError;
pub use render::{Renderer, RendererConfig};
