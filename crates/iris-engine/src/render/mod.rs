//! Rendering.
//!
//! Drawing space is normalized coordinates: origin at the window center, +Y up,
//! `[-1, 1]` across the window. Draw calls are recorded on a [`Canvas`] and
//! replayed on the GPU by the [`Renderer`] at the end of each frame.

pub mod geometry;
pub mod shader;

mod canvas;
mod layout;
mod renderer;
mod resources;
mod texture;

pub use canvas::{Canvas, DrawCall, FrameState};
pub use layout::{LayoutId, Topology, VertexAttribute, VertexLayout};
pub use renderer::{Renderer, RendererConfig};
pub use shader::{ProgramId, ShaderError, ShaderProgram};
pub use texture::{TextureError, TextureId, TextureImage, TextureRef};
