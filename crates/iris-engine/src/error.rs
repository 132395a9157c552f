//! Library error types.

pub use crate::render::shader::ShaderError;
pub use crate::render::TextureError;
pub use crate::window::WindowError;

/// Failure to construct or drive a [`Renderer`](crate::render::Renderer).
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error(transparent)]
    Window(#[from] WindowError),

    /// Adapter, device or surface setup failed.
    #[error("GPU initialization failed: {0:#}")]
    Gpu(anyhow::Error),

    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// The surface reported an unrecoverable error (out of memory).
    #[error("surface lost beyond recovery")]
    SurfaceFatal,
}
