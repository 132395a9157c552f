//! GPU device + surface management.
//!
//! Owns the wgpu Instance/Adapter/Device/Queue, configures the window surface
//! and hands out per-frame encoders. Pipelines and resources live in `render`.

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
