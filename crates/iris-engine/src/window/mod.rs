//! Windowing backend.
//!
//! Owns the winit `EventLoop` (one per process) and the single window. The
//! loop is driven by the caller through `Backend::pump` instead of
//! `run_app`, so the application keeps its own frame loop.

mod backend;
mod handler;

pub use backend::Backend;
pub use handler::{WindowConfig, WindowEvents};

/// Failure to bring up the windowing backend or its window.
#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    /// The event loop could not be created; winit allows one per process.
    #[error("failed to initialize the windowing backend")]
    Backend(#[from] winit::error::EventLoopError),

    #[error("failed to create window")]
    Create(#[from] winit::error::OsError),

    /// The backend never delivered a `resumed` event to create the window in.
    #[error("windowing backend did not become ready")]
    NotReady,
}
