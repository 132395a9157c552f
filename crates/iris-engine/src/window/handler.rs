use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Fullscreen, Window, WindowId};

use crate::input::platform::winit::translate_pointer_event;
use crate::input::{PointerEvent, SharedPointer};

use super::WindowError;

/// Window creation parameters.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    /// Logical size of a windowed window. Ignored in fullscreen.
    pub width: u32,
    pub height: u32,
    /// Borderless fullscreen on the primary monitor, at its current video mode size.
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "iris".to_string(),
            width: 800,
            height: 600,
            fullscreen: false,
        }
    }
}

/// Receives winit events for the single window.
///
/// Creates the window on the first `resumed`, then only records what the
/// renderer needs: the close flag, the latest resize and the pointer position.
pub struct WindowEvents {
    config: WindowConfig,
    pointer: SharedPointer,

    window: Option<Window>,
    window_id: Option<WindowId>,
    error: Option<WindowError>,

    /// Logical size the window was created with.
    size: (u32, u32),
    scale_factor: f64,
    resized: Option<PhysicalSize<u32>>,
    close_requested: bool,
}

impl WindowEvents {
    pub fn new(config: WindowConfig, pointer: SharedPointer) -> Self {
        let size = (config.width, config.height);
        Self {
            config,
            pointer,
            window: None,
            window_id: None,
            error: None,
            size,
            scale_factor: 1.0,
            resized: None,
            close_requested: false,
        }
    }

    pub(super) fn take_window(&mut self) -> Option<Window> {
        self.window.take()
    }

    pub(super) fn take_error(&mut self) -> Option<WindowError> {
        self.error.take()
    }

    pub(super) fn request_close(&mut self) {
        self.close_requested = true;
    }

    #[inline]
    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Logical size chosen at creation (the monitor size in fullscreen).
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Latest physical size reported since the last call, if any.
    pub fn take_resize(&mut self) -> Option<PhysicalSize<u32>> {
        self.resized.take()
    }

    fn create(&mut self, event_loop: &ActiveEventLoop) -> Result<Window, WindowError> {
        let mut attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        if self.config.fullscreen {
            match event_loop.primary_monitor() {
                Some(monitor) => {
                    let logical: LogicalSize<u32> = monitor.size().to_logical(monitor.scale_factor());
                    log::debug!(
                        "fullscreen on {} at {}x{}",
                        monitor.name().unwrap_or_else(|| "primary monitor".into()),
                        logical.width,
                        logical.height
                    );
                    self.size = (logical.width, logical.height);
                    attrs = attrs
                        .with_inner_size(monitor.size())
                        .with_fullscreen(Some(Fullscreen::Borderless(Some(monitor))));
                }
                None => log::warn!("no primary monitor reported; opening a window instead"),
            }
        }

        let window = event_loop.create_window(attrs)?;
        self.scale_factor = window.scale_factor();
        log::info!(
            "window created: \"{}\" {}x{} (scale {:.2})",
            self.config.title,
            self.size.0,
            self.size.1,
            self.scale_factor
        );
        Ok(window)
    }
}

impl ApplicationHandler for WindowEvents {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window_id.is_some() || self.error.is_some() {
            return;
        }

        match self.create(event_loop) {
            Ok(window) => {
                self.window_id = Some(window.id());
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("{e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.window_id != Some(window_id) {
            return;
        }

        if let Some(pe) = translate_pointer_event(self.scale_factor, &event) {
            // The last-known position survives the pointer leaving the window.
            if let PointerEvent::Moved { x, y } = pe {
                self.pointer.set(x, y);
            }
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                log::info!("window close requested");
                self.close_requested = true;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.resized = Some(size);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
            }
            _ => {}
        }
    }
}
