use std::time::Duration;

use winit::event_loop::EventLoop;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::Window;

use super::{WindowConfig, WindowError, WindowEvents};

/// Attempts at getting a `resumed` event before giving up on window creation.
const READY_ATTEMPTS: u32 = 200;
const READY_POLL: Duration = Duration::from_millis(10);

/// Lifecycle object around the process-wide event loop.
///
/// Constructing a second `Backend` in the same process fails: winit refuses
/// to recreate its event loop, even after the first one is dropped.
pub struct Backend {
    event_loop: EventLoop<()>,
    exited: bool,
}

impl Backend {
    pub fn new() -> Result<Self, WindowError> {
        let event_loop = EventLoop::new()?;
        log::debug!("windowing backend initialized");
        Ok(Self {
            event_loop,
            exited: false,
        })
    }

    /// Pumps events until the handler has created its window, then hands the window out.
    pub fn create_window(&mut self, events: &mut WindowEvents) -> Result<Window, WindowError> {
        for _ in 0..READY_ATTEMPTS {
            self.pump(events, Some(READY_POLL));

            if let Some(err) = events.take_error() {
                return Err(err);
            }
            if let Some(window) = events.take_window() {
                return Ok(window);
            }
            if self.exited {
                break;
            }
        }
        Err(WindowError::NotReady)
    }

    /// Dispatches pending events to `events`, waiting at most `timeout` for new ones.
    ///
    /// `Some(Duration::ZERO)` drains without blocking. Returns `false` once the
    /// event loop has exited; later calls do nothing.
    pub fn pump(&mut self, events: &mut WindowEvents, timeout: Option<Duration>) -> bool {
        if self.exited {
            return false;
        }

        if let PumpStatus::Exit(code) = self.event_loop.pump_app_events(timeout, events) {
            log::debug!("event loop exited with code {code}");
            self.exited = true;
            events.request_close();
        }
        !self.exited
    }

    #[inline]
    pub fn has_exited(&self) -> bool {
        self.exited
    }
}
