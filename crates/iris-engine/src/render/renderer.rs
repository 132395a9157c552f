use std::path::PathBuf;
use std::time::Duration;

use ouroboros::self_referencing;
use winit::window::Window;

use crate::coords::NormPoint;
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::error::RendererError;
use crate::input::{InputTracker, SharedPointer};
use crate::time::{FrameClock, FramePacer, DEFAULT_FRAME_INTERVAL};
use crate::window::{Backend, WindowConfig, WindowEvents};

use super::canvas::{Canvas, FrameState};
use super::resources::GpuResources;
use super::shader::ShaderProgram;
use super::texture::{TextureError, TextureId};

/// Renderer construction parameters.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub title: String,
    /// Logical window size. Fullscreen uses the primary monitor's size instead.
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    /// Directory holding `vertex.wgsl`, `fragment.wgsl`,
    /// `textured_vertex.wgsl` and `textured_fragment.wgsl`.
    pub shader_dir: PathBuf,
    pub gpu: GpuInit,
    /// Minimum time between the starts of two frames.
    pub frame_interval: Duration,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            title: "iris".to_string(),
            width: 800,
            height: 600,
            fullscreen: false,
            shader_dir: PathBuf::from("shaders"),
            gpu: GpuInit::default(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

#[self_referencing]
struct WindowTarget {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Immediate-mode renderer for one window.
///
/// Every frame is `begin_frame`, any number of draws, then `end_frame`. Draws
/// are recorded by the inner [`Canvas`] and replayed on the GPU at
/// `end_frame`. Only one renderer can exist per process.
///
/// Building a `Renderer` needs a window and a GPU, so its tests run on the
/// [`Canvas`] instead. That includes teardown: the after-`destroy` behavior of
/// `end_frame`, `window_should_close` and the draw calls is the canvas'
/// `FrameState::Destroyed` handling, exercised by `Canvas::destroy`'s tests and
/// `tests/frame.rs`.
pub struct Renderer {
    canvas: Canvas,
    input: InputTracker<SharedPointer>,

    // Teardown order: GPU resources, then the window target, then the backend.
    resources: Option<GpuResources>,
    target: Option<WindowTarget>,
    events: WindowEvents,
    backend: Option<Backend>,

    clock: FrameClock,
    pacer: FramePacer,
}

impl Renderer {
    /// Creates the window, the GPU context and both built-in programs.
    pub fn new(config: RendererConfig) -> Result<Self, RendererError> {
        let RendererConfig {
            title,
            width,
            height,
            fullscreen,
            shader_dir,
            gpu,
            frame_interval,
        } = config;

        let mut backend = Backend::new()?;

        let pointer = SharedPointer::new();
        let mut events = WindowEvents::new(
            WindowConfig {
                title,
                width,
                height,
                fullscreen,
            },
            pointer.clone(),
        );
        let window = backend.create_window(&mut events)?;
        let (width, height) = events.size();

        let target = WindowTarget::try_new(window, |w| pollster::block_on(Gpu::new(w, gpu)))
            .map_err(RendererError::Gpu)?;

        let flat = ShaderProgram::from_files(
            shader_dir.join("vertex.wgsl"),
            shader_dir.join("fragment.wgsl"),
        )?;
        let textured = ShaderProgram::from_files(
            shader_dir.join("textured_vertex.wgsl"),
            shader_dir.join("textured_fragment.wgsl"),
        )?;
        log::info!("shader programs linked: {}, {}", flat.id(), textured.id());

        let canvas = Canvas::new(width, height, flat, textured);
        let resources = target.with_gpu(|gpu| GpuResources::new(gpu, &canvas));

        Ok(Self {
            canvas,
            input: InputTracker::new(pointer, width, height),
            resources: Some(resources),
            target: Some(target),
            events,
            backend: Some(backend),
            clock: FrameClock::new(),
            pacer: FramePacer::new(frame_interval),
        })
    }

    /// The recording half, for inspection.
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn input(&self) -> &InputTracker<SharedPointer> {
        &self.input
    }

    /// Pointer position in normalized coordinates.
    pub fn pointer_position(&self) -> NormPoint {
        self.input.position()
    }

    pub fn window_should_close(&self) -> bool {
        self.is_destroyed()
            || self.events.close_requested()
            || self.backend.as_ref().is_none_or(Backend::has_exited)
    }

    fn is_destroyed(&self) -> bool {
        self.canvas.state() == FrameState::Destroyed
    }

    /// Drains pending window events, then opens a frame cleared to opaque black.
    pub fn begin_frame(&mut self) {
        if !self.is_destroyed() {
            self.pump(Some(Duration::ZERO));
            self.pacer.start();
        }
        self.canvas.begin_frame();
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_circle(&mut self, x: f32, y: f32, radius: f32, r: f32, g: f32, b: f32, a: f32) {
        self.canvas.draw_circle(x, y, radius, r, g, b, a);
    }

    pub fn draw_quad(&mut self, x: f32, y: f32, w: f32, h: f32, texture: TextureId) {
        self.canvas.draw_quad(x, y, w, h, texture);
    }

    pub fn create_texture(&mut self) -> TextureId {
        self.canvas.create_texture()
    }

    /// Replaces a texture with `width * height` packed RGB pixels.
    pub fn update_texture(
        &mut self,
        id: TextureId,
        rgb: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(), TextureError> {
        if let Some(target) = &self.target {
            let max = target.with_gpu(|gpu| gpu.max_texture_dimension());
            if width > max || height > max {
                return Err(TextureError::TooLarge { width, height, max });
            }
        }
        self.canvas.update_texture(id, rgb, width, height)
    }

    /// Renders the recorded draws, presents, and waits out the rest of the frame interval.
    ///
    /// Transient surface errors skip the frame. Without an open frame this does nothing.
    pub fn end_frame(&mut self) -> Result<(), RendererError> {
        if !self.canvas.end_frame() {
            return Ok(());
        }

        let (Some(target), Some(resources)) = (self.target.as_mut(), self.resources.as_mut()) else {
            return Ok(());
        };
        let canvas = &self.canvas;

        target.with_gpu_mut(|gpu| {
            let size = gpu.size();
            if size.width == 0 || size.height == 0 {
                return Ok(());
            }

            resources.prepare(gpu, canvas);

            match gpu.begin_frame() {
                Ok(mut frame) => {
                    resources.encode(&mut frame.encoder, &frame.view, canvas);
                    gpu.present(frame);
                    Ok(())
                }
                Err(err) => match gpu.handle_surface_error(err.clone()) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface error: {err}");
                        Err(RendererError::SurfaceFatal)
                    }
                    action => {
                        log::debug!("surface error: {err}; {action:?}");
                        Ok(())
                    }
                },
            }
        })?;

        self.clock.tick();
        self.pace();
        Ok(())
    }

    /// Waits for window events until the frame deadline passes.
    fn pace(&mut self) {
        loop {
            let remaining = self.pacer.remaining();
            if remaining.is_zero() || self.window_should_close() {
                break;
            }
            self.pump(Some(remaining));
        }
    }

    fn pump(&mut self, timeout: Option<Duration>) {
        let Some(backend) = self.backend.as_mut() else { return };
        backend.pump(&mut self.events, timeout);

        if let Some(size) = self.events.take_resize()
            && let Some(target) = self.target.as_mut()
        {
            target.with_gpu_mut(|gpu| gpu.resize(size));
        }
    }

    /// Releases everything: programs, textures, GPU resources, the GPU context,
    /// the window and finally the windowing backend. Safe to call twice.
    ///
    /// Afterwards `window_should_close` is true and `end_frame` returns `Ok`
    /// without rendering.
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }

        if let Some(mut resources) = self.resources.take() {
            resources.release();
        }
        self.canvas.destroy();
        // The GPU context borrows the window and drops with it, first.
        self.target = None;
        self.backend = None;

        log::info!("renderer destroyed");
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.destroy();
    }
}
