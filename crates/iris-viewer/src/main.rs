mod camera;
mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use iris_engine::logging::{init_logging, LoggingConfig};
use iris_engine::{Renderer, RendererConfig};

use camera::CameraCapture;
use cli::Args;

const CURSOR_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut renderer = Renderer::new(RendererConfig {
        title: args.title,
        width: args.width,
        height: args.height,
        fullscreen: !args.windowed,
        shader_dir: args.shader_dir,
        ..RendererConfig::default()
    })
    .context("failed to initialize the renderer")?;

    let mut camera = CameraCapture::open(args.camera, args.capture_width, args.capture_height)
        .context("could not open camera")?;
    let frame_tex = renderer.create_texture();

    let [r, g, b, a] = CURSOR_COLOR;

    while !renderer.window_should_close() {
        renderer.begin_frame();

        match camera.next_frame() {
            Ok(frame) => {
                let (w, h) = frame.dimensions();
                match renderer.update_texture(frame_tex, frame.as_raw(), w, h) {
                    Ok(()) => {
                        renderer.draw_quad(0.0, 0.0, 1.0, 1.0, frame_tex);

                        let p = renderer.pointer_position();
                        renderer.draw_circle(p.x, p.y, args.cursor_radius, r, g, b, a);
                    }
                    Err(e) => log::warn!("dropping camera frame: {e}"),
                }
            }
            Err(e) => log::warn!("{e:#}"),
        }

        renderer.end_frame()?;
    }

    let (w, h) = camera.resolution();
    log::info!("window closed; camera was streaming at {w}x{h}");
    Ok(())
}
