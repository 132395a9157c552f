use std::path::PathBuf;

use clap::Parser;

/// Live webcam feed with a circle that follows the mouse.
#[derive(Debug, Parser)]
#[command(name = "iris", version, about)]
pub struct Args {
    /// Camera device index.
    #[arg(long, default_value_t = 0)]
    pub camera: u32,

    /// Requested capture width; the camera picks the closest supported format.
    #[arg(long, default_value_t = 640)]
    pub capture_width: u32,

    /// Requested capture height.
    #[arg(long, default_value_t = 480)]
    pub capture_height: u32,

    /// Window width in logical pixels (windowed mode only).
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Window height in logical pixels (windowed mode only).
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Open a regular window instead of fullscreen on the primary monitor.
    #[arg(long)]
    pub windowed: bool,

    #[arg(long, default_value = "iris")]
    pub title: String,

    /// Directory containing the WGSL shader programs.
    #[arg(long, default_value = "shaders")]
    pub shader_dir: PathBuf,

    /// Cursor circle radius in normalized units.
    #[arg(long, default_value_t = 0.02)]
    pub cursor_radius: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_viewer() {
        let args = Args::parse_from(["iris"]);
        assert_eq!(args.camera, 0);
        assert_eq!((args.width, args.height), (800, 600));
        assert!(!args.windowed);
        assert_eq!(args.shader_dir, PathBuf::from("shaders"));
        assert_eq!(args.cursor_radius, 0.02);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from(["iris", "--camera", "2", "--windowed", "--cursor-radius", "0.1"]);
        assert_eq!(args.camera, 2);
        assert!(args.windowed);
        assert_eq!(args.cursor_radius, 0.1);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
