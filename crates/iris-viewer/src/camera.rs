use anyhow::{Context, Result};
use image::RgbImage;
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
    Camera,
};

/// An open webcam stream producing RGB frames.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Opens camera `index` and starts streaming, asking for the format
    /// closest to `width x height` at 30 fps.
    pub fn open(index: u32, width: u32, height: u32) -> Result<Self> {
        let fmt = CameraFormat::new(Resolution::new(width, height), FrameFormat::YUYV, 30);
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(CameraIndex::Index(index), req)
            .with_context(|| format!("failed to create camera {index}"))?;
        cam.open_stream()
            .with_context(|| format!("failed to open stream of camera {index}"))?;

        // The device may settle on a different resolution than requested.
        let actual = cam.resolution();
        log::info!(
            "camera {index} opened: {}x{} ({})",
            actual.width(),
            actual.height(),
            cam.info().human_name()
        );

        Ok(Self {
            cam,
            width: actual.width(),
            height: actual.height(),
        })
    }

    /// Blocks until the next frame arrives and decodes it to RGB.
    pub fn next_frame(&mut self) -> Result<RgbImage> {
        let frame = self.cam.frame().context("failed to fetch camera frame")?;
        let img = frame
            .decode_image::<RgbFormat>()
            .context("failed to decode camera frame")?;
        anyhow::ensure!(img.width() > 0 && img.height() > 0, "camera returned an empty frame");
        Ok(img)
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        if let Err(e) = self.cam.stop_stream() {
            log::warn!("failed to stop camera stream: {e}");
        }
    }
}
