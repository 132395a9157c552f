use std::fmt;
use std::num::NonZeroU32;

/// Handle to a texture created through the renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(NonZeroU32);

impl TextureId {
    pub(crate) fn from_index(index: NonZeroU32) -> Self {
        Self(index)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "texture#{}", self.0)
    }
}

/// A texture as it was when a draw referenced it: the handle plus the
/// upload generation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureRef {
    pub id: TextureId,
    pub generation: u64,
}

impl fmt::Display for TextureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.generation)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    #[error("{0} does not exist")]
    Unknown(TextureId),

    #[error("texture size {width}x{height} has a zero dimension")]
    ZeroSize { width: u32, height: u32 },

    #[error("texture size {width}x{height} exceeds the device limit of {max}")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("expected {expected} bytes of RGB data, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// CPU copy of a texture's last upload, stored as tightly packed RGBA8 rows.
///
/// Rows are in upload order, top row first. The textured fragment shader
/// samples at `1 - v`, so row 0 lands on the top edge of the quad.
#[derive(Debug, Clone, Default)]
pub struct TextureImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    generation: u64,
}

impl TextureImage {
    /// An image that has never been uploaded to (0x0, generation 0).
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rgba.is_empty()
    }

    /// Number of completed uploads.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// RGBA value at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = 4 * (y as usize * self.width as usize + x as usize);
        self.rgba.get(i..i + 4).and_then(|p| p.try_into().ok())
    }

    /// Replaces the image with `width * height` packed RGB pixels.
    ///
    /// Alpha is set to 255. On error the previous contents stay untouched.
    pub fn upload_rgb(&mut self, rgb: &[u8], width: u32, height: u32) -> Result<(), TextureError> {
        check_rgb(rgb, width, height)?;

        self.rgba.clear();
        self.rgba.reserve(width as usize * height as usize * 4);
        for px in rgb.chunks_exact(3) {
            self.rgba.extend_from_slice(&[px[0], px[1], px[2], u8::MAX]);
        }
        self.width = width;
        self.height = height;
        self.generation += 1;
        Ok(())
    }
}

pub(crate) fn check_rgb(rgb: &[u8], width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroSize { width, height });
    }
    let expected = width as usize * height as usize * 3;
    if rgb.len() != expected {
        return Err(TextureError::LengthMismatch {
            expected,
            actual: rgb.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_expands_rgb_to_opaque_rgba() {
        let mut img = TextureImage::empty();
        img.upload_rgb(&[255, 0, 0, 0, 255, 0], 2, 1).unwrap();
        assert_eq!(img.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(img.pixel(1, 0), Some([0, 255, 0, 255]));
        assert_eq!(img.pixel(2, 0), None);
        assert_eq!(img.generation(), 1);
    }

    #[test]
    fn rejected_upload_keeps_previous_image() {
        let mut img = TextureImage::empty();
        img.upload_rgb(&[1, 2, 3], 1, 1).unwrap();

        assert_eq!(
            img.upload_rgb(&[0; 5], 1, 2),
            Err(TextureError::LengthMismatch { expected: 6, actual: 5 })
        );
        assert_eq!(img.upload_rgb(&[], 0, 4), Err(TextureError::ZeroSize { width: 0, height: 4 }));

        assert_eq!(img.pixel(0, 0), Some([1, 2, 3, 255]));
        assert_eq!(img.generation(), 1);
    }

    #[test]
    fn resize_replaces_dimensions() {
        let mut img = TextureImage::empty();
        img.upload_rgb(&[0; 12], 2, 2).unwrap();
        img.upload_rgb(&[9; 3 * 8], 4, 2).unwrap();
        assert_eq!((img.width(), img.height()), (4, 2));
        assert_eq!(img.pixel(3, 1), Some([9, 9, 9, 255]));
    }
}
