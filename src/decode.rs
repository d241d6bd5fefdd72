//! Image decoding for fetched thumbnail bytes

use crate::error::DecodeError;
use image::RgbaImage;
use std::fmt;

/// A decoded, display-ready thumbnail (RGBA8)
///
/// Produced by the worker and moved into the listener on delivery.
#[derive(Clone, PartialEq, Eq)]
pub struct Thumbnail {
    image: RgbaImage,
}

impl Thumbnail {
    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrow the pixel buffer
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    /// Take ownership of the pixel buffer
    pub fn into_rgba(self) -> RgbaImage {
        self.image
    }
}

impl From<RgbaImage> for Thumbnail {
    fn from(image: RgbaImage) -> Self {
        Self { image }
    }
}

impl fmt::Debug for Thumbnail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thumbnail")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Decode `bytes` into a [`Thumbnail`]
///
/// The format is sniffed from the data, not taken from the URL. When
/// `max_dimension` is set and either side is larger, the image is scaled
/// down preserving aspect ratio.
pub fn decode_thumbnail(
    bytes: &[u8],
    max_dimension: Option<u32>,
) -> std::result::Result<Thumbnail, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::Empty);
    }

    let format = image::guess_format(bytes).map_err(|_| DecodeError::UnsupportedFormat)?;
    let decoded = image::load_from_memory_with_format(bytes, format)?;

    let decoded = match max_dimension {
        Some(max) if decoded.width() > max || decoded.height() > max => {
            decoded.thumbnail(max, max)
        }
        _ => decoded,
    };

    Ok(Thumbnail::from(decoded.into_rgba8()))
}

/// Encode a solid-color PNG, for tests that need real image bytes
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 255]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("png encode");
    buf.into_inner()
}
