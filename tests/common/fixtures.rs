//! Image and listing fixtures

use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// Solid-color image of the given size, encoded in `format`
pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
    let mut bytes = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(image)
        .to_rgb8()
        .write_to(&mut bytes, format)
        .expect("encoding a solid image should not fail");
    bytes.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, ImageFormat::Jpeg)
}

/// Listing body pointing at `/thumbs/<id>.<ext>` on `base`
///
/// Photo "3" carries no thumbnail URL and must be skipped.
pub fn listing_json(base: &str) -> String {
    format!(
        r#"{{
  "photos": {{
    "page": 1,
    "pages": 1,
    "perpage": 100,
    "photo": [
      {{"id": "1", "title": "first", "url_s": "{base}/thumbs/1.png"}},
      {{"id": "2", "title": "second", "url_s": "{base}/thumbs/2.jpg"}},
      {{"id": "3", "title": "no size s"}},
      {{"id": "4", "title": "fourth", "url_s": "{base}/thumbs/4.png"}}
    ]
  }},
  "stat": "ok"
}}"#
    )
}
