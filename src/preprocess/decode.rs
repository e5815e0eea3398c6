/// Image decoding into RGB8 via the image crate, plus a header-only dimension read.

use std::io::Cursor;

use crate::geometry::NaturalImageDimensions;

pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// RGB pixel data, row-major, 3 bytes per pixel
    pub data: Vec<u8>,
}

impl DecodedImage {
    pub fn dimensions(&self) -> NaturalImageDimensions {
        NaturalImageDimensions::new(self.width, self.height)
    }
}

/// Decode image bytes into RGB pixel data.
pub fn decode_image(data: &[u8]) -> Result<DecodedImage, String> {
    let img = image::load_from_memory(data).map_err(|e| format!("Image decode: {e}"))?;
    let rgb = img.to_rgb8();
    let width = rgb.width();
    let height = rgb.height();
    if width == 0 || height == 0 {
        return Err("Image decode: empty image".to_string());
    }
    Ok(DecodedImage {
        width,
        height,
        data: rgb.into_raw(),
    })
}

/// Reads natural dimensions from the header without decoding pixels.
pub fn read_dimensions(data: &[u8]) -> Result<NaturalImageDimensions, String> {
    let (width, height) = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| format!("Image header: {e}"))?
        .into_dimensions()
        .map_err(|e| format!("Image header: {e}"))?;
    if width == 0 || height == 0 {
        return Err("Image header: empty image".to_string());
    }
    Ok(NaturalImageDimensions::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 128]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn decodes_png_to_rgb() {
        let decoded = decode_image(&encoded(7, 5, ImageFormat::Png)).unwrap();
        assert_eq!(decoded.dimensions(), NaturalImageDimensions::new(7, 5));
        assert_eq!(decoded.data.len(), 7 * 5 * 3);
        // pixel (3, 2)
        let idx = (2 * 7 + 3) * 3;
        assert_eq!(&decoded.data[idx..idx + 3], &[3, 2, 128]);
    }

    #[test]
    fn decodes_jpeg() {
        let decoded = decode_image(&encoded(32, 16, ImageFormat::Jpeg)).unwrap();
        assert_eq!((decoded.width, decoded.height), (32, 16));
    }

    #[test]
    fn header_dimensions_match_decode() {
        let bytes = encoded(41, 23, ImageFormat::Png);
        let from_header = read_dimensions(&bytes).unwrap();
        assert_eq!(from_header, decode_image(&bytes).unwrap().dimensions());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_image(b"definitely not an image").is_err());
        assert!(read_dimensions(b"definitely not an image").is_err());
    }

    #[test]
    fn truncated_body_reads_header_but_fails_decode() {
        let bytes = encoded(64, 64, ImageFormat::Png);
        let truncated = &bytes[..60];
        assert_eq!(
            read_dimensions(truncated).unwrap(),
            NaturalImageDimensions::new(64, 64)
        );
        assert!(decode_image(truncated).is_err());
    }
}
