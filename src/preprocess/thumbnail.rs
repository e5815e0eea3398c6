/// Per-detection thumbnails: cover-fit crops encoded as JPEG data URLs.
///
/// The output square is always filled; the region is scaled by the larger of
/// the two axis ratios and centred, so the overflowing axis is cropped evenly
/// on both sides.

use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use fast_image_resize as fr;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use serde::Serialize;

use super::decode::DecodedImage;
use crate::error::AppError;
use crate::geometry::Rect;
use crate::postprocess::Detection;

/// Placement of a `region_w × region_h` region drawn into a `size × size` square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverPlacement {
    pub scale: f64,
    pub draw_width: f64,
    pub draw_height: f64,
    /// Horizontal draw offset; zero or negative.
    pub dx: f64,
    /// Vertical draw offset; zero or negative.
    pub dy: f64,
}

impl CoverPlacement {
    /// `None` for empty regions or a zero output size.
    pub fn compute(region_w: f64, region_h: f64, size: u32) -> Option<Self> {
        if !(region_w > 0.0 && region_h > 0.0) || size == 0 {
            return None;
        }
        let size = size as f64;
        let scale = (size / region_w).max(size / region_h);
        let draw_width = region_w * scale;
        let draw_height = region_h * scale;
        Some(Self {
            scale,
            draw_width,
            draw_height,
            dx: (size - draw_width) / 2.0,
            dy: (size - draw_height) / 2.0,
        })
    }

    /// The part of `region` that ends up inside the square, in source pixels.
    pub fn visible_source(&self, region: &Rect) -> Rect {
        let side_x = (self.draw_width + 2.0 * self.dx) / self.scale;
        let side_y = (self.draw_height + 2.0 * self.dy) / self.scale;
        Rect::new(
            region.x - self.dx / self.scale,
            region.y - self.dy / self.scale,
            side_x,
            side_y,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
    pub size: u32,
    /// `data:image/jpeg;base64,...`
    pub data_url: String,
}

/// Thumbnail slot for one detection; `None` means show a placeholder.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionThumbnail {
    pub index: usize,
    pub thumbnail: Option<Thumbnail>,
}

/// Crops `region` out of `img` and encodes a `size × size` JPEG thumbnail.
///
/// Regions with a non-positive side yield `Ok(None)`.
pub fn extract_thumbnail(
    region: &Rect,
    img: &DecodedImage,
    size: u32,
    quality: u8,
) -> Result<Option<Thumbnail>, AppError> {
    let Some(placement) = CoverPlacement::compute(region.width, region.height, size) else {
        return Ok(None);
    };
    let source = clamp_to_image(placement.visible_source(region), img);
    if !(source.width > 0.0 && source.height > 0.0) {
        return Ok(None);
    }

    let pixels = resize_crop(img, &source, size)?;

    let mut jpeg = Cursor::new(Vec::with_capacity((size * size) as usize / 2));
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode(&pixels, size, size, ExtendedColorType::Rgb8)
        .map_err(|e| AppError::Thumbnail(format!("JPEG encode: {e}")))?;

    let data_url = format!(
        "data:image/jpeg;base64,{}",
        general_purpose::STANDARD.encode(jpeg.into_inner())
    );
    Ok(Some(Thumbnail { size, data_url }))
}

/// Thumbnails for every detection, in detection order.
///
/// Only called once the bitmap is decoded and the region set is final.
/// A failing region is logged and gets a placeholder; the rest still render.
pub fn extract_all(
    detections: &[Detection],
    img: &DecodedImage,
    size: u32,
    quality: u8,
) -> Vec<DetectionThumbnail> {
    detections
        .iter()
        .enumerate()
        .map(|(index, detection)| {
            let thumbnail = match &detection.region {
                Some(region) => extract_thumbnail(&region.bounds(), img, size, quality)
                    .unwrap_or_else(|e| {
                        tracing::warn!(index, label = %detection.label, error = %e, "thumbnail failed");
                        None
                    }),
                None => None,
            };
            DetectionThumbnail { index, thumbnail }
        })
        .collect()
}

fn clamp_to_image(rect: Rect, img: &DecodedImage) -> Rect {
    let max_w = img.width as f64;
    let max_h = img.height as f64;
    let left = rect.x.clamp(0.0, max_w);
    let top = rect.y.clamp(0.0, max_h);
    let right = rect.right().clamp(left, max_w);
    let bottom = rect.bottom().clamp(top, max_h);
    Rect::new(left, top, right - left, bottom - top)
}

/// Bilinear crop-and-resize of the RGB source window using fast_image_resize.
fn resize_crop(img: &DecodedImage, source: &Rect, size: u32) -> Result<Vec<u8>, AppError> {
    let src_image = fr::images::ImageRef::new(img.width, img.height, &img.data, fr::PixelType::U8x3)
        .map_err(|e| AppError::Thumbnail(format!("source image: {e}")))?;

    let mut dst_image = fr::images::Image::new(size, size, fr::PixelType::U8x3);

    let options = fr::ResizeOptions::new()
        .resize_alg(fr::ResizeAlg::Interpolation(fr::FilterType::Bilinear))
        .crop(source.x, source.y, source.width, source.height);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| AppError::Thumbnail(format!("resize: {e}")))?;

    Ok(dst_image.into_vec())
}
