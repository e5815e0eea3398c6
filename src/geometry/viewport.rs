/// "Contain" fit of an image inside a display container.
///
/// Recomputed by callers whenever the container measurement or the image
/// changes; the result is only a transform, no pixels are touched.

use super::region::{NaturalImageDimensions, Point};
use serde::{Deserialize, Serialize};

/// Measured size of the element the image is displayed in, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A container that has not been laid out yet (or reports garbage).
    pub fn is_unmeasured(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Natural-to-container transform for a contained image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub rendered_width: f64,
    pub rendered_height: f64,
    /// False until both the image and the container have been measured.
    pub ready: bool,
}

impl ViewportTransform {
    fn unmeasured(natural: NaturalImageDimensions) -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            rendered_width: natural.width as f64,
            rendered_height: natural.height as f64,
            ready: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Maps a natural-space point into container space.
    pub fn apply(&self, point: Point) -> Point {
        Point {
            x: point.x * self.scale + self.offset_x,
            y: point.y * self.scale + self.offset_y,
        }
    }
}

/// Computes the rendered rectangle of `natural` contained in `container`.
///
/// Letterboxing happens on one axis only: a relatively wider image fills the
/// container width and is centred vertically, otherwise it fills the height
/// and is centred horizontally. Unmeasured inputs give `scale = 1`, zero
/// offsets and `ready = false`; callers must not draw with that transform.
pub fn fit(natural: NaturalImageDimensions, container: ContainerSize) -> ViewportTransform {
    if natural.is_empty() || container.is_unmeasured() {
        return ViewportTransform::unmeasured(natural);
    }

    let natural_w = natural.width as f64;
    let natural_h = natural.height as f64;
    let image_aspect = natural_w / natural_h;
    let container_aspect = container.width / container.height;

    if image_aspect > container_aspect {
        let rendered_width = container.width;
        let scale = rendered_width / natural_w;
        let rendered_height = natural_h * scale;
        ViewportTransform {
            scale,
            offset_x: 0.0,
            offset_y: (container.height - rendered_height) / 2.0,
            rendered_width,
            rendered_height,
            ready: true,
        }
    } else {
        let rendered_height = container.height;
        let scale = rendered_height / natural_h;
        let rendered_width = natural_w * scale;
        ViewportTransform {
            scale,
            offset_x: (container.width - rendered_width) / 2.0,
            offset_y: 0.0,
            rendered_width,
            rendered_height,
            ready: true,
        }
    }
}
