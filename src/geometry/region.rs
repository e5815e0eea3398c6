/// Region normalization: raw detection geometry into natural-pixel space.
///
/// The detection service reports bounding polygons either in source pixels or
/// normalized to [0, 1] relative to the image size. Projection and thumbnail
/// extraction only ever see the canonical form produced here.

use serde::{Deserialize, Serialize};

/// Smallest side a canonical region may have, in natural pixels.
pub const MIN_REGION_SIDE: f64 = 1.0;

/// Source-pixel size of the loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaturalImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl NaturalImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Wire vertex. Either coordinate may be omitted by the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    fn resolve(&self) -> Point {
        Point {
            x: self.x.unwrap_or(0.0),
            y: self.y.unwrap_or(0.0),
        }
    }
}

/// Wire bounding polygon; both encodings may be present at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingPoly {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
    #[serde(default)]
    pub normalized_vertices: Vec<Vertex>,
}

impl BoundingPoly {
    pub fn from_pixels(points: &[(f64, f64)]) -> Self {
        Self {
            vertices: points.iter().map(|&(x, y)| Vertex::new(x, y)).collect(),
            normalized_vertices: Vec::new(),
        }
    }

    pub fn from_normalized(points: &[(f64, f64)]) -> Self {
        Self {
            vertices: Vec::new(),
            normalized_vertices: points.iter().map(|&(x, y)| Vertex::new(x, y)).collect(),
        }
    }

    /// Points in natural pixels. Normalized vertices win when present.
    fn natural_points(&self, natural: NaturalImageDimensions) -> Vec<Point> {
        if !self.normalized_vertices.is_empty() {
            let w = natural.width as f64;
            let h = natural.height as f64;
            self.normalized_vertices
                .iter()
                .map(Vertex::resolve)
                .map(|p| Point { x: p.x * w, y: p.y * h })
                .collect()
        } else {
            self.vertices.iter().map(Vertex::resolve).collect()
        }
    }
}

/// Raw detection geometry, tagged by how it should be interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRegion {
    /// Axis-aligned box: exactly 4 vertices ordered top-left, top-right,
    /// bottom-right, bottom-left.
    Box(BoundingPoly),
    /// Freehand outline with at least 3 vertices.
    Polygon(BoundingPoly),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn clamp_to(self, natural: NaturalImageDimensions) -> Point {
        Point {
            x: self.x.clamp(0.0, natural.width as f64),
            y: self.y.clamp(0.0, natural.height as f64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True min/max bounds over all points.
    pub fn bounding(points: &[Point]) -> Option<Rect> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Clamps into the image and grows degenerate sides to `MIN_REGION_SIDE`.
    fn clamp_to(self, natural: NaturalImageDimensions) -> Rect {
        let max_w = natural.width as f64;
        let max_h = natural.height as f64;

        let left = self.x.clamp(0.0, max_w);
        let top = self.y.clamp(0.0, max_h);
        let right = self.right().clamp(left, max_w);
        let bottom = self.bottom().clamp(top, max_h);

        let (x, width) = expand_axis(left, right - left, max_w);
        let (y, height) = expand_axis(top, bottom - top, max_h);
        Rect::new(x, y, width, height)
    }
}

fn expand_axis(start: f64, len: f64, limit: f64) -> (f64, f64) {
    if len >= MIN_REGION_SIDE {
        return (start, len);
    }
    let len = MIN_REGION_SIDE.min(limit);
    (start.min(limit - len), len)
}

/// Detection geometry in natural-pixel space.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanonicalRegion {
    Rect(Rect),
    Polygon { points: Vec<Point>, bounds: Rect },
}

impl CanonicalRegion {
    /// Axis-aligned bounds, used for captions and thumbnails.
    pub fn bounds(&self) -> Rect {
        match self {
            CanonicalRegion::Rect(rect) => *rect,
            CanonicalRegion::Polygon { bounds, .. } => *bounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    #[error("region has {found} vertices, at least {needed} required")]
    TooFewVertices { found: usize, needed: usize },
    #[error("box vertices are not ordered top-left, top-right, bottom-right, bottom-left")]
    OutOfOrder,
    #[error("natural image dimensions are empty")]
    EmptyImage,
}

/// Resolves a raw region into natural-pixel space.
///
/// Boxes take `x`/`y` from the first vertex, width from the second and height
/// from the third, so vertex order matters; a box whose top-right lies left of
/// its top-left (or whose bottom lies above its top) is rejected as
/// `OutOfOrder` rather than producing a negative box. Polygons keep every
/// point and get min/max bounds.
pub fn normalize(
    raw: &RawRegion,
    natural: NaturalImageDimensions,
) -> Result<CanonicalRegion, RegionError> {
    if natural.is_empty() {
        return Err(RegionError::EmptyImage);
    }

    match raw {
        RawRegion::Box(poly) => {
            let points = poly.natural_points(natural);
            if points.len() < 4 {
                return Err(RegionError::TooFewVertices {
                    found: points.len(),
                    needed: 4,
                });
            }
            let width = points[1].x - points[0].x;
            let height = points[2].y - points[0].y;
            if width < 0.0 || height < 0.0 {
                return Err(RegionError::OutOfOrder);
            }
            let rect = Rect::new(points[0].x, points[0].y, width, height);
            Ok(CanonicalRegion::Rect(rect.clamp_to(natural)))
        }
        RawRegion::Polygon(poly) => {
            let points: Vec<Point> = poly
                .natural_points(natural)
                .into_iter()
                .map(|p| p.clamp_to(natural))
                .collect();
            if points.len() < 3 {
                return Err(RegionError::TooFewVertices {
                    found: points.len(),
                    needed: 3,
                });
            }
            let bounds = Rect::bounding(&points)
                .ok_or(RegionError::TooFewVertices { found: 0, needed: 3 })?
                .clamp_to(natural);
            Ok(CanonicalRegion::Polygon { points, bounds })
        }
    }
}
