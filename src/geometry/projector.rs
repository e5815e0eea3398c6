/// Natural-space regions into container-space overlay instructions.

use serde::Serialize;

use super::region::{CanonicalRegion, NaturalImageDimensions, Point, Rect};
use super::viewport::{fit, ContainerSize, ViewportTransform};
use crate::postprocess::Detection;

/// Vertical space reserved for a caption above its region.
pub const CAPTION_GAP: f64 = 22.0;

/// Region in container pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScreenRegion {
    Rect(Rect),
    Polygon { points: Vec<Point> },
}

impl ScreenRegion {
    pub fn bounds(&self) -> Rect {
        match self {
            ScreenRegion::Rect(rect) => *rect,
            ScreenRegion::Polygon { points } => {
                Rect::bounding(points).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0))
            }
        }
    }
}

/// Maps a canonical region through `transform`; polygon point order is kept.
pub fn project(region: &CanonicalRegion, transform: &ViewportTransform) -> ScreenRegion {
    match region {
        CanonicalRegion::Rect(rect) => {
            let origin = transform.apply(Point::new(rect.x, rect.y));
            ScreenRegion::Rect(Rect::new(
                origin.x,
                origin.y,
                rect.width * transform.scale,
                rect.height * transform.scale,
            ))
        }
        CanonicalRegion::Polygon { points, .. } => ScreenRegion::Polygon {
            points: points.iter().map(|&p| transform.apply(p)).collect(),
        },
    }
}

/// Caption position `gap` pixels above the region, kept inside the container's top-left.
pub fn caption_anchor(screen: &ScreenRegion, gap: f64) -> Point {
    let bounds = screen.bounds();
    Point::new(bounds.x.max(0.0), (bounds.y - gap).max(0.0))
}

/// Confidence bucket used to colour a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    VeryLow,
    Low,
    Medium,
    High,
}

impl ScoreTier {
    pub fn from_score(score: f32) -> Self {
        if score >= 0.85 {
            ScoreTier::High
        } else if score >= 0.6 {
            ScoreTier::Medium
        } else if score >= 0.3 {
            ScoreTier::Low
        } else {
            ScoreTier::VeryLow
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlayItem {
    /// Position of the detection in the envelope's primary list.
    pub index: usize,
    pub label: String,
    pub caption_text: String,
    pub score: f32,
    pub tier: ScoreTier,
    pub shape: ScreenRegion,
    pub caption: Point,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Overlay {
    /// Container not measured yet; nothing may be drawn.
    NotReady,
    Ready {
        transform: ViewportTransform,
        items: Vec<OverlayItem>,
    },
}

impl Overlay {
    pub fn items(&self) -> &[OverlayItem] {
        match self {
            Overlay::NotReady => &[],
            Overlay::Ready { items, .. } => items,
        }
    }
}

/// `"<label> • <score%>"` with one decimal.
pub fn caption_text(label: &str, score: f32) -> String {
    format!("{label} • {:.1}%", score * 100.0)
}

/// Builds draw instructions for every detection that has a region.
///
/// Cheap enough to rerun on every container resize.
pub fn build_overlay(
    detections: &[Detection],
    natural: NaturalImageDimensions,
    container: ContainerSize,
) -> Overlay {
    let transform = fit(natural, container);
    if !transform.is_ready() {
        return Overlay::NotReady;
    }

    let items = detections
        .iter()
        .enumerate()
        .filter_map(|(index, detection)| {
            let region = detection.region.as_ref()?;
            let shape = project(region, &transform);
            let caption = caption_anchor(&shape, CAPTION_GAP);
            Some(OverlayItem {
                index,
                label: detection.label.clone(),
                caption_text: caption_text(&detection.label, detection.score),
                score: detection.score,
                tier: ScoreTier::from_score(detection.score),
                shape,
                caption,
            })
        })
        .collect();

    Overlay::Ready { transform, items }
}
