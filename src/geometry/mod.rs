/// Detection geometry: normalization, viewport fit and overlay projection.

pub mod projector;
pub mod region;
pub mod viewport;

pub use projector::{
    build_overlay, caption_anchor, caption_text, project, Overlay, OverlayItem, ScoreTier,
    ScreenRegion, CAPTION_GAP,
};
pub use region::{
    normalize, BoundingPoly, CanonicalRegion, NaturalImageDimensions, Point, RawRegion, Rect,
    RegionError, Vertex, MIN_REGION_SIDE,
};
pub use viewport::{fit, ContainerSize, ViewportTransform};
