/// Vision annotation service: detection geometry, overlay projection,
/// thumbnails and fallback resolution in front of an image-annotation API.

pub mod config;
pub mod error;
pub mod geometry;
pub mod handlers;
pub mod postprocess;
pub mod preprocess;
pub mod resolution;
pub mod vision;
