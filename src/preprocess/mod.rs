pub mod decode;
pub mod thumbnail;

pub use decode::{decode_image, read_dimensions, DecodedImage};
pub use thumbnail::{extract_all, extract_thumbnail, CoverPlacement, DetectionThumbnail, Thumbnail};
