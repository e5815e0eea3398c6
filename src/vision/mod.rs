pub mod client;
pub mod model;

pub use client::VisionClient;
pub use model::{AnnotateImageResponse, Category, Feature, Likelihood};
