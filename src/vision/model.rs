/// Wire types for the `images:annotate` REST endpoint.
///
/// Only the fields the service reads are modelled; everything is optional on
/// the wire and defaults when absent.

use crate::geometry::BoundingPoly;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

/// Detection feature requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    FaceDetection,
    ObjectLocalization,
    LogoDetection,
    LandmarkDetection,
    LabelDetection,
    TextDetection,
    ImageProperties,
    SafeSearchDetection,
    WebDetection,
}

/// Page-level category. Each maps to one primary feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Faces,
    Objects,
    Logos,
    Landmarks,
    Labels,
    Text,
    Colors,
    SafeSearch,
    Web,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Faces,
        Category::Objects,
        Category::Logos,
        Category::Landmarks,
        Category::Labels,
        Category::Text,
        Category::Colors,
        Category::SafeSearch,
        Category::Web,
    ];

    /// Parses the URL path segment used by the HTTP routes.
    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.segment().eq_ignore_ascii_case(segment.trim()))
    }

    pub fn segment(self) -> &'static str {
        match self {
            Category::Faces => "faces",
            Category::Objects => "objects",
            Category::Logos => "logos",
            Category::Landmarks => "landmarks",
            Category::Labels => "labels",
            Category::Text => "ocr",
            Category::Colors => "colors",
            Category::SafeSearch => "safe",
            Category::Web => "web",
        }
    }

    pub fn feature(self) -> Feature {
        match self {
            Category::Faces => Feature::FaceDetection,
            Category::Objects => Feature::ObjectLocalization,
            Category::Logos => Feature::LogoDetection,
            Category::Landmarks => Feature::LandmarkDetection,
            Category::Labels => Feature::LabelDetection,
            Category::Text => Feature::TextDetection,
            Category::Colors => Feature::ImageProperties,
            Category::SafeSearch => Feature::SafeSearchDetection,
            Category::Web => Feature::WebDetection,
        }
    }

    /// Whether an empty primary result triggers the web + label fallback.
    pub fn has_fallback(self) -> bool {
        matches!(self, Category::Landmarks)
    }
}

/// Five-level ordinal used for qualitative detections.
///
/// `Unknown` sorts lowest; any unrecognised wire string maps to it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum Likelihood {
    #[default]
    Unknown,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

impl Likelihood {
    pub fn label(self) -> &'static str {
        match self {
            Likelihood::Unknown => "Unknown",
            Likelihood::VeryUnlikely => "Very unlikely",
            Likelihood::Unlikely => "Unlikely",
            Likelihood::Possible => "Possible",
            Likelihood::Likely => "Likely",
            Likelihood::VeryLikely => "Very likely",
        }
    }

    /// At least `Likely`.
    pub fn is_probable(self) -> bool {
        self >= Likelihood::Likely
    }
}

impl From<String> for Likelihood {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "VERY_UNLIKELY" => Likelihood::VeryUnlikely,
            "UNLIKELY" => Likelihood::Unlikely,
            "POSSIBLE" => Likelihood::Possible,
            "LIKELY" => Likelihood::Likely,
            "VERY_LIKELY" => Likelihood::VeryLikely,
            _ => Likelihood::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnotateRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnotateImageRequest {
    pub image: ImageContent,
    pub features: Vec<FeatureRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageContent {
    /// Base64-encoded image bytes.
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRequest {
    #[serde(rename = "type")]
    pub feature: Feature,
    pub max_results: u32,
}

impl AnnotateRequest {
    pub fn single(image: &[u8], feature: Feature, max_results: u32) -> Self {
        Self {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: general_purpose::STANDARD.encode(image),
                },
                features: vec![FeatureRequest {
                    feature,
                    max_results,
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BatchAnnotateResponse {
    pub responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotateImageResponse {
    pub face_annotations: Vec<FaceAnnotation>,
    pub landmark_annotations: Vec<EntityAnnotation>,
    pub logo_annotations: Vec<EntityAnnotation>,
    pub label_annotations: Vec<EntityAnnotation>,
    pub text_annotations: Vec<EntityAnnotation>,
    pub localized_object_annotations: Vec<LocalizedObjectAnnotation>,
    pub safe_search_annotation: Option<SafeSearchAnnotation>,
    pub image_properties_annotation: Option<ImageProperties>,
    pub web_detection: Option<WebDetection>,
    pub error: Option<Status>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityAnnotation {
    pub description: Option<String>,
    pub score: Option<f32>,
    pub bounding_poly: Option<BoundingPoly>,
    pub locations: Vec<LocationInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationInfo {
    pub lat_lng: Option<LatLng>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct LatLng {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaceAnnotation {
    pub bounding_poly: Option<BoundingPoly>,
    pub detection_confidence: Option<f32>,
    pub joy_likelihood: Likelihood,
    pub sorrow_likelihood: Likelihood,
    pub anger_likelihood: Likelihood,
    pub surprise_likelihood: Likelihood,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalizedObjectAnnotation {
    pub name: Option<String>,
    pub score: Option<f32>,
    pub bounding_poly: Option<BoundingPoly>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SafeSearchAnnotation {
    pub adult: Likelihood,
    pub spoof: Likelihood,
    pub medical: Likelihood,
    pub violence: Likelihood,
    pub racy: Likelihood,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProperties {
    pub dominant_colors: Option<DominantColors>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DominantColors {
    pub colors: Vec<ColorInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorInfo {
    pub color: Option<Color>,
    pub score: Option<f32>,
    pub pixel_fraction: Option<f32>,
}

/// Channels are floats in [0, 255] on the wire.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct Color {
    pub red: Option<f32>,
    pub green: Option<f32>,
    pub blue: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebDetection {
    pub web_entities: Vec<WebEntity>,
    pub full_matching_images: Vec<WebImage>,
    pub partial_matching_images: Vec<WebImage>,
    pub visually_similar_images: Vec<WebImage>,
    pub pages_with_matching_images: Vec<WebPage>,
    pub best_guess_labels: Vec<WebLabel>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebEntity {
    pub score: Option<f32>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebImage {
    pub url: Option<String>,
    pub score: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebPage {
    pub url: Option<String>,
    pub page_title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebLabel {
    pub label: Option<String>,
}

/// Per-image error status embedded in an otherwise successful response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Status {
    pub code: Option<i32>,
    pub message: Option<String>,
}

impl Status {
    pub fn is_error(&self) -> bool {
        self.code.unwrap_or(0) != 0 || self.message.as_deref().is_some_and(|m| !m.is_empty())
    }
}
