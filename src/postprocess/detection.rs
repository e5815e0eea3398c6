/// Per-category conversion of annotate responses into detections.
///
/// Geometry goes through `geometry::normalize`; a region that fails to
/// normalize is dropped (debug log) while label and score stay listed.

use serde::Serialize;

use crate::geometry::{
    normalize, BoundingPoly, CanonicalRegion, NaturalImageDimensions, RawRegion,
};
use crate::vision::model::{
    AnnotateImageResponse, Category, EntityAnnotation, Likelihood, SafeSearchAnnotation,
    WebDetection, WebImage,
};

#[derive(Debug, Clone, Serialize)]
pub struct Detection {
    pub label: String,
    pub score: f32,
    /// `None` when the service gave no usable geometry.
    pub region: Option<CanonicalRegion>,
    #[serde(skip_serializing_if = "DetectionDetails::is_none")]
    pub details: DetectionDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectionDetails {
    #[default]
    None,
    Face {
        joy: LikelihoodReading,
        sorrow: LikelihoodReading,
        anger: LikelihoodReading,
        surprise: LikelihoodReading,
    },
    Landmark {
        locations: Vec<GeoLocation>,
    },
    Color {
        red: u8,
        green: u8,
        blue: u8,
        pixel_fraction: f32,
    },
}

impl DetectionDetails {
    pub fn is_none(&self) -> bool {
        matches!(self, DetectionDetails::None)
    }
}

/// A likelihood alongside the text shown for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikelihoodReading {
    pub level: Likelihood,
    pub label: &'static str,
}

impl From<Likelihood> for LikelihoodReading {
    fn from(level: Likelihood) -> Self {
        Self {
            level,
            label: level.label(),
        }
    }
}

/// Safe-search verdicts. `flagged` is set when adult, violence or racy
/// content is at least likely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SafeSearchReport {
    pub adult: LikelihoodReading,
    pub spoof: LikelihoodReading,
    pub medical: LikelihoodReading,
    pub violence: LikelihoodReading,
    pub racy: LikelihoodReading,
    pub flagged: bool,
}

impl From<SafeSearchAnnotation> for SafeSearchReport {
    fn from(safe: SafeSearchAnnotation) -> Self {
        Self {
            adult: safe.adult.into(),
            spoof: safe.spoof.into(),
            medical: safe.medical.into(),
            violence: safe.violence.into(),
            racy: safe.racy.into(),
            flagged: [safe.adult, safe.violence, safe.racy]
                .into_iter()
                .any(Likelihood::is_probable),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Category-level result that is not a list of regions.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Summary {
    Text { full_text: String },
    SafeSearch(SafeSearchReport),
    Web(WebMatches),
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WebMatches {
    pub best_guess_labels: Vec<String>,
    pub full_matching_images: Vec<String>,
    pub partial_matching_images: Vec<String>,
    pub visually_similar_images: Vec<String>,
    pub pages: Vec<MatchingPage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchingPage {
    pub url: String,
    pub title: Option<String>,
}

/// Converts one annotate response for `category` into detections.
pub fn extract_detections(
    category: Category,
    response: &AnnotateImageResponse,
    natural: NaturalImageDimensions,
) -> (Vec<Detection>, Option<Summary>) {
    match category {
        Category::Faces => {
            let detections = response
                .face_annotations
                .iter()
                .enumerate()
                .map(|(i, face)| Detection {
                    label: format!("Face {}", i + 1),
                    score: face.detection_confidence.unwrap_or(0.0),
                    region: region_of(face.bounding_poly.as_ref(), RawRegion::Box, natural),
                    details: DetectionDetails::Face {
                        joy: face.joy_likelihood.into(),
                        sorrow: face.sorrow_likelihood.into(),
                        anger: face.anger_likelihood.into(),
                        surprise: face.surprise_likelihood.into(),
                    },
                })
                .collect();
            (detections, None)
        }
        Category::Objects => {
            let detections = response
                .localized_object_annotations
                .iter()
                .map(|obj| Detection {
                    label: obj.name.clone().unwrap_or_default(),
                    score: obj.score.unwrap_or(0.0),
                    region: region_of(obj.bounding_poly.as_ref(), RawRegion::Box, natural),
                    details: DetectionDetails::None,
                })
                .collect();
            (detections, None)
        }
        Category::Landmarks => {
            let detections = response
                .landmark_annotations
                .iter()
                .map(|lm| Detection {
                    details: DetectionDetails::Landmark {
                        locations: geo_locations(lm),
                    },
                    ..entity(lm, RawRegion::Box, natural)
                })
                .collect();
            (detections, None)
        }
        Category::Logos => {
            let detections = response
                .logo_annotations
                .iter()
                .map(|logo| entity(logo, RawRegion::Polygon, natural))
                .collect();
            (detections, None)
        }
        Category::Labels => {
            let detections = response
                .label_annotations
                .iter()
                .map(|label| Detection {
                    label: label.description.clone().unwrap_or_default(),
                    score: label.score.unwrap_or(0.0),
                    region: None,
                    details: DetectionDetails::None,
                })
                .collect();
            (detections, None)
        }
        Category::Text => {
            // First annotation is the whole text block, the rest are words.
            let mut annotations = response.text_annotations.iter();
            let summary = annotations.next().map(|full| Summary::Text {
                full_text: full.description.clone().unwrap_or_default(),
            });
            let detections = annotations
                .map(|word| entity(word, RawRegion::Polygon, natural))
                .collect();
            (detections, summary)
        }
        Category::Colors => {
            let colors = response
                .image_properties_annotation
                .as_ref()
                .and_then(|p| p.dominant_colors.as_ref())
                .map(|d| d.colors.as_slice())
                .unwrap_or_default();
            let detections = colors
                .iter()
                .map(|info| {
                    let color = info.color.unwrap_or_default();
                    let (red, green, blue) = (
                        channel(color.red),
                        channel(color.green),
                        channel(color.blue),
                    );
                    Detection {
                        label: format!("rgb({red}, {green}, {blue})"),
                        score: info.score.unwrap_or(0.0),
                        region: None,
                        details: DetectionDetails::Color {
                            red,
                            green,
                            blue,
                            pixel_fraction: info.pixel_fraction.unwrap_or(0.0),
                        },
                    }
                })
                .collect();
            (detections, None)
        }
        Category::SafeSearch => {
            let summary = response
                .safe_search_annotation
                .map(|safe| Summary::SafeSearch(safe.into()));
            (Vec::new(), summary)
        }
        Category::Web => match &response.web_detection {
            Some(web) => {
                let detections = web
                    .web_entities
                    .iter()
                    .filter_map(|e| {
                        let label = e.description.as_deref().filter(|d| !d.is_empty())?;
                        Some(Detection {
                            label: label.to_string(),
                            score: e.score.unwrap_or(0.0),
                            region: None,
                            details: DetectionDetails::None,
                        })
                    })
                    .collect();
                (detections, Some(Summary::Web(web_matches(web))))
            }
            None => (Vec::new(), None),
        },
    }
}

fn entity(
    annotation: &EntityAnnotation,
    kind: fn(BoundingPoly) -> RawRegion,
    natural: NaturalImageDimensions,
) -> Detection {
    Detection {
        label: annotation.description.clone().unwrap_or_default(),
        score: annotation.score.unwrap_or(0.0),
        region: region_of(annotation.bounding_poly.as_ref(), kind, natural),
        details: DetectionDetails::None,
    }
}

fn region_of(
    poly: Option<&BoundingPoly>,
    kind: fn(BoundingPoly) -> RawRegion,
    natural: NaturalImageDimensions,
) -> Option<CanonicalRegion> {
    let raw = kind(poly?.clone());
    match normalize(&raw, natural) {
        Ok(region) => Some(region),
        Err(e) => {
            tracing::debug!(error = %e, "dropping malformed region");
            None
        }
    }
}

fn geo_locations(annotation: &EntityAnnotation) -> Vec<GeoLocation> {
    annotation
        .locations
        .iter()
        .filter_map(|loc| {
            let lat_lng = loc.lat_lng?;
            Some(GeoLocation {
                latitude: lat_lng.latitude?,
                longitude: lat_lng.longitude?,
            })
        })
        .collect()
}

fn channel(value: Option<f32>) -> u8 {
    value.unwrap_or(0.0).round().clamp(0.0, 255.0) as u8
}

fn web_matches(web: &WebDetection) -> WebMatches {
    let urls = |images: &[WebImage]| -> Vec<String> {
        images.iter().filter_map(|i| i.url.clone()).collect()
    };
    WebMatches {
        best_guess_labels: web
            .best_guess_labels
            .iter()
            .filter_map(|l| l.label.clone())
            .filter(|l| !l.is_empty())
            .collect(),
        full_matching_images: urls(&web.full_matching_images),
        partial_matching_images: urls(&web.partial_matching_images),
        visually_similar_images: urls(&web.visually_similar_images),
        pages: web
            .pages_with_matching_images
            .iter()
            .filter_map(|p| {
                Some(MatchingPage {
                    url: p.url.clone()?,
                    title: p.page_title.clone().filter(|t| !t.is_empty()),
                })
            })
            .collect(),
    }
}
