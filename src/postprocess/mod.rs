pub mod detection;

pub use detection::{
    extract_detections, Detection, DetectionDetails, GeoLocation, LikelihoodReading,
    MatchingPage, SafeSearchReport, Summary, WebMatches,
};
