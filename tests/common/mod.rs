#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use image::{ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use vision_overlay::config::Config;
use vision_overlay::handlers::{router, AppState};

/// One recorded annotate call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub feature: String,
    pub api_key: Option<String>,
}

#[derive(Clone, Default)]
struct FakeState {
    responses: Arc<HashMap<String, Value>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    /// Base64 content whose calls are delayed.
    slow_content: Option<String>,
    slow_delay: Duration,
}

/// In-process stand-in for the annotate endpoint.
pub struct FakeVision {
    pub url: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl FakeVision {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn features(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.feature).collect()
    }
}

pub struct FakeVisionBuilder {
    responses: HashMap<String, Value>,
    slow_content: Option<String>,
    slow_delay: Duration,
}

impl FakeVisionBuilder {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            slow_content: None,
            slow_delay: Duration::ZERO,
        }
    }

    /// Response body for one feature type, e.g. `LANDMARK_DETECTION`.
    pub fn respond(mut self, feature: &str, response: Value) -> Self {
        self.responses.insert(feature.to_string(), response);
        self
    }

    /// Delays every call carrying exactly these image bytes.
    pub fn slow_for(mut self, image: &[u8], delay: Duration) -> Self {
        use base64::Engine as _;
        self.slow_content = Some(base64::engine::general_purpose::STANDARD.encode(image));
        self.slow_delay = delay;
        self
    }

    pub async fn spawn(self) -> FakeVision {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            responses: Arc::new(self.responses),
            calls: calls.clone(),
            slow_content: self.slow_content,
            slow_delay: self.slow_delay,
        };
        // The annotate path contains a colon, so it is matched by hand.
        let app = Router::new().fallback(annotate).with_state(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        FakeVision {
            url: format!("http://{addr}"),
            calls,
        }
    }
}

async fn annotate(
    State(state): State<FakeState>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if !uri.path().ends_with("/v1/images:annotate") {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "no route"})));
    }
    let request = &body["requests"][0];
    let feature = request["features"][0]["type"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    state.calls.lock().unwrap().push(RecordedCall {
        feature: feature.clone(),
        api_key: query.get("key").cloned(),
    });

    if state.slow_content.as_deref() == request["image"]["content"].as_str() {
        tokio::time::sleep(state.slow_delay).await;
    }

    let response = state
        .responses
        .get(&feature)
        .cloned()
        .unwrap_or_else(|| json!({}));
    (StatusCode::OK, Json(json!({ "responses": [response] })))
}

/// Starts the service against `vision_url` and returns its base URL.
pub async fn spawn_app(vision_url: &str) -> String {
    let config = Config {
        vision_api_url: vision_url.to_string(),
        vision_api_key: Some("test-key".to_string()),
        vision_timeout_secs: 5,
        thumbnail_size: 32,
        ..Config::default()
    };
    let state = Arc::new(AppState::new(config).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

/// PNG with a horizontal gradient; `seed` makes otherwise identical fixtures differ.
pub fn png_fixture(width: u32, height: u32, seed: u8) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, seed])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

pub fn upload_form(image: Vec<u8>, fields: &[(&str, &str)]) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(image)
        .file_name("upload.png")
        .mime_str("image/png")
        .unwrap();
    fields
        .iter()
        .fold(reqwest::multipart::Form::new().part("file", part), |form, (k, v)| {
            form.text(k.to_string(), v.to_string())
        })
}
