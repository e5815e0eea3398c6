/// REST client for the `images:annotate` endpoint.

use std::time::Duration;

use reqwest::Client;

use super::model::{AnnotateImageResponse, AnnotateRequest, BatchAnnotateResponse, Feature};
use crate::config::Config;
use crate::error::AppError;
use crate::resolution::DetectionBackend;

#[derive(Clone)]
pub struct VisionClient {
    base_url: String,
    api_key: Option<String>,
    access_token: Option<String>,
    max_results: u32,
    client: Client,
}

impl VisionClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.vision_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.vision_api_url.trim_end_matches('/').to_string(),
            api_key: config.vision_api_key.clone(),
            access_token: config.vision_access_token.clone(),
            max_results: config.vision_max_results,
            client,
        })
    }

    /// Runs one feature against one image.
    ///
    /// Non-success status and per-image error objects are both errors.
    pub async fn annotate_image(
        &self,
        image: &[u8],
        feature: Feature,
    ) -> Result<AnnotateImageResponse, AppError> {
        let url = format!("{base_url}/v1/images:annotate", base_url = self.base_url);
        let body = AnnotateRequest::single(image, feature, self.max_results);

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::VisionApi(format!("{feature:?} request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::VisionApi(format!(
                "{feature:?} failed ({status}): {text}"
            )));
        }

        let batch: BatchAnnotateResponse = response
            .json()
            .await
            .map_err(|e| AppError::VisionApi(format!("Failed to parse {feature:?} response: {e}")))?;

        let first = batch.responses.into_iter().next().unwrap_or_default();
        if let Some(status) = first.error.as_ref().filter(|s| s.is_error()) {
            return Err(AppError::VisionApi(
                status
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("{feature:?} returned error code {:?}", status.code)),
            ));
        }

        tracing::debug!(?feature, "annotate call succeeded");
        Ok(first)
    }
}

impl DetectionBackend for VisionClient {
    async fn annotate(
        &self,
        image: &[u8],
        feature: Feature,
    ) -> Result<AnnotateImageResponse, AppError> {
        self.annotate_image(image, feature).await
    }
}
