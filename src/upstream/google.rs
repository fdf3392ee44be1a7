/// Blocking client for the Cloud Vision `images:annotate` endpoint.
///
/// One request carries both label detection and object localization for the
/// same image. Authentication is by API key.
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{UpstreamError, VisionAnnotations, VisionService};
use crate::config::VisionApiConfig;

const SERVICE: &str = "google-vision";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Per-image error embedded in an otherwise successful batch response.
#[derive(Debug, Deserialize)]
struct ImageError {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(flatten)]
    annotations: VisionAnnotations,
    error: Option<ImageError>,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

pub struct GoogleVisionClient {
    endpoint: String,
    api_key: Option<String>,
    max_results: usize,
}

impl GoogleVisionClient {
    pub fn new(config: &VisionApiConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            max_results: config.max_results,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && !self.endpoint.is_empty()
    }

    fn request_body(&self, image: &[u8]) -> serde_json::Value {
        json!({
            "requests": [{
                "image": { "content": STANDARD.encode(image) },
                "features": [
                    { "type": "LABEL_DETECTION", "maxResults": self.max_results },
                    { "type": "OBJECT_LOCALIZATION", "maxResults": self.max_results },
                ],
            }]
        })
    }
}

fn request_error(e: reqwest::Error) -> UpstreamError {
    UpstreamError::Request {
        service: SERVICE,
        message: e.to_string(),
    }
}

/// First image of a batch response; an embedded error fails the call.
fn first_annotations(body: AnnotateResponse) -> Result<VisionAnnotations, UpstreamError> {
    let Some(first) = body.responses.into_iter().next() else {
        return Ok(VisionAnnotations::default());
    };
    if let Some(err) = first.error {
        return Err(UpstreamError::Request {
            service: SERVICE,
            message: format!("code {}: {}", err.code, err.message),
        });
    }
    Ok(first.annotations)
}

impl VisionService for GoogleVisionClient {
    fn annotate(&self, image: &[u8]) -> Result<VisionAnnotations, UpstreamError> {
        let Some(key) = &self.api_key else {
            return Err(UpstreamError::NotConfigured {
                service: SERVICE,
                hint: "set GOOGLE_VISION_API_KEY",
            });
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(request_error)?;

        debug!("sending {} bytes to {SERVICE}", image.len());
        let resp = client
            .post(&self.endpoint)
            .query(&[("key", key)])
            .json(&self.request_body(image))
            .send()
            .map_err(request_error)?;

        if !resp.status().is_success() {
            warn!("{SERVICE} responded with {}", resp.status());
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: resp.status().as_u16(),
            });
        }

        let body: AnnotateResponse = resp.json().map_err(|e| UpstreamError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;

        first_annotations(body)
    }
}
