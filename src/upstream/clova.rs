/// Blocking client for the CLOVA general OCR endpoint (V2 message format).
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use serde_json::json;
use tracing::{debug, warn};

use super::{OcrField, OcrResponse, OcrService, UpstreamError};
use crate::config::OcrConfig;

const SERVICE: &str = "clova-ocr";
const SECRET_HEADER: &str = "X-OCR-SECRET";
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct ClovaOcrClient {
    url: Option<String>,
    secret: Option<String>,
}

impl ClovaOcrClient {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            url: config.url.clone().filter(|u| !u.is_empty()),
            secret: config.secret.clone().filter(|s| !s.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.secret.is_some()
    }

    fn request_message() -> serde_json::Value {
        let now = chrono::Utc::now().timestamp_millis();
        json!({
            "version": "V2",
            "requestId": format!("inbody-{now}"),
            "timestamp": now,
            "images": [{ "format": "jpg", "name": "inbody" }],
        })
    }
}

fn request_error(e: reqwest::Error) -> UpstreamError {
    UpstreamError::Request {
        service: SERVICE,
        message: e.to_string(),
    }
}

impl OcrService for ClovaOcrClient {
    fn recognize(&self, image: &[u8]) -> Result<Vec<OcrField>, UpstreamError> {
        let (Some(url), Some(secret)) = (&self.url, &self.secret) else {
            return Err(UpstreamError::NotConfigured {
                service: SERVICE,
                hint: "set NAVER_CLOVA_OCR_URL and NAVER_CLOVA_OCR_SECRET",
            });
        };

        let file = Part::bytes(image.to_vec())
            .file_name("inbody.jpg")
            .mime_str("image/jpeg")
            .map_err(request_error)?;
        let form = Form::new()
            .text("message", Self::request_message().to_string())
            .part("file", file);

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(request_error)?;

        debug!("sending {} bytes to {SERVICE}", image.len());
        let resp = client
            .post(url)
            .header(SECRET_HEADER, secret)
            .multipart(form)
            .send()
            .map_err(request_error)?;

        if !resp.status().is_success() {
            warn!("{SERVICE} responded with {}", resp.status());
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: resp.status().as_u16(),
            });
        }

        let body: OcrResponse = resp.json().map_err(|e| UpstreamError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })?;

        Ok(body.into_fields())
    }
}
