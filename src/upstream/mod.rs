/// External recognition services and their payloads.
///
/// The OCR and vision-labeling services sit behind [`OcrService`] and
/// [`VisionService`]. Their failures surface as [`UpstreamError`] and are
/// returned untouched; no extraction or matching runs after one.
pub mod clova;
pub mod google;
pub mod recorded;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by an upstream recognition service.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("{service} is not configured: {hint}")]
    NotConfigured {
        service: &'static str,
        hint: &'static str,
    },

    #[error("request to {service} failed: {message}")]
    Request {
        service: &'static str,
        message: String,
    },

    #[error("{service} returned status {status}")]
    Status { service: &'static str, status: u16 },

    #[error("could not decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

// ── OCR payload ──────────────────────────────────────────────────────

/// One recognized text field.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OcrField {
    #[serde(default)]
    pub infer_text: String,
    #[serde(default)]
    pub infer_confidence: f32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OcrImage {
    #[serde(default)]
    pub fields: Vec<OcrField>,
}

/// V2 general OCR response. Only the fields the extractor reads are kept.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OcrResponse {
    #[serde(default)]
    pub images: Vec<OcrImage>,
}

impl OcrResponse {
    /// Fields of the first image, in reading order.
    pub fn into_fields(self) -> Vec<OcrField> {
        self.images
            .into_iter()
            .next()
            .map(|img| img.fields)
            .unwrap_or_default()
    }
}

// ── Vision payload ───────────────────────────────────────────────────

/// Whole-image label.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LabelAnnotation {
    pub description: String,
    #[serde(default)]
    pub score: f64,
}

/// Localized object label.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ObjectAnnotation {
    pub name: String,
    #[serde(default)]
    pub score: f64,
}

/// Label detection plus object localization for one image.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionAnnotations {
    #[serde(default)]
    pub label_annotations: Vec<LabelAnnotation>,
    #[serde(default)]
    pub localized_object_annotations: Vec<ObjectAnnotation>,
}

// ── Service traits ───────────────────────────────────────────────────

/// Text recognition over an image.
///
/// Implementations must be `Send + Sync` so one client can serve
/// concurrent requests behind `Arc`.
pub trait OcrService: Send + Sync {
    /// Recognize text fields in reading order.
    fn recognize(&self, image: &[u8]) -> Result<Vec<OcrField>, UpstreamError>;
}

/// Image labeling.
pub trait VisionService: Send + Sync {
    fn annotate(&self, image: &[u8]) -> Result<VisionAnnotations, UpstreamError>;
}
