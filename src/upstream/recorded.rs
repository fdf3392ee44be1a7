/// Services that replay previously captured responses.
///
/// Used by the CLI to process saved payloads offline and by tests.
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::{OcrField, OcrResponse, OcrService, UpstreamError, VisionAnnotations, VisionService};

pub struct RecordedOcr {
    fields: Vec<OcrField>,
}

impl RecordedOcr {
    pub fn new(fields: Vec<OcrField>) -> Self {
        Self { fields }
    }

    /// Load a saved OCR response (`{"images": [{"fields": [...]}]}`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read OCR response: {}", path.display()))?;
        let response: OcrResponse = serde_json::from_str(&data)
            .with_context(|| format!("invalid OCR response: {}", path.display()))?;
        Ok(Self::new(response.into_fields()))
    }
}

impl OcrService for RecordedOcr {
    fn recognize(&self, _image: &[u8]) -> Result<Vec<OcrField>, UpstreamError> {
        Ok(self.fields.clone())
    }
}

pub struct RecordedVision {
    annotations: VisionAnnotations,
}

impl RecordedVision {
    pub fn new(annotations: VisionAnnotations) -> Self {
        Self { annotations }
    }

    /// Load a saved annotate response. Accepts either a bare annotation
    /// object or the batch form `{"responses": [{...}]}`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read vision response: {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&data)
            .with_context(|| format!("invalid vision response: {}", path.display()))?;

        let inner = match value.get("responses").and_then(|r| r.get(0)) {
            Some(first) => first.clone(),
            None => value,
        };
        let annotations: VisionAnnotations = serde_json::from_value(inner)
            .with_context(|| format!("unexpected vision response shape: {}", path.display()))?;
        Ok(Self::new(annotations))
    }
}

impl VisionService for RecordedVision {
    fn annotate(&self, _image: &[u8]) -> Result<VisionAnnotations, UpstreamError> {
        Ok(self.annotations.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_ocr_response() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ocr.json");
        fs::write(
            &path,
            r#"{"images":[{"fields":[{"inferText":"체중","inferConfidence":0.99}]}]}"#,
        )
        .unwrap();

        let ocr = RecordedOcr::load(&path).unwrap();
        let fields = ocr.recognize(&[]).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].infer_text, "체중");
    }

    #[test]
    fn test_load_vision_batch_form() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vision.json");
        fs::write(
            &path,
            r#"{"responses":[{"labelAnnotations":[{"description":"Stew","score":0.9}]}]}"#,
        )
        .unwrap();

        let vision = RecordedVision::load(&path).unwrap();
        let ann = vision.annotate(&[]).unwrap();
        assert_eq!(ann.label_annotations.len(), 1);
        assert!(ann.localized_object_annotations.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(RecordedOcr::load("/nonexistent/ocr.json").is_err());
    }
}
