/// Request-level entry points.
///
/// Each call is independent: recognize, then extract or match. Upstream
/// failures stop the request before any extraction or matching runs.
use chrono::Local;
use thiserror::Error;
use tracing::info;

use crate::dataset::{DatasetError, NutritionLookup};
use crate::inbody::BodyComposition;
use crate::inbody::extractor::FieldExtractor;
use crate::inbody::tokens;
use crate::meal::MatchOutcome;
use crate::meal::matcher::FoodMatcher;
use crate::upstream::{OcrService, UpstreamError, VisionService};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// OCR an InBody result sheet and extract its fields. The record is dated
/// with today's local date.
pub fn analyze_inbody(
    ocr: &dyn OcrService,
    image: &[u8],
    extractor: &FieldExtractor,
) -> Result<BodyComposition, UpstreamError> {
    let fields = ocr.recognize(image)?;
    info!("OCR returned {} fields", fields.len());

    let tokens = tokens::normalize(&fields);
    let mut record = extractor.extract(&tokens);
    record.test_date = Some(Local::now().date_naive());
    Ok(record)
}

/// Label a meal photo and match it against the dataset.
pub fn analyze_meal<D: NutritionLookup + ?Sized>(
    vision: &dyn VisionService,
    image: &[u8],
    matcher: &FoodMatcher,
    dataset: &D,
) -> Result<MatchOutcome, PipelineError> {
    let annotations = vision.annotate(image)?;
    info!(
        "vision returned {} labels, {} objects",
        annotations.label_annotations.len(),
        annotations.localized_object_annotations.len()
    );
    Ok(matcher.match_annotations(dataset, &annotations)?)
}
