/// OCR token normalization and section bounds.
///
/// Result sheets print the same labels twice: once in the current
/// composition table and again in the history chart at the bottom. Every
/// metric scan is confined to the range returned by [`locate_section`].
use std::ops::Range;

use serde::Serialize;

use crate::upstream::OcrField;

/// Header text that opens the current composition table.
pub const COMPOSITION_MARKER: &str = "체성분분석";

/// Header text that opens the history section.
pub const HISTORY_MARKER: &str = "신체변화";

/// A single recognized text field, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrToken {
    pub index: usize,
    pub text: String,
    pub confidence: f32,
}

impl OcrToken {
    pub fn new(index: usize, text: &str, confidence: f32) -> Self {
        Self {
            index,
            text: text.trim().to_string(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Convert raw OCR fields into indexed, trimmed tokens.
pub fn normalize(fields: &[OcrField]) -> Vec<OcrToken> {
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| OcrToken::new(i, &f.infer_text, f.infer_confidence))
        .collect()
}

/// Build tokens straight from text, with full confidence.
pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Vec<OcrToken> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| OcrToken::new(i, t.as_ref(), 1.0))
        .collect()
}

/// Find the `[start, end)` range of the current composition section.
///
/// The start is the first token containing [`COMPOSITION_MARKER`], the end
/// the first token after it containing [`HISTORY_MARKER`]. Missing markers
/// fall back to the start or end of the stream.
pub fn locate_section(tokens: &[OcrToken]) -> Range<usize> {
    let start = tokens
        .iter()
        .position(|t| t.text.contains(COMPOSITION_MARKER))
        .unwrap_or(0);

    let end = tokens[start..]
        .iter()
        .position(|t| t.text.contains(HISTORY_MARKER))
        .map(|offset| start + offset)
        .unwrap_or(tokens.len());

    tracing::debug!(
        "composition section: {start}..{end} ({} tokens)",
        end - start
    );

    start..end
}
