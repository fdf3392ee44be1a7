/// Table-driven field extractor.
///
/// One generic scan runs for every row of the metric table: find the anchor
/// inside the section, confirm the unit, then take the first in-range value
/// within the lookahead. Nothing here fails; unreadable fields stay `None`.
use std::ops::Range;

use tracing::{debug, info};

use super::BodyComposition;
use super::metrics::{self, METRICS, MetricSpec};
use super::tokens::{self, OcrToken};

pub struct FieldExtractor {
    metrics: &'static [MetricSpec],
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self { metrics: METRICS }
    }
}

impl FieldExtractor {
    /// Use a custom metric table instead of [`METRICS`].
    #[must_use]
    pub fn with_metrics(metrics: &'static [MetricSpec]) -> Self {
        Self { metrics }
    }

    /// Build a record from tokens in reading order.
    pub fn extract(&self, tokens: &[OcrToken]) -> BodyComposition {
        let mut record = BodyComposition::default();

        record.height = extract_height(tokens);
        if let Some(h) = record.height {
            info!("height: {h}cm");
        }

        let section = tokens::locate_section(tokens);
        for spec in self.metrics {
            if let Some(value) = extract_metric(spec, tokens, section.clone()) {
                let value = if spec.round { value.round() } else { value };
                if record.set_once(spec.metric, value) {
                    info!("{}: {value}", spec.metric.as_str());
                }
            }
        }

        debug!("extracted {} fields", record.filled_count());
        record
    }
}

/// First `<number>cm` token anywhere in the stream within the height range.
pub fn extract_height(tokens: &[OcrToken]) -> Option<f64> {
    tokens
        .iter()
        .filter_map(|t| metrics::parse_height(&t.text))
        .find(|v| metrics::HEIGHT_RANGE.contains(*v))
}

/// Try every anchor occurrence in `section`, in order, until one yields a value.
pub fn extract_metric(
    spec: &MetricSpec,
    tokens: &[OcrToken],
    section: Range<usize>,
) -> Option<f64> {
    let end = section.end.min(tokens.len());
    let start = section.start.min(end);

    for anchor in start..end {
        if !spec.anchors.contains(&tokens[anchor].text.as_str()) {
            continue;
        }

        let found = match spec.unit {
            Some(unit) => {
                let window_end = (anchor + 1 + unit.window).min(end);
                (anchor + 1..window_end)
                    .filter(|&j| tokens[j].text == unit.text)
                    .find_map(|origin| scan_value(spec, tokens, origin, end))
            }
            None => scan_value(spec, tokens, anchor, end),
        };

        if found.is_some() {
            return found;
        }
        debug!(
            "{}: anchor at {anchor} gave no value",
            spec.metric.as_str()
        );
    }

    None
}

/// Scan `origin+1 .. origin+lookahead` (clipped to `end`) for a value.
fn scan_value(spec: &MetricSpec, tokens: &[OcrToken], origin: usize, end: usize) -> Option<f64> {
    let stop = (origin + spec.lookahead).min(end);
    let mut gate_passed = spec.gate.is_none();

    for token in tokens.iter().take(stop).skip(origin + 1) {
        let text = token.text.as_str();

        if !gate_passed {
            gate_passed = spec.gate == Some(text);
            continue;
        }

        // reference ranges are printed as "(55.0~70.0)"
        if text.starts_with('(') || spec.skip_texts.contains(&text) {
            continue;
        }

        let Some(value) = spec.pattern.parse(text) else {
            continue;
        };

        if spec.range.contains(value) {
            return Some(value);
        }
        debug!(
            "{}: {value} outside ({}, {})",
            spec.metric.as_str(),
            spec.range.min,
            spec.range.max
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbody::metrics::{Metric, ValuePattern, spec_for};
    use crate::inbody::tokens::from_texts;

    fn extract(texts: &[&str]) -> BodyComposition {
        FieldExtractor::default().extract(&from_texts(texts))
    }

    #[test]
    fn test_weight_first_write_wins() {
        let record = extract(&["체중", "(kg)", "70.5", "체중", "(kg)", "55.0"]);
        assert_eq!(record.weight, Some(70.5));
    }

    #[test]
    fn test_weight_requires_unit_right_after_anchor() {
        let record = extract(&["체중", "표준", "(kg)", "70.5"]);
        assert_eq!(record.weight, None);
    }

    #[test]
    fn test_reference_range_token_skipped() {
        let record = extract(&["체중", "(kg)", "(55.0~75.0)", "70.5"]);
        assert_eq!(record.weight, Some(70.5));
    }

    #[test]
    fn test_out_of_range_value_continues_scan() {
        // 2 tokens after the unit are scanned; the first is implausible
        let record = extract(&["체중", "(kg)", "7", "70.5"]);
        assert_eq!(record.weight, Some(70.5));
    }

    #[test]
    fn test_lookahead_exhausted_leaves_field_unset() {
        let record = extract(&["체중", "(kg)", "표준", "이하", "70.5"]);
        assert_eq!(record.weight, None);
    }

    #[test]
    fn test_history_section_not_read() {
        let record = extract(&["체성분분석", "체수분", "(L)", "신체변화", "체수분", "(L)", "38.2"]);
        assert_eq!(record.body_water, None);
    }

    #[test]
    fn test_muscle_mass_unit_within_window() {
        let record = extract(&["골격근량", "Skeletal", "Muscle", "Mass", "(kg)", "28.4"]);
        assert_eq!(record.muscle_mass, Some(28.4));
    }

    #[test]
    fn test_muscle_mass_unit_outside_window() {
        let mut texts = vec!["골격근량"];
        texts.extend(std::iter::repeat_n("-", 9));
        texts.extend(["(kg)", "28.4"]);
        let record = extract(&texts);
        assert_eq!(record.muscle_mass, None);
    }

    #[test]
    fn test_visceral_fat_skips_baseline() {
        let record = extract(&["내장지방레벨", "10", "낮음", "표준", "높음", "5", "13"]);
        assert_eq!(record.visceral_fat_level, Some(13));
    }

    #[test]
    fn test_visceral_fat_rejects_decimal() {
        let record = extract(&["내장지방레벨", "10", "12.5", "14"]);
        assert_eq!(record.visceral_fat_level, Some(14));
    }

    #[test]
    fn test_waist_hip_ratio_needs_gate() {
        let record = extract(&["복부지방률", "0.95", "표준", "높음", "0.85", "0.93"]);
        assert_eq!(record.waist_hip_ratio, Some(0.93));

        let record = extract(&["복부지방률", "0.95", "0.93"]);
        assert_eq!(record.waist_hip_ratio, None);
    }

    #[test]
    fn test_lean_body_mass_kg_token() {
        let record = extract(&["제지방량", "52.3kg"]);
        assert_eq!(record.lean_body_mass, Some(52.3));
    }

    #[test]
    fn test_bmi_from_either_anchor() {
        assert_eq!(extract(&["BMI", "23.4"]).bmi, Some(23.4));
        assert_eq!(extract(&["(kg/m2)", "(18.5~25.0)", "23.4"]).bmi, Some(23.4));
    }

    #[test]
    fn test_basal_metabolic_rate_rounded() {
        let record = extract(&["기초대사량", "1487.6kcal"]);
        assert_eq!(record.basal_metabolic_rate, Some(1488));
    }

    #[test]
    fn test_height_is_section_unbounded() {
        let record = extract(&["신체변화", "체성분분석", "키", "156.9cm"]);
        assert_eq!(record.height, Some(156.9));
        assert_eq!(extract(&["99cm", "300cm"]).height, None);
    }

    /// Render `value` the way a sheet prints it for `spec`'s pattern.
    fn shaped(spec: &MetricSpec, value: f64) -> String {
        match spec.pattern {
            ValuePattern::KgSuffixed => format!("{value}kg"),
            ValuePattern::Integer => format!("{}", value.round()),
            ValuePattern::LeadingDecimal | ValuePattern::Fraction => format!("{value}"),
        }
    }

    /// anchor, unit, gate, then the value token.
    fn row_tokens(spec: &MetricSpec, value: &str) -> Vec<OcrToken> {
        let mut texts = vec![spec.anchors[0]];
        if let Some(unit) = spec.unit {
            texts.push(unit.text);
        }
        if let Some(gate) = spec.gate {
            texts.push(gate);
        }
        texts.push(value);
        from_texts(&texts)
    }

    #[test]
    fn test_out_of_range_never_populates() {
        for spec in METRICS {
            let name = spec.metric.as_str();
            let (min, max) = (spec.range.min, spec.range.max);

            // the same layout must accept a mid-range reading
            let mid = shaped(spec, (min + max) / 2.0);
            let tokens = row_tokens(spec, &mid);
            assert!(
                extract_metric(spec, &tokens, 0..tokens.len()).is_some(),
                "{name} rejected in-range {mid}"
            );

            for value in [min, max, max * 10.0, min / 10.0] {
                let text = shaped(spec, value);
                if spec.pattern.parse(&text).is_none() {
                    continue;
                }
                let tokens = row_tokens(spec, &text);
                assert_eq!(
                    extract_metric(spec, &tokens, 0..tokens.len()),
                    None,
                    "{name} accepted out-of-range {text}"
                );
            }
        }
    }

    #[test]
    fn test_round_flag_comes_from_table() {
        static UNROUNDED: std::sync::LazyLock<[MetricSpec; 1]> = std::sync::LazyLock::new(|| {
            [MetricSpec {
                round: false,
                ..*spec_for(Metric::BasalMetabolicRate).unwrap()
            }]
        });
        let texts = ["기초대사량", "1487.6kcal"];

        let record = FieldExtractor::with_metrics(&*UNROUNDED).extract(&from_texts(&texts));
        assert_eq!(record.basal_metabolic_rate, Some(1487));

        let record = FieldExtractor::default().extract(&from_texts(&texts));
        assert_eq!(record.basal_metabolic_rate, Some(1488));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let tokens = from_texts(&[
            "체성분분석", "체중", "(kg)", "70.5", "체지방량", "(kg)", "18.2", "BMI", "24.1",
        ]);
        let extractor = FieldExtractor::default();
        assert_eq!(extractor.extract(&tokens), extractor.extract(&tokens));
    }

    #[test]
    fn test_custom_metric_table() {
        static ONLY_WEIGHT: std::sync::LazyLock<[MetricSpec; 1]> =
            std::sync::LazyLock::new(|| [*spec_for(Metric::Weight).unwrap()]);
        let extractor = FieldExtractor::with_metrics(&*ONLY_WEIGHT);
        let record = extractor.extract(&from_texts(&["체중", "(kg)", "70.5", "BMI", "23.4"]));
        assert_eq!(record.weight, Some(70.5));
        assert_eq!(record.bmi, None);
    }
}
