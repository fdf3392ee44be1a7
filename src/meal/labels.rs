/// Pre-selection of vision annotations.
///
/// Localized objects name the dish more precisely than whole-image labels,
/// so food-like objects go first and get a score boost. Generic and
/// non-food labels (tableware, "Food" itself) are dropped.
use tracing::debug;

use super::VisionLabel;
use crate::config::VisionConfig;
use crate::upstream::VisionAnnotations;

fn by_score_desc(a: &VisionLabel, b: &VisionLabel) -> std::cmp::Ordering {
    b.score.total_cmp(&a.score)
}

fn contains_any(text: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| text.contains(&n.to_lowercase()))
}

/// Filter, merge and rank annotations into at most `max_labels` labels.
pub fn select_food_labels(
    annotations: &VisionAnnotations,
    config: &VisionConfig,
) -> Vec<VisionLabel> {
    let mut objects: Vec<VisionLabel> = annotations
        .localized_object_annotations
        .iter()
        .filter(|o| {
            o.score >= config.min_score
                && contains_any(&o.name.to_lowercase(), &config.food_object_keywords)
        })
        .map(|o| VisionLabel::new(&o.name, o.score))
        .collect();
    objects.sort_by(by_score_desc);
    objects.truncate(config.max_objects);

    let mut labels: Vec<VisionLabel> = annotations
        .label_annotations
        .iter()
        .filter(|l| {
            let lower = l.description.to_lowercase();
            l.score >= config.min_score
                && !contains_any(&lower, &config.non_food_labels)
                && !config
                    .generic_labels
                    .iter()
                    .any(|g| g.eq_ignore_ascii_case(&lower))
        })
        .map(|l| VisionLabel::new(&l.description, l.score))
        .collect();
    labels.sort_by(by_score_desc);
    labels.truncate(config.max_labels);

    let mut combined: Vec<VisionLabel> = objects
        .into_iter()
        .map(|o| VisionLabel {
            score: o.score * config.object_score_weight,
            ..o
        })
        .collect();
    for label in labels {
        let duplicate = combined
            .iter()
            .any(|c| c.description.eq_ignore_ascii_case(&label.description));
        if !duplicate {
            combined.push(label);
        }
    }

    combined.sort_by(by_score_desc);
    combined.truncate(config.max_labels);

    debug!(
        "selected labels: {:?}",
        combined.iter().map(|l| &l.description).collect::<Vec<_>>()
    );
    combined
}
