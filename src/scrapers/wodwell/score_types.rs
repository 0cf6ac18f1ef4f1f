//! Score-type classification from embedded markup.
//!
//! Entries carry a small HTML fragment listing how a workout is scored, one
//! `<div class="wod-score-type">` per label. Labels map onto [`ScoreFacets`]
//! through an exact-match table. Anything outside the table is reported back
//! as an unknown label instead of being guessed at.

use std::sync::OnceLock;

use scraper::{Html, Selector};

use crate::models::ScoreFacets;

/// Structural selector for a score-type label container.
pub const SCORE_TYPE_SELECTOR: &str = r#"div[class="wod-score-type"]"#;

pub const LABEL_FOR_LOAD: &str = "For Load";
pub const LABEL_FOR_TIME: &str = "For Time";
pub const LABEL_FOR_ROUNDS_REPS: &str = "For Rounds/Reps (AMRAP)";

fn score_type_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse(SCORE_TYPE_SELECTOR).unwrap())
}

/// Result of classifying one fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub facets: ScoreFacets,
    /// Label texts that matched no known facet, in document order.
    pub unknown_labels: Vec<String>,
    /// Set when the fragment could not be read as markup at all.
    pub malformed: Option<String>,
}

impl Classification {
    /// All-false facets with a malformed-fragment note.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self {
            malformed: Some(detail.into()),
            ..Default::default()
        }
    }
}

/// Classify a score-type markup fragment.
///
/// An empty fragment means no facet applies. Parsing is fault tolerant:
/// unclosed or stray tags never fail the call. A non-empty fragment that
/// contains no elements at all is reported as malformed.
///
/// Label text must match exactly, surrounding whitespace included; padded
/// labels are reported as unknown.
pub fn classify(fragment: &str) -> Classification {
    if fragment.trim().is_empty() {
        return Classification::default();
    }

    let document = Html::parse_fragment(fragment);

    // The fragment root is a synthetic <html> element; anything else is content.
    let element_count = document
        .root_element()
        .descendants()
        .filter(|node| node.value().is_element())
        .count();
    if element_count <= 1 {
        return Classification::malformed("score_types contains no markup elements");
    }

    let mut result = Classification::default();
    for element in document.select(score_type_selector()) {
        // Own text only; nested containers are matched on their own.
        let label: String = element
            .children()
            .filter_map(|child| child.value().as_text())
            .map(|text| &**text)
            .collect();
        match label.as_str() {
            LABEL_FOR_LOAD => result.facets.load = true,
            LABEL_FOR_TIME => result.facets.time = true,
            LABEL_FOR_ROUNDS_REPS => result.facets.rounds_reps = true,
            _ => result.unknown_labels.push(label),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str) -> String {
        format!(r#"<div class="wod-score-type">{}</div>"#, text)
    }

    #[test]
    fn test_empty_fragment_is_all_false() {
        let result = classify("");
        assert!(result.facets.is_empty());
        assert!(result.unknown_labels.is_empty());
        assert!(result.malformed.is_none());

        assert_eq!(classify("   \n"), Classification::default());
    }

    #[test]
    fn test_all_known_labels_any_order() {
        let orders = [
            [LABEL_FOR_LOAD, LABEL_FOR_TIME, LABEL_FOR_ROUNDS_REPS],
            [LABEL_FOR_ROUNDS_REPS, LABEL_FOR_LOAD, LABEL_FOR_TIME],
            [LABEL_FOR_TIME, LABEL_FOR_ROUNDS_REPS, LABEL_FOR_LOAD],
        ];
        for order in orders {
            let fragment: String = order.iter().map(|l| label(l)).collect();
            let result = classify(&fragment);
            assert_eq!(
                result.facets,
                ScoreFacets {
                    load: true,
                    time: true,
                    rounds_reps: true
                }
            );
            assert!(result.unknown_labels.is_empty());
        }
    }

    #[test]
    fn test_single_label() {
        let result = classify(&label(LABEL_FOR_TIME));
        assert!(result.facets.time);
        assert!(!result.facets.load);
        assert!(!result.facets.rounds_reps);
    }

    #[test]
    fn test_unknown_label_is_reported_and_others_kept() {
        let fragment = format!(
            "{}{}{}",
            label(LABEL_FOR_LOAD),
            label("For Calories"),
            label(LABEL_FOR_ROUNDS_REPS)
        );
        let result = classify(&fragment);
        assert!(result.facets.load);
        assert!(result.facets.rounds_reps);
        assert!(!result.facets.time);
        assert_eq!(result.unknown_labels, vec!["For Calories".to_string()]);
        assert!(result.malformed.is_none());
    }

    #[test]
    fn test_matching_is_exact() {
        let result = classify(&label("for time"));
        assert!(!result.facets.time);
        assert_eq!(result.unknown_labels, vec!["for time".to_string()]);
    }

    #[test]
    fn test_padded_label_is_unknown() {
        let result = classify(&label(" For Time "));
        assert!(!result.facets.time);
        assert_eq!(result.unknown_labels, vec![" For Time ".to_string()]);
    }

    #[test]
    fn test_entities_decoded() {
        let result = classify(r#"<div class="wod-score-type">For Rounds/Reps &#40;AMRAP&#41;</div>"#);
        assert!(result.facets.rounds_reps);
    }

    #[test]
    fn test_other_containers_ignored() {
        let fragment = format!(
            r#"<span class="wod-score-type">For Load</span><div class="wod-score-type extra">For Load</div>{}"#,
            label(LABEL_FOR_TIME)
        );
        let result = classify(&fragment);
        assert!(result.facets.time);
        assert!(!result.facets.load);
        assert!(result.unknown_labels.is_empty());
    }

    #[test]
    fn test_malformed_markup_tolerated() {
        let fragment = r#"<div class="wod-score-type">For Load<div class="wod-score-type">For Time</p></span>"#;
        let result = classify(fragment);
        assert!(result.malformed.is_none());
        assert!(result.facets.load);
        assert!(result.facets.time);
        assert!(result.unknown_labels.is_empty());
    }

    #[test]
    fn test_plain_text_is_malformed() {
        let result = classify("For Time");
        assert!(result.facets.is_empty());
        assert!(result.malformed.is_some());
    }
}
