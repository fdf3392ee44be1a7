/// Vision label → Korean food keyword normalization.
///
/// The vision service labels in English while the nutrition dataset is keyed
/// by Korean dish names. Table keys are matched as case-insensitive
/// substrings of the label, longest key first, so "Hamburger" resolves to
/// 햄버거 before "ham" gets a chance to claim it.
use crate::config::KeywordMapping;

/// Built-in table, used when the configuration does not supply one.
pub const DEFAULT_LABEL_KEYWORDS: &[(&str, &str)] = &[
    ("jjigae", "찌개"),
    ("kimchi", "김치"),
    ("stew", "찌개"),
    ("soup", "국"),
    ("curry", "카레"),
    ("rice", "밥"),
    ("noodle", "면"),
    ("ramen", "라면"),
    ("bread", "빵"),
    ("bun", "빵"),
    ("chicken", "닭"),
    ("beef", "소고기"),
    ("pork", "돼지고기"),
    ("ham", "햄"),
    ("hamburger", "햄버거"),
    ("burger", "버거"),
    ("sandwich", "샌드위치"),
    ("fish", "생선"),
    ("vegetable", "채소"),
    ("salad", "샐러드"),
    ("tofu", "두부"),
    ("bean", "콩"),
    ("bean curd", "두부"),
    ("soybean", "콩"),
    ("doenjang", "된장"),
    ("gochujang", "고추장"),
];

#[derive(Debug, Clone)]
pub struct LabelNormalizer {
    /// (lowercased label fragment, keyword), longest fragment first.
    entries: Vec<(String, String)>,
}

impl Default for LabelNormalizer {
    fn default() -> Self {
        Self::new(
            DEFAULT_LABEL_KEYWORDS
                .iter()
                .map(|(label, keyword)| (label.to_string(), keyword.to_string())),
        )
    }
}

impl LabelNormalizer {
    pub fn new<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut entries: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(label, keyword)| (label.to_lowercase(), keyword))
            .filter(|(label, _)| !label.is_empty())
            .collect();
        // stable: equal lengths keep table order
        entries.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        Self { entries }
    }

    pub fn from_mappings(mappings: &[KeywordMapping]) -> Self {
        Self::new(
            mappings
                .iter()
                .map(|m| (m.label.clone(), m.keyword.clone())),
        )
    }

    /// Keyword for `label`, if any table key occurs in it.
    pub fn normalize(&self, label: &str) -> Option<&str> {
        let lower = label.to_lowercase();
        self.entries
            .iter()
            .find(|(fragment, _)| lower.contains(fragment.as_str()))
            .map(|(_, keyword)| keyword.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_key_wins() {
        let n = LabelNormalizer::default();
        assert_eq!(n.normalize("Hamburger"), Some("햄버거"));
        assert_eq!(n.normalize("Ham"), Some("햄"));
        assert_eq!(n.normalize("Veggie burger"), Some("버거"));
        assert_eq!(n.normalize("Bean curd"), Some("두부"));
        assert_eq!(n.normalize("Soybean paste"), Some("콩"));
    }

    #[test]
    fn test_case_insensitive_substring() {
        let n = LabelNormalizer::default();
        assert_eq!(n.normalize("KIMCHI JJIGAE"), Some("찌개"));
        assert_eq!(n.normalize("Fried rice"), Some("밥"));
        assert_eq!(n.normalize("Tableware"), None);
    }

    #[test]
    fn test_equal_length_keeps_table_order() {
        let n = LabelNormalizer::new(vec![
            ("abc".to_string(), "first".to_string()),
            ("bcd".to_string(), "second".to_string()),
        ]);
        assert_eq!(n.normalize("abcd"), Some("first"));
    }

    #[test]
    fn test_from_mappings() {
        let n = LabelNormalizer::from_mappings(&[KeywordMapping {
            label: "Pizza".to_string(),
            keyword: "피자".to_string(),
        }]);
        assert_eq!(n.len(), 1);
        assert_eq!(n.normalize("pepperoni pizza"), Some("피자"));
    }
}
