use api_client::ImageRecord;

/// Case-insensitive substring filter over record title and description.
///
/// A blank query (empty or whitespace only) matches everything. Otherwise the
/// query is matched as typed, surrounding whitespace included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    needle: Option<String>,
}

impl SearchFilter {
    pub fn new(query: &str) -> Self {
        let needle = if query.trim().is_empty() {
            None
        } else {
            Some(query.to_lowercase())
        };
        Self { needle }
    }

    pub fn is_identity(&self) -> bool {
        self.needle.is_none()
    }

    pub fn matches(&self, record: &ImageRecord) -> bool {
        match &self.needle {
            None => true,
            Some(needle) => {
                record.title.to_lowercase().contains(needle.as_str())
                    || record.description.to_lowercase().contains(needle.as_str())
            }
        }
    }

    /// Matching subset of `records`, in their original order.
    pub fn apply(&self, records: &[ImageRecord]) -> Vec<ImageRecord> {
        if self.is_identity() {
            return records.to_vec();
        }
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

pub fn apply(records: &[ImageRecord], query: &str) -> Vec<ImageRecord> {
    SearchFilter::new(query).apply(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, description: &str) -> ImageRecord {
        ImageRecord {
            title: title.into(),
            description: description.into(),
            image_url: format!("http://img/{}.png", title),
            created: "2024-02-20".into(),
        }
    }

    fn sample() -> Vec<ImageRecord> {
        vec![
            record("Rex", "A big dog"),
            record("Tom", "Grumpy Cat in a box"),
            record("Catalina", "Parrot"),
            record("Bubbles", "Goldfish"),
        ]
    }

    fn is_subsequence(sub: &[ImageRecord], of: &[ImageRecord]) -> bool {
        let mut it = of.iter();
        sub.iter().all(|s| it.any(|o| o == s))
    }

    #[test]
    fn test_empty_query_is_identity() {
        let records = sample();
        assert_eq!(apply(&records, ""), records);
        assert_eq!(apply(&records, "   \t"), records);
    }

    #[test]
    fn test_matches_title_or_description_ignoring_case() {
        let records = sample();
        let hits = apply(&records, "CAT");
        let titles: Vec<_> = hits.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Tom", "Catalina"]);
    }

    #[test]
    fn test_no_match_excludes_everything() {
        assert!(apply(&sample(), "hamster").is_empty());
    }

    #[test]
    fn test_query_whitespace_is_significant() {
        let records = sample();
        let hits = apply(&records, "big ");
        assert_eq!(hits.len(), 1);
        assert!(apply(&records, " rex").is_empty());
    }

    #[test]
    fn test_result_is_ordered_subsequence_and_idempotent() {
        let records = sample();
        for q in ["", "a", "o", "cat", "dog", "x", "GOLD", " "] {
            let once = apply(&records, q);
            assert!(is_subsequence(&once, &records), "query {:?}", q);
            assert_eq!(apply(&once, q), once, "query {:?}", q);
        }
    }
}
