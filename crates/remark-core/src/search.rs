//! Client-side search over the in-memory annotation list.
//!
//! Matching is a case-insensitive substring test against the note text or
//! the author name, intersected with an ownership scope. There is no
//! ranking: results keep the order of the source list.

use crate::models::{Annotation, ScopeFilter};

/// Trim, collapse runs of whitespace to a single space, and lowercase.
pub fn normalize_text(text: &str) -> String {
    condense_whitespace(text).to_lowercase()
}

/// Trim and collapse runs of whitespace to a single space.
pub fn condense_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Filter `source` by `query` and `scope`, preserving order.
///
/// An empty (after normalization) query matches every entry in scope.
pub fn filter_annotations(
    source: &[Annotation],
    query: &str,
    scope: ScopeFilter,
) -> Vec<Annotation> {
    let needle = normalize_text(query);
    source
        .iter()
        .filter(|a| scope.matches(a.scope))
        .filter(|a| {
            needle.is_empty()
                || normalize_text(&a.note).contains(&needle)
                || normalize_text(&a.author).contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, LandmarkRecord};

    fn annotation(id: &str, note: &str, author: &str, current_user: &str) -> Annotation {
        Annotation::from_record(
            LandmarkRecord {
                id: id.to_string(),
                coordinates: Coordinates {
                    latitude: 0.0,
                    longitude: 0.0,
                },
                note: note.to_string(),
                author: author.to_string(),
            },
            current_user,
            None,
        )
    }

    fn sample() -> Vec<Annotation> {
        vec![
            annotation("1", "Great  coffee   here", "alice", "alice"),
            annotation("2", "Foo Bar fountain", "bob", "alice"),
            annotation("3", "Parking", "Foobar_fan", "alice"),
            annotation("4", "Quiet bench", "alice", "alice"),
        ]
    }

    fn ids(list: &[Annotation]) -> Vec<&str> {
        list.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Foo   Bar "), "foo bar");
        assert_eq!(normalize_text("\tA\n b  "), "a b");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn test_condense_whitespace() {
        assert_eq!(
            condense_whitespace("A    string with       extra spaces"),
            "A string with extra spaces"
        );
        assert_eq!(
            condense_whitespace("  A string with extra spaces   "),
            "A string with extra spaces"
        );
    }

    #[test]
    fn test_empty_query_all_scope_is_identity() {
        let list = sample();
        assert_eq!(filter_annotations(&list, "", ScopeFilter::All), list);
        assert_eq!(filter_annotations(&list, "   ", ScopeFilter::All), list);
    }

    #[test]
    fn test_empty_query_scope_only() {
        let list = sample();
        assert_eq!(
            ids(&filter_annotations(&list, "", ScopeFilter::Mine)),
            vec!["1", "4"]
        );
        assert_eq!(
            ids(&filter_annotations(&list, "", ScopeFilter::Others)),
            vec!["2", "3"]
        );
    }

    #[test]
    fn test_query_matches_note_or_author() {
        let list = sample();
        // "foo" hits note of 2 and author of 3
        assert_eq!(
            ids(&filter_annotations(&list, "FOO", ScopeFilter::All)),
            vec!["2", "3"]
        );
    }

    #[test]
    fn test_query_normalization_equivalence() {
        let list = sample();
        let a = filter_annotations(&list, "  Foo   Bar ", ScopeFilter::All);
        let b = filter_annotations(&list, "foo bar", ScopeFilter::All);
        assert_eq!(a, b);
        assert_eq!(ids(&a), vec!["2"]);
    }

    #[test]
    fn test_note_side_is_normalized_too() {
        let list = sample();
        assert_eq!(
            ids(&filter_annotations(&list, "great coffee", ScopeFilter::All)),
            vec!["1"]
        );
    }

    #[test]
    fn test_query_intersects_scope() {
        let list = sample();
        assert!(filter_annotations(&list, "foo", ScopeFilter::Mine).is_empty());
        assert_eq!(
            ids(&filter_annotations(&list, "alice", ScopeFilter::Mine)),
            vec!["1", "4"]
        );
    }

    #[test]
    fn test_no_match_returns_empty() {
        assert!(filter_annotations(&sample(), "zzz", ScopeFilter::All).is_empty());
    }
}
