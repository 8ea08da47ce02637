//! Derived views shared by every collection.
//!
//! These are pure functions of a snapshot; services re-run them whenever a
//! new snapshot is published.

use crate::record::{Record, Searchable};

/// Case-insensitive substring search over title, body and tags.
///
/// An empty query matches everything.
pub fn search<'a, T: Searchable>(records: &'a [T], query: &str) -> Vec<&'a T> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            record.title().to_lowercase().contains(&needle)
                || record.body().to_lowercase().contains(&needle)
                || record
                    .tags()
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Records carrying exactly `tag` (case-insensitive).
pub fn with_tag<'a, T: Searchable>(records: &'a [T], tag: &str) -> Vec<&'a T> {
    records
        .iter()
        .filter(|record| record.tags().iter().any(|t| t.eq_ignore_ascii_case(tag)))
        .collect()
}

pub fn find_by_id<'a, T: Record>(records: &'a [T], id: &str) -> Option<&'a T> {
    records.iter().find(|record| record.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::Note;

    fn notes() -> Vec<Note> {
        vec![
            Note::new("Groceries", "milk, eggs").with_tags(["Home"]),
            Note::new("Sprint plan", "Ship the Importer").with_tags(["work", "q2"]),
            Note::new("Books", "Dune"),
        ]
    }

    fn titles<'a>(notes: &[&'a Note]) -> Vec<&'a str> {
        notes.iter().map(|n| n.title.as_str()).collect()
    }

    #[test]
    fn test_search_matches_title_body_and_tags() {
        let notes = notes();
        assert_eq!(titles(&search(&notes, "GROC")), vec!["Groceries"]);
        assert_eq!(titles(&search(&notes, "importer")), vec!["Sprint plan"]);
        assert_eq!(titles(&search(&notes, "hom")), vec!["Groceries"]);
        assert!(search(&notes, "nothing here").is_empty());
    }

    #[test]
    fn test_empty_query_matches_all() {
        assert_eq!(search(&notes(), "").len(), 3);
    }

    #[test]
    fn test_with_tag_is_exact() {
        let notes = notes();
        assert_eq!(titles(&with_tag(&notes, "home")), vec!["Groceries"]);
        assert!(with_tag(&notes, "wor").is_empty());
    }

    #[test]
    fn test_find_by_id() {
        let notes = notes();
        let id = notes[2].id.clone();
        assert_eq!(find_by_id(&notes, &id).map(|n| n.title.as_str()), Some("Books"));
        assert!(find_by_id(&notes, "missing").is_none());
    }
}
