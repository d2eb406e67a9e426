use std::collections::HashSet;

use crate::Isbn;

/// Projection of one book as returned by the metadata lookup.
///
/// Everything except `isbn` may be missing from the upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRecord {
    /// The accepted code the lookup was keyed by.
    pub isbn: String,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub published_date: Option<String>,
    pub page_count: Option<u32>,
    pub thumbnail: Option<String>,
    pub info_link: Option<String>,
}

impl BookRecord {
    /// A record with only the key filled in.
    pub fn bare(isbn: &Isbn) -> Self {
        Self {
            isbn: isbn.as_str().to_string(),
            title: None,
            authors: Vec::new(),
            published_date: None,
            page_count: None,
            thumbnail: None,
            info_link: None,
        }
    }
}

/// Accepted books in insertion order, at most one per isbn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Catalog {
    records: Vec<BookRecord>,
    keys: HashSet<String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, isbn: &str) -> bool {
        self.keys.contains(isbn)
    }

    /// Appends `record` unless its isbn is already present.
    ///
    /// Returns `false` and leaves the catalog untouched on a duplicate.
    pub fn insert(&mut self, record: BookRecord) -> bool {
        if !self.keys.insert(record.isbn.clone()) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn get(&self, isbn: &str) -> Option<&BookRecord> {
        if !self.contains(isbn) {
            return None;
        }
        self.records.iter().find(|record| record.isbn == isbn)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BookRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.keys.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(isbn: &str, title: &str) -> BookRecord {
        BookRecord {
            isbn: isbn.to_string(),
            title: Some(title.to_string()),
            authors: Vec::new(),
            published_date: None,
            page_count: None,
            thumbnail: None,
            info_link: None,
        }
    }

    #[test]
    fn insert_rejects_duplicate_keys() {
        let mut catalog = Catalog::new();
        assert!(catalog.insert(record("9780000000001", "first")));
        assert!(!catalog.insert(record("9780000000001", "second")));
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get("9780000000001").and_then(|r| r.title.as_deref()),
            Some("first")
        );
    }

    #[test]
    fn iteration_follows_insertion_order() {
        let mut catalog = Catalog::new();
        catalog.insert(record("9780000000002", "b"));
        catalog.insert(record("9780000000001", "a"));
        let order: Vec<_> = catalog.iter().map(|r| r.isbn.as_str()).collect();
        assert_eq!(order, vec!["9780000000002", "9780000000001"]);
    }

    #[test]
    fn clear_forgets_keys() {
        let mut catalog = Catalog::new();
        catalog.insert(record("9780000000001", "a"));
        catalog.clear();
        assert!(catalog.is_empty());
        assert!(!catalog.contains("9780000000001"));
        assert!(catalog.insert(record("9780000000001", "a")));
    }
}
