use crate::models::{Course, EquivalencyEntry};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading the equivalency guide
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to read equivalency table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse equivalency table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// On-disk layout of the equivalency guide
#[derive(Debug, Deserialize)]
struct TableFile {
    courses: Vec<EquivalencyEntry>,
}

/// Static source → UW equivalency guide
///
/// Loaded once at startup and shared read-only between requests.
#[derive(Debug, Clone, Default)]
pub struct EquivalencyTable {
    entries: Vec<EquivalencyEntry>,
}

impl EquivalencyTable {
    pub fn new(entries: Vec<EquivalencyEntry>) -> Self {
        Self { entries }
    }

    /// Load the guide from a JSON file of the form `{"courses": [...]}`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, TableError> {
        let file: TableFile = serde_json::from_str(raw)?;
        Ok(Self::new(file.courses))
    }

    pub fn entries(&self) -> &[EquivalencyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose source code appears in `codes`, in table order
    ///
    /// An empty code set yields an empty subset, never the whole table.
    pub fn filter_codes(&self, codes: &HashSet<&str>) -> Vec<&EquivalencyEntry> {
        if codes.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|entry| entry.source_code().is_some_and(|code| codes.contains(code)))
            .collect()
    }

    /// Subset of the guide relevant to a transcript
    pub fn relevant_to(&self, courses: &[Course]) -> Vec<&EquivalencyEntry> {
        let codes: HashSet<&str> = courses.iter().map(|c| c.course_code.as_str()).collect();
        self.filter_codes(&codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: Option<&str>, target: &str) -> EquivalencyEntry {
        EquivalencyEntry {
            source_course: code.map(str::to_string),
            uw_equivalent: Some(target.to_string()),
            uw_title: None,
            uw_credits: Some(5.0),
            category: None,
            direct_transfer: true,
        }
    }

    fn table() -> EquivalencyTable {
        EquivalencyTable::new(vec![
            entry(Some("MATH& 151"), "MATH 124"),
            entry(Some("ENGL& 101"), "ENGL 131"),
            entry(None, "CSE 121"),
            entry(Some("MATH& 152"), "MATH 125"),
        ])
    }

    #[test]
    fn test_filter_preserves_table_order() {
        let table = table();
        let codes: HashSet<&str> = ["MATH& 152", "MATH& 151"].into_iter().collect();

        let subset = table.filter_codes(&codes);

        assert_eq!(subset.len(), 2);
        assert_eq!(subset[0].source_code(), Some("MATH& 151"));
        assert_eq!(subset[1].source_code(), Some("MATH& 152"));
    }

    #[test]
    fn test_empty_codes_yield_empty_subset() {
        let table = table();
        assert!(table.filter_codes(&HashSet::new()).is_empty());
        assert!(table.relevant_to(&[]).is_empty());
    }

    #[test]
    fn test_codeless_entries_never_match() {
        let table = table();
        let codes: HashSet<&str> = [""].into_iter().collect();
        assert!(table.filter_codes(&codes).is_empty());
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let table = table();
        let codes: HashSet<&str> = ["math& 151"].into_iter().collect();
        assert!(table.filter_codes(&codes).is_empty());
    }

    #[test]
    fn test_from_json() {
        let table = EquivalencyTable::from_json(
            r#"{"courses": [{"bellevueCourse": "PSYC& 100", "uwEquivalent": "PSYCH 101", "uwCredits": 5}]}"#,
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.entries()[0].source_code(), Some("PSYC& 100"));
    }

    #[test]
    fn test_from_json_rejects_missing_courses() {
        assert!(EquivalencyTable::from_json(r#"{"entries": []}"#).is_err());
    }
}
