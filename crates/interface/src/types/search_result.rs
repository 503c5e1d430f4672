//! Results returned by search and history collaborators.

use serde::{Deserialize, Serialize};

use crate::types::Resource;

/// Why an entry is part of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// The entry matched the search criteria.
    #[default]
    Match,
    /// The entry was added by `_include` or `_revinclude`.
    Include,
    /// The entry is an OperationOutcome about the search.
    Outcome,
}

impl SearchMode {
    /// Returns the FHIR code for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Match => "match",
            SearchMode::Include => "include",
            SearchMode::Outcome => "outcome",
        }
    }
}

/// A single entry of a search or history result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    /// Absolute URL of the entry's resource.
    pub full_url: String,
    /// The resource content.
    pub resource: Resource,
    /// Why the entry is included.
    pub search_mode: SearchMode,
}

impl SearchEntry {
    /// Creates an entry with search mode `match`.
    pub fn matched(full_url: impl Into<String>, resource: Resource) -> Self {
        Self {
            full_url: full_url.into(),
            resource,
            search_mode: SearchMode::Match,
        }
    }
}

/// One page of search or history results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Total number of matches across all pages.
    pub num_total: usize,
    /// Optional collaborator message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Entries on this page.
    #[serde(default)]
    pub entries: Vec<SearchEntry>,
    /// URL of the first page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_result_url: Option<String>,
    /// URL of the previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_result_url: Option<String>,
    /// URL of the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_result_url: Option<String>,
    /// URL of the last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_result_url: Option<String>,
}

impl SearchResult {
    /// Creates a single-page result whose total equals the entry count.
    pub fn from_entries(entries: Vec<SearchEntry>) -> Self {
        Self {
            num_total: entries.len(),
            entries,
            ..Default::default()
        }
    }

    /// Returns `true` if this page holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patient(id: &str) -> Resource {
        Resource::try_from(json!({"resourceType": "Patient", "id": id})).unwrap()
    }

    #[test]
    fn test_from_entries_sets_total() {
        let result = SearchResult::from_entries(vec![
            SearchEntry::matched("http://x/Patient/1", patient("1")),
            SearchEntry::matched("http://x/Patient/2", patient("2")),
        ]);
        assert_eq!(result.num_total, 2);
        assert!(!result.is_empty());
        assert!(result.next_result_url.is_none());
    }

    #[test]
    fn test_search_mode_codes() {
        assert_eq!(SearchMode::default(), SearchMode::Match);
        assert_eq!(SearchMode::Include.as_str(), "include");
        assert_eq!(serde_json::to_value(SearchMode::Outcome).unwrap(), json!("outcome"));
    }
}
