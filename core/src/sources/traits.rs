use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identity of a diff query: a revision pair plus an optional path filter.
///
/// A missing `from` compares the index against the working tree; a missing
/// `to` compares `from` against the working tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRequest {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl DiffRequest {
    pub fn new(from: Option<&str>, to: Option<&str>) -> Self {
        Self {
            from: from.map(str::to_owned),
            to: to.map(str::to_owned),
            path: None,
        }
    }

    /// Scope the request to a single path (or directory prefix)
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Revision arguments in command-line order, skipping absent ones
    pub fn revisions(&self) -> Vec<&str> {
        self.from
            .iter()
            .chain(self.to.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Whole-diff totals, as reported by the backend's stat call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsTotal {
    pub files: u64,
    pub lines: u64,
    pub insertions: u64,
    pub deletions: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub insertions: u64,
    pub deletions: u64,
}

/// Stats summary for a diff request.
///
/// Sourced directly from the backend; nothing guarantees it agrees with the
/// parsed [`DiffSet`](crate::diff::DiffSet).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub total: StatsTotal,
    #[serde(default)]
    pub files: IndexMap<String, FileStats>,
}

/// Path to status letter (`M`, `A`, `D`, `R100`, ...), in backend order
pub type NameStatus = IndexMap<String, String>;

/// Trait for diff backends - abstracts over the git executable, canned text, etc.
pub trait DiffSource {
    type Error: std::error::Error + 'static;

    /// Get the complete unified diff for a request, as raw bytes
    fn diff_full(&self, request: &DiffRequest) -> Result<Vec<u8>, Self::Error>;

    /// Get the numeric stats summary for a request
    fn diff_stats(&self, request: &DiffRequest) -> Result<DiffStats, Self::Error>;

    /// Get the name/status summary for a request
    fn diff_name_status(&self, request: &DiffRequest) -> Result<NameStatus, Self::Error>;

    /// Resolve a content identifier into the stored bytes.
    ///
    /// Callers never pass the null id; see
    /// [`is_null_id`](crate::diff::is_null_id).
    fn object(&self, id: &str) -> Result<Vec<u8>, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revisions_skip_missing() {
        assert!(DiffRequest::new(None, None).revisions().is_empty());
        assert_eq!(DiffRequest::new(Some("HEAD~1"), None).revisions(), vec!["HEAD~1"]);
        assert_eq!(
            DiffRequest::new(Some("main"), Some("feature")).revisions(),
            vec!["main", "feature"]
        );
    }

    #[test]
    fn test_with_path_keeps_revisions() {
        let request = DiffRequest::new(Some("main"), None).with_path("src/lib.rs");
        assert_eq!(request.path.as_deref(), Some("src/lib.rs"));
        assert_eq!(request.from.as_deref(), Some("main"));
    }

    #[test]
    fn test_stats_deserialize_without_files() {
        let stats: DiffStats = serde_json::from_str(
            r#"{"total":{"files":2,"lines":7,"insertions":5,"deletions":2}}"#,
        )
        .unwrap();
        assert_eq!(stats.total.files, 2);
        assert_eq!(stats.total.lines, 7);
        assert!(stats.files.is_empty());
    }
}
