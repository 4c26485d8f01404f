use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Seconds since the unix epoch.
pub type Timestamp = i64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageMetric {
    pub code_lines: u64,
    pub comment_lines: u64,
}

impl LanguageMetric {
    pub fn new(code_lines: u64, comment_lines: u64) -> Self {
        Self {
            code_lines,
            comment_lines,
        }
    }
}

/// Per-language line counts of a source tree at one revision.
///
/// Languages keep the order in which the metrics tool reported them; that
/// order feeds language discovery and therefore the per-language columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    languages: Vec<(String, LanguageMetric)>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `metric` for `language`, replacing any earlier value in place.
    pub fn insert(&mut self, language: impl Into<String>, metric: LanguageMetric) {
        let language = language.into();
        match self.languages.iter_mut().find(|(name, _)| *name == language) {
            Some((_, existing)) => *existing = metric,
            None => self.languages.push((language, metric)),
        }
    }

    pub fn with(mut self, language: impl Into<String>, code_lines: u64, comment_lines: u64) -> Self {
        self.insert(language, LanguageMetric::new(code_lines, comment_lines));
        self
    }

    pub fn get(&self, language: &str) -> Option<&LanguageMetric> {
        self.languages
            .iter()
            .find(|(name, _)| name == language)
            .map(|(_, metric)| metric)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> + '_ {
        self.languages.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LanguageMetric)> + '_ {
        self.languages.iter().map(|(name, metric)| (name.as_str(), metric))
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, LanguageMetric)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (S, LanguageMetric)>>(iter: I) -> Self {
        let mut snapshot = Snapshot::new();
        for (language, metric) in iter {
            snapshot.insert(language, metric);
        }
        snapshot
    }
}

/// A revision selected for sampling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub id: String,
    pub timestamp: Timestamp,
}

/// One output row: a point on the merged timeline and its column values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub timestamp: Timestamp,
    pub values: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    /// Repositories that contributed at least one snapshot, in collection order.
    pub repositories: Vec<String>,
    pub columns: Vec<String>,
    pub rows: Vec<SeriesRow>,
}

impl Series {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repositories: Vec<String>,
    pub by_language: bool,
    pub include_comments: bool,
    pub sparse: bool,
    pub since: Option<String>,
    pub until: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<SeriesRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub language: String,
    pub code_lines: u64,
    pub comment_lines: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository: String,
    pub revision: String,
    pub timestamp: Timestamp,
    pub languages: Vec<SnapshotEntry>,
}

#[derive(Debug, Clone)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new() -> Self {
        Self { since: None, until: None }
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn contains(&self, timestamp: Timestamp) -> bool {
        if let Some(since) = self.since {
            if timestamp < since.timestamp() {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp > until.timestamp() {
                return false;
            }
        }
        true
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::new()
    }
}
