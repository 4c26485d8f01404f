use super::store::SnapshotStore;
use std::collections::HashSet;

/// Ordered set of language names, most recently discovered first.
///
/// Languages are never removed. Registering a known language does not move it.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    discovered: Vec<String>,
    known: HashSet<String>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans every snapshot: repository order, then timestamp order, then the
    /// tool's language order.
    pub fn from_store(store: &SnapshotStore) -> Self {
        let mut registry = Self::new();
        for timeline in store.timelines() {
            for (_, snapshot) in timeline.entries() {
                for language in snapshot.languages() {
                    registry.register(language);
                }
            }
        }
        registry
    }

    /// Returns `true` if `language` was not known before.
    pub fn register(&mut self, language: &str) -> bool {
        if self.known.contains(language) {
            return false;
        }
        self.known.insert(language.to_string());
        self.discovered.push(language.to_string());
        true
    }

    pub fn contains(&self, language: &str) -> bool {
        self.known.contains(language)
    }

    pub fn ordered_languages(&self) -> Vec<String> {
        self.discovered.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.discovered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discovered.is_empty()
    }
}
