use crate::model::{Snapshot, Timestamp};

/// Snapshots of one repository, ordered by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryTimeline {
    name: String,
    entries: Vec<(Timestamp, Snapshot)>,
}

impl RepositoryTimeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a snapshot. An out-of-order timestamp is placed after every
    /// entry with an equal or earlier timestamp, so the timeline stays sorted.
    pub fn push(&mut self, timestamp: Timestamp, snapshot: Snapshot) {
        let at = self.entries.partition_point(|(t, _)| *t <= timestamp);
        self.entries.insert(at, (timestamp, snapshot));
    }

    pub fn entries(&self) -> &[(Timestamp, Snapshot)] {
        &self.entries
    }

    pub fn timestamps(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.entries.iter().map(|(t, _)| *t)
    }

    pub fn first(&self) -> Option<&(Timestamp, Snapshot)> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&(Timestamp, Snapshot)> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All repository timelines of one run, in the order they were collected.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    timelines: Vec<RepositoryTimeline>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, timeline: RepositoryTimeline) {
        self.timelines.push(timeline);
    }

    pub fn timelines(&self) -> &[RepositoryTimeline] {
        &self.timelines
    }

    pub fn snapshot_count(&self) -> usize {
        self.timelines.iter().map(RepositoryTimeline::len).sum()
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }
}

impl FromIterator<RepositoryTimeline> for SnapshotStore {
    fn from_iter<I: IntoIterator<Item = RepositoryTimeline>>(iter: I) -> Self {
        Self {
            timelines: iter.into_iter().collect(),
        }
    }
}
