use super::sparse::sparsify;
use super::store::{RepositoryTimeline, SnapshotStore};
use crate::model::{Snapshot, Timestamp};

/// Union of every repository's timestamps, optionally one per calendar day.
#[derive(Debug, Clone)]
pub struct MergedTimeline<'a> {
    points: Vec<Timestamp>,
    timelines: Vec<&'a RepositoryTimeline>,
}

/// Builds the merged timeline. Repositories without snapshots take no part.
pub fn merge(store: &SnapshotStore, sparse: bool) -> MergedTimeline<'_> {
    let timelines: Vec<&RepositoryTimeline> =
        store.timelines().iter().filter(|t| !t.is_empty()).collect();

    let mut points: Vec<Timestamp> = timelines.iter().flat_map(|t| t.timestamps()).collect();
    points.sort_unstable();
    points.dedup();
    if sparse {
        points = sparsify(points, |t| *t);
    }

    MergedTimeline { points, timelines }
}

impl<'a> MergedTimeline<'a> {
    pub fn points(&self) -> &[Timestamp] {
        &self.points
    }

    pub fn repositories(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.timelines.iter().map(|&t| t.name())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Walks the timeline in ascending order, yielding the state of every
    /// repository at each point. Each repository timeline is read once.
    pub fn states(&self) -> StateWalk<'a, '_> {
        StateWalk {
            points: self.points.iter(),
            cursors: self.timelines.iter().map(|&t| Cursor::new(t)).collect(),
        }
    }

    /// State at an arbitrary timestamp, independent of the merged points.
    pub fn state_at(&self, timestamp: Timestamp) -> CurrentStateVector<'a> {
        let states = self
            .timelines
            .iter()
            .map(|&t| {
                let entries = t.entries();
                let consumed = entries.partition_point(|(ts, _)| *ts <= timestamp);
                let current = consumed.checked_sub(1).map(|i| &entries[i].1);
                (t.name(), current)
            })
            .collect();
        CurrentStateVector { states }
    }
}

/// Forward-only position inside one repository timeline.
#[derive(Debug, Clone)]
struct Cursor<'a> {
    name: &'a str,
    entries: &'a [(Timestamp, Snapshot)],
    next: usize,
    current: Option<&'a Snapshot>,
}

impl<'a> Cursor<'a> {
    fn new(timeline: &'a RepositoryTimeline) -> Self {
        Self {
            name: timeline.name(),
            entries: timeline.entries(),
            next: 0,
            current: None,
        }
    }

    fn advance_to(&mut self, timestamp: Timestamp) {
        while let Some((ts, snapshot)) = self.entries.get(self.next) {
            if *ts > timestamp {
                break;
            }
            self.current = Some(snapshot);
            self.next += 1;
        }
    }
}

pub struct StateWalk<'a, 'm> {
    points: std::slice::Iter<'m, Timestamp>,
    cursors: Vec<Cursor<'a>>,
}

impl<'a> Iterator for StateWalk<'a, '_> {
    type Item = (Timestamp, CurrentStateVector<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let timestamp = *self.points.next()?;
        for cursor in &mut self.cursors {
            cursor.advance_to(timestamp);
        }
        let states = self.cursors.iter().map(|c| (c.name, c.current)).collect();
        Some((timestamp, CurrentStateVector { states }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.points.size_hint()
    }
}

impl ExactSizeIterator for StateWalk<'_, '_> {}

/// Latest snapshot at or before a point, per repository. `None` means the
/// repository has not started yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentStateVector<'a> {
    states: Vec<(&'a str, Option<&'a Snapshot>)>,
}

impl<'a> CurrentStateVector<'a> {
    pub fn get(&self, repository: &str) -> Option<&'a Snapshot> {
        self.states
            .iter()
            .find(|(name, _)| *name == repository)
            .and_then(|(_, snapshot)| *snapshot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, Option<&'a Snapshot>)> + '_ {
        self.states.iter().copied()
    }

    pub fn present(&self) -> impl Iterator<Item = &'a Snapshot> + '_ {
        self.states.iter().filter_map(|(_, snapshot)| *snapshot)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
