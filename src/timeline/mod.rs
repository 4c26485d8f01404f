//! Aligning independently sampled repository histories on one timeline.
//!
//! Every repository contributes a [`RepositoryTimeline`] of snapshots. The
//! merged timeline is the union of their timestamps; at each point every
//! repository is represented by its latest snapshot at or before that point,
//! and the [`Aggregator`] folds those snapshots into one output row.

pub mod aggregate;
pub mod languages;
pub mod merge;
pub mod sparse;
pub mod store;

pub use aggregate::{AggregationMode, Aggregator};
pub use languages::LanguageRegistry;
pub use merge::{merge, CurrentStateVector, MergedTimeline, StateWalk};
pub use sparse::{day_index, sparsify, Sparsifier, SECONDS_PER_DAY};
pub use store::{RepositoryTimeline, SnapshotStore};

use crate::model::Series;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeriesOptions {
    pub sparse: bool,
    pub by_language: bool,
    pub include_comments: bool,
}

impl SeriesOptions {
    pub fn mode(&self) -> AggregationMode {
        if self.by_language {
            AggregationMode::ByLanguage
        } else {
            AggregationMode::Total
        }
    }
}

/// Merges every timeline in `store` and aggregates one row per merged point.
pub fn build_series(store: &SnapshotStore, options: SeriesOptions) -> Series {
    let languages = LanguageRegistry::from_store(store).ordered_languages();
    let aggregator = Aggregator::new(options.mode(), options.include_comments, languages);
    let merged = merge(store, options.sparse);

    debug!(
        repositories = store.len(),
        snapshots = store.snapshot_count(),
        points = merged.len(),
        "merged repository timelines"
    );

    Series {
        repositories: merged.repositories().map(str::to_string).collect(),
        columns: aggregator.columns(),
        rows: aggregator.rows(&merged),
    }
}
