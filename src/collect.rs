use crate::cache::Cache;
use crate::error::Result;
use crate::git::GitRepo;
use crate::metrics::MetricsTool;
use crate::model::{DateRange, Revision, Snapshot};
use crate::timeline::{sparsify, RepositoryTimeline};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub rev: String,
    pub range: DateRange,
    pub sparse: bool,
    /// Drop a failed point instead of failing the whole repository.
    pub skip_failed: bool,
    pub progress: bool,
}

/// Samples the history of `repo` into a timeline named `name`.
pub fn collect_timeline(
    name: &str,
    repo: &GitRepo,
    tool: &dyn MetricsTool,
    mut cache: Option<&mut Cache>,
    options: &CollectOptions,
) -> Result<RepositoryTimeline> {
    let mut revisions = repo.revisions(&options.rev, &options.range)?;
    if options.sparse {
        revisions = sparsify(revisions, |r| r.timestamp);
    }

    let pb = progress_bar(name, revisions.len() as u64, options.progress);
    let mut timeline = RepositoryTimeline::new(name);
    let mut cached = 0usize;

    for revision in &revisions {
        let from_cache = match cache.as_deref() {
            Some(cache) => cache.get_snapshot(&revision.id, tool.name())?,
            None => None,
        };

        let snapshot = match from_cache {
            Some(snapshot) => {
                cached += 1;
                snapshot
            }
            None => match capture(repo, tool, revision) {
                Ok(snapshot) => {
                    if let Some(cache) = cache.as_deref_mut() {
                        cache.store_snapshot(&revision.id, tool.name(), &snapshot)?;
                    }
                    snapshot
                }
                Err(e) if options.skip_failed => {
                    warn!(repository = name, revision = %revision.id, error = %e, "skipping revision");
                    pb.inc(1);
                    continue;
                }
                Err(e) => {
                    pb.abandon();
                    return Err(e);
                }
            },
        };

        timeline.push(revision.timestamp, snapshot);
        pb.inc(1);
    }

    pb.finish_and_clear();
    debug!(
        repository = name,
        revisions = revisions.len(),
        snapshots = timeline.len(),
        cached,
        "collected timeline"
    );
    Ok(timeline)
}

/// Measures one revision in a scratch directory.
pub fn capture(repo: &GitRepo, tool: &dyn MetricsTool, revision: &Revision) -> Result<Snapshot> {
    let scratch = tempfile::tempdir()?;
    let files = repo.materialize(&revision.id, scratch.path())?;
    debug!(revision = %revision.id, files, "materialized tree");
    tool.measure(scratch.path())
}

fn progress_bar(name: &str, len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message(name.to_string());
    pb
}
