use super::{output_csv, output_json, output_ndjson, output_table};
use crate::cli::{CommonArgs, OutputArgs};
use crate::collect::{collect_timeline, CollectOptions};
use crate::git::repository_label;
use crate::metrics::ExternalTool;
use crate::sources::{repository_specs, unique_label, Source};
use crate::timeline::{build_series, RepositoryTimeline, SeriesOptions, SnapshotStore};
use anyhow::Context;
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct SeriesArgs {
    pub sparse: bool,
    pub by_language: bool,
    pub include_comments: bool,
    pub skip_failed: bool,
    pub output: OutputArgs,
}

impl SeriesArgs {
    pub fn options(&self) -> SeriesOptions {
        SeriesOptions {
            sparse: self.sparse,
            by_language: self.by_language,
            include_comments: self.include_comments,
        }
    }
}

pub fn exec(common: CommonArgs, args: SeriesArgs) -> anyhow::Result<()> {
    let tool = ExternalTool::new(common.tool, common.tool_path.clone());
    let mut store = SnapshotStore::new();
    let mut seen = HashMap::new();

    for spec in repository_specs(&common) {
        let label = unique_label(&repository_label(&spec), &mut seen);
        match collect_source(&spec, &label, &tool, &common, &args) {
            Ok(timeline) => {
                info!(repository = timeline.name(), snapshots = timeline.len(), "repository collected");
                store.insert(timeline);
            }
            Err(e) => {
                let error = format!("{e:#}");
                warn!(repository = %spec, %error, "excluding repository");
            }
        }
    }

    let series = build_series(&store, args.options());

    if args.output.json {
        output_json(&series, &common, args.options())?;
    } else if args.output.ndjson {
        output_ndjson(&series)?;
    } else if args.output.csv {
        output_csv(&series)?;
    } else {
        output_table(&series)?;
    }

    Ok(())
}

fn collect_source(
    spec: &str,
    label: &str,
    tool: &ExternalTool,
    common: &CommonArgs,
    args: &SeriesArgs,
) -> anyhow::Result<RepositoryTimeline> {
    let source = Source::open(spec).context("Failed to open git repository")?;
    let range = source
        .repo
        .resolve_range(common.since.as_deref(), common.until.as_deref())
        .context("Failed to resolve date range")?;
    let mut cache = source.cache(common).context("Failed to initialize cache")?;

    let options = CollectOptions {
        rev: common.rev.clone(),
        range,
        sparse: args.sparse,
        skip_failed: args.skip_failed,
        progress: !common.quiet,
    };

    collect_timeline(label, &source.repo, tool, cache.as_mut(), &options)
        .with_context(|| format!("Failed to collect snapshots of {}", source.spec))
}
