use crate::cli::CommonArgs;
use crate::collect::capture;
use crate::metrics::{ExternalTool, MetricsTool};
use crate::model::{SnapshotEntry, SnapshotOutput, SCHEMA_VERSION};
use crate::sources::{repository_specs, Source};
use crate::util::format_day;
use anyhow::Context;
use chrono::Utc;
use console::style;
use tracing::warn;

pub fn exec(common: CommonArgs, json: bool) -> anyhow::Result<()> {
    let tool = ExternalTool::new(common.tool, common.tool_path.clone());

    let mut outputs = Vec::new();
    for spec in repository_specs(&common) {
        match measure_tip(&spec, &tool, &common) {
            Ok(output) => outputs.push(output),
            Err(e) => {
                let error = format!("{e:#}");
                warn!(repository = %spec, %error, "excluding repository");
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else {
        output_summary(&outputs);
    }
    Ok(())
}

fn measure_tip(spec: &str, tool: &ExternalTool, common: &CommonArgs) -> anyhow::Result<SnapshotOutput> {
    let source = Source::open(spec).context("Failed to open git repository")?;
    let tip = source
        .repo
        .tip(&common.rev)
        .with_context(|| format!("Failed to resolve {}", common.rev))?;
    let mut cache = source.cache(common).context("Failed to initialize cache")?;

    let cached = match cache.as_ref() {
        Some(cache) => cache
            .get_snapshot(&tip.id, tool.name())
            .context("Failed to read snapshot cache")?,
        None => None,
    };
    let snapshot = match cached {
        Some(snapshot) => snapshot,
        None => {
            let snapshot = capture(&source.repo, tool, &tip)
                .with_context(|| format!("Failed to measure {}", tip.id))?;
            if let Some(cache) = cache.as_mut() {
                cache
                    .store_snapshot(&tip.id, tool.name(), &snapshot)
                    .context("Failed to store snapshot in cache")?;
            }
            snapshot
        }
    };

    Ok(SnapshotOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository: source.label.clone(),
        revision: tip.id,
        timestamp: tip.timestamp,
        languages: snapshot
            .iter()
            .map(|(language, metric)| SnapshotEntry {
                language: language.to_string(),
                code_lines: metric.code_lines,
                comment_lines: metric.comment_lines,
            })
            .collect(),
    })
}

fn output_summary(outputs: &[SnapshotOutput]) {
    if outputs.is_empty() {
        println!("No data to display");
        return;
    }

    for output in outputs {
        println!(
            "{} {} {}",
            style(&output.repository).bold(),
            style(output.revision.chars().take(8).collect::<String>()).dim(),
            style(format_day(output.timestamp)).dim()
        );
        println!("{:<24} {:>10} {:>10}", "Language", "Code", "Comments");
        println!("{}", "─".repeat(46));

        let mut languages: Vec<&SnapshotEntry> = output.languages.iter().collect();
        languages.sort_by(|a, b| b.code_lines.cmp(&a.code_lines));
        for entry in &languages {
            println!(
                "{:<24} {:>10} {:>10}",
                entry.language, entry.code_lines, entry.comment_lines
            );
        }

        let code: u64 = languages.iter().map(|e| e.code_lines).sum();
        let comments: u64 = languages.iter().map(|e| e.comment_lines).sum();
        println!(
            "{:<24} {:>10} {:>10}\n",
            style("Total").bold(),
            style(code).green(),
            style(comments).blue()
        );
    }
}
