use crate::metrics::ToolKind;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "loctrend")]
#[command(about = "Track lines of code and comments across the history of git repositories")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(
        long = "repo",
        value_name = "PATH|URL",
        help = "Repository to analyze (repeatable, defaults to the current directory)"
    )]
    pub repos: Vec<String>,

    #[arg(long, default_value = "HEAD", help = "Revision whose history is sampled")]
    pub rev: String,

    #[arg(long, help = "Directory for the snapshot cache database")]
    pub cache: Option<PathBuf>,

    #[arg(long, help = "Do not read or write the snapshot cache", default_value_t = false)]
    pub no_cache: bool,

    #[arg(long, help = "Start from this commit or date (RFC3339, YYYY-MM-DD, or natural language)")]
    pub since: Option<String>,

    #[arg(long, help = "End at this commit or date (RFC3339, YYYY-MM-DD, or natural language)")]
    pub until: Option<String>,

    #[arg(long, value_enum, default_value_t = ToolKind::Scc, help = "Line counting tool")]
    pub tool: ToolKind,

    #[arg(long, value_name = "PROGRAM", help = "Path to the line counting executable")]
    pub tool_path: Option<PathBuf>,

    #[arg(long, short, help = "Hide progress bars", default_value_t = false)]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct OutputArgs {
    #[arg(long, help = "Output as JSON")]
    pub json: bool,

    #[arg(long, help = "Output as NDJSON", conflicts_with = "json")]
    pub ndjson: bool,

    #[arg(long, help = "Output as CSV", conflicts_with_all = ["json", "ndjson"])]
    pub csv: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Line counts over time, one row per sampled point
    Series {
        #[arg(long, help = "Keep at most one point per calendar day")]
        sparse: bool,

        #[arg(long, help = "One column per language instead of totals")]
        by_language: bool,

        #[arg(long, help = "Count code lines only")]
        no_comments: bool,

        #[arg(long, help = "Skip revisions that fail to measure instead of dropping the repository")]
        skip_failed: bool,

        #[clap(flatten)]
        output: OutputArgs,
    },
    /// Per-language line counts at the tip revision
    Snapshot {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Series {
                sparse,
                by_language,
                no_comments,
                skip_failed,
                output,
            } => {
                let options = crate::series::SeriesArgs {
                    sparse,
                    by_language,
                    include_comments: !no_comments,
                    skip_failed,
                    output,
                };
                crate::series::exec(self.common, options)
            }
            Commands::Snapshot { json } => crate::snapshot::exec(self.common, json),
        }
    }
}
