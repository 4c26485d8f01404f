use super::{scc, tokei, MetricsTool};
use crate::error::{LoctrendError, Result};
use crate::model::Snapshot;
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToolKind {
    Scc,
    Tokei,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Scc => "scc",
            ToolKind::Tokei => "tokei",
        }
    }

    fn json_args(&self) -> [&'static str; 2] {
        match self {
            ToolKind::Scc => ["--format", "json"],
            ToolKind::Tokei => ["--output", "json"],
        }
    }

    fn parse(&self, output: &[u8]) -> Result<Snapshot> {
        match self {
            ToolKind::Scc => scc::parse(output),
            ToolKind::Tokei => tokei::parse(output),
        }
    }
}

/// A line counter run as a child process on a materialized tree.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    kind: ToolKind,
    program: PathBuf,
}

impl ExternalTool {
    pub fn new(kind: ToolKind, program: Option<PathBuf>) -> Self {
        Self {
            kind,
            program: program.unwrap_or_else(|| PathBuf::from(kind.name())),
        }
    }
}

impl MetricsTool for ExternalTool {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn measure(&self, dir: &Path) -> Result<Snapshot> {
        let output = Command::new(&self.program)
            .args(self.kind.json_args())
            .arg(dir)
            .output()
            .map_err(|e| {
                LoctrendError::Tool(format!("cannot run {}: {e}", self.program.display()))
            })?;

        if !output.status.success() {
            return Err(LoctrendError::Tool(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let snapshot = self.kind.parse(&output.stdout)?;
        debug!(tool = self.name(), languages = snapshot.len(), "measured tree");
        Ok(snapshot)
    }
}
