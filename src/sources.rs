use crate::cache::Cache;
use crate::cli::CommonArgs;
use crate::error::Result;
use crate::git::{is_remote, repository_label, GitRepo};
use std::collections::HashMap;
use tempfile::TempDir;
use tracing::info;

/// An opened repository and, for remote ones, the clone that backs it.
pub struct Source {
    pub label: String,
    pub spec: String,
    pub repo: GitRepo,
    clone_dir: Option<TempDir>,
}

impl Source {
    pub fn open(spec: &str) -> Result<Self> {
        let (repo, clone_dir) = if is_remote(spec) {
            let dir = tempfile::tempdir()?;
            info!(url = spec, "cloning repository");
            (GitRepo::clone_remote(spec, dir.path())?, Some(dir))
        } else {
            (GitRepo::open(Some(spec))?, None)
        };

        Ok(Self {
            label: repository_label(spec),
            spec: spec.to_string(),
            repo,
            clone_dir,
        })
    }

    pub fn is_clone(&self) -> bool {
        self.clone_dir.is_some()
    }

    /// Cache for this source. Clones only get one when `--cache` names a directory.
    pub fn cache(&self, common: &CommonArgs) -> Result<Option<Cache>> {
        if common.no_cache || (self.is_clone() && common.cache.is_none()) {
            return Ok(None);
        }
        Cache::new(common.cache.as_deref(), self.repo.path()).map(Some)
    }
}

/// Repository arguments, with the current directory when none were given.
pub fn repository_specs(common: &CommonArgs) -> Vec<String> {
    if common.repos.is_empty() {
        vec![".".to_string()]
    } else {
        common.repos.clone()
    }
}

/// Appends `#2`, `#3`, ... to labels that repeat so every repository keeps
/// its own column of state.
pub fn unique_label(label: &str, seen: &mut HashMap<String, usize>) -> String {
    let count = seen.entry(label.to_string()).or_insert(0);
    *count += 1;
    if *count == 1 {
        label.to_string()
    } else {
        format!("{label}#{count}")
    }
}
