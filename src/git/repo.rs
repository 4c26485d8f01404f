use crate::error::{LoctrendError, Result};
use crate::model::{DateRange, Revision};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gix::{discover, ObjectId, Repository};
use std::path::{Component, Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::debug;

pub struct GitRepo {
    repo: Repository,
    path: PathBuf,
}

impl GitRepo {
    /// Open a repository at `path`, or current dir if `None`
    pub fn open<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let repo_path = path
            .map(|p| p.as_ref().to_path_buf())
            .unwrap_or(std::env::current_dir()?);

        let repo = discover(&repo_path)?;
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
        debug!(path = %path.display(), "opened repository");

        Ok(Self { repo, path })
    }

    /// Clone `url` into `dest` with the git executable and open the result.
    pub fn clone_remote(url: &str, dest: &Path) -> Result<Self> {
        let output = Command::new("git")
            .args(["clone", "--quiet", "--no-checkout", url])
            .arg(dest)
            .output()?;

        if !output.status.success() {
            return Err(LoctrendError::GitRepo(format!(
                "git clone {url} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Self::open(Some(dest))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn resolve_range(&self, since: Option<&str>, until: Option<&str>) -> Result<DateRange> {
        let mut range = DateRange::new();

        let since_dt = if let Some(s) = since {
            Some(self.parse_commit_or_date(s)?)
        } else {
            None
        };

        let until_dt = if let Some(u) = until {
            Some(self.parse_commit_or_date(u)?)
        } else {
            None
        };

        if let (Some(s), Some(u)) = (since_dt, until_dt) {
            if s > u {
                return Err(LoctrendError::InvalidDate(format!(
                    "Invalid range: since ({}) is after until ({})",
                    s, u
                )));
            }
        }

        if let Some(s) = since_dt {
            range = range.with_since(s);
        }
        if let Some(u) = until_dt {
            range = range.with_until(u);
        }

        Ok(range)
    }

    fn parse_commit_or_date(&self, input: &str) -> Result<DateTime<Utc>> {
        if let Some(dt) = parse_date(input)? {
            return Ok(dt);
        }

        let commit = self.resolve_commit(input)?;
        let secs = commit.time()?.seconds;
        DateTime::<Utc>::from_timestamp(secs, 0)
            .ok_or_else(|| LoctrendError::InvalidDate(format!("Invalid timestamp: {secs}")))
    }

    fn resolve_commit(&self, rev: &str) -> Result<gix::Commit<'_>> {
        let id = self
            .repo
            .rev_parse_single(rev)
            .map_err(|e| LoctrendError::Parse(format!("Invalid commit or date '{rev}': {e}")))?;

        id.object()?
            .try_into_commit()
            .map_err(|_| LoctrendError::Parse(format!("Not a commit: {rev}")))
    }

    /// The commit `rev` points at.
    pub fn tip(&self, rev: &str) -> Result<Revision> {
        let commit = self.resolve_commit(rev)?;
        Ok(Revision {
            id: commit.id.to_string(),
            timestamp: commit.time()?.seconds,
        })
    }

    /// First-parent history of `rev` inside `range`, oldest first.
    pub fn revisions(&self, rev: &str, range: &DateRange) -> Result<Vec<Revision>> {
        let mut commit = self.resolve_commit(rev)?;
        let mut revisions = Vec::new();

        loop {
            let timestamp = commit.time()?.seconds;
            if range.contains(timestamp) {
                revisions.push(Revision {
                    id: commit.id.to_string(),
                    timestamp,
                });
            }

            let parent: Option<ObjectId> = commit.parent_ids().next().map(|id| id.into());
            match parent {
                Some(parent_id) => commit = self.repo.find_commit(parent_id)?,
                None => break,
            }
        }

        revisions.reverse();
        // Commit dates on the first-parent chain are not guaranteed to be monotonic.
        revisions.sort_by_key(|r| r.timestamp);
        debug!(path = %self.path.display(), count = revisions.len(), "enumerated revisions");
        Ok(revisions)
    }

    /// Write the files of `revision` into `dest`. Symlinks, submodules and
    /// entries whose path would leave `dest` are skipped. Returns the number
    /// of files written.
    pub fn materialize(&self, revision: &str, dest: &Path) -> Result<usize> {
        let oid = ObjectId::from_hex(revision.as_bytes())
            .map_err(|e| LoctrendError::Parse(format!("Invalid commit ID: {e}")))?;
        let tree = self.repo.find_commit(oid)?.tree()?;

        let mut recorder = gix::traverse::tree::Recorder::default();
        tree.traverse().breadthfirst(&mut recorder)?;

        let mut written = 0;
        for entry in recorder.records {
            if !entry.mode.is_blob() {
                continue;
            }
            let Ok(relative) = std::str::from_utf8(&entry.filepath) else {
                debug!(revision, "skipping non-UTF-8 path");
                continue;
            };
            if !is_checkout_path(relative) {
                debug!(revision, path = relative, "skipping unsafe path");
                continue;
            }

            let target = dest.join(relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let object = self.repo.find_object(entry.oid)?;
            std::fs::write(&target, &object.data)?;
            written += 1;
        }

        Ok(written)
    }
}

/// Whether a tree path stays inside the checkout: relative, made of plain
/// names only, and never touching a `.git` directory.
fn is_checkout_path(relative: &str) -> bool {
    let plain_names = relative.split('/').all(|name| {
        !name.is_empty() && name != "." && name != ".." && !name.eq_ignore_ascii_case(".git")
    });
    plain_names
        && Path::new(relative)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

fn parse_date(input: &str) -> Result<Option<DateTime<Utc>>> {
    // RFC3339
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    // YYYY-MM-DD
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(datetime) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(Utc.from_utc_datetime(&datetime)));
        }
    }

    // Relative duration (e.g. "2 weeks ago")
    if let Some(duration) = parse_natural_duration(input)? {
        let target = chrono::Duration::from_std(duration)
            .ok()
            .and_then(|d| Utc::now().checked_sub_signed(d))
            .ok_or_else(|| LoctrendError::InvalidDate(format!("Duration overflow for '{input}'")))?;
        return Ok(Some(target));
    }

    Ok(None)
}

fn parse_natural_duration(input: &str) -> Result<Option<Duration>> {
    let input = input.trim().to_lowercase();

    let units = [
        (" days ago", 86_400),
        (" weeks ago", 7 * 86_400),
        (" months ago", 30 * 86_400),
        (" years ago", 365 * 86_400),
    ];
    for (suffix, seconds) in units {
        if let Some(count) = input.strip_suffix(suffix) {
            if let Ok(n) = count.trim().parse::<u64>() {
                return n
                    .checked_mul(seconds)
                    .map(|secs| Some(Duration::from_secs(secs)))
                    .ok_or_else(|| {
                        LoctrendError::InvalidDate(format!("Duration overflow for '{input}'"))
                    });
            }
        }
    }

    Ok(None)
}

/// Human label for a repository argument: the last path or URL segment.
pub fn repository_label(spec: &str) -> String {
    let trimmed = spec.trim_end_matches(['/', '\\']);
    let last = trimmed
        .rsplit(['/', '\\', ':'])
        .next()
        .unwrap_or(trimmed);
    let last = last.strip_suffix(".git").unwrap_or(last);
    if last.is_empty() || last == "." {
        spec.to_string()
    } else {
        last.to_string()
    }
}

pub fn is_remote(spec: &str) -> bool {
    spec.contains("://") || (spec.starts_with("git@") && spec.contains(':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_durations() {
        assert_eq!(
            parse_natural_duration("3 days ago").unwrap(),
            Some(Duration::from_secs(3 * 86_400))
        );
        assert_eq!(
            parse_natural_duration(" 2 Weeks ago ").unwrap(),
            Some(Duration::from_secs(14 * 86_400))
        );
        assert_eq!(parse_natural_duration("soon").unwrap(), None);
    }

    #[test]
    fn oversized_durations_are_invalid_dates() {
        assert!(matches!(
            parse_natural_duration("99999999999999999 years ago"),
            Err(LoctrendError::InvalidDate(_))
        ));
        // Fits in seconds but lies before the earliest representable date.
        assert!(matches!(
            parse_date("9999999 years ago"),
            Err(LoctrendError::InvalidDate(_))
        ));
        assert!(parse_date("5 days ago").unwrap().is_some());
    }

    #[test]
    fn checkout_paths_stay_inside_destination() {
        assert!(is_checkout_path("src/main.rs"));
        assert!(is_checkout_path(".github/workflows/ci.yml"));
        assert!(!is_checkout_path("../escaped.txt"));
        assert!(!is_checkout_path("src/../../escaped.txt"));
        assert!(!is_checkout_path("/etc/passwd"));
        assert!(!is_checkout_path("./a"));
        assert!(!is_checkout_path("a//b"));
        assert!(!is_checkout_path(".git/config"));
        assert!(!is_checkout_path("nested/.GIT/hooks/post-checkout"));
    }

    #[test]
    fn parses_absolute_dates() {
        let day = parse_date("2024-03-01").unwrap().unwrap();
        assert_eq!(day.timestamp(), 1_709_251_200);
        let rfc = parse_date("2024-03-01T12:00:00+02:00").unwrap().unwrap();
        assert_eq!(rfc.timestamp(), 1_709_287_200);
        assert!(parse_date("main").unwrap().is_none());
    }

    #[test]
    fn labels_paths_and_urls() {
        assert_eq!(repository_label("/home/me/src/project/"), "project");
        assert_eq!(repository_label("https://github.com/acme/widget.git"), "widget");
        assert_eq!(repository_label("git@github.com:acme/gadget.git"), "gadget");
        assert_eq!(repository_label("."), ".");
    }

    #[test]
    fn detects_remote_specs() {
        assert!(is_remote("https://example.com/a.git"));
        assert!(is_remote("git@example.com:a/b.git"));
        assert!(!is_remote("../local/repo"));
    }
}
