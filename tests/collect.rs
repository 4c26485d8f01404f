use loctrend::cache::Cache;
use loctrend::collect::{collect_timeline, CollectOptions};
use loctrend::error::{LoctrendError, Result};
use loctrend::git::GitRepo;
use loctrend::metrics::MetricsTool;
use loctrend::model::{DateRange, LanguageMetric, Snapshot};
use std::cell::Cell;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tempfile::tempdir;

const DAY: i64 = 86_400;
const BASE: i64 = 1_700_000_000 - 1_700_000_000 % DAY;

fn has_git() -> bool {
    Command::new("git").arg("--version").output().is_ok()
}

fn git(dir: &Path, args: &[&str], date: Option<i64>) {
    let mut cmd = Command::new("git");
    cmd.args(args).current_dir(dir);
    if let Some(ts) = date {
        let stamp = format!("@{ts} +0000");
        cmd.env("GIT_AUTHOR_DATE", &stamp).env("GIT_COMMITTER_DATE", &stamp);
    }
    assert!(cmd.status().unwrap().success());
}

/// Runs git with `input` on stdin and returns its trimmed stdout.
fn git_output(dir: &Path, args: &[&str], input: &str) -> String {
    let mut child = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_DATE", format!("@{BASE} +0000"))
        .env("GIT_COMMITTER_DATE", format!("@{BASE} +0000"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

fn init_git_repo(dir: &Path) {
    git(dir, &["init", "--quiet"], None);
    git(dir, &["config", "core.autocrlf", "false"], None);
    git(dir, &["config", "user.email", "you@example.com"], None);
    git(dir, &["config", "user.name", "Your Name"], None);
}

fn commit_file(dir: &Path, name: &str, content: &str, timestamp: i64) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    git(dir, &["add", "."], None);
    git(dir, &["commit", "--quiet", "-m", &format!("add {name}")], Some(timestamp));
}

/// Counts `//` lines as comments and every other non-blank line as code,
/// keyed by file extension.
#[derive(Default)]
struct LineCounter {
    calls: Cell<usize>,
}

impl LineCounter {
    fn walk(dir: &Path, snapshot: &mut Snapshot) -> Result<()> {
        let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
        entries.sort_by_key(|e| e.file_name());
        for entry in entries {
            let path = entry.path();
            if path.is_dir() {
                Self::walk(&path, snapshot)?;
                continue;
            }
            let language = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("none")
                .to_string();
            let text = fs::read_to_string(&path)?;
            let mut metric = snapshot.get(&language).copied().unwrap_or_default();
            for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                if line.starts_with("//") {
                    metric.comment_lines += 1;
                } else {
                    metric.code_lines += 1;
                }
            }
            snapshot.insert(language, metric);
        }
        Ok(())
    }
}

impl MetricsTool for LineCounter {
    fn name(&self) -> &str {
        "line-counter"
    }

    fn measure(&self, dir: &Path) -> Result<Snapshot> {
        self.calls.set(self.calls.get() + 1);
        let mut snapshot = Snapshot::new();
        Self::walk(dir, &mut snapshot)?;
        Ok(snapshot)
    }
}

struct Broken;

impl MetricsTool for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn measure(&self, _dir: &Path) -> Result<Snapshot> {
        Err(LoctrendError::Tool("broken tool".to_string()))
    }
}

fn options(sparse: bool, skip_failed: bool) -> CollectOptions {
    CollectOptions {
        rev: "HEAD".to_string(),
        range: DateRange::new(),
        sparse,
        skip_failed,
        progress: false,
    }
}

fn sample_repo(dir: &Path) {
    init_git_repo(dir);
    commit_file(dir, "src/main.rs", "// entry\nfn main() {}\n", BASE + 10 * 3_600);
    commit_file(dir, "src/lib.rs", "pub fn a() {}\n\npub fn b() {}\n", BASE + 12 * 3_600);
    commit_file(dir, "tools/gen.py", "print(1)\n", BASE + 2 * DAY);
}

#[test]
fn collects_every_first_parent_revision() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    sample_repo(dir.path());
    let repo = GitRepo::open(Some(dir.path())).unwrap();

    let tool = LineCounter::default();
    let timeline = collect_timeline("sample", &repo, &tool, None, &options(false, false)).unwrap();

    let timestamps: Vec<_> = timeline.timestamps().collect();
    assert_eq!(timestamps, vec![BASE + 10 * 3_600, BASE + 12 * 3_600, BASE + 2 * DAY]);

    let (_, last) = timeline.last().unwrap();
    assert_eq!(last.get("rs"), Some(&LanguageMetric::new(3, 1)));
    assert_eq!(last.get("py"), Some(&LanguageMetric::new(1, 0)));
    assert_eq!(timeline.first().unwrap().1.get("py"), None);
}

#[test]
fn sparse_collection_keeps_first_commit_per_day() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    sample_repo(dir.path());
    let repo = GitRepo::open(Some(dir.path())).unwrap();

    let tool = LineCounter::default();
    let timeline = collect_timeline("sample", &repo, &tool, None, &options(true, false)).unwrap();
    let timestamps: Vec<_> = timeline.timestamps().collect();
    assert_eq!(timestamps, vec![BASE + 10 * 3_600, BASE + 2 * DAY]);
    assert_eq!(tool.calls.get(), 2);
}

#[test]
fn cached_snapshots_skip_the_tool() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    sample_repo(dir.path());
    let repo = GitRepo::open(Some(dir.path())).unwrap();
    let mut cache = Cache::in_memory().unwrap();

    let first = LineCounter::default();
    let fresh = collect_timeline("sample", &repo, &first, Some(&mut cache), &options(false, false)).unwrap();
    assert_eq!(first.calls.get(), 3);

    let second = LineCounter::default();
    let replayed =
        collect_timeline("sample", &repo, &second, Some(&mut cache), &options(false, false)).unwrap();
    assert_eq!(second.calls.get(), 0);
    assert_eq!(fresh, replayed);
}

#[test]
fn failing_tool_fails_repository_unless_skipping() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    sample_repo(dir.path());
    let repo = GitRepo::open(Some(dir.path())).unwrap();

    assert!(collect_timeline("sample", &repo, &Broken, None, &options(false, false)).is_err());
    let skipped = collect_timeline("sample", &repo, &Broken, None, &options(false, true)).unwrap();
    assert!(skipped.is_empty());
}

#[test]
fn materialize_writes_tree_of_revision() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    sample_repo(dir.path());
    let repo = GitRepo::open(Some(dir.path())).unwrap();

    let revisions = repo.revisions("HEAD", &DateRange::new()).unwrap();
    let out = tempdir().unwrap();
    let written = repo.materialize(&revisions[1].id, out.path()).unwrap();

    assert_eq!(written, 2);
    assert!(out.path().join("src/lib.rs").exists());
    assert!(!out.path().join("tools/gen.py").exists());
    assert_eq!(
        fs::read_to_string(out.path().join("src/main.rs")).unwrap(),
        "// entry\nfn main() {}\n"
    );
}

#[test]
fn date_range_limits_revisions() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    sample_repo(dir.path());
    let repo = GitRepo::open(Some(dir.path())).unwrap();

    let range = repo.resolve_range(Some("HEAD~1"), None).unwrap();
    let revisions = repo.revisions("HEAD", &range).unwrap();
    let timestamps: Vec<_> = revisions.iter().map(|r| r.timestamp).collect();
    assert_eq!(timestamps, vec![BASE + 12 * 3_600, BASE + 2 * DAY]);
}

#[test]
fn materialize_skips_paths_leaving_the_destination() {
    if !has_git() {
        return;
    }
    let dir = tempdir().unwrap();
    init_git_repo(dir.path());

    let blob = git_output(dir.path(), &["hash-object", "-w", "--stdin"], "escaped\n");
    let inner = git_output(dir.path(), &["mktree"], &format!("100644 blob {blob}\tescaped.txt\n"));
    let root = git_output(
        dir.path(),
        &["mktree"],
        &format!("040000 tree {inner}\t..\n100644 blob {blob}\tkept.txt\n"),
    );
    let commit = git_output(dir.path(), &["commit-tree", &root, "-m", "crafted"], "");

    let repo = GitRepo::open(Some(dir.path())).unwrap();
    let out = tempdir().unwrap();
    let scratch = out.path().join("scratch");
    fs::create_dir(&scratch).unwrap();

    let written = repo.materialize(&commit, &scratch).unwrap();
    assert_eq!(written, 1);
    assert!(scratch.join("kept.txt").exists());
    assert!(!out.path().join("escaped.txt").exists());
}
