//! Shared fixtures for tests that need a real git repository.
//!
//! Requires `git` in PATH. Commits get fixed author/committer dates so history is
//! reproducible regardless of when the test runs.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

pub(crate) struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Empty repository on branch `main`.
    pub fn init() -> Self {
        let dir = tempfile::Builder::new().prefix("ccount-fixture-").tempdir().unwrap();
        let repo = Self { dir };
        repo.git(&["init", "--quiet"]);
        repo.git(&["symbolic-ref", "HEAD", "refs/heads/main"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run git with a fixed identity; panics with stderr on failure.
    pub fn git(&self, args: &[&str]) -> String {
        self.git_with_date(args, None)
    }

    fn git_with_date(&self, args: &[&str], date: Option<&str>) -> String {
        let mut cmd = Command::new("git");
        cmd.args(["-c", "user.name=Fixture", "-c", "user.email=fixture@example.com"])
            .args(["-c", "commit.gpgsign=false", "-c", "core.hooksPath=/dev/null"])
            .args(args)
            .current_dir(self.path())
            .env("GIT_CONFIG_NOSYSTEM", "1");
        if let Some(date) = date {
            cmd.env("GIT_AUTHOR_DATE", date).env("GIT_COMMITTER_DATE", date);
        }
        let output = cmd.output().expect("git must be installed for these tests");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Write `file`, commit it at `date` (ISO 8601 with offset), return the new commit id.
    pub fn commit_file(&self, file: &str, content: &str, message: &str, date: &str) -> String {
        let path = self.path().join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        self.git(&["add", file]);
        self.git_with_date(&["commit", "--quiet", "-m", message], Some(date));
        self.git(&["rev-parse", "HEAD"])
    }

    /// Commit a `count.json` report claiming `code` lines of Python.
    ///
    /// Paired with a `cat count.json` counter this stands in for tokei.
    pub fn commit_python_count(&self, code: u64, message: &str, date: &str) -> String {
        let report = format!(
            r#"{{"Python":{{"blanks":0,"code":{},"comments":0,"reports":[]}}}}"#,
            code
        );
        self.commit_file("count.json", &report, message, date)
    }

    pub fn current_branch(&self) -> String {
        self.git(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    pub fn status_porcelain(&self) -> String {
        self.git(&["status", "--porcelain"])
    }
}
