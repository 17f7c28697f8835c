//! Git history access via the `git` CLI.
//!
//! Only read-only commands run against the caller's repository. Everything that moves
//! a work tree (`checkout`) runs inside an [`IsolatedClone`].

use std::collections::HashSet;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::LazyLock;

use chrono::DateTime;
use regex::Regex;
use tracing::debug;

use crate::Commit;
use crate::error::{CcountError, Result};

pub mod isolate;

pub use isolate::IsolatedClone;

// ─── Git CLI helpers ────────────────────────────────────────────────

/// `<hash> TAB <strict ISO-8601 author date> TAB <subject>`, newest first.
const LOG_FORMAT: &str = "--format=%H%x09%aI%x09%s";

/// Ref, timestamp and optional subject, separated by a tab or a space.
static LOG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9a-fA-F]{4,64})[\t ]+(\S+)(?:[\t ](.*))?$").expect("log line pattern is valid")
});

/// True when `path` has a `.git` entry (directory, or file for linked work trees).
pub fn is_git_repository(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Run `git <args>` in `repo` and return stdout.
///
/// Commit subjects are not guaranteed to be UTF-8, so output is decoded lossily.
pub(crate) fn run_git(repo: &Path, args: &[&str]) -> Result<String> {
    let command = format!("git {}", args.join(" "));
    debug!(cwd = %repo.display(), %command, "Running git");

    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| CcountError::VcsInvocation {
            command: command.clone(),
            message: format!("failed to execute git: {}. Is git installed and in PATH?", e),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CcountError::VcsInvocation {
            command,
            message: format!("{} ({})", stderr.trim(), output.status),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run `git <args>` in `repo` and report only whether it succeeded.
fn git_succeeds(repo: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .args(args)
        .current_dir(repo)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

// ─── Parsing ────────────────────────────────────────────────────────

/// Parse one `git log` line. Blank lines are the caller's business.
pub fn parse_log_line(line: &str) -> Result<Commit> {
    let caps = LOG_LINE.captures(line).ok_or_else(|| CcountError::HistoryParse {
        line: line.to_string(),
        reason: "expected '<ref> <timestamp> <subject>'".to_string(),
    })?;

    let timestamp = DateTime::parse_from_rfc3339(&caps[2]).map_err(|e| CcountError::HistoryParse {
        line: line.to_string(),
        reason: format!("bad timestamp '{}': {}", &caps[2], e),
    })?;
    let subject = caps.get(3).map(|m| m.as_str()).unwrap_or("");

    Ok(Commit::new(&caps[1], timestamp, subject))
}

/// Parse full `git log` output, keeping git's order. Any malformed line fails the whole parse.
pub fn parse_log(output: &str) -> Result<Vec<Commit>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_log_line)
        .collect()
}

/// Keep one commit per calendar day: the first one met in newest-first order,
/// i.e. the newest commit of that day. Input order is preserved otherwise.
pub fn collapse_same_day(newest_first: Vec<Commit>) -> Vec<Commit> {
    let mut seen_days = HashSet::new();
    newest_first
        .into_iter()
        .filter(|c| seen_days.insert(c.day()))
        .collect()
}

// ─── Queries ────────────────────────────────────────────────────────

/// All commits reachable from `revision`, oldest first.
///
/// With `collapse`, only the newest commit of each calendar day survives.
/// Commits with equal timestamps keep git's traversal order (oldest first).
pub fn list_commits(repo: &Path, revision: &str, collapse: bool) -> Result<Vec<Commit>> {
    let output = run_git(repo, &["log", LOG_FORMAT, revision, "--"])?;
    let mut commits = parse_log(&output)?;
    let total = commits.len();

    if collapse {
        commits = collapse_same_day(commits);
    }

    commits.reverse();
    commits.sort_by_key(|c| c.timestamp);

    debug!(revision, total, kept = commits.len(), "Listed commits");
    Ok(commits)
}

/// Resolve a branch name to something `git log` accepts inside a fresh clone.
///
/// A clone only has the source's current branch locally; every other branch is
/// reachable as `origin/<branch>`. `None` means `HEAD`.
pub fn resolve_revision(repo: &Path, branch: Option<&str>) -> Result<String> {
    let Some(branch) = branch else {
        return Ok("HEAD".to_string());
    };

    let candidates = [branch.to_string(), format!("origin/{}", branch)];
    for candidate in &candidates {
        let spec = format!("{}^{{commit}}", candidate);
        if git_succeeds(repo, &["rev-parse", "--verify", "--quiet", &spec]) {
            return Ok(candidate.clone());
        }
    }

    Err(CcountError::VcsInvocation {
        command: format!("git rev-parse --verify {}", branch),
        message: format!("unknown branch '{}' (also tried 'origin/{}')", branch, branch),
    })
}

/// Move the work tree of `repo` to `reference`. Detached-HEAD chatter on stderr is discarded.
pub fn checkout(repo: &Path, reference: &str) -> Result<()> {
    let status = Command::new("git")
        .args(["checkout", "--quiet", "--force", reference])
        .current_dir(repo)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| CcountError::VcsInvocation {
            command: format!("git checkout {}", reference),
            message: format!("failed to execute git: {}", e),
        })?;

    if !status.success() {
        return Err(CcountError::VcsInvocation {
            command: format!("git checkout {}", reference),
            message: format!("exited with {}", status),
        });
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
