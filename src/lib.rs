//! # ccount: lines of code over a repository's history
//!
//! Samples commits from a branch, runs an external line counter (`tokei` by default) at each
//! sampled commit inside a throwaway clone, caches the raw reports per commit and reshapes the
//! per-commit counts into per-language time series for plotting.
//!
//! ## Library usage
//!
//! The binary is a thin CLI over [`pipeline::Pipeline`]; the individual stages are exposed for
//! integration tests and benchmarks.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

pub mod cache;
pub mod collect;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod sample;
pub mod series;

#[cfg(test)]
mod test_utils;

pub use error::{CacheRejection, CcountError, Result};

/// Version tag written into every persisted [`CountCollection`].
/// Bump when the persisted layout changes; older files are discarded on load.
pub const SCHEMA_VERSION: &str = "1.0";

// ─── Stable hashing ─────────────────────────────────────────────────

/// Stable FNV-1a hash (deterministic across Rust versions, unlike `DefaultHasher`).
///
/// Parts are fed sequentially, so `[a, b]` hashes the same as `[a ++ b]`.
#[must_use]
pub fn stable_hash(parts: &[&[u8]]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;
    let mut hash = FNV_OFFSET;
    for part in parts {
        for &byte in *part {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

/// Last path component as a display name, `"repo"` when there is none (e.g. `/`).
#[must_use]
pub fn repo_base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "repo".to_string())
}

// ─── Core types ──────────────────────────────────────────────────────

/// One commit from `git log`. Identity is `reference`, ordering key is `timestamp`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Commit {
    /// Full object id (`%H`).
    #[serde(rename = "ref")]
    pub reference: String,
    /// Author date with its original UTC offset.
    pub timestamp: DateTime<FixedOffset>,
    /// First line of the commit message, possibly empty.
    #[serde(default)]
    pub subject: String,
}

impl Commit {
    pub fn new(reference: impl Into<String>, timestamp: DateTime<FixedOffset>, subject: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            timestamp,
            subject: subject.into(),
        }
    }

    /// Calendar day in the commit's own offset.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn short_ref(&self) -> &str {
        &self.reference[..self.reference.len().min(10)]
    }
}

/// One language's counts at one commit. Extra fields in the counter's report are ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCount {
    #[serde(default)]
    pub blanks: u64,
    #[serde(default)]
    pub code: u64,
    #[serde(default)]
    pub comments: u64,
}

/// A sampled commit with its counts, filtered to the languages of interest.
///
/// A language missing from `counts` was not observed at this commit, which is
/// different from being observed with zero lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRecord {
    pub commit: Commit,
    pub counts: BTreeMap<String, LanguageCount>,
}

/// The persisted unit of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountCollection {
    pub schema_version: String,
    /// Languages the records were filtered to.
    pub languages: Vec<String>,
    pub records: Vec<CountRecord>,
}

impl CountCollection {
    pub fn new(languages: Vec<String>, records: Vec<CountRecord>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            languages,
            records,
        }
    }

    /// True when the records cover exactly `commits`, in order.
    pub fn matches_commits(&self, commits: &[Commit]) -> bool {
        self.records.len() == commits.len()
            && self
                .records
                .iter()
                .zip(commits)
                .all(|(r, c)| r.commit.reference == c.reference)
    }
}

/// One point of a language series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DataPoint {
    pub commit: Commit,
    pub code: u64,
}

/// language → one point per record, in record order.
pub type LanguageSeries = BTreeMap<String, Vec<DataPoint>>;

#[cfg(test)]
mod lib_tests {
    use super::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_stable_hash_deterministic() {
        let a = stable_hash(&[b"/home/me/project"]);
        let b = stable_hash(&[b"/home/me/project"]);
        assert_eq!(a, b, "same input must produce same hash");
    }

    #[test]
    fn test_stable_hash_multi_part_equivalent_to_concat() {
        let split = stable_hash(&[b"hello", b"world"]);
        let concat = stable_hash(&[b"helloworld"]);
        assert_eq!(split, concat);
    }

    #[test]
    fn test_stable_hash_known_fnv1a_vector() {
        // FNV-1a 64-bit of empty input is the offset basis
        assert_eq!(stable_hash(&[]), 0xcbf2_9ce4_8422_2325);
    }

    #[test]
    fn test_repo_base_name() {
        assert_eq!(repo_base_name(Path::new("/src/widgets")), "widgets");
        assert_eq!(repo_base_name(Path::new("/")), "repo");
    }

    #[test]
    fn test_commit_day_uses_own_offset() {
        // 23:30 at -05:00 is already the next day in UTC
        let c = Commit::new("a1", ts("2024-03-01T23:30:00-05:00"), "late");
        assert_eq!(c.day(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_commit_serializes_ref_field() {
        let c = Commit::new("deadbeef", ts("2024-03-01T10:00:00+00:00"), "init");
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"ref\":\"deadbeef\""));
        let back: Commit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_language_count_ignores_extra_fields() {
        let raw = r#"{"blanks": 3, "code": 40, "comments": 5, "reports": [], "inaccurate": false}"#;
        let lc: LanguageCount = serde_json::from_str(raw).unwrap();
        assert_eq!(lc, LanguageCount { blanks: 3, code: 40, comments: 5 });
    }

    #[test]
    fn test_collection_matches_commits() {
        let c1 = Commit::new("a", ts("2024-01-01T00:00:00Z"), "");
        let c2 = Commit::new("b", ts("2024-01-02T00:00:00Z"), "");
        let coll = CountCollection::new(
            vec!["Rust".to_string()],
            vec![CountRecord { commit: c1.clone(), counts: BTreeMap::new() }],
        );
        assert!(coll.matches_commits(&[c1.clone()]));
        assert!(!coll.matches_commits(&[c2.clone()]));
        assert!(!coll.matches_commits(&[c1, c2]));
    }
}

// ─── Property-based tests (proptest) ─────────────────────────────────
