//! Per-commit measurement: cache lookup, else checkout + external counter + cache write.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, ContentAddressedCache, EntryFile};
use crate::error::{CcountError, Result};
use crate::{Commit, CountRecord, LanguageCount, git};

/// Raw counter output: language name → tool-specific object.
type RawReport = Map<String, Value>;

// ─── Counter command ────────────────────────────────────────────────

/// External line counter, run from the root of a checked-out work tree.
/// Must print a JSON object keyed by language name on stdout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for CounterCommand {
    fn default() -> Self {
        Self {
            program: "tokei".to_string(),
            args: vec!["--output".to_string(), "json".to_string()],
        }
    }
}

impl fmt::Display for CounterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl CounterCommand {
    /// Split a command line with shell quoting rules, so `sh -c 'tokei --output json'`
    /// keeps its quoted argument whole.
    pub fn parse(command_line: &str) -> std::result::Result<Self, String> {
        let mut words = shell_words::split(command_line)
            .map_err(|e| format!("cannot parse counter command '{}': {}", command_line, e))?
            .into_iter();
        let program = words.next().ok_or_else(|| "counter command is empty".to_string())?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    fn run(&self, work_tree: &Path) -> std::result::Result<String, String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(work_tree)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| format!("failed to execute '{}': {}", self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("'{}' exited with {}: {}", self, output.status, stderr.trim()));
        }

        String::from_utf8(output.stdout).map_err(|e| format!("'{}' printed invalid UTF-8: {}", self, e))
    }
}

fn parse_report(text: &str) -> std::result::Result<RawReport, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_kind(&other))),
        Err(e) => Err(format!("unparseable report: {}", e)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ─── Collector ──────────────────────────────────────────────────────

/// Cache hit/miss counters of one collection pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollectStats {
    pub hits: usize,
    pub misses: usize,
}

pub struct CountCollector<'a> {
    cache: &'a ContentAddressedCache,
    /// Repository whose identity keys the cache (the source, never the clone).
    repo: &'a Path,
    counter: CounterCommand,
    languages: BTreeSet<String>,
    reuse_entries: bool,
}

impl<'a> CountCollector<'a> {
    pub fn new(
        cache: &'a ContentAddressedCache,
        repo: &'a Path,
        counter: CounterCommand,
        languages: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            cache,
            repo,
            counter,
            languages: languages.into_iter().collect(),
            reuse_entries: true,
        }
    }

    /// Ignore existing entries: every commit is measured again and its entry overwritten.
    pub fn refreshing(mut self) -> Self {
        self.reuse_entries = false;
        self
    }

    /// Measure `commits` in order inside `clone`.
    ///
    /// All-or-nothing: the first checkout or counter failure aborts with
    /// [`CcountError::Counting`]. Entries written before the failure stay valid.
    pub fn collect(&self, clone: &Path, commits: &[Commit]) -> Result<(Vec<CountRecord>, CollectStats)> {
        let mut stats = CollectStats::default();
        let mut records = Vec::with_capacity(commits.len());

        for commit in commits {
            let entry = self.cache.entry_for(self.repo, commit)?;
            let counts = match self.cached_counts(&entry) {
                Some(counts) => {
                    stats.hits += 1;
                    counts
                }
                None => {
                    stats.misses += 1;
                    self.measure(clone, commit, &entry)?
                }
            };

            info!("{}", self.summary_line(commit, &counts));
            records.push(CountRecord {
                commit: commit.clone(),
                counts,
            });
        }

        info!(hits = stats.hits, misses = stats.misses, "Collected counts for {} commits", records.len());
        Ok((records, stats))
    }

    /// `None` on a miss. An entry that cannot be read, parsed or converted into counts is
    /// logged and treated as a miss, so the next measurement overwrites it.
    fn cached_counts(&self, entry: &CacheEntry) -> Option<BTreeMap<String, LanguageCount>> {
        if !self.reuse_entries || !entry.exists() {
            return None;
        }
        let parsed = entry
            .read_text()
            .map_err(|e| e.to_string())
            .and_then(|text| parse_report(&text))
            .and_then(|report| self.filter(&report));
        match parsed {
            Ok(counts) => Some(counts),
            Err(reason) => {
                warn!(path = %entry.path().display(), %reason, "Ignoring corrupt cache entry");
                None
            }
        }
    }

    /// Fresh output that does not fit the expected shape is fatal and never cached.
    fn measure(
        &self,
        clone: &Path,
        commit: &Commit,
        entry: &CacheEntry,
    ) -> Result<BTreeMap<String, LanguageCount>> {
        let fail = |message: String| CcountError::Counting {
            commit: commit.reference.clone(),
            message,
        };

        git::checkout(clone, &commit.reference).map_err(|e| fail(e.to_string()))?;
        debug!(commit = commit.short_ref(), counter = %self.counter, "Counting");
        let stdout = self.counter.run(clone).map_err(fail)?;
        let counts = parse_report(&stdout)
            .and_then(|report| self.filter(&report))
            .map_err(fail)?;

        entry.write_text(&stdout)?;
        Ok(counts)
    }

    /// Keep the languages of interest that the report mentions.
    fn filter(&self, report: &RawReport) -> std::result::Result<BTreeMap<String, LanguageCount>, String> {
        let mut counts = BTreeMap::new();
        for language in &self.languages {
            let Some(value) = report.get(language) else {
                continue;
            };
            let count: LanguageCount = serde_json::from_value(value.clone())
                .map_err(|e| format!("bad counts for {}: {}", language, e))?;
            counts.insert(language.clone(), count);
        }
        Ok(counts)
    }

    /// `abc1234567 (2024-01-31 17:02) - Python=1200 Sass=-`
    fn summary_line(&self, commit: &Commit, counts: &BTreeMap<String, LanguageCount>) -> String {
        let per_language: Vec<String> = self
            .languages
            .iter()
            .map(|lang| match counts.get(lang) {
                Some(c) => format!("{}={}", lang, c.code),
                None => format!("{}=-", lang),
            })
            .collect();
        format!(
            "{} ({}) - {}",
            commit.short_ref(),
            commit.timestamp.format("%Y-%m-%d %H:%M"),
            per_language.join(" ")
        )
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "collect_tests.rs"]
mod tests;
