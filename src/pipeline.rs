//! One end-to-end run: isolate, list, sample, measure (or reuse), aggregate.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::cache::{Codec, ContentAddressedCache};
use crate::collect::{CollectStats, CountCollector, CounterCommand};
use crate::error::{CcountError, Result};
use crate::git::{self, IsolatedClone};
use crate::sample::sample;
use crate::series::to_series;
use crate::{Commit, CountCollection, CountRecord, LanguageSeries};

/// Sampling limit used when none is given.
pub const DEFAULT_LIMIT: usize = 50;

/// Languages charted when none are given.
pub const DEFAULT_LANGUAGES: [&str; 3] = ["Python", "TypeScript", "Sass"];

/// Everything a run needs. Built by the CLI, or directly by tests.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Source repository (must contain `.git`); also the cache identity.
    pub repo: PathBuf,
    /// Branch to walk; `None` walks `HEAD`.
    pub revision: Option<String>,
    /// Maximum number of sampled commits; 0 keeps all.
    pub limit: usize,
    /// Keep only the newest commit of each calendar day.
    pub collapse: bool,
    pub languages: Vec<String>,
    pub cache_root: PathBuf,
    pub codec: Codec,
    pub counter: CounterCommand,
    /// When false, neither the persisted collection nor per-commit entries are read.
    pub use_cache: bool,
}

impl RunOptions {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            revision: None,
            limit: DEFAULT_LIMIT,
            collapse: true,
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            cache_root: ContentAddressedCache::default_root(),
            codec: Codec::default(),
            counter: CounterCommand::default(),
            use_cache: true,
        }
    }
}

/// Result of [`Pipeline::run`].
#[derive(Debug)]
pub struct RunOutcome {
    pub series: LanguageSeries,
    pub records: Vec<CountRecord>,
    /// All zero when the persisted collection was reused.
    pub stats: CollectStats,
    pub reused_collection: bool,
}

type CloneHook = Box<dyn Fn(&Path) + Send + Sync>;

pub struct Pipeline {
    options: RunOptions,
    on_clone: Option<CloneHook>,
}

impl Pipeline {
    pub fn new(options: RunOptions) -> Self {
        Self { options, on_clone: None }
    }

    /// Called with the clone's path right after it is created, e.g. to register
    /// it for removal on Ctrl-C.
    pub fn on_clone(mut self, hook: impl Fn(&Path) + Send + Sync + 'static) -> Self {
        self.on_clone = Some(Box::new(hook));
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run once. The disposable clone is deleted before this returns, on every path.
    pub fn run(&self) -> Result<RunOutcome> {
        let repo = &self.options.repo;
        if !git::is_git_repository(repo) {
            return Err(CcountError::InvalidRepository {
                path: repo.display().to_string(),
            });
        }

        let clone = IsolatedClone::create(repo)?;
        if let Some(hook) = &self.on_clone {
            hook(clone.path());
        }
        self.run_in(&clone)
    }

    fn run_in(&self, clone: &IsolatedClone) -> Result<RunOutcome> {
        let opts = &self.options;

        let revision = git::resolve_revision(clone.path(), opts.revision.as_deref())?;
        let commits = git::list_commits(clone.path(), &revision, opts.collapse)?;
        let sampled = sample(&commits, opts.limit)?;
        info!(
            revision = %revision,
            commits = commits.len(),
            sampled = sampled.len(),
            limit = opts.limit,
            "Sampled history"
        );

        let cache = ContentAddressedCache::new(opts.cache_root.clone(), opts.codec);

        if opts.use_cache {
            if let Some(collection) = self.reusable_collection(&cache, &sampled) {
                info!(records = collection.records.len(), "Reusing persisted collection");
                return Ok(self.outcome(collection.records, CollectStats::default(), true));
            }
        }

        let mut collector = CountCollector::new(&cache, &opts.repo, opts.counter.clone(), opts.languages.iter().cloned());
        if !opts.use_cache {
            collector = collector.refreshing();
        }
        let (records, stats) = collector.collect(clone.path(), &sampled)?;

        let collection = CountCollection::new(opts.languages.clone(), records);
        cache.save_collection(&opts.repo, &collection)?;
        Ok(self.outcome(collection.records, stats, false))
    }

    fn reusable_collection(&self, cache: &ContentAddressedCache, sampled: &[Commit]) -> Option<CountCollection> {
        let collection = match cache.load_collection(&self.options.repo) {
            Ok(collection) => collection,
            Err(rejection) => {
                debug!(reason = %rejection, "No reusable collection");
                return None;
            }
        };

        if collection.languages != self.options.languages {
            debug!(cached = ?collection.languages, "Persisted collection covers other languages");
            return None;
        }
        if !collection.matches_commits(sampled) {
            debug!("Persisted collection covers other commits");
            return None;
        }
        Some(collection)
    }

    fn outcome(&self, records: Vec<CountRecord>, stats: CollectStats, reused_collection: bool) -> RunOutcome {
        RunOutcome {
            series: to_series(&records, &self.options.languages),
            records,
            stats,
            reused_collection,
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
