//! On-disk cache of raw counter reports, addressed by repository and commit.
//!
//! Layout under the cache root:
//!
//! ```text
//! <root>/<repo-name>-<path-hash>/<commit-ref>.json.gz   raw counter report for one commit
//! <root>/<repo-name>-<path-hash>/counts.json.gz         last run's CountCollection
//! ```
//!
//! The hash is taken over the canonical repository path, so two checkouts that share a
//! directory name never share a cache directory. The extension follows the [`Codec`].

pub mod codec;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{CacheRejection, CcountError, Result};
use crate::{Commit, CountCollection, SCHEMA_VERSION, repo_base_name, stable_hash};

pub use codec::Codec;

// ─── Entry handles ──────────────────────────────────────────────────

/// Minimal file interface of a cache entry. Compression is applied inside
/// `read_bytes`/`write_bytes`, callers only ever see plain bytes.
pub trait EntryFile {
    fn exists(&self) -> bool;
    fn read_bytes(&self) -> Result<Vec<u8>>;
    fn write_bytes(&self, data: &[u8]) -> Result<()>;

    /// Read and decode as strict UTF-8.
    fn read_text(&self) -> Result<String> {
        String::from_utf8(self.read_bytes()?).map_err(|e| {
            CcountError::Encoding(format!("cache entry is not valid UTF-8: {}", e))
        })
    }

    fn write_text(&self, text: &str) -> Result<()> {
        self.write_bytes(text.as_bytes())
    }
}

/// A cache file bound to one codec.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    path: PathBuf,
    codec: Codec,
}

impl CacheEntry {
    pub fn new(path: PathBuf, codec: Codec) -> Self {
        Self { path, codec }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl EntryFile for CacheEntry {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn read_bytes(&self) -> Result<Vec<u8>> {
        let raw = fs::read(&self.path)?;
        Ok(self.codec.decompress(&raw)?)
    }

    /// Atomic write: compress in memory, write to `<file>.tmp`, then rename.
    fn write_bytes(&self, data: &[u8]) -> Result<()> {
        let packed = self.codec.compress(data)?;
        let tmp_path = PathBuf::from(format!("{}.tmp", self.path.display()));
        let written = fs::write(&tmp_path, &packed).and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

// ─── Cache ──────────────────────────────────────────────────────────

/// File name of the persisted collection (extension added by the codec).
const COLLECTION_STEM: &str = "counts";

/// Only the version tag, read before trusting the rest of the file.
#[derive(Deserialize)]
struct VersionProbe {
    schema_version: Option<String>,
}

/// Raw-report cache rooted at an explicit directory.
#[derive(Clone, Debug)]
pub struct ContentAddressedCache {
    root: PathBuf,
    codec: Codec,
}

impl ContentAddressedCache {
    /// Nothing is created on disk until the first lookup.
    pub fn new(root: impl Into<PathBuf>, codec: Codec) -> Self {
        Self {
            root: root.into(),
            codec,
        }
    }

    /// Default production root: `<user cache dir>/ccount`.
    /// Tests should NOT use this; pass a test-local directory instead.
    pub fn default_root() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("ccount")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// `<base-name>-<16 hex digits>` for the canonical form of `repo`.
    pub fn dir_name_for(repo: &Path) -> String {
        let canonical = fs::canonicalize(repo).unwrap_or_else(|_| repo.to_path_buf());
        let hash = stable_hash(&[canonical.to_string_lossy().as_bytes()]);
        format!("{}-{:016x}", repo_base_name(&canonical), hash)
    }

    /// Cache directory for `repo`, created (with parents) if missing.
    pub fn location_for(&self, repo: &Path) -> Result<PathBuf> {
        let dir = self.root.join(Self::dir_name_for(repo));
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "Creating cache directory");
            fs::create_dir_all(&dir)?;
        }
        Ok(dir)
    }

    /// Handle for the raw report of `commit`. A missing file is a miss, not an error.
    pub fn entry_for(&self, repo: &Path, commit: &Commit) -> Result<CacheEntry> {
        let dir = self.location_for(repo)?;
        let file = format!("{}.{}", commit.reference, self.codec.extension());
        Ok(CacheEntry::new(dir.join(file), self.codec))
    }

    pub fn collection_entry(&self, repo: &Path) -> Result<CacheEntry> {
        let dir = self.location_for(repo)?;
        let file = format!("{}.{}", COLLECTION_STEM, self.codec.extension());
        Ok(CacheEntry::new(dir.join(file), self.codec))
    }

    pub fn save_collection(&self, repo: &Path, collection: &CountCollection) -> Result<()> {
        let entry = self.collection_entry(repo)?;
        entry.write_text(&serde_json::to_string(collection)?)?;
        debug!(path = %entry.path().display(), records = collection.records.len(), "Saved count collection");
        Ok(())
    }

    /// Parse, then validate the version tag. Stale or malformed files are deleted;
    /// every failure is reported as a [`CacheRejection`], never as a fatal error.
    pub fn load_collection(&self, repo: &Path) -> std::result::Result<CountCollection, CacheRejection> {
        let entry = self
            .collection_entry(repo)
            .map_err(|e| CacheRejection::Unreadable(e.to_string()))?;
        if !entry.exists() {
            return Err(CacheRejection::Missing);
        }

        let rejection = match entry.read_text() {
            Err(e) => CacheRejection::Unreadable(e.to_string()),
            Ok(text) => match validate_collection(&text) {
                Ok(collection) => return Ok(collection),
                Err(rejection) => rejection,
            },
        };

        warn!(path = %entry.path().display(), reason = %rejection, "Discarding persisted collection");
        if let Err(e) = entry.remove() {
            warn!(path = %entry.path().display(), error = %e, "Failed to remove stale collection");
        }
        Err(rejection)
    }
}

fn validate_collection(text: &str) -> std::result::Result<CountCollection, CacheRejection> {
    let probe: VersionProbe =
        serde_json::from_str(text).map_err(|e| CacheRejection::Malformed(e.to_string()))?;
    let found = probe.schema_version.unwrap_or_default();
    if found != SCHEMA_VERSION {
        return Err(CacheRejection::SchemaMismatch {
            found,
            expected: SCHEMA_VERSION.to_string(),
        });
    }
    serde_json::from_str(text).map_err(|e| CacheRejection::Malformed(e.to_string()))
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
