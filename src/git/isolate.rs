//! Disposable clones, so checkouts never touch the caller's work tree.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};

use super::run_git;
use crate::error::Result;
use crate::repo_base_name;

/// A no-checkout local clone living in its own temp directory.
///
/// Dropping the handle deletes the directory, whether the run succeeded or not.
#[derive(Debug)]
pub struct IsolatedClone {
    dir: TempDir,
    source: PathBuf,
}

impl IsolatedClone {
    /// Clone `source` with `git clone --local --no-checkout` into a fresh temp directory
    /// named after the source. `--local` hard-links objects when source and temp share a
    /// filesystem and falls back to copying otherwise.
    pub fn create(source: &Path) -> Result<Self> {
        let source = source.canonicalize()?;
        let prefix = format!("{}-", repo_base_name(&source));
        let dir = tempfile::Builder::new().prefix(&prefix).tempdir()?;

        let src = source.to_string_lossy();
        let dst = dir.path().to_string_lossy();
        run_git(dir.path(), &["clone", "--local", "--no-checkout", "--quiet", &src, &dst])?;

        info!(source = %source.display(), clone = %dir.path().display(), "Created disposable clone");
        Ok(Self { dir, source })
    }

    /// Work tree of the clone.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl Drop for IsolatedClone {
    fn drop(&mut self) {
        debug!(clone = %self.dir.path().display(), "Removing disposable clone");
    }
}
