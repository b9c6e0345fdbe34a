//! Checkpointed version-control primitives
//!
//! Every mutation the conversion makes goes through a [`GitCheckpointer`] so
//! it is tracked by version control, and each step records its work with
//! [`GitCheckpointer::commit_if_dirty`]. Implementations are faithful
//! wrappers: failures are returned to the calling step, never swallowed.

mod mock;
mod process;

pub use mock::{GitOp, MockGit};
pub use process::ProcessGit;

use crate::error::GitError;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the remote the conversion branch is fetched from.
pub const UPSTREAM_REMOTE: &str = "composerify-upstream";

const GLOB_SUFFIX: &str = "/*";

/// Handle to one local checkout and its active branch. Passed explicitly to
/// every operation so concurrent conversions never share state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingCopy {
    path: PathBuf,
    branch: String,
}

impl WorkingCopy {
    pub fn new(path: impl Into<PathBuf>, branch: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            branch: branch.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRef {
    pub id: String,
    pub message: String,
}

impl fmt::Display for CommitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.id.get(..8).unwrap_or(&self.id);
        write!(f, "{} {}", short, self.message)
    }
}

/// `dir/*`: every non-hidden child of `dir`.
pub fn glob_of(dir: &Path) -> String {
    format!("{}{}", dir.display(), GLOB_SUFFIX)
}

/// Directory part of a `dir/*` source, `None` for a plain path.
pub(crate) fn glob_dir(src: &str) -> Option<&str> {
    src.strip_suffix(GLOB_SUFFIX)
}

pub trait GitCheckpointer: Send + Sync {
    /// Fetches `remote_ref` from `remote_url` and creates (or resets)
    /// `branch` at it in the checkout at `path`.
    fn branch_from(
        &self,
        path: &Path,
        branch: &str,
        remote_url: &str,
        remote_ref: &str,
    ) -> Result<WorkingCopy, GitError>;

    /// Restores `path` as it exists on `git_ref`, leaving other paths alone.
    fn checkout_path_from_ref(
        &self,
        wc: &WorkingCopy,
        git_ref: &str,
        path: &Path,
    ) -> Result<(), GitError>;

    /// Moves `src` (a path or a `dir/*` glob) to `dst`. An existing `dst`
    /// directory receives `src` inside it; `force` overwrites an existing file.
    fn move_path(&self, wc: &WorkingCopy, src: &str, dst: &Path, force: bool)
        -> Result<(), GitError>;

    fn remove(&self, wc: &WorkingCopy, path: &Path, force: bool) -> Result<(), GitError>;

    /// Stages everything and commits it, returning `None` when nothing changed.
    fn commit_if_dirty(&self, wc: &WorkingCopy, message: &str)
        -> Result<Option<CommitRef>, GitError>;

    fn is_dirty(&self, wc: &WorkingCopy) -> Result<bool, GitError>;

    fn push(&self, wc: &WorkingCopy, remote: &str, force: bool) -> Result<(), GitError>;
}
