//! State shared by the steps of one conversion run

use super::runner::CommandRunner;
use crate::config::ConversionConfig;
use crate::error::StepError;
use crate::fs::FileSystem;
use crate::git::{CommitRef, GitCheckpointer, WorkingCopy};
use crate::manifest::Migration;
use crate::scanner::ScanResult;
use crate::site::DocrootLayout;
use std::path::Path;
use tracing::warn;

/// What the pre-conversion tree held at `sites/default/config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultConfig {
    Missing,
    /// Only dotfiles such as the `.htaccess` Drupal writes on install.
    Empty,
    Present,
}

impl DefaultConfig {
    pub fn probe(fs: &dyn FileSystem, dir: &Path) -> Self {
        if !fs.is_dir(dir) {
            return DefaultConfig::Missing;
        }
        match fs.read_dir(dir) {
            Ok(entries) if entries.iter().all(|e| e.file_name().starts_with('.')) => {
                DefaultConfig::Empty
            }
            Ok(_) => DefaultConfig::Present,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Failed to list configuration directory");
                DefaultConfig::Present
            }
        }
    }
}

/// Borrowed collaborators plus the working copy, which only exists once the
/// conversion branch has been created.
pub struct StepContext<'a> {
    pub fs: &'a dyn FileSystem,
    pub git: &'a dyn GitCheckpointer,
    pub runner: &'a dyn CommandRunner,
    pub config: &'a ConversionConfig,
    pub layout: &'a DocrootLayout,
    pub scan: &'a ScanResult,
    pub migration: &'a Migration,
    pub default_config: DefaultConfig,
    pub working_copy: Option<WorkingCopy>,
}

impl<'a> StepContext<'a> {
    pub fn site_root(&self) -> &Path {
        self.layout.root()
    }

    pub fn working_copy(&self) -> Result<&WorkingCopy, StepError> {
        self.working_copy.as_ref().ok_or(StepError::NoWorkingCopy)
    }

    /// Restores `path` from the pre-conversion branch.
    pub fn checkout_from_default(&self, path: &Path) -> Result<(), StepError> {
        let wc = self.working_copy()?;
        self.git
            .checkout_path_from_ref(wc, &self.config.default_branch, path)?;
        Ok(())
    }

    pub fn commit(&self, message: &str) -> Result<Option<CommitRef>, StepError> {
        let wc = self.working_copy()?;
        Ok(self.git.commit_if_dirty(wc, message)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    #[test]
    fn test_probe_default_config() {
        let fs = MockFileSystem::new();
        fs.add_file("/site/a/config/.htaccess", "Deny from all\n");
        fs.add_file("/site/b/config/.htaccess", "Deny from all\n");
        fs.add_file("/site/b/config/system.site.yml", "name: Site\n");

        assert_eq!(DefaultConfig::probe(&fs, Path::new("/site/a/config")), DefaultConfig::Empty);
        assert_eq!(DefaultConfig::probe(&fs, Path::new("/site/b/config")), DefaultConfig::Present);
        assert_eq!(DefaultConfig::probe(&fs, Path::new("/site/c/config")), DefaultConfig::Missing);
    }
}
