use super::config::{SiteConfig, SiteConfigError, SITE_CONFIG_FILE};
use crate::fs::FileSystem;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subdirectory holding Drupal on webroot sites and on every converted site.
pub const WEB_ROOT: &str = "web";

/// Where Drupal lives inside a checkout. Computed once per run and passed to
/// every path-building call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocrootLayout {
    root: PathBuf,
    drupal_subpath: Option<PathBuf>,
}

impl DocrootLayout {
    pub fn new(root: impl Into<PathBuf>, web_docroot: bool) -> Self {
        Self {
            root: root.into(),
            drupal_subpath: web_docroot.then(|| PathBuf::from(WEB_ROOT)),
        }
    }

    /// Reads `pantheon.yml` at the site root; a missing file means Drupal
    /// lives at the root.
    pub fn detect(fs: &dyn FileSystem, root: &Path) -> Result<Self, SiteConfigError> {
        let web_docroot = SiteConfig::load(fs, &root.join(SITE_CONFIG_FILE))?
            .map(|config| config.web_docroot())
            .unwrap_or(false);

        debug!(root = %root.display(), web_docroot, "Detected docroot layout");
        Ok(Self::new(root, web_docroot))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_webroot(&self) -> bool {
        self.drupal_subpath.is_some()
    }

    /// Absolute Drupal installation directory.
    pub fn drupal_root(&self) -> PathBuf {
        match &self.drupal_subpath {
            Some(sub) => self.root.join(sub),
            None => self.root.clone(),
        }
    }

    /// Webroot-aware path relative to the site root.
    pub fn relative(&self, parts: &[&str]) -> PathBuf {
        let mut path = self.drupal_subpath.clone().unwrap_or_default();
        path.extend(parts);
        path
    }

    /// Path relative to the site root in the converted layout, which always
    /// keeps Drupal under `web/`.
    pub fn target_relative(parts: &[&str]) -> PathBuf {
        let mut path = PathBuf::from(WEB_ROOT);
        path.extend(parts);
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    #[test]
    fn test_root_layout() {
        let layout = DocrootLayout::new("/site", false);
        assert!(!layout.is_webroot());
        assert_eq!(layout.drupal_root(), PathBuf::from("/site"));
        assert_eq!(
            layout.relative(&["sites", "default", "settings.php"]),
            PathBuf::from("sites/default/settings.php")
        );
    }

    #[test]
    fn test_webroot_layout() {
        let layout = DocrootLayout::new("/site", true);
        assert!(layout.is_webroot());
        assert_eq!(layout.drupal_root(), PathBuf::from("/site/web"));
        assert_eq!(
            layout.relative(&["sites", "default", "config"]),
            PathBuf::from("web/sites/default/config")
        );
    }

    #[test]
    fn test_target_relative_is_always_under_web() {
        assert_eq!(
            DocrootLayout::target_relative(&["modules", "custom"]),
            PathBuf::from("web/modules/custom")
        );
    }

    #[test]
    fn test_detect_without_site_config() {
        let fs = MockFileSystem::new();
        fs.add_dir("site");
        let layout = DocrootLayout::detect(&fs, Path::new("/mock/site")).unwrap();
        assert!(!layout.is_webroot());
        assert_eq!(layout.root(), Path::new("/mock/site"));
    }

    #[test]
    fn test_detect_webroot_site() {
        let fs = MockFileSystem::new();
        fs.add_file("site/pantheon.yml", "api_version: 1\nweb_docroot: true\n");
        let layout = DocrootLayout::detect(&fs, Path::new("/mock/site")).unwrap();
        assert!(layout.is_webroot());
    }

    #[test]
    fn test_detect_propagates_malformed_config() {
        let fs = MockFileSystem::new();
        fs.add_file("site/pantheon.yml", "web_docroot: [");
        assert!(DocrootLayout::detect(&fs, Path::new("/mock/site")).is_err());
    }
}
