//! The site behaviour file (`pantheon.yml`)

use crate::fs::FileSystem;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SITE_CONFIG_FILE: &str = "pantheon.yml";

const BUILD_STEP_KEY: &str = "build_step";
const WEB_DOCROOT_KEY: &str = "web_docroot";

#[derive(Debug, Error)]
pub enum SiteConfigError {
    #[error("Failed to read {}: {cause}", path.display())]
    Read { path: PathBuf, cause: String },

    #[error("Malformed {}: {cause}", path.display())]
    Malformed { path: PathBuf, cause: String },

    #[error("Failed to serialize site config: {0}")]
    Serialize(String),
}

/// Parsed `pantheon.yml`. The whole mapping is kept so rewriting a flag
/// leaves every other key (and the key order) untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteConfig {
    doc: Mapping,
}

impl SiteConfig {
    pub fn parse(content: &str, path: &Path) -> Result<Self, SiteConfigError> {
        let value: Value =
            serde_yaml::from_str(content).map_err(|e| SiteConfigError::Malformed {
                path: path.to_path_buf(),
                cause: e.to_string(),
            })?;

        match value {
            Value::Mapping(doc) => Ok(Self { doc }),
            Value::Null => Ok(Self::default()),
            other => Err(SiteConfigError::Malformed {
                path: path.to_path_buf(),
                cause: format!("expected a mapping at the top level, found {:?}", other),
            }),
        }
    }

    /// Loads the file, returning `None` when it does not exist.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Option<Self>, SiteConfigError> {
        if !fs.is_file(path) {
            return Ok(None);
        }
        let content = fs.read_to_string(path).map_err(|e| SiteConfigError::Read {
            path: path.to_path_buf(),
            cause: format!("{:#}", e),
        })?;
        Self::parse(&content, path).map(Some)
    }

    pub fn build_step(&self) -> bool {
        self.flag(BUILD_STEP_KEY)
    }

    pub fn web_docroot(&self) -> bool {
        self.flag(WEB_DOCROOT_KEY)
    }

    pub fn set_build_step(&mut self, enabled: bool) {
        self.doc
            .insert(Value::from(BUILD_STEP_KEY), Value::Bool(enabled));
    }

    pub fn to_yaml(&self) -> Result<String, SiteConfigError> {
        serde_yaml::to_string(&self.doc).map_err(|e| SiteConfigError::Serialize(e.to_string()))
    }

    fn flag(&self, key: &str) -> bool {
        matches!(self.doc.get(key), Some(Value::Bool(true)))
    }
}
