//! `*.info.yml` metadata

use crate::fs::{DirEntry, FileSystem};
use serde::Deserialize;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

const INFO_SUFFIX: &str = ".info.yml";

/// The subset of an info file the scanner cares about. `version` and
/// `project` are the keys the drupal.org packaging script appends.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InfoFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    version: Option<Value>,
    #[serde(default)]
    pub project: Option<String>,
}

impl InfoFile {
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        let value: Value = serde_yaml::from_str(content)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value)
    }

    /// The packaging version, if any. Numeric YAML scalars are accepted and
    /// the `VERSION` placeholder used by core is ignored.
    pub fn version(&self) -> Option<String> {
        let version = match self.version.as_ref()? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        if version.is_empty() || version == "VERSION" {
            None
        } else {
            Some(version)
        }
    }
}

/// Picks the info file describing a project directory: `<dir>/<dir>.info.yml`
/// when present, otherwise the first `*.info.yml` by name.
pub fn find_info_file(fs: &dyn FileSystem, dir: &Path, entries: &[DirEntry]) -> Option<PathBuf> {
    let dir_name = dir.file_name()?.to_str()?;
    let preferred = format!("{}{}", dir_name, INFO_SUFFIX);

    entries
        .iter()
        .find(|e| e.is_file() && e.file_name() == preferred)
        .or_else(|| {
            entries
                .iter()
                .find(|e| e.is_file() && e.file_name().ends_with(INFO_SUFFIX))
        })
        .map(|e| e.path().to_path_buf())
        .filter(|p| fs.is_file(p))
}
