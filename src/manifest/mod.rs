//! Composer manifest (`composer.json`) model

mod migrator;

pub use migrator::{
    LibraryMapping, LibraryRelocation, ManifestMigrator, Migration, MigrationWarning,
    SEEDED_CORE_PACKAGES,
};

use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MANIFEST_FILE: &str = "composer.json";

const REQUIRE: &str = "require";
const REQUIRE_DEV: &str = "require-dev";
const EXTRA: &str = "extra";

#[derive(Debug, Clone, Error)]
pub enum ManifestError {
    #[error("Failed to read {}: {cause}", path.display())]
    Read { path: PathBuf, cause: String },

    #[error("Malformed manifest {}: {cause}", path.display())]
    Malformed { path: PathBuf, cause: String },

    #[error("Constraint for {package} in `{section}` must be a string")]
    InvalidConstraint { section: String, package: String },

    #[error("Failed to write manifest: {0}")]
    Write(String),
}

/// Ordered `package -> constraint` mapping. Insertion order is kept so the
/// rendered manifest diffs cleanly against its source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Requirements(Map<String, Value>);

impl Requirements {
    /// Adds `package` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, package: impl Into<String>, constraint: impl Into<String>) -> bool {
        let package = package.into();
        if self.0.contains_key(&package) {
            return false;
        }
        self.0.insert(package, Value::String(constraint.into()));
        true
    }

    pub fn get(&self, package: &str) -> Option<&str> {
        self.0.get(package).and_then(Value::as_str)
    }

    pub fn contains(&self, package: &str) -> bool {
        self.0.contains_key(package)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|c| (k.as_str(), c)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Requirements {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut requirements = Requirements::default();
        for (package, constraint) in iter {
            requirements.insert(package, constraint);
        }
        requirements
    }
}

/// The parts of a Composer manifest the conversion reasons about. Never
/// mutated in place: the migrator synthesizes a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub require: Requirements,
    #[serde(rename = "require-dev", skip_serializing_if = "Requirements::is_empty")]
    pub require_dev: Requirements,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Parses a manifest. Composer writes empty sections as `[]`, which is
    /// accepted as an empty mapping.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        let doc = parse_document(content, path)?;
        let Value::Object(doc) = doc else {
            return Err(malformed(path, "expected a JSON object at the top level"));
        };

        let extra = match doc.get(EXTRA) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Array(items)) if items.is_empty() => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => return Err(malformed(path, "`extra` must be an object")),
        };

        Ok(Self {
            require: requirements(&doc, REQUIRE, path)?,
            require_dev: requirements(&doc, REQUIRE_DEV, path)?,
            extra,
        })
    }

    /// Loads the manifest at `path`, `None` when the file does not exist.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Option<Self>, ManifestError> {
        read_optional(fs, path)?
            .map(|content| Self::parse(&content, path))
            .transpose()
    }

    /// Lays this manifest over `base` (typically the target upstream's own
    /// `composer.json`). `require` and `require-dev` are replaced in place
    /// and `extra` keys already present in the base win. Every other base
    /// key is untouched.
    pub fn merge_into(&self, base: Option<Value>) -> Value {
        let mut doc = match base {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };

        doc.insert(REQUIRE.to_string(), self.require.to_value());

        if self.require_dev.is_empty() {
            doc.shift_remove(REQUIRE_DEV);
        } else {
            doc.insert(REQUIRE_DEV.to_string(), self.require_dev.to_value());
        }

        let mut extra = match doc.get(EXTRA) {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        for (key, value) in &self.extra {
            if !extra.contains_key(key) {
                extra.insert(key.clone(), value.clone());
            }
        }
        if !extra.is_empty() {
            doc.insert(EXTRA.to_string(), Value::Object(extra));
        }

        Value::Object(doc)
    }
}

/// Reads an arbitrary JSON document, `None` when the file does not exist.
pub fn load_document(fs: &dyn FileSystem, path: &Path) -> Result<Option<Value>, ManifestError> {
    read_optional(fs, path)?
        .map(|content| parse_document(&content, path))
        .transpose()
}

/// Renders a manifest the way Composer does: four-space indentation and a
/// trailing newline.
pub fn render(doc: &Value) -> Result<String, ManifestError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    doc.serialize(&mut serializer)
        .map_err(|e| ManifestError::Write(e.to_string()))?;

    let mut rendered = String::from_utf8(out).map_err(|e| ManifestError::Write(e.to_string()))?;
    rendered.push('\n');
    Ok(rendered)
}

fn read_optional(fs: &dyn FileSystem, path: &Path) -> Result<Option<String>, ManifestError> {
    if !fs.is_file(path) {
        return Ok(None);
    }
    fs.read_to_string(path)
        .map(Some)
        .map_err(|e| ManifestError::Read {
            path: path.to_path_buf(),
            cause: format!("{:#}", e),
        })
}

fn parse_document(content: &str, path: &Path) -> Result<Value, ManifestError> {
    serde_json::from_str(content).map_err(|e| malformed(path, e))
}

fn requirements(
    doc: &Map<String, Value>,
    section: &str,
    path: &Path,
) -> Result<Requirements, ManifestError> {
    let map = match doc.get(section) {
        None | Some(Value::Null) => return Ok(Requirements::default()),
        Some(Value::Array(items)) if items.is_empty() => return Ok(Requirements::default()),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(malformed(path, format!("`{}` must be an object", section))),
    };

    if let Some((package, _)) = map.iter().find(|(_, constraint)| !constraint.is_string()) {
        return Err(ManifestError::InvalidConstraint {
            section: section.to_string(),
            package: package.clone(),
        });
    }

    Ok(Requirements(map.clone()))
}

fn malformed(path: &Path, cause: impl ToString) -> ManifestError {
    ManifestError::Malformed {
        path: path.to_path_buf(),
        cause: cause.to_string(),
    }
}
