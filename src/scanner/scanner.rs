use super::info::{find_info_file, InfoFile};
use super::project::{Extension, Project, ProjectKind};
use crate::fs::{DirEntry, FileSystem};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Where Drupal may live relative to the scanned root.
const DRUPAL_PREFIXES: &[&str] = &["", "web"];
/// Parents of the `modules`/`themes` directories inside Drupal.
const EXTENSION_BASES: &[&str] = &["", "sites/all"];
const LIBRARY_DIRS: &[&str] = &["libraries", "sites/all/libraries"];
const CORE_MODULES_DIR: &str = "core/modules";

const CONTRIB_DIR: &str = "contrib";
const CUSTOM_DIR: &str = "custom";

#[derive(Debug, Clone, Error)]
pub enum ScanError {
    #[error("Failed to read directory {}: {cause}", path.display())]
    Unreadable { path: PathBuf, cause: String },

    #[error("Malformed info file {}: {cause}", path.display())]
    MalformedInfo { path: PathBuf, cause: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Contrib,
    Custom,
    /// Directly under `modules`/`themes`; the version marker decides.
    Unsorted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub contrib: Vec<Project>,
    pub custom: Vec<Project>,
    pub core: Vec<Project>,
    pub libraries: Vec<Project>,
}

/// A unit of custom code to carry over: either a whole `custom` container
/// directory or a single custom project sitting outside one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomSource {
    pub path: PathBuf,
    pub extension: Extension,
    pub container: bool,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.contrib.is_empty()
            && self.custom.is_empty()
            && self.core.is_empty()
            && self.libraries.is_empty()
    }

    /// Distinct library names, sorted.
    pub fn library_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.libraries.iter().map(|l| l.name().to_string()).collect();
        names.dedup();
        names
    }

    /// Every copy of the library `name`, in scan order.
    pub fn library_paths(&self, name: &str) -> Vec<&Path> {
        self.libraries
            .iter()
            .filter(|l| l.name() == name)
            .map(|l| l.path())
            .collect()
    }

    pub fn custom_sources(&self) -> Vec<CustomSource> {
        let mut seen = HashSet::new();
        let mut sources = Vec::new();

        for project in &self.custom {
            let Some(extension) = project.kind().extension() else {
                continue;
            };
            let source = match project.path().parent() {
                Some(parent) if parent.file_name().and_then(|n| n.to_str()) == Some(CUSTOM_DIR) => {
                    CustomSource {
                        path: parent.to_path_buf(),
                        extension,
                        container: true,
                    }
                }
                _ => CustomSource {
                    path: project.path().to_path_buf(),
                    extension,
                    container: false,
                },
            };
            if seen.insert(source.path.clone()) {
                sources.push(source);
            }
        }

        sources
    }
}

/// Classifies the modules, themes and libraries of a Drupal codebase by
/// provenance. Read-only: it never touches the files it inspects.
pub struct ProjectScanner<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> ProjectScanner<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Scans `root`. A missing root or unreadable directories produce an
    /// empty (or partial) result rather than an error.
    pub fn scan(&self, root: &Path) -> ScanResult {
        let mut result = ScanResult::default();

        if !self.fs.is_dir(root) {
            debug!(root = %root.display(), "Scan root does not exist, nothing to classify");
            return result;
        }

        let start = Instant::now();
        info!(root = %root.display(), "Scanning for Drupal projects");

        for prefix in DRUPAL_PREFIXES {
            for base in EXTENSION_BASES {
                for extension in [Extension::Module, Extension::Theme] {
                    let parent = Path::new(prefix).join(base).join(extension.dir_name());
                    self.scan_extensions(root, &parent, extension, Placement::Unsorted, &mut result);
                    self.scan_extensions(
                        root,
                        &parent.join(CONTRIB_DIR),
                        extension,
                        Placement::Contrib,
                        &mut result,
                    );
                    self.scan_extensions(
                        root,
                        &parent.join(CUSTOM_DIR),
                        extension,
                        Placement::Custom,
                        &mut result,
                    );
                }
            }

            self.scan_core(root, &Path::new(prefix).join(CORE_MODULES_DIR), &mut result);

            for dir in LIBRARY_DIRS {
                self.scan_libraries(root, &Path::new(prefix).join(dir), &mut result);
            }
        }

        result.contrib.sort_by(|a, b| a.path().cmp(b.path()));
        result.custom.sort_by(|a, b| a.path().cmp(b.path()));
        result.core.sort_by(|a, b| a.path().cmp(b.path()));
        result.libraries.sort_by(|a, b| {
            a.name().cmp(b.name()).then_with(|| a.path().cmp(b.path()))
        });

        info!(
            contrib = result.contrib.len(),
            custom = result.custom.len(),
            core = result.core.len(),
            libraries = result.libraries.len(),
            scan_time_ms = start.elapsed().as_millis() as u64,
            "Project scan completed"
        );

        result
    }

    fn scan_extensions(
        &self,
        root: &Path,
        rel_dir: &Path,
        extension: Extension,
        placement: Placement,
        result: &mut ScanResult,
    ) {
        for entry in self.list_subdirs(root, rel_dir) {
            if placement == Placement::Unsorted
                && matches!(entry.file_name(), CONTRIB_DIR | CUSTOM_DIR)
            {
                continue;
            }

            let rel_path = rel_dir.join(entry.file_name());
            let Some(info) = self.read_project_info(entry.path()) else {
                debug!(path = %rel_path.display(), "No info file, not a project");
                continue;
            };

            let version = info.version();
            let kind = match placement {
                Placement::Contrib => extension.contrib(),
                Placement::Custom => extension.custom(),
                Placement::Unsorted if version.is_some() => extension.contrib(),
                Placement::Unsorted => extension.custom(),
            };

            if kind.is_contrib() && version.is_none() {
                warn!(
                    path = %rel_path.display(),
                    "Contrib project has no version, reporting it as unknown"
                );
            }

            let project = Project::new(
                project_name(&info, entry.file_name()),
                kind,
                version,
                rel_path,
            );
            debug!(project = %project, kind = %project.kind(), "Detected project");

            if kind.is_contrib() {
                result.contrib.push(project);
            } else {
                result.custom.push(project);
            }
        }
    }

    fn scan_core(&self, root: &Path, rel_dir: &Path, result: &mut ScanResult) {
        for entry in self.list_subdirs(root, rel_dir) {
            if let Some(info) = self.read_project_info(entry.path()) {
                result.core.push(Project::new(
                    entry.file_name(),
                    ProjectKind::CoreModule,
                    info.version(),
                    rel_dir.join(entry.file_name()),
                ));
            }
        }
    }

    fn scan_libraries(&self, root: &Path, rel_dir: &Path, result: &mut ScanResult) {
        for entry in self.list_subdirs(root, rel_dir) {
            result.libraries.push(Project::new(
                entry.file_name(),
                ProjectKind::Library,
                None,
                rel_dir.join(entry.file_name()),
            ));
        }
    }

    /// Non-hidden subdirectories of `root/rel_dir`; empty when the directory
    /// is absent or unreadable.
    fn list_subdirs(&self, root: &Path, rel_dir: &Path) -> Vec<DirEntry> {
        let dir = root.join(rel_dir);
        if !self.fs.is_dir(&dir) {
            return Vec::new();
        }

        match self.read_dir(&dir) {
            Ok(entries) => entries
                .into_iter()
                .filter(|e| e.is_dir() && !e.file_name().starts_with('.'))
                .collect(),
            Err(err) => {
                warn!(error = %err, "Skipping unreadable directory");
                Vec::new()
            }
        }
    }

    fn read_dir(&self, dir: &Path) -> Result<Vec<DirEntry>, ScanError> {
        self.fs.read_dir(dir).map_err(|e| ScanError::Unreadable {
            path: dir.to_path_buf(),
            cause: format!("{:#}", e),
        })
    }

    /// `None` when the directory holds no info file. A malformed info file
    /// still marks a project, just without metadata.
    fn read_project_info(&self, dir: &Path) -> Option<InfoFile> {
        let entries = match self.read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "Skipping unreadable project directory");
                return None;
            }
        };
        let info_path = find_info_file(self.fs, dir, &entries)?;

        let parsed = self
            .fs
            .read_to_string(&info_path)
            .map_err(|e| format!("{:#}", e))
            .and_then(|content| InfoFile::parse(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(info) => Some(info),
            Err(cause) => {
                let err = ScanError::MalformedInfo {
                    path: info_path,
                    cause,
                };
                warn!(error = %err, "Ignoring project metadata");
                Some(InfoFile::default())
            }
        }
    }
}

fn project_name(info: &InfoFile, dir_name: &str) -> String {
    info.project
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(dir_name)
        .to_string()
}
