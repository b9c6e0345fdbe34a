use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProjectKind {
    CoreModule,
    ContribModule,
    ContribTheme,
    CustomModule,
    CustomTheme,
    Library,
}

impl ProjectKind {
    pub fn is_contrib(self) -> bool {
        matches!(self, ProjectKind::ContribModule | ProjectKind::ContribTheme)
    }

    pub fn is_custom(self) -> bool {
        matches!(self, ProjectKind::CustomModule | ProjectKind::CustomTheme)
    }

    pub fn extension(self) -> Option<Extension> {
        match self {
            ProjectKind::CoreModule | ProjectKind::ContribModule | ProjectKind::CustomModule => {
                Some(Extension::Module)
            }
            ProjectKind::ContribTheme | ProjectKind::CustomTheme => Some(Extension::Theme),
            ProjectKind::Library => None,
        }
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProjectKind::CoreModule => "core module",
            ProjectKind::ContribModule => "contrib module",
            ProjectKind::ContribTheme => "contrib theme",
            ProjectKind::CustomModule => "custom module",
            ProjectKind::CustomTheme => "custom theme",
            ProjectKind::Library => "library",
        };
        f.write_str(label)
    }
}

/// Drupal extension type, which decides the `modules`/`themes` directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Extension {
    Module,
    Theme,
}

impl Extension {
    pub fn dir_name(self) -> &'static str {
        match self {
            Extension::Module => "modules",
            Extension::Theme => "themes",
        }
    }

    pub(crate) fn contrib(self) -> ProjectKind {
        match self {
            Extension::Module => ProjectKind::ContribModule,
            Extension::Theme => ProjectKind::ContribTheme,
        }
    }

    pub(crate) fn custom(self) -> ProjectKind {
        match self {
            Extension::Module => ProjectKind::CustomModule,
            Extension::Theme => ProjectKind::CustomTheme,
        }
    }
}

/// A module, theme or library found in the codebase. Built once per scan
/// and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    name: String,
    kind: ProjectKind,
    version: Option<String>,
    path: PathBuf,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        kind: ProjectKind,
        version: Option<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            version,
            path: path.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProjectKind {
        self.kind
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Relative to the scanned root.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} ({})", self.name, version),
            None => write!(f, "{} (unknown version)", self.name),
        }
    }
}
