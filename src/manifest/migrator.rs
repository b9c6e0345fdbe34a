use super::{Manifest, Requirements};
use crate::scanner::Project;
use crate::version::caret_constraint;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Packages the target upstream pins itself, in the order they are emitted.
pub const SEEDED_CORE_PACKAGES: &[(&str, &str)] = &[
    ("composer/installers", "^1.9"),
    ("drupal/core-composer-scaffold", "^9.2"),
    ("drupal/core-recommended", "^9.2"),
    ("pantheon-systems/drupal-integrations", "^9"),
    ("drush/drush", "^10"),
    ("pantheon-upstreams/upstream-configuration", "self.version"),
];

const DRUPAL_VENDOR: &str = "drupal";
const UNCONSTRAINED: &str = "*";

/// A detected library that matched a package already required by the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryMapping {
    pub library: String,
    pub package: String,
}

/// A detected library with no package, to be moved out of the docroot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryRelocation {
    pub library: String,
    pub destination: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MigrationWarning {
    UnknownVersion {
        project: String,
        version: Option<String>,
    },
    LibraryRelocated {
        library: String,
        destination: PathBuf,
    },
}

impl fmt::Display for MigrationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationWarning::UnknownVersion { project, version } => match version {
                Some(v) => write!(
                    f,
                    "{}: version {} has no usable major.minor, requiring any version",
                    project, v
                ),
                None => write!(f, "{}: version unknown, requiring any version", project),
            },
            MigrationWarning::LibraryRelocated {
                library,
                destination,
            } => write!(
                f,
                "{}: no package found, moved to {}",
                library,
                destination.display()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Migration {
    pub manifest: Manifest,
    pub mapped_libraries: Vec<LibraryMapping>,
    pub relocations: Vec<LibraryRelocation>,
    pub warnings: Vec<MigrationWarning>,
}

/// Rewrites a source manifest into one suitable for the Composer-managed
/// upstream. Pure: the same inputs always yield the same output.
#[derive(Debug, Clone)]
pub struct ManifestMigrator {
    contrib_vendor: String,
}

impl Default for ManifestMigrator {
    fn default() -> Self {
        Self::new(DRUPAL_VENDOR)
    }
}

impl ManifestMigrator {
    pub fn new(contrib_vendor: impl Into<String>) -> Self {
        Self {
            contrib_vendor: contrib_vendor.into(),
        }
    }

    pub fn contrib_vendor(&self) -> &str {
        &self.contrib_vendor
    }

    /// Core packages are owned by the upstream and never copied from a source.
    pub fn is_core_package(&self, package: &str) -> bool {
        let package = package.to_ascii_lowercase();
        SEEDED_CORE_PACKAGES.iter().any(|(name, _)| *name == package)
            || package == "drupal/core"
            || package.starts_with("drupal/core-")
    }

    pub fn migrate(
        &self,
        source: &Manifest,
        contrib: &[Project],
        libraries: &[String],
        backup_dir: &Path,
    ) -> Migration {
        let mut require = Requirements::default();
        let mut warnings = Vec::new();

        for (package, constraint) in SEEDED_CORE_PACKAGES {
            require.insert(*package, *constraint);
        }

        let contrib_names: HashSet<String> = contrib
            .iter()
            .filter(|p| p.kind().is_contrib())
            .map(|p| p.name().to_ascii_lowercase())
            .collect();

        for project in contrib.iter().filter(|p| p.kind().is_contrib()) {
            let package = format!("{}/{}", self.contrib_vendor, project.name());
            if self.is_core_package(&package) {
                debug!(package = %package, "Skipping contrib project shadowing a core package");
                continue;
            }

            let constraint = match project.version().and_then(caret_constraint) {
                Some(constraint) => constraint,
                None => {
                    let warning = MigrationWarning::UnknownVersion {
                        project: project.name().to_string(),
                        version: project.version().map(str::to_string),
                    };
                    warn!(warning = %warning, "Contrib project falls back to an open constraint");
                    warnings.push(warning);
                    UNCONSTRAINED.to_string()
                }
            };
            require.insert(package, constraint);
        }

        let mut mapped_libraries = Vec::new();
        let mut relocations = Vec::new();

        for library in libraries {
            let package = source
                .require
                .iter()
                .map(|(package, _)| package)
                .filter(|package| !self.is_core_package(package))
                .find(|package| package_tail(package).eq_ignore_ascii_case(library));

            match package {
                Some(package) => {
                    debug!(library = %library, package = %package, "Library maps to a required package");
                    mapped_libraries.push(LibraryMapping {
                        library: library.clone(),
                        package: package.to_string(),
                    });
                }
                None => {
                    let destination = backup_dir.join(library);
                    let warning = MigrationWarning::LibraryRelocated {
                        library: library.clone(),
                        destination: destination.clone(),
                    };
                    warn!(warning = %warning, "Library has no package mapping");
                    warnings.push(warning);
                    relocations.push(LibraryRelocation {
                        library: library.clone(),
                        destination,
                    });
                }
            }
        }

        for (package, constraint) in source.require.iter() {
            if self.is_core_package(package) {
                debug!(package = %package, "Dropping core package from source manifest");
                continue;
            }
            if self.is_covered(package, &contrib_names) {
                continue;
            }
            require.insert(package, constraint);
        }

        info!(
            packages = require.len(),
            contrib = contrib_names.len(),
            mapped_libraries = mapped_libraries.len(),
            relocated_libraries = relocations.len(),
            "Manifest migrated"
        );

        Migration {
            manifest: Manifest {
                require,
                require_dev: source.require_dev.clone(),
                extra: source.extra.clone(),
            },
            mapped_libraries,
            relocations,
            warnings,
        }
    }

    /// Whether a source package is already emitted from a detected contrib
    /// project.
    fn is_covered(&self, package: &str, contrib_names: &HashSet<String>) -> bool {
        let Some((vendor, name)) = package.split_once('/') else {
            return false;
        };
        let vendor_matches = vendor.eq_ignore_ascii_case(DRUPAL_VENDOR)
            || vendor.eq_ignore_ascii_case(&self.contrib_vendor);
        vendor_matches && contrib_names.contains(&name.to_ascii_lowercase())
    }
}

fn package_tail(package: &str) -> &str {
    package.rsplit('/').next().unwrap_or(package)
}
