//! Site-shape detection and conversion advice

use crate::fs::FileSystem;
use crate::manifest::{Manifest, MANIFEST_FILE};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

const UPSTREAM_CONFIGURATION_DIR: &str = "upstream-configuration";
const CORE_RECOMMENDED: &str = "drupal/core-recommended";
/// Written into every build artifact by Terminus Build Tools.
const BUILD_METADATA_FILE: &str = "build-metadata.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SiteShape {
    /// Already matches the Composer-managed target.
    DrupalRecommended,
    /// The older Composer-managed `drupal-project` layout.
    DrupalProject,
    /// A build artifact produced by a Terminus Build Tools CI workflow.
    BuildTools,
    /// Not Composer-managed, but Composer was used to add packages.
    ComposerBolted,
    NonComposer,
}

impl SiteShape {
    pub fn advice(self) -> &'static str {
        match self {
            SiteShape::DrupalRecommended => {
                "The site already matches the drupal-recommended layout. No conversion is necessary."
            }
            SiteShape::DrupalProject => {
                "The site uses the drupal-project layout. Convert it to drupal-recommended with \
                 `composerify convert <PATH>`, then switch its upstream to drupal-recommended."
            }
            SiteShape::BuildTools => {
                "The site was created by a Terminus Build Tools workflow. Stay on it if you rely on \
                 continuous integration (tests, asset builds). Otherwise run \
                 `composerify convert <PATH>` to move to a Composer-managed layout."
            }
            SiteShape::ComposerBolted => {
                "Although the site is not Composer-managed, Composer was used to add packages. \
                 This works but makes upstream updates fragile. Run `composerify convert <PATH>` \
                 to move the site to a Composer-managed layout; the packages below are carried over."
            }
            SiteShape::NonComposer => {
                "Standard non-Composer Drupal site. Run `composerify convert <PATH>` to create a \
                 Composer-managed copy on a separate branch, test it, then release it."
            }
        }
    }
}

impl fmt::Display for SiteShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SiteShape::DrupalRecommended => "drupal-recommended",
            SiteShape::DrupalProject => "drupal-project",
            SiteShape::BuildTools => "build-tools",
            SiteShape::ComposerBolted => "composer-bolted",
            SiteShape::NonComposer => "non-composer",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advice {
    pub shape: SiteShape,
    /// Packages required directly by the site owner, besides core.
    pub extra_packages: Vec<String>,
    pub advice: &'static str,
}

/// Inspects the checkout at `site_root` and recommends what to do with it.
pub fn advise(fs: &dyn FileSystem, site_root: &Path) -> Advice {
    let upstream_config = site_root
        .join(UPSTREAM_CONFIGURATION_DIR)
        .join(MANIFEST_FILE);

    let build_tools = fs.is_file(&site_root.join(BUILD_METADATA_FILE));

    let (shape, extra_packages) = if build_tools {
        (SiteShape::BuildTools, Vec::new())
    } else if fs.is_file(&upstream_config) {
        let content = match fs.read_to_string(&upstream_config) {
            Ok(content) => content,
            Err(err) => {
                warn!(
                    path = %upstream_config.display(),
                    error = %err,
                    "Failed to read upstream configuration"
                );
                String::new()
            }
        };
        if content.contains(CORE_RECOMMENDED) {
            (SiteShape::DrupalProject, Vec::new())
        } else {
            (SiteShape::DrupalRecommended, Vec::new())
        }
    } else {
        let extras = extra_packages(fs, site_root);
        if extras.is_empty() {
            (SiteShape::NonComposer, extras)
        } else {
            (SiteShape::ComposerBolted, extras)
        }
    };

    debug!(shape = %shape, extra_packages = extra_packages.len(), "Detected site shape");
    Advice {
        shape,
        extra_packages,
        advice: shape.advice(),
    }
}

fn extra_packages(fs: &dyn FileSystem, site_root: &Path) -> Vec<String> {
    match Manifest::load(fs, &site_root.join(MANIFEST_FILE)) {
        Ok(Some(manifest)) => manifest
            .require
            .iter()
            .map(|(package, _)| package)
            .filter(|package| {
                *package != "composer/installers" && !package.starts_with("drupal/core-")
            })
            .map(str::to_string)
            .collect(),
        Ok(None) => Vec::new(),
        Err(err) => {
            warn!(error = %err, "Failed composer.json analysis");
            Vec::new()
        }
    }
}
