//! Drupal project discovery and classification

mod info;
mod project;
#[allow(clippy::module_inception)]
mod scanner;

pub use info::InfoFile;
pub use project::{Extension, Project, ProjectKind};
pub use scanner::{CustomSource, ProjectScanner, ScanError, ScanResult};
