//! composerify - converts non-Composer Drupal sites into Composer-managed ones
//!
//! The conversion runs against a local git checkout of a site. The checkout
//! is scanned for modules, themes and libraries, `composer.json` is rewritten
//! so those projects become package requirements, and the converted tree is
//! built on a separate branch one commit per step.
//!
//! # Core Concepts
//!
//! - **Scan**: classification of every project in the checkout as core,
//!   contrib, custom or library, from fixed Drupal locations
//! - **Migration**: the pure rewrite of the manifest from the scan result
//! - **Checkpoint**: a commit made after a step, only when the step changed
//!   something
//! - **Report**: the per-step outcome of a conversion, also available when
//!   the run stops early
//!
//! # Example Usage
//!
//! ```ignore
//! use composerify::{ConversionConfig, ConversionWorkflow, ProcessGit, ProcessRunner, RealFileSystem};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let workflow = ConversionWorkflow::new(
//!     Arc::new(RealFileSystem::new()),
//!     Arc::new(ProcessGit::default()),
//!     Arc::new(ProcessRunner),
//!     ConversionConfig::default(),
//! );
//! let report = workflow.run(Path::new("/srv/site"))?;
//! println!("{}", report.status);
//! ```
//!
//! # Project Structure
//!
//! - [`scanner`]: project discovery and classification
//! - [`manifest`]: `composer.json` model and migration
//! - [`git`]: checkpointed version-control operations
//! - [`workflow`]: the ordered conversion steps and their report
//! - [`advise`]: site-shape detection

pub mod advise;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod git;
pub mod manifest;
pub mod progress;
pub mod scanner;
pub mod site;
pub mod util;
pub mod version;
pub mod workflow;

pub use advise::{advise, Advice, SiteShape};
pub use config::{ConfigError, ConversionConfig};
pub use error::{ConversionError, GitError, StepError};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use git::{CommitRef, GitCheckpointer, MockGit, ProcessGit, WorkingCopy};
pub use manifest::{Manifest, ManifestError, ManifestMigrator, Migration};
pub use scanner::{Project, ProjectKind, ProjectScanner, ScanResult};
pub use util::{init_from_env, init_logging, LoggingConfig};
pub use workflow::{
    ConversionReport, ConversionWorkflow, MockRunner, ProcessRunner, StepId, StepOutcome,
    WorkflowState,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
