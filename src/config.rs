use regex::Regex;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_BRANCH: &str = "conversion";
const DEFAULT_UPSTREAM_URL: &str = "https://github.com/pantheon-upstreams/drupal-recommended.git";
const DEFAULT_UPSTREAM_REF: &str = "master";
const DEFAULT_SOURCE_BRANCH: &str = "master";
const DEFAULT_PUSH_REMOTE: &str = "origin";
const DEFAULT_CONTRIB_VENDOR: &str = "drupal";
const DEFAULT_LIBRARY_BACKUP_DIR: &str = "libraries-backup";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Branch the converted site is built on.
    pub branch: String,
    /// Git URL of the Composer-managed upstream.
    pub upstream_url: String,
    /// Branch of the upstream to start from.
    pub upstream_ref: String,
    /// Pre-conversion branch that config and code are pulled forward from.
    pub default_branch: String,
    pub push_remote: String,
    /// Vendor prefix for contrib project packages.
    pub contrib_vendor: String,
    /// Relative to the site root.
    pub library_backup_dir: PathBuf,
    pub dry_run: bool,
    pub log_level: String,
    pub post_deploy_commands: Vec<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            branch: env_or("COMPOSERIFY_BRANCH", DEFAULT_BRANCH),
            upstream_url: env_or("COMPOSERIFY_UPSTREAM_URL", DEFAULT_UPSTREAM_URL),
            upstream_ref: env_or("COMPOSERIFY_UPSTREAM_REF", DEFAULT_UPSTREAM_REF),
            default_branch: env_or("COMPOSERIFY_DEFAULT_BRANCH", DEFAULT_SOURCE_BRANCH),
            push_remote: env_or("COMPOSERIFY_PUSH_REMOTE", DEFAULT_PUSH_REMOTE),
            contrib_vendor: env_or("COMPOSERIFY_CONTRIB_VENDOR", DEFAULT_CONTRIB_VENDOR),
            library_backup_dir: PathBuf::from(env_or(
                "COMPOSERIFY_LIBRARY_BACKUP_DIR",
                DEFAULT_LIBRARY_BACKUP_DIR,
            )),
            dry_run: env::var("COMPOSERIFY_DRY_RUN")
                .ok()
                .and_then(|v| v.parse::<bool>().ok())
                .unwrap_or(false),
            log_level: env_or("COMPOSERIFY_LOG_LEVEL", DEFAULT_LOG_LEVEL).to_lowercase(),
            post_deploy_commands: Vec::new(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl ConversionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        static REF_REGEX: OnceLock<Regex> = OnceLock::new();
        let ref_re = REF_REGEX.get_or_init(|| {
            Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._/-]*$").expect("Invalid ref name regex")
        });

        for (field, value) in [
            ("branch", &self.branch),
            ("upstream_ref", &self.upstream_ref),
            ("default_branch", &self.default_branch),
            ("push_remote", &self.push_remote),
        ] {
            if !ref_re.is_match(value) || value.contains("..") || value.ends_with(".lock") {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid {}: '{}' is not a valid git ref name",
                    field, value
                )));
            }
        }

        if self.branch == self.default_branch {
            return Err(ConfigError::ValidationFailed(format!(
                "Conversion branch must differ from the default branch '{}'",
                self.default_branch
            )));
        }

        if self.upstream_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Upstream URL cannot be empty".to_string(),
            ));
        }

        if self.contrib_vendor.is_empty() || self.contrib_vendor.contains('/') {
            return Err(ConfigError::ParseError {
                field: "contrib_vendor".to_string(),
                error: format!("'{}' is not a package vendor", self.contrib_vendor),
            });
        }

        if self.library_backup_dir.is_absolute()
            || self.library_backup_dir.as_os_str().is_empty()
        {
            return Err(ConfigError::ValidationFailed(
                "Library backup directory must be a non-empty relative path".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }
}

impl fmt::Display for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Composerify Configuration:")?;
        writeln!(f, "  Branch: {}", self.branch)?;
        writeln!(f, "  Upstream: {} ({})", self.upstream_url, self.upstream_ref)?;
        writeln!(f, "  Default Branch: {}", self.default_branch)?;
        writeln!(f, "  Push Remote: {}", self.push_remote)?;
        writeln!(f, "  Contrib Vendor: {}", self.contrib_vendor)?;
        writeln!(
            f,
            "  Library Backup Dir: {}",
            self.library_backup_dir.display()
        )?;
        writeln!(f, "  Dry Run: {}", self.dry_run)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
