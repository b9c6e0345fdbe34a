use crate::error::StepError;
use crate::git::glob_of;
use crate::workflow::context::{DefaultConfig, StepContext};
use crate::workflow::report::StepId;
use crate::workflow::step_trait::{ConversionStep, StepOutput};
use std::path::Path;
use tracing::{debug, info};

/// Where exported configuration lives on the converted site, relative to
/// the site root.
pub const CONFIG_DIR: &str = "config";

const HTACCESS: &str = ".htaccess";

const NO_CONFIG_FILES: &str = "No configuration files found";

/// Pulls `sites/default/config` forward from the default branch into the
/// converted layout's `config/` directory.
pub struct CopyConfigStep;

impl ConversionStep for CopyConfigStep {
    fn id(&self) -> StepId {
        StepId::CopyConfig
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutput, StepError> {
        let source = ctx.layout.relative(&["sites", "default", "config"]);
        match ctx.default_config {
            DefaultConfig::Missing => {
                return Ok(StepOutput::Skipped(format!(
                    "No default configuration directory ({})",
                    source.display()
                )));
            }
            DefaultConfig::Empty => {
                return Ok(StepOutput::Skipped(NO_CONFIG_FILES.to_string()));
            }
            DefaultConfig::Present => {}
        }

        info!(source = %source.display(), "Copying configuration files");
        let wc = ctx.working_copy()?;
        ctx.checkout_from_default(&source)?;
        ctx.git
            .move_path(wc, &glob_of(&source), Path::new(CONFIG_DIR), false)?;

        // The glob leaves dotfiles behind; the source directory's .htaccess
        // has no place in the target.
        let htaccess = source.join(HTACCESS);
        if ctx.fs.exists(&wc.path().join(&htaccess)) {
            debug!(path = %htaccess.display(), "Removing leftover .htaccess");
            ctx.git.remove(wc, &htaccess, true)?;
        }

        let commit = ctx.commit("Pull in configuration from default git branch")?;
        Ok(StepOutput::from_commits(
            commit.into_iter().collect(),
            NO_CONFIG_FILES,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::steps::test_support::Harness;

    #[test]
    fn test_moves_config_into_root_config_dir() {
        let harness = Harness::new(
            &[
                ("sites/default/config/system.site.yml", "name: Site\n"),
                ("sites/default/config/.htaccess", "Deny from all\n"),
            ],
            &[("composer.json", "{}")],
            false,
        );
        let mut ctx = harness.context();

        let output = CopyConfigStep.run(&mut ctx).unwrap();
        let StepOutput::Committed(commits) = output else {
            panic!("expected a commit, got {output:?}");
        };
        assert_eq!(commits[0].message, "Pull in configuration from default git branch");
        assert_eq!(harness.read("config/system.site.yml").as_deref(), Some("name: Site\n"));
        assert!(harness.read("config/.htaccess").is_none());
        assert!(harness.read("sites/default/config/.htaccess").is_none());
    }

    #[test]
    fn test_webroot_source() {
        let harness = Harness::new(
            &[("web/sites/default/config/core.extension.yml", "module: {}\n")],
            &[("composer.json", "{}")],
            true,
        );
        let mut ctx = harness.context();

        CopyConfigStep.run(&mut ctx).unwrap();
        assert!(harness.read("config/core.extension.yml").is_some());
    }

    #[test]
    fn test_skipped_without_config_dir() {
        let harness = Harness::new(&[("index.php", "")], &[("composer.json", "{}")], false);
        let mut ctx = harness.context();
        ctx.default_config = DefaultConfig::Missing;

        let output = CopyConfigStep.run(&mut ctx).unwrap();
        assert!(matches!(output, StepOutput::Skipped(_)));
        assert!(harness.git.commits().is_empty());
    }

    #[test]
    fn test_skipped_when_only_htaccess() {
        let harness = Harness::new(
            &[("sites/default/config/.htaccess", "Deny from all\n")],
            &[("composer.json", "{}")],
            false,
        );
        let mut ctx = harness.context();
        ctx.default_config = DefaultConfig::Empty;

        let output = CopyConfigStep.run(&mut ctx).unwrap();
        assert_eq!(output, StepOutput::Skipped(NO_CONFIG_FILES.to_string()));
        assert!(harness.git.commits().is_empty());
    }
}
