use crate::error::StepError;
use crate::site::{SiteConfig, SITE_CONFIG_FILE};
use crate::workflow::context::StepContext;
use crate::workflow::report::StepId;
use crate::workflow::step_trait::{ConversionStep, StepOutput};
use std::path::Path;
use tracing::info;

/// Brings `pantheon.yml` over from the default branch and turns the build
/// step on, committing each change separately.
pub struct CopyPantheonConfigStep;

impl ConversionStep for CopyPantheonConfigStep {
    fn id(&self) -> StepId {
        StepId::CopyPantheonConfig
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutput, StepError> {
        info!("Copying {}", SITE_CONFIG_FILE);
        let wc = ctx.working_copy()?;
        let mut commits = Vec::new();

        ctx.checkout_from_default(Path::new(SITE_CONFIG_FILE))?;
        commits.extend(ctx.commit("Copy pantheon.yml")?);

        let path = wc.path().join(SITE_CONFIG_FILE);
        let mut site_config =
            SiteConfig::load(ctx.fs, &path)?.ok_or_else(|| StepError::MissingPath(path.clone()))?;

        if !site_config.build_step() {
            site_config.set_build_step(true);
            ctx.fs
                .write_string(&path, &site_config.to_yaml()?)
                .map_err(|e| StepError::io(format!("Writing {}", SITE_CONFIG_FILE), e))?;
            commits.extend(ctx.commit("Add build_step:true to pantheon.yml")?);
        }

        Ok(StepOutput::from_commits(
            commits,
            "pantheon.yml already up to date",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::steps::test_support::Harness;

    fn messages(output: StepOutput) -> Vec<String> {
        match output {
            StepOutput::Committed(commits) => commits.into_iter().map(|c| c.message).collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_copies_and_enables_build_step() {
        let harness = Harness::new(
            &[("pantheon.yml", "api_version: 1\nphp_version: 7.4\n")],
            &[("pantheon.upstream.yml", "api_version: 1\n")],
            false,
        );
        let mut ctx = harness.context();

        let output = CopyPantheonConfigStep.run(&mut ctx).unwrap();
        assert_eq!(
            messages(output),
            vec!["Copy pantheon.yml", "Add build_step:true to pantheon.yml"]
        );

        let written = harness.read("pantheon.yml").unwrap();
        let config = SiteConfig::parse(&written, Path::new("pantheon.yml")).unwrap();
        assert!(config.build_step());
        assert!(written.starts_with("api_version: 1"));
    }

    #[test]
    fn test_build_step_already_enabled() {
        let harness = Harness::new(
            &[("pantheon.yml", "api_version: 1\nbuild_step: true\n")],
            &[],
            false,
        );
        let mut ctx = harness.context();

        let output = CopyPantheonConfigStep.run(&mut ctx).unwrap();
        assert_eq!(messages(output), vec!["Copy pantheon.yml"]);
    }

    #[test]
    fn test_missing_on_default_branch() {
        let harness = Harness::new(&[("index.php", "")], &[], false);
        let mut ctx = harness.context();
        assert!(matches!(
            CopyPantheonConfigStep.run(&mut ctx),
            Err(StepError::Git(_))
        ));
    }
}
