use crate::error::StepError;
use crate::site::DocrootLayout;
use crate::workflow::context::StepContext;
use crate::workflow::report::StepId;
use crate::workflow::step_trait::{ConversionStep, StepOutput};
use tracing::info;

const SETTINGS: [&str; 3] = ["sites", "default", "settings.php"];

/// Carries `settings.php` over, replacing the upstream's copy.
pub struct CopySettingsStep;

impl ConversionStep for CopySettingsStep {
    fn id(&self) -> StepId {
        StepId::CopySettings
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutput, StepError> {
        let wc = ctx.working_copy()?;
        let source = ctx.layout.relative(&SETTINGS);
        let target = DocrootLayout::target_relative(&SETTINGS);
        info!(source = %source.display(), "Copying settings.php");

        ctx.checkout_from_default(&source)?;
        if source != target {
            ctx.git
                .move_path(wc, &source.to_string_lossy(), &target, true)?;
        }

        let commit = ctx.commit("Copy settings.php")?;
        Ok(StepOutput::from_commits(
            commit.into_iter().collect(),
            "settings.php already up to date",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::steps::test_support::Harness;

    #[test]
    fn test_overwrites_upstream_settings() {
        let harness = Harness::new(
            &[("sites/default/settings.php", "<?php // site\n")],
            &[("web/sites/default/settings.php", "<?php // upstream\n")],
            false,
        );
        let mut ctx = harness.context();

        let output = CopySettingsStep.run(&mut ctx).unwrap();
        assert!(matches!(output, StepOutput::Committed(ref c) if c[0].message == "Copy settings.php"));
        assert_eq!(
            harness.read("web/sites/default/settings.php").as_deref(),
            Some("<?php // site\n")
        );
        assert!(harness.read("sites/default/settings.php").is_none());
    }

    #[test]
    fn test_rerun_is_a_no_op() {
        let harness = Harness::new(
            &[("web/sites/default/settings.php", "<?php // site\n")],
            &[("web/sites/default/settings.php", "<?php // site\n")],
            true,
        );
        let mut ctx = harness.context();

        let output = CopySettingsStep.run(&mut ctx).unwrap();
        assert!(matches!(output, StepOutput::Done(_)));
        assert!(harness.git.commits().is_empty());
    }
}
