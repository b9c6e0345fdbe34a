use crate::error::StepError;
use crate::workflow::context::StepContext;
use crate::workflow::report::StepId;
use crate::workflow::step_trait::{ConversionStep, StepOutput};
use tracing::info;

/// Runs the configured follow-up commands (database updates, cache rebuild)
/// once the branch is pushed.
pub struct PostDeployStep;

impl ConversionStep for PostDeployStep {
    fn id(&self) -> StepId {
        StepId::PostDeployCommands
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutput, StepError> {
        let commands = &ctx.config.post_deploy_commands;
        if commands.is_empty() {
            return Ok(StepOutput::Skipped("No post-deploy commands".to_string()));
        }

        for command in commands {
            info!(command = %command, "Running post-deploy command");
            ctx.runner.run(ctx.site_root(), command)?;
        }

        Ok(StepOutput::Done(format!("Ran {}", commands.join(", "))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::steps::test_support::Harness;

    #[test]
    fn test_runs_commands_in_order() {
        let mut harness = Harness::new(&[], &[], false);
        harness.config.post_deploy_commands =
            vec!["drush updb -y".to_string(), "drush cr".to_string()];
        let mut ctx = harness.context();

        PostDeployStep.run(&mut ctx).unwrap();
        assert_eq!(harness.runner.executed(), vec!["drush updb -y", "drush cr"]);
    }

    #[test]
    fn test_stops_at_first_failure() {
        let mut harness = Harness::new(&[], &[], false);
        harness.config.post_deploy_commands =
            vec!["drush updb -y".to_string(), "drush cr".to_string()];
        harness.runner.fail_matching("updb");
        let mut ctx = harness.context();

        assert!(matches!(
            PostDeployStep.run(&mut ctx),
            Err(StepError::Command { .. })
        ));
        assert_eq!(harness.runner.executed(), vec!["drush updb -y"]);
    }

    #[test]
    fn test_skipped_without_commands() {
        let harness = Harness::new(&[], &[], false);
        let mut ctx = harness.context();
        assert!(matches!(
            PostDeployStep.run(&mut ctx).unwrap(),
            StepOutput::Skipped(_)
        ));
    }
}
