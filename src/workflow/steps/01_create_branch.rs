use crate::error::StepError;
use crate::workflow::context::StepContext;
use crate::workflow::report::StepId;
use crate::workflow::step_trait::{ConversionStep, StepOutput};
use tracing::info;

/// Creates (or resets) the conversion branch from the target upstream.
pub struct CreateBranchStep;

impl ConversionStep for CreateBranchStep {
    fn id(&self) -> StepId {
        StepId::CreateBranch
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutput, StepError> {
        let config = ctx.config;
        info!(
            branch = %config.branch,
            upstream = %config.upstream_url,
            "Creating conversion branch"
        );

        let wc = ctx.git.branch_from(
            ctx.site_root(),
            &config.branch,
            &config.upstream_url,
            &config.upstream_ref,
        )?;
        ctx.working_copy = Some(wc);

        Ok(StepOutput::Done(format!(
            "Branch {} created from {} ({})",
            config.branch, config.upstream_url, config.upstream_ref
        )))
    }
}
