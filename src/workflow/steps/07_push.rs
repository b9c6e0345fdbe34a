use crate::error::StepError;
use crate::workflow::context::StepContext;
use crate::workflow::report::StepId;
use crate::workflow::step_trait::{ConversionStep, StepOutput};

/// Force-pushes the conversion branch so the hosting platform can build it.
pub struct PushStep;

impl ConversionStep for PushStep {
    fn id(&self) -> StepId {
        StepId::Push
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutput, StepError> {
        let wc = ctx.working_copy()?;
        let remote = &ctx.config.push_remote;
        ctx.git.push(wc, remote, true)?;
        Ok(StepOutput::Done(format!(
            "Pushed {} to {}",
            wc.branch(),
            remote
        )))
    }
}
