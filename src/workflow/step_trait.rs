use super::context::StepContext;
use super::report::StepId;
use crate::error::StepError;
use crate::git::CommitRef;

/// What a successful (or deliberately skipped) step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutput {
    /// One or more checkpoint commits were recorded.
    Committed(Vec<CommitRef>),
    /// The step ran but left nothing to commit.
    Done(String),
    Skipped(String),
}

impl StepOutput {
    /// Committed when `commits` is non-empty, otherwise `Done(no_changes)`.
    pub fn from_commits(commits: Vec<CommitRef>, no_changes: impl Into<String>) -> Self {
        if commits.is_empty() {
            StepOutput::Done(no_changes.into())
        } else {
            StepOutput::Committed(commits)
        }
    }
}

pub trait ConversionStep: Send + Sync {
    fn id(&self) -> StepId;

    fn required(&self) -> bool {
        self.id().is_required()
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutput, StepError>;
}
