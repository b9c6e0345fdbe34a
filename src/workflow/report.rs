use crate::git::CommitRef;
use crate::manifest::{LibraryMapping, LibraryRelocation};
use crate::scanner::ScanResult;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StepId {
    CreateBranch,
    CopyConfig,
    CopyPantheonConfig,
    CopyCustomCode,
    CopySettings,
    WriteManifest,
    Push,
    PostDeployCommands,
}

impl StepId {
    /// Failure of a required step aborts the whole conversion.
    pub fn is_required(self) -> bool {
        matches!(self, StepId::CreateBranch | StepId::WriteManifest)
    }

    /// Steps with effects outside the local checkout; skipped in dry-run mode.
    pub fn is_remote(self) -> bool {
        matches!(self, StepId::Push | StepId::PostDeployCommands)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepId::CreateBranch => "create-branch",
            StepId::CopyConfig => "copy-config",
            StepId::CopyPantheonConfig => "copy-pantheon-config",
            StepId::CopyCustomCode => "copy-custom-code",
            StepId::CopySettings => "copy-settings",
            StepId::WriteManifest => "write-manifest",
            StepId::Push => "push",
            StepId::PostDeployCommands => "post-deploy-commands",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepOutcome {
    Success,
    Skipped,
    Failed,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Success => f.write_str("success"),
            StepOutcome::Skipped => f.write_str("skipped"),
            StepOutcome::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: StepId,
    pub outcome: StepOutcome,
    pub detail: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub commits: Vec<CommitRef>,
}

impl StepReport {
    pub fn skipped(step: StepId, detail: impl Into<String>) -> Self {
        Self {
            step,
            outcome: StepOutcome::Skipped,
            detail: detail.into(),
            commits: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WorkflowState {
    NotStarted,
    Running(StepId),
    Completed,
    CompletedWithWarnings,
    Aborted,
}

impl WorkflowState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WorkflowState::Completed | WorkflowState::CompletedWithWarnings | WorkflowState::Aborted
        )
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::NotStarted => f.write_str("not started"),
            WorkflowState::Running(step) => write!(f, "running {}", step),
            WorkflowState::Completed => f.write_str("completed"),
            WorkflowState::CompletedWithWarnings => f.write_str("completed with warnings"),
            WorkflowState::Aborted => f.write_str("aborted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbortCause {
    pub step: StepId,
    pub error: String,
}

/// Everything a caller needs to see how far a conversion got.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub branch: String,
    pub dry_run: bool,
    pub status: WorkflowState,
    pub steps: Vec<StepReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort: Option<AbortCause>,
    pub scan: ScanResult,
    pub mapped_libraries: Vec<LibraryMapping>,
    pub relocations: Vec<LibraryRelocation>,
    pub warnings: Vec<String>,
}

impl ConversionReport {
    pub fn step(&self, id: StepId) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.step == id)
    }

    pub fn commits(&self) -> impl Iterator<Item = &CommitRef> {
        self.steps.iter().flat_map(|s| s.commits.iter())
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.status {
            WorkflowState::Completed => 0,
            WorkflowState::CompletedWithWarnings => 2,
            _ => 1,
        }
    }
}
