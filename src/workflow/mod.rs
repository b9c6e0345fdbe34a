//! The conversion workflow: a fixed sequence of checkpointed steps
//!
//! `CreateBranch` and `WriteManifest` are required and abort the run when
//! they fail. Every other step is best-effort: its failure is recorded and
//! the next step still runs, leaving a partially converted branch whose
//! commit history shows exactly how far the conversion got.

pub mod context;
pub mod orchestrator;
pub mod report;
pub mod runner;
pub mod step_trait;
pub mod steps;

pub use context::{DefaultConfig, StepContext};
pub use orchestrator::ConversionWorkflow;
pub use report::{AbortCause, ConversionReport, StepId, StepOutcome, StepReport, WorkflowState};
pub use runner::{CommandRunner, MockRunner, ProcessRunner};
pub use step_trait::{ConversionStep, StepOutput};
