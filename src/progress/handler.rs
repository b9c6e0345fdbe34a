//! Progress handler trait and events

use crate::workflow::{StepId, StepOutcome, WorkflowState};
use std::time::Duration;

/// Events emitted while a conversion runs
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started { site_root: String, branch: String },

    /// Project scan finished
    ScanComplete {
        contrib: usize,
        custom: usize,
        libraries: usize,
        scan_time: Duration,
    },

    /// Target manifest synthesized
    ManifestMigrated { packages: usize, warnings: usize },

    StepStarted { step: StepId },

    StepFinished {
        step: StepId,
        outcome: StepOutcome,
        detail: String,
        duration: Duration,
    },

    /// Terminal state reached
    Completed {
        status: WorkflowState,
        total_time: Duration,
    },
}

/// Trait for handling progress events during a conversion
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
