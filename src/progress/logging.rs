//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use crate::workflow::{StepOutcome, WorkflowState};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { site_root, branch } => {
                info!(site = %site_root, branch = %branch, "Starting conversion");
            }
            ProgressEvent::ScanComplete {
                contrib,
                custom,
                libraries,
                scan_time,
            } => {
                info!(
                    contrib,
                    custom,
                    libraries,
                    scan_time_ms = scan_time.as_millis() as u64,
                    "Scan complete"
                );
            }
            ProgressEvent::ManifestMigrated { packages, warnings } => {
                if *warnings > 0 {
                    warn!(packages, warnings, "Manifest migrated with warnings");
                } else {
                    info!(packages, "Manifest migrated");
                }
            }
            ProgressEvent::StepStarted { step } => {
                debug!(step = %step, "Starting step");
            }
            ProgressEvent::StepFinished {
                step,
                outcome,
                detail,
                duration,
            } => {
                let duration_ms = duration.as_millis() as u64;
                match outcome {
                    StepOutcome::Failed => {
                        warn!(step = %step, detail = %detail, duration_ms, "Step failed")
                    }
                    StepOutcome::Skipped => {
                        info!(step = %step, detail = %detail, "Step skipped")
                    }
                    StepOutcome::Success => {
                        info!(step = %step, detail = %detail, duration_ms, "Step complete")
                    }
                }
            }
            ProgressEvent::Completed { status, total_time } => {
                let total_time_ms = total_time.as_millis() as u64;
                match status {
                    WorkflowState::Completed => {
                        info!(total_time_ms, "Conversion complete")
                    }
                    other => warn!(status = %other, total_time_ms, "Conversion finished"),
                }
            }
        }
    }
}
