use super::context::{DefaultConfig, StepContext};
use super::report::{
    AbortCause, ConversionReport, StepId, StepOutcome, StepReport, WorkflowState,
};
use super::runner::CommandRunner;
use super::step_trait::{ConversionStep, StepOutput};
use super::steps::default_steps;
use crate::config::ConversionConfig;
use crate::error::{ConversionError, StepError};
use crate::fs::FileSystem;
use crate::git::GitCheckpointer;
use crate::manifest::{Manifest, ManifestMigrator, MANIFEST_FILE};
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::scanner::ProjectScanner;
use crate::site::DocrootLayout;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

static NO_PROGRESS: NoOpHandler = NoOpHandler;

/// Runs scan, manifest migration and the checkpointed steps against one
/// site checkout, strictly in sequence.
pub struct ConversionWorkflow {
    fs: Arc<dyn FileSystem>,
    git: Arc<dyn GitCheckpointer>,
    runner: Arc<dyn CommandRunner>,
    config: ConversionConfig,
    steps: Vec<Box<dyn ConversionStep>>,
    progress: Option<Arc<dyn ProgressHandler>>,
}

impl ConversionWorkflow {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        git: Arc<dyn GitCheckpointer>,
        runner: Arc<dyn CommandRunner>,
        config: ConversionConfig,
    ) -> Self {
        Self {
            fs,
            git,
            runner,
            config,
            steps: default_steps(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress = Some(handler);
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    fn emit(&self, event: ProgressEvent) {
        let handler: &dyn ProgressHandler = match &self.progress {
            Some(handler) => handler.as_ref(),
            None => &NO_PROGRESS,
        };
        handler.on_progress(&event);
    }

    /// Converts the checkout at `site_root`.
    ///
    /// Errors are returned only for problems found before the first git
    /// mutation. Once branch creation starts, every outcome is in the report.
    pub fn run(&self, site_root: &Path) -> Result<ConversionReport, ConversionError> {
        let start = Instant::now();
        self.config.validate()?;

        if !self.fs.is_dir(site_root) {
            return Err(ConversionError::SiteRootMissing(site_root.to_path_buf()));
        }

        self.emit(ProgressEvent::Started {
            site_root: site_root.display().to_string(),
            branch: self.config.branch.clone(),
        });

        let layout = DocrootLayout::detect(self.fs.as_ref(), site_root)?;
        let source = match Manifest::load(self.fs.as_ref(), &site_root.join(MANIFEST_FILE))? {
            Some(manifest) => manifest,
            None => {
                warn!(site = %site_root.display(), "No composer.json found, starting from an empty manifest");
                Manifest::default()
            }
        };

        let scan_start = Instant::now();
        let scan = ProjectScanner::new(self.fs.as_ref()).scan(site_root);
        self.emit(ProgressEvent::ScanComplete {
            contrib: scan.contrib.len(),
            custom: scan.custom.len(),
            libraries: scan.libraries.len(),
            scan_time: scan_start.elapsed(),
        });

        // The branch replaces the working tree, so anything read from the
        // pre-conversion tree is read now.
        let default_config = DefaultConfig::probe(
            self.fs.as_ref(),
            &layout.drupal_root().join("sites/default/config"),
        );

        let migration = ManifestMigrator::new(&self.config.contrib_vendor).migrate(
            &source,
            &scan.contrib,
            &scan.library_names(),
            &self.config.library_backup_dir,
        );
        self.emit(ProgressEvent::ManifestMigrated {
            packages: migration.manifest.require.len(),
            warnings: migration.warnings.len(),
        });

        let mut ctx = StepContext {
            fs: self.fs.as_ref(),
            git: self.git.as_ref(),
            runner: self.runner.as_ref(),
            config: &self.config,
            layout: &layout,
            scan: &scan,
            migration: &migration,
            default_config,
            working_copy: None,
        };

        let mut state = WorkflowState::NotStarted;
        let mut reports = Vec::with_capacity(self.steps.len());
        let mut abort = None;

        for step in &self.steps {
            let id = step.id();

            if self.config.dry_run && id.is_remote() {
                debug!(step = %id, "Dry run, skipping remote step");
                reports.push(StepReport::skipped(id, "dry run"));
                continue;
            }

            transition(&mut state, WorkflowState::Running(id));
            self.emit(ProgressEvent::StepStarted { step: id });

            let step_start = Instant::now();
            let result = step.run(&mut ctx);
            let report = step_report(id, result);

            self.emit(ProgressEvent::StepFinished {
                step: id,
                outcome: report.outcome,
                detail: report.detail.clone(),
                duration: step_start.elapsed(),
            });

            let failed = report.outcome == StepOutcome::Failed;
            if failed && step.required() {
                abort = Some(AbortCause {
                    step: id,
                    error: report.detail.clone(),
                });
                reports.push(report);
                break;
            }
            reports.push(report);
        }

        transition(&mut state, final_state(&reports, abort.is_some()));
        info!(
            status = %state,
            steps = reports.len(),
            commits = reports.iter().map(|r| r.commits.len()).sum::<usize>(),
            "Conversion finished"
        );
        self.emit(ProgressEvent::Completed {
            status: state,
            total_time: start.elapsed(),
        });

        Ok(ConversionReport {
            branch: self.config.branch.clone(),
            dry_run: self.config.dry_run,
            status: state,
            steps: reports,
            abort,
            scan: scan.clone(),
            mapped_libraries: migration.mapped_libraries.clone(),
            relocations: migration.relocations.clone(),
            warnings: migration.warnings.iter().map(|w| w.to_string()).collect(),
        })
    }
}

fn transition(state: &mut WorkflowState, next: WorkflowState) {
    debug!(from = %state, to = %next, "Workflow state changed");
    *state = next;
}

fn step_report(step: StepId, result: Result<StepOutput, StepError>) -> StepReport {
    match result {
        Ok(StepOutput::Committed(commits)) => StepReport {
            step,
            outcome: StepOutcome::Success,
            detail: commits
                .iter()
                .map(|c| c.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            commits,
        },
        Ok(StepOutput::Done(detail)) => StepReport {
            step,
            outcome: StepOutcome::Success,
            detail,
            commits: Vec::new(),
        },
        Ok(StepOutput::Skipped(detail)) => StepReport::skipped(step, detail),
        Err(err) => {
            let detail = err.to_string();
            let commits = match err {
                StepError::Incomplete { commits, .. } => commits,
                _ => Vec::new(),
            };
            StepReport {
                step,
                outcome: StepOutcome::Failed,
                detail,
                commits,
            }
        }
    }
}

fn final_state(reports: &[StepReport], aborted: bool) -> WorkflowState {
    if aborted {
        WorkflowState::Aborted
    } else if reports.iter().any(|r| r.outcome == StepOutcome::Failed) {
        WorkflowState::CompletedWithWarnings
    } else {
        WorkflowState::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::CommitRef;

    #[test]
    fn test_step_report_from_commits() {
        let report = step_report(
            StepId::CopyPantheonConfig,
            Ok(StepOutput::Committed(vec![
                CommitRef {
                    id: "a".to_string(),
                    message: "Copy pantheon.yml".to_string(),
                },
                CommitRef {
                    id: "b".to_string(),
                    message: "Add build_step:true to pantheon.yml".to_string(),
                },
            ])),
        );
        assert_eq!(report.outcome, StepOutcome::Success);
        assert_eq!(
            report.detail,
            "Copy pantheon.yml; Add build_step:true to pantheon.yml"
        );
        assert_eq!(report.commits.len(), 2);
    }

    #[test]
    fn test_step_report_keeps_partial_commits() {
        let report = step_report(
            StepId::CopyCustomCode,
            Err(StepError::Incomplete {
                failures: vec!["themes/custom: git mv failed: denied".to_string()],
                commits: vec![CommitRef {
                    id: "a".to_string(),
                    message: "Copy custom modules from modules/custom".to_string(),
                }],
            }),
        );
        assert_eq!(report.outcome, StepOutcome::Failed);
        assert_eq!(report.commits.len(), 1);
        assert!(report.detail.contains("themes/custom"));
    }

    #[test]
    fn test_final_state() {
        let ok = StepReport::skipped(StepId::CopyConfig, "none");
        let failed = StepReport {
            step: StepId::CopySettings,
            outcome: StepOutcome::Failed,
            detail: "boom".to_string(),
            commits: Vec::new(),
        };

        assert_eq!(final_state(&[ok.clone()], false), WorkflowState::Completed);
        assert_eq!(
            final_state(&[ok.clone(), failed.clone()], false),
            WorkflowState::CompletedWithWarnings
        );
        assert_eq!(final_state(&[ok, failed], true), WorkflowState::Aborted);
    }
}
