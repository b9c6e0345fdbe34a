use crate::error::StepError;
use crate::git::{glob_of, CommitRef};
use crate::scanner::CustomSource;
use crate::site::DocrootLayout;
use crate::workflow::context::StepContext;
use crate::workflow::report::StepId;
use crate::workflow::step_trait::{ConversionStep, StepOutput};
use tracing::{info, warn};

/// Copies custom modules and themes into `web/{modules,themes}/custom`, one
/// commit per source. A failing source does not stop the others.
pub struct CopyCustomCodeStep;

impl ConversionStep for CopyCustomCodeStep {
    fn id(&self) -> StepId {
        StepId::CopyCustomCode
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutput, StepError> {
        let sources = ctx.scan.custom_sources();
        if sources.is_empty() {
            return Ok(StepOutput::Skipped(
                "No custom modules or themes to copy".to_string(),
            ));
        }

        info!(sources = sources.len(), "Copying custom modules and themes");
        let mut commits = Vec::new();
        let mut failures = Vec::new();

        for source in &sources {
            match copy_source(ctx, source) {
                Ok(commit) => commits.extend(commit),
                Err(err) => {
                    warn!(
                        source = %source.path.display(),
                        error = %err,
                        "Failed copying custom {}",
                        source.extension.dir_name()
                    );
                    failures.push(format!("{}: {}", source.path.display(), err));
                }
            }
        }

        if failures.is_empty() {
            Ok(StepOutput::from_commits(
                commits,
                "Custom code already in place",
            ))
        } else {
            Err(StepError::Incomplete { failures, commits })
        }
    }
}

fn copy_source(ctx: &StepContext<'_>, source: &CustomSource) -> Result<Option<CommitRef>, StepError> {
    let wc = ctx.working_copy()?;
    let kind = source.extension.dir_name();
    let target = DocrootLayout::target_relative(&[kind, "custom"]);

    ctx.checkout_from_default(&source.path)?;

    let target_abs = wc.path().join(&target);
    ctx.fs
        .create_dir_all(&target_abs)
        .map_err(|e| StepError::io(format!("Creating {}", target.display()), e))?;

    if source.container {
        if source.path != target {
            ctx.git
                .move_path(wc, &glob_of(&source.path), &target, false)?;
        }
    } else if source.path.parent() != Some(target.as_path()) {
        ctx.git
            .move_path(wc, &source.path.to_string_lossy(), &target, false)?;
    }

    let commit = ctx.commit(&format!(
        "Copy custom {} from {}",
        kind,
        source.path.display()
    ))?;
    if let Some(commit) = &commit {
        info!(source = %source.path.display(), commit = %commit, "Copied custom {}", kind);
    }
    Ok(commit)
}
