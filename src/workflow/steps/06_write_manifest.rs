use crate::error::StepError;
use crate::manifest::{self, ManifestError, MANIFEST_FILE};
use crate::workflow::context::StepContext;
use crate::workflow::report::StepId;
use crate::workflow::step_trait::{ConversionStep, StepOutput};
use std::path::{Path, PathBuf};
use tracing::info;

/// Moves unmapped libraries out of the docroot and commits the migrated
/// `composer.json`, laid over the upstream's own.
pub struct WriteManifestStep;

impl ConversionStep for WriteManifestStep {
    fn id(&self) -> StepId {
        StepId::WriteManifest
    }

    fn run(&self, ctx: &mut StepContext<'_>) -> Result<StepOutput, StepError> {
        let wc = ctx.working_copy()?;

        for relocation in &ctx.migration.relocations {
            let sources = ctx.scan.library_paths(&relocation.library);
            if sources.is_empty() {
                return Err(StepError::MissingPath(PathBuf::from(&relocation.library)));
            }

            for (index, source) in sources.into_iter().enumerate() {
                let destination = numbered_destination(&relocation.destination, index);
                info!(
                    library = %relocation.library,
                    source = %source.display(),
                    destination = %destination.display(),
                    "Relocating library"
                );
                ctx.checkout_from_default(source)?;
                if let Some(parent) = destination.parent() {
                    ctx.fs
                        .create_dir_all(&wc.path().join(parent))
                        .map_err(|e| StepError::io(format!("Creating {}", parent.display()), e))?;
                }
                ctx.git
                    .move_path(wc, &source.to_string_lossy(), &destination, false)?;
            }
        }

        let path = wc.path().join(MANIFEST_FILE);
        let base = manifest::load_document(ctx.fs, &path)?;
        let merged = ctx.migration.manifest.merge_into(base);
        let rendered = manifest::render(&merged)?;
        ctx.fs
            .write_string(&path, &rendered)
            .map_err(|e| StepError::Manifest(ManifestError::Write(format!("{:#}", e))))?;

        let commit = ctx.commit("Migrate composer.json")?;
        Ok(StepOutput::from_commits(
            commit.into_iter().collect(),
            "composer.json already migrated",
        ))
    }
}

/// The first copy of a library takes `base`; later copies get `-2`, `-3`...
fn numbered_destination(base: &Path, index: usize) -> PathBuf {
    if index == 0 {
        return base.to_path_buf();
    }
    let mut name = base.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!("-{}", index + 1));
    base.with_file_name(name)
}
