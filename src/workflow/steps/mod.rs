//! The fixed, ordered conversion steps
//!
//! Each step funnels its mutations through the git checkpointer and records
//! them with `commit_if_dirty`, so re-running a step that has nothing new to
//! copy produces no commit.

#[path = "01_create_branch.rs"]
pub mod create_branch;
#[path = "02_copy_config.rs"]
pub mod copy_config;
#[path = "03_copy_pantheon_config.rs"]
pub mod copy_pantheon_config;
#[path = "04_copy_custom_code.rs"]
pub mod copy_custom_code;
#[path = "05_copy_settings.rs"]
pub mod copy_settings;
#[path = "06_write_manifest.rs"]
pub mod write_manifest;
#[path = "07_push.rs"]
pub mod push;
#[path = "08_post_deploy.rs"]
pub mod post_deploy;

use super::step_trait::ConversionStep;

pub use copy_config::CopyConfigStep;
pub use copy_custom_code::CopyCustomCodeStep;
pub use copy_pantheon_config::CopyPantheonConfigStep;
pub use copy_settings::CopySettingsStep;
pub use create_branch::CreateBranchStep;
pub use post_deploy::PostDeployStep;
pub use push::PushStep;
pub use write_manifest::WriteManifestStep;

/// Steps in execution order.
pub fn default_steps() -> Vec<Box<dyn ConversionStep>> {
    vec![
        Box::new(CreateBranchStep),
        Box::new(CopyConfigStep),
        Box::new(CopyPantheonConfigStep),
        Box::new(CopyCustomCodeStep),
        Box::new(CopySettingsStep),
        Box::new(WriteManifestStep),
        Box::new(PushStep),
        Box::new(PostDeployStep),
    ]
}
