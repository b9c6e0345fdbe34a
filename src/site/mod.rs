//! Site layout and site behaviour configuration

mod config;
mod layout;

pub use config::{SiteConfig, SiteConfigError, SITE_CONFIG_FILE};
pub use layout::{DocrootLayout, WEB_ROOT};
