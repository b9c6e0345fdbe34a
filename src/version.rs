//! Drupal project version handling

use regex::Regex;
use std::sync::OnceLock;

/// Extracts `(major, minor)` from a Drupal or semver style version.
///
/// Accepts `8.x-3.4`, `7.x-2.0-beta1`, `3.4.0`, `2.1` and `v1.2.3`. Dev
/// snapshots such as `1.x-dev` and placeholders such as `VERSION` have no
/// usable minor and return `None`.
pub fn major_minor(version: &str) -> Option<(u64, u64)> {
    let caps = version_regex().captures(version.trim())?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some((major, minor))
}

fn version_regex() -> &'static Regex {
    static VERSION_REGEX: OnceLock<Regex> = OnceLock::new();
    VERSION_REGEX.get_or_init(|| {
        Regex::new(r"^(?:\d+\.x-)?v?(\d+)\.(\d+)(?:[.\-+].*)?$").expect("Invalid version regex")
    })
}

/// Caret constraint (`^M.m`) for a detected version.
pub fn caret_constraint(version: &str) -> Option<String> {
    major_minor(version).map(|(major, minor)| format!("^{}.{}", major, minor))
}
