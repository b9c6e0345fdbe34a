//! Checkpointing and full conversions against real git repositories
//!
//! Skipped when no `git` executable is available.

use composerify::config::ConversionConfig;
use composerify::fs::RealFileSystem;
use composerify::git::{GitCheckpointer, ProcessGit};
use composerify::workflow::{ConversionWorkflow, MockRunner, StepId, StepOutcome, WorkflowState};
use std::fs;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git runs");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Creates a repository on `master` with one commit holding `files`.
fn repo(dir: &Path, files: &[(&str, &str)]) {
    fs::create_dir_all(dir).unwrap();
    run_git(dir, &["init", "--quiet"]);
    run_git(dir, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    run_git(dir, &["config", "user.name", "Site Owner"]);
    run_git(dir, &["config", "user.email", "owner@example.com"]);
    run_git(dir, &["config", "commit.gpgsign", "false"]);
    for (path, content) in files {
        let path = dir.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    run_git(dir, &["add", "-A"]);
    run_git(dir, &["commit", "--quiet", "-m", "Initial commit"]);
}

struct Repos {
    _tmp: TempDir,
    site: std::path::PathBuf,
    upstream: String,
}

fn repos(site_files: &[(&str, &str)]) -> Repos {
    let tmp = TempDir::new().unwrap();
    let upstream = tmp.path().join("upstream");
    repo(
        &upstream,
        &[
            (
                "composer.json",
                "{\n    \"name\": \"example/upstream\",\n    \"require\": {}\n}\n",
            ),
            ("web/sites/default/settings.php", "<?php // upstream\n"),
        ],
    );
    let site = tmp.path().join("site");
    repo(&site, site_files);

    Repos {
        upstream: upstream.to_string_lossy().into_owned(),
        site,
        _tmp: tmp,
    }
}

#[test]
fn test_commit_if_dirty_is_idempotent() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let repos = repos(&[("pantheon.yml", "api_version: 1\n")]);
    let git = ProcessGit::default();

    let wc = git
        .branch_from(&repos.site, "conversion", &repos.upstream, "master")
        .unwrap();
    assert!(!repos.site.join("pantheon.yml").exists());
    assert!(!git.is_dirty(&wc).unwrap());

    git.checkout_path_from_ref(&wc, "master", Path::new("pantheon.yml"))
        .unwrap();
    assert!(git.is_dirty(&wc).unwrap());

    let first = git.commit_if_dirty(&wc, "Copy pantheon.yml").unwrap();
    let commit = first.expect("first commit");
    assert_eq!(commit.id, run_git(&repos.site, &["rev-parse", "HEAD"]));
    assert_eq!(commit.message, "Copy pantheon.yml");

    assert!(git.commit_if_dirty(&wc, "Copy pantheon.yml").unwrap().is_none());
    assert!(!git.is_dirty(&wc).unwrap());
}

#[test]
fn test_branch_from_is_repeatable() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let repos = repos(&[("index.php", "<?php\n")]);
    let git = ProcessGit::default();

    git.branch_from(&repos.site, "conversion", &repos.upstream, "master")
        .unwrap();
    let wc = git
        .branch_from(&repos.site, "conversion", &repos.upstream, "master")
        .unwrap();
    assert_eq!(wc.branch(), "conversion");
    assert_eq!(
        run_git(&repos.site, &["rev-parse", "--abbrev-ref", "HEAD"]),
        "conversion"
    );
}

#[test]
fn test_failures_carry_operation_and_cause() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let repos = repos(&[("index.php", "<?php\n")]);
    let git = ProcessGit::default();

    let err = git
        .branch_from(&repos.site, "conversion", "/nonexistent/upstream", "master")
        .unwrap_err();
    assert_eq!(err.op, "fetch");
    assert!(!err.cause.is_empty());

    let wc = git
        .branch_from(&repos.site, "conversion", &repos.upstream, "master")
        .unwrap();
    let err = git
        .checkout_path_from_ref(&wc, "master", Path::new("missing.txt"))
        .unwrap_err();
    assert_eq!(err.op, "checkout");
}

#[test]
fn test_dry_run_conversion_on_real_repository() {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let repos = repos(&[
        ("index.php", "<?php\n"),
        ("pantheon.yml", "api_version: 1\n"),
        ("sites/default/settings.php", "<?php // site\n"),
        (
            "composer.json",
            "{\"require\": {\"drupal/core-recommended\": \"^8.9\", \"acme/lib\": \"^2.0\"}}",
        ),
        (
            "modules/contrib/token/token.info.yml",
            "name: Token\nversion: '8.x-1.7'\n",
        ),
        (
            "modules/custom/site_tweaks/site_tweaks.info.yml",
            "name: Site tweaks\n",
        ),
    ]);

    let config = ConversionConfig {
        branch: "conversion".to_string(),
        upstream_url: repos.upstream.clone(),
        upstream_ref: "master".to_string(),
        default_branch: "master".to_string(),
        dry_run: true,
        ..ConversionConfig::default()
    };
    let report = ConversionWorkflow::new(
        Arc::new(RealFileSystem::new()),
        Arc::new(ProcessGit::default()),
        Arc::new(MockRunner::new()),
        config,
    )
    .run(&repos.site)
    .unwrap();

    assert_eq!(report.status, WorkflowState::Completed, "{:#?}", report.steps);
    assert_eq!(
        report.step(StepId::Push).map(|s| s.outcome),
        Some(StepOutcome::Skipped)
    );

    let log = run_git(&repos.site, &["log", "--format=%s", "composerify-upstream/master..conversion"]);
    let messages: Vec<&str> = log.lines().rev().collect();
    assert_eq!(
        messages,
        vec![
            "Copy pantheon.yml",
            "Add build_step:true to pantheon.yml",
            "Copy custom modules from modules/custom",
            "Copy settings.php",
            "Migrate composer.json",
        ]
    );

    assert!(repos
        .site
        .join("web/modules/custom/site_tweaks/site_tweaks.info.yml")
        .is_file());
    assert_eq!(
        fs::read_to_string(repos.site.join("web/sites/default/settings.php")).unwrap(),
        "<?php // site\n"
    );
    let composer = fs::read_to_string(repos.site.join("composer.json")).unwrap();
    assert!(composer.contains("\"drupal/token\": \"^1.7\""));
    assert!(composer.contains("\"acme/lib\": \"^2.0\""));
    assert!(composer.contains("\"name\": \"example/upstream\""));
    assert_eq!(run_git(&repos.site, &["status", "--porcelain"]), "");
}
