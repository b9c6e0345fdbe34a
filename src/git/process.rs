use super::{glob_dir, CommitRef, GitCheckpointer, WorkingCopy, UPSTREAM_REMOTE};
use crate::error::GitError;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{debug, info};

/// Drives the `git` executable. Every call blocks until the process exits;
/// no timeout is applied.
#[derive(Debug, Clone)]
pub struct ProcessGit {
    program: PathBuf,
}

impl Default for ProcessGit {
    fn default() -> Self {
        Self::new("git")
    }
}

impl ProcessGit {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, cwd: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .current_dir(cwd)
            .env("GIT_TERMINAL_PROMPT", "0");
        cmd
    }

    fn output(&self, cwd: &Path, op: &str, args: &[&str]) -> Result<Output, GitError> {
        debug!(op, args = ?args, cwd = %cwd.display(), "Running git");
        self.command(cwd, args)
            .output()
            .map_err(|e| GitError::new(op, format!("failed to spawn git: {}", e)))
    }

    /// Runs git and fails on a non-zero exit, returning trimmed stdout.
    fn run(&self, cwd: &Path, op: &str, args: &[&str]) -> Result<String, GitError> {
        let output = self.output(cwd, op, args)?;
        if !output.status.success() {
            return Err(GitError::new(op, failure_cause(&output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn configure_remote(&self, path: &Path, remote_url: &str) -> Result<(), GitError> {
        let existing = self.output(path, "remote", &["remote", "get-url", UPSTREAM_REMOTE])?;
        if existing.status.success() {
            self.run(
                path,
                "remote",
                &["remote", "set-url", UPSTREAM_REMOTE, remote_url],
            )?;
        } else {
            self.run(path, "remote", &["remote", "add", UPSTREAM_REMOTE, remote_url])?;
        }
        Ok(())
    }
}

impl GitCheckpointer for ProcessGit {
    fn branch_from(
        &self,
        path: &Path,
        branch: &str,
        remote_url: &str,
        remote_ref: &str,
    ) -> Result<WorkingCopy, GitError> {
        if !path.is_dir() {
            return Err(GitError::new(
                "checkout",
                format!("{} is not a directory", path.display()),
            ));
        }

        self.configure_remote(path, remote_url)?;
        self.run(path, "fetch", &["fetch", UPSTREAM_REMOTE, remote_ref])?;

        let start_point = format!("{}/{}", UPSTREAM_REMOTE, remote_ref);
        self.run(path, "checkout", &["checkout", "-B", branch, &start_point])?;

        info!(branch, upstream = %start_point, "Conversion branch ready");
        Ok(WorkingCopy::new(path, branch))
    }

    fn checkout_path_from_ref(
        &self,
        wc: &WorkingCopy,
        git_ref: &str,
        path: &Path,
    ) -> Result<(), GitError> {
        let path = path.to_string_lossy();
        self.run(wc.path(), "checkout", &["checkout", git_ref, "--", &path])?;
        Ok(())
    }

    fn move_path(
        &self,
        wc: &WorkingCopy,
        src: &str,
        dst: &Path,
        force: bool,
    ) -> Result<(), GitError> {
        let sources = match glob_dir(src) {
            Some(dir) => {
                let sources = expand_children(wc.path(), dir)?;
                if sources.is_empty() {
                    return Err(GitError::new("mv", format!("no paths match {}", src)));
                }
                ensure_dir(&wc.path().join(dst))?;
                sources
            }
            None => {
                if let Some(parent) = dst.parent() {
                    ensure_dir(&wc.path().join(parent))?;
                }
                vec![src.to_string()]
            }
        };

        let dst = dst.to_string_lossy();
        let mut args = vec!["mv"];
        if force {
            args.push("-f");
        }
        args.extend(sources.iter().map(String::as_str));
        args.push(&dst);

        self.run(wc.path(), "mv", &args)?;
        Ok(())
    }

    fn remove(&self, wc: &WorkingCopy, path: &Path, force: bool) -> Result<(), GitError> {
        let path = path.to_string_lossy();
        let mut args = vec!["rm", "-r", "--quiet"];
        if force {
            args.push("-f");
        }
        args.push(&path);
        self.run(wc.path(), "rm", &args)?;
        Ok(())
    }

    fn commit_if_dirty(
        &self,
        wc: &WorkingCopy,
        message: &str,
    ) -> Result<Option<CommitRef>, GitError> {
        self.run(wc.path(), "add", &["add", "-A"])?;

        let diff = self.output(wc.path(), "diff", &["diff", "--cached", "--quiet"])?;
        match diff.status.code() {
            Some(0) => {
                debug!(message, "Nothing to commit");
                return Ok(None);
            }
            Some(1) => {}
            _ => return Err(GitError::new("diff", failure_cause(&diff))),
        }

        self.run(wc.path(), "commit", &["commit", "--quiet", "-m", message])?;
        let id = self.run(wc.path(), "rev-parse", &["rev-parse", "HEAD"])?;

        Ok(Some(CommitRef {
            id,
            message: message.to_string(),
        }))
    }

    fn is_dirty(&self, wc: &WorkingCopy) -> Result<bool, GitError> {
        let status = self.run(wc.path(), "status", &["status", "--porcelain"])?;
        Ok(!status.is_empty())
    }

    fn push(&self, wc: &WorkingCopy, remote: &str, force: bool) -> Result<(), GitError> {
        let mut args = vec!["push"];
        if force {
            args.push("--force");
        }
        args.extend([remote, wc.branch()]);
        self.run(wc.path(), "push", &args)?;
        info!(remote, branch = wc.branch(), "Pushed conversion branch");
        Ok(())
    }
}

/// Non-hidden children of `dir`, relative to the checkout, sorted.
fn expand_children(root: &Path, dir: &str) -> Result<Vec<String>, GitError> {
    let entries = std::fs::read_dir(root.join(dir))
        .map_err(|e| GitError::new("mv", format!("cannot read {}: {}", dir, e)))?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();

    Ok(names
        .into_iter()
        .map(|name| format!("{}/{}", dir, name))
        .collect())
}

fn ensure_dir(path: &Path) -> Result<(), GitError> {
    std::fs::create_dir_all(path)
        .map_err(|e| GitError::new("mv", format!("cannot create {}: {}", path.display(), e)))
}

fn failure_cause(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        output.status.to_string()
    } else {
        stderr
    }
}
