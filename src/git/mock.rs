use super::{glob_dir, CommitRef, GitCheckpointer, WorkingCopy};
use crate::error::GitError;
use crate::fs::{FileSystem, MockFileSystem};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

type Tree = BTreeMap<PathBuf, String>;

/// Operations that can be made to fail in [`MockGit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitOp {
    BranchFrom,
    Checkout,
    Move,
    Remove,
    Commit,
    Status,
    Push,
}

impl GitOp {
    fn command(self) -> &'static str {
        match self {
            GitOp::BranchFrom => "fetch",
            GitOp::Checkout => "checkout",
            GitOp::Move => "mv",
            GitOp::Remove => "rm",
            GitOp::Commit => "commit",
            GitOp::Status => "status",
            GitOp::Push => "push",
        }
    }
}

#[derive(Default)]
struct MockGitState {
    refs: HashMap<String, Tree>,
    remotes: HashMap<(String, String), Tree>,
    head: Tree,
    commits: Vec<CommitRef>,
    pushed: Vec<(String, String)>,
    failures: HashMap<GitOp, String>,
}

/// In-memory version control over a [`MockFileSystem`]. Refs are plain file
/// snapshots and the working tree is whatever the file system holds.
pub struct MockGit {
    fs: Arc<MockFileSystem>,
    state: Mutex<MockGitState>,
}

impl MockGit {
    pub fn new(fs: Arc<MockFileSystem>) -> Self {
        Self {
            fs,
            state: Mutex::new(MockGitState::default()),
        }
    }

    /// Records the current contents of `path` as `git_ref`.
    pub fn capture_ref(&self, git_ref: &str, path: &Path) {
        let tree = self.fs.snapshot(path);
        self.state
            .lock()
            .unwrap()
            .refs
            .insert(git_ref.to_string(), tree);
    }

    pub fn add_remote(&self, url: &str, git_ref: &str, files: &[(&str, &str)]) {
        let tree = files
            .iter()
            .map(|(path, content)| (PathBuf::from(path), content.to_string()))
            .collect();
        self.state
            .lock()
            .unwrap()
            .remotes
            .insert((url.to_string(), git_ref.to_string()), tree);
    }

    pub fn fail_on(&self, op: GitOp, cause: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(op, cause.to_string());
    }

    pub fn commits(&self) -> Vec<CommitRef> {
        self.state.lock().unwrap().commits.clone()
    }

    pub fn pushed(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().pushed.clone()
    }

    fn check(&self, op: GitOp) -> Result<(), GitError> {
        match self.state.lock().unwrap().failures.get(&op) {
            Some(cause) => Err(GitError::new(op.command(), cause.clone())),
            None => Ok(()),
        }
    }

    fn move_one(&self, root: &Path, src: &Path, dst: &Path, force: bool) -> Result<(), GitError> {
        let from = root.join(src);
        if !self.fs.exists(&from) {
            return Err(GitError::new(
                "mv",
                format!("bad source, source={}", src.display()),
            ));
        }

        let mut to = root.join(dst);
        if self.fs.is_dir(&to) {
            if let Some(name) = src.file_name() {
                to = to.join(name);
            }
        }
        if self.fs.exists(&to) {
            if !force || self.fs.is_dir(&to) {
                return Err(GitError::new(
                    "mv",
                    format!("destination exists, destination={}", to.display()),
                ));
            }
            self.fs
                .remove(&to)
                .map_err(|e| GitError::new("mv", e.to_string()))?;
        }

        self.fs
            .rename(&from, &to)
            .map_err(|e| GitError::new("mv", e.to_string()))
    }
}

impl GitCheckpointer for MockGit {
    fn branch_from(
        &self,
        path: &Path,
        branch: &str,
        remote_url: &str,
        remote_ref: &str,
    ) -> Result<WorkingCopy, GitError> {
        self.check(GitOp::BranchFrom)?;

        let mut state = self.state.lock().unwrap();
        let tree = state
            .remotes
            .get(&(remote_url.to_string(), remote_ref.to_string()))
            .cloned()
            .ok_or_else(|| {
                GitError::new(
                    "fetch",
                    format!("could not read from remote repository {}", remote_url),
                )
            })?;

        self.fs.restore(path, &tree);
        state.refs.insert(branch.to_string(), tree.clone());
        state.head = tree;

        Ok(WorkingCopy::new(path, branch))
    }

    fn checkout_path_from_ref(
        &self,
        wc: &WorkingCopy,
        git_ref: &str,
        path: &Path,
    ) -> Result<(), GitError> {
        self.check(GitOp::Checkout)?;

        let state = self.state.lock().unwrap();
        let tree = state.refs.get(git_ref).ok_or_else(|| {
            GitError::new("checkout", format!("invalid reference: {}", git_ref))
        })?;

        let matched: Vec<(&PathBuf, &String)> =
            tree.iter().filter(|(p, _)| p.starts_with(path)).collect();
        if matched.is_empty() {
            return Err(GitError::new(
                "checkout",
                format!(
                    "pathspec '{}' did not match any file(s) known to git",
                    path.display()
                ),
            ));
        }
        for (rel, content) in matched {
            self.fs.add_file(wc.path().join(rel), content);
        }
        Ok(())
    }

    fn move_path(
        &self,
        wc: &WorkingCopy,
        src: &str,
        dst: &Path,
        force: bool,
    ) -> Result<(), GitError> {
        self.check(GitOp::Move)?;

        let Some(dir) = glob_dir(src) else {
            return self.move_one(wc.path(), Path::new(src), dst, force);
        };

        let children = self
            .fs
            .read_dir(&wc.path().join(dir))
            .map_err(|e| GitError::new("mv", format!("{:#}", e)))?;
        let children: Vec<String> = children
            .into_iter()
            .map(|e| e.file_name().to_string())
            .filter(|name| !name.starts_with('.'))
            .collect();
        if children.is_empty() {
            return Err(GitError::new("mv", format!("no paths match {}", src)));
        }

        self.fs.add_dir(wc.path().join(dst));
        for name in children {
            self.move_one(wc.path(), &Path::new(dir).join(&name), dst, force)?;
        }
        Ok(())
    }

    fn remove(&self, wc: &WorkingCopy, path: &Path, _force: bool) -> Result<(), GitError> {
        self.check(GitOp::Remove)?;
        self.fs.remove(wc.path().join(path)).map_err(|_| {
            GitError::new(
                "rm",
                format!("pathspec '{}' did not match any files", path.display()),
            )
        })
    }

    fn commit_if_dirty(
        &self,
        wc: &WorkingCopy,
        message: &str,
    ) -> Result<Option<CommitRef>, GitError> {
        self.check(GitOp::Commit)?;

        let tree = self.fs.snapshot(wc.path());
        let mut state = self.state.lock().unwrap();
        if tree == state.head {
            return Ok(None);
        }

        let commit = CommitRef {
            id: format!("mock{:04}", state.commits.len() + 1),
            message: message.to_string(),
        };
        state.refs.insert(wc.branch().to_string(), tree.clone());
        state.head = tree;
        state.commits.push(commit.clone());
        Ok(Some(commit))
    }

    fn is_dirty(&self, wc: &WorkingCopy) -> Result<bool, GitError> {
        self.check(GitOp::Status)?;
        let tree = self.fs.snapshot(wc.path());
        Ok(tree != self.state.lock().unwrap().head)
    }

    fn push(&self, wc: &WorkingCopy, remote: &str, _force: bool) -> Result<(), GitError> {
        self.check(GitOp::Push)?;
        self.state
            .lock()
            .unwrap()
            .pushed
            .push((remote.to_string(), wc.branch().to_string()));
        Ok(())
    }
}
