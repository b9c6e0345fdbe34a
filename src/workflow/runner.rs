//! Post-deploy command execution

use crate::error::StepError;
use std::path::Path;
use std::process::Command;
use std::sync::Mutex;
use tracing::debug;

pub trait CommandRunner: Send + Sync {
    /// Runs `command` through the shell in `cwd`, returning its stdout.
    fn run(&self, cwd: &Path, command: &str) -> Result<String, StepError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, cwd: &Path, command: &str) -> Result<String, StepError> {
        debug!(command, cwd = %cwd.display(), "Running command");
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .output()
            .map_err(|e| StepError::Command {
                command: command.to_string(),
                cause: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(StepError::Command {
                command: command.to_string(),
                cause: if stderr.is_empty() {
                    output.status.to_string()
                } else {
                    stderr
                },
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Records commands instead of running them.
#[derive(Debug, Default)]
pub struct MockRunner {
    executed: Mutex<Vec<String>>,
    failing: Mutex<Option<String>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every command containing `pattern` fail.
    pub fn fail_matching(&self, pattern: &str) {
        *self.failing.lock().unwrap() = Some(pattern.to_string());
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, _cwd: &Path, command: &str) -> Result<String, StepError> {
        self.executed.lock().unwrap().push(command.to_string());
        match self.failing.lock().unwrap().as_deref() {
            Some(pattern) if command.contains(pattern) => Err(StepError::Command {
                command: command.to_string(),
                cause: "exit status: 1".to_string(),
            }),
            _ => Ok(String::new()),
        }
    }
}
