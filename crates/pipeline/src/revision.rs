//! Commit revision lookup

use crate::exec::{ExecError, Executable, Execution};
use gitpack_core::fs::FileSystem;
use gitpack_core::progress::{ProgressEvent, ProgressHandler};
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Name of the version-control metadata directory
pub const GIT_DIR: &str = ".git";

const REV_PARSE_ARGS: [&str; 2] = ["rev-parse", "HEAD"];

#[derive(Debug, Error)]
pub enum RevisionError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to execute '{command}': {source}")]
    Command {
        command: String,
        #[source]
        source: ExecError,
    },
}

/// Commit identifier of the working directory's HEAD
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision(String);

impl Revision {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `true` when `working_dir/.git` is a directory. A `.git` file (submodule
/// or worktree marker) counts as absent.
pub fn git_dir_exists(fs: &dyn FileSystem, working_dir: &Path) -> io::Result<bool> {
    fs.dir_exists(&working_dir.join(GIT_DIR))
}

pub struct RevisionExtractor {
    executable: Arc<dyn Executable>,
    fs: Arc<dyn FileSystem>,
    progress: Arc<dyn ProgressHandler>,
}

impl RevisionExtractor {
    pub fn new(
        executable: Arc<dyn Executable>,
        fs: Arc<dyn FileSystem>,
        progress: Arc<dyn ProgressHandler>,
    ) -> Self {
        Self {
            executable,
            fs,
            progress,
        }
    }

    /// Returns `None` without running git when there is no `.git` directory
    pub fn extract(&self, working_dir: &Path) -> Result<Option<Revision>, RevisionError> {
        if !git_dir_exists(self.fs.as_ref(), working_dir)? {
            debug!(dir = %working_dir.display(), "No .git directory, skipping revision");
            return Ok(None);
        }

        let execution = Execution::new(REV_PARSE_ARGS, working_dir);
        let mut output = Vec::new();

        if let Err(source) = self.executable.execute(&execution, &mut output) {
            self.progress.on_progress(&ProgressEvent::CommandOutput {
                output: String::from_utf8_lossy(&output).into_owned(),
            });
            return Err(RevisionError::Command {
                command: execution.command_line("git"),
                source,
            });
        }

        let revision = Revision::new(&String::from_utf8_lossy(&output));
        debug!(revision = %revision, "Resolved HEAD");
        Ok(Some(revision))
    }
}
