//! External command execution

use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("command failed: {status}")]
    Failed { status: String },
}

/// One invocation of the external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub args: Vec<String>,
    pub dir: PathBuf,
}

impl Execution {
    pub fn new<I, S>(args: I, dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            dir: dir.into(),
        }
    }

    /// `<program> <args...>`, for messages
    pub fn command_line(&self, program: &str) -> String {
        std::iter::once(program)
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Executable: Send + Sync {
    /// Runs `execution`, appending everything the process wrote to stdout
    /// and stderr to `output` whether or not it succeeded.
    fn execute(&self, execution: &Execution, output: &mut Vec<u8>) -> Result<(), ExecError>;
}

/// Runs the git binary
pub struct GitExecutable {
    binary: String,
}

impl GitExecutable {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for GitExecutable {
    fn default() -> Self {
        Self::new("git")
    }
}

impl Executable for GitExecutable {
    fn execute(&self, execution: &Execution, output: &mut Vec<u8>) -> Result<(), ExecError> {
        debug!(
            command = %execution.command_line(&self.binary),
            dir = %execution.dir.display(),
            "Executing"
        );

        let result = Command::new(&self.binary)
            .args(&execution.args)
            .current_dir(&execution.dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExecError::Spawn {
                program: self.binary.clone(),
                source,
            })?;

        output.extend_from_slice(&result.stdout);
        output.extend_from_slice(&result.stderr);

        if !result.status.success() {
            return Err(ExecError::Failed {
                status: result.status.to_string(),
            });
        }

        Ok(())
    }
}
