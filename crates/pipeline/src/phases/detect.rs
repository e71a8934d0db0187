//! Eligibility check
//!
//! The buildpack participates when the working directory is a git checkout
//! or when git credentials are bound, since either one gives the build phase
//! something to do.

use crate::bindings::{BindingError, BindingResolver, GIT_CREDENTIALS_TYPE};
use crate::context::DetectContext;
use crate::phase_trait::BuildpackPhase;
use crate::revision::git_dir_exists;
use gitpack_core::fs::FileSystem;
use std::io;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const INELIGIBLE_MESSAGE: &str =
    "failed to find .git directory and no git credential service bindings present";

#[derive(Debug, Error)]
pub enum DetectError {
    /// Not a failure of the build: the orchestrator should skip this buildpack
    #[error("{0}")]
    Ineligible(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Resolution(#[from] BindingError),
}

impl DetectError {
    pub fn is_ineligible(&self) -> bool {
        matches!(self, DetectError::Ineligible(_))
    }
}

/// Detect contributes no build plan entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectResult;

pub struct DetectPhase {
    resolver: Arc<dyn BindingResolver>,
    fs: Arc<dyn FileSystem>,
}

impl DetectPhase {
    pub fn new(resolver: Arc<dyn BindingResolver>, fs: Arc<dyn FileSystem>) -> Self {
        Self { resolver, fs }
    }

    pub fn check(&self, working_dir: &Path, platform_dir: &Path) -> Result<DetectResult, DetectError> {
        let has_git_dir = git_dir_exists(self.fs.as_ref(), working_dir)?;

        let bindings = self
            .resolver
            .resolve(GIT_CREDENTIALS_TYPE, "", platform_dir)?;

        debug!(
            has_git_dir,
            bindings = bindings.len(),
            "Evaluated detect conditions"
        );

        if !has_git_dir && bindings.is_empty() {
            return Err(DetectError::Ineligible(INELIGIBLE_MESSAGE.to_string()));
        }

        Ok(DetectResult)
    }
}

impl BuildpackPhase for DetectPhase {
    type Context = DetectContext;
    type Output = DetectResult;
    type Error = DetectError;

    fn name(&self) -> &'static str {
        "detect"
    }

    fn execute(&self, context: &DetectContext) -> Result<DetectResult, DetectError> {
        self.check(&context.working_dir, &context.platform_dir)
    }
}
