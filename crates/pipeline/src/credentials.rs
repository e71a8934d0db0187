//! Git credential provisioning from service bindings
//!
//! Each `git-credentials` binding becomes one `credential.helper` entry in
//! the global git config. A binding with a `context` entry is scoped to that
//! URL (`credential.<context>.helper`); otherwise it becomes the default
//! helper. Two bindings may not share a scope: git would silently use
//! whichever was written last.
//!
//! Directives are applied one at a time, in resolution order. A duplicate
//! scope or a failed `git config` aborts the pass, and directives applied
//! before the failure stay in the config; there is no rollback.

use crate::bindings::{Binding, BindingError, BindingResolver, GIT_CREDENTIALS_TYPE};
use crate::exec::{ExecError, Executable, Execution};
use crate::shell::credential_helper_expression;
use gitpack_core::progress::{ProgressEvent, ProgressHandler};
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_SCOPE: &str = "credential.helper";
pub const CONTEXT_ENTRY: &str = "context";

/// git config key a credential helper is registered under
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeKey(String);

impl ScopeKey {
    pub fn default_scope() -> Self {
        Self(DEFAULT_SCOPE.to_string())
    }

    /// Scope for a context value; blank contexts fall back to the default
    pub fn for_context(context: &str) -> Self {
        let context = context.trim();
        if context.is_empty() {
            Self::default_scope()
        } else {
            Self(format!("credential.{}.helper", context))
        }
    }

    /// Reads the binding's `context` entry, if it has one
    pub fn for_binding(binding: &Binding) -> io::Result<Self> {
        match binding.entry(CONTEXT_ENTRY) {
            Some(entry) => Ok(Self::for_context(&entry.read_string()?)),
            None => Ok(Self::default_scope()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single `git config --global <scope> <helper>` write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDirective {
    pub scope: ScopeKey,
    pub helper: String,
}

impl ConfigDirective {
    pub fn for_binding(scope: ScopeKey, binding: &Binding) -> Self {
        Self {
            scope,
            helper: credential_helper_expression(&binding.path),
        }
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "config".to_string(),
            "--global".to_string(),
            self.scope.to_string(),
            self.helper.clone(),
        ]
    }
}

/// Stage of a provisioning pass that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStage {
    Resolution,
    EntryRead,
    DuplicateScope,
    Apply,
}

impl fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProvisionStage::Resolution => "resolution",
            ProvisionStage::EntryRead => "entry read",
            ProvisionStage::DuplicateScope => "duplicate scope",
            ProvisionStage::Apply => "apply",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Resolution(#[from] BindingError),

    #[error("{source}")]
    EntryRead {
        binding: String,
        #[source]
        source: io::Error,
    },

    #[error("failed: there are two or more bindings for the same context: please limit the bindings to one per context")]
    DuplicateScope { scope: ScopeKey, binding: String },

    #[error(transparent)]
    Apply(#[from] ExecError),
}

impl ProvisionError {
    pub fn stage(&self) -> ProvisionStage {
        match self {
            ProvisionError::Resolution(_) => ProvisionStage::Resolution,
            ProvisionError::EntryRead { .. } => ProvisionStage::EntryRead,
            ProvisionError::DuplicateScope { .. } => ProvisionStage::DuplicateScope,
            ProvisionError::Apply(_) => ProvisionStage::Apply,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait CredentialManager: Send + Sync {
    /// Configures git credential helpers for every bound credential and
    /// returns how many were written.
    fn setup(&self, working_dir: &Path, platform_dir: &Path) -> Result<usize, ProvisionError>;
}

pub struct GitCredentialManager {
    resolver: Arc<dyn BindingResolver>,
    executable: Arc<dyn Executable>,
    progress: Arc<dyn ProgressHandler>,
}

impl GitCredentialManager {
    pub fn new(
        resolver: Arc<dyn BindingResolver>,
        executable: Arc<dyn Executable>,
        progress: Arc<dyn ProgressHandler>,
    ) -> Self {
        Self {
            resolver,
            executable,
            progress,
        }
    }

    fn apply(&self, directive: &ConfigDirective, working_dir: &Path) -> Result<(), ProvisionError> {
        let mut output = Vec::new();
        let execution = Execution::new(directive.args(), working_dir);

        if let Err(e) = self.executable.execute(&execution, &mut output) {
            self.progress.on_progress(&ProgressEvent::CommandOutput {
                output: String::from_utf8_lossy(&output).into_owned(),
            });
            return Err(e.into());
        }

        debug!(scope = %directive.scope, "Credential helper configured");
        Ok(())
    }
}

impl CredentialManager for GitCredentialManager {
    fn setup(&self, working_dir: &Path, platform_dir: &Path) -> Result<usize, ProvisionError> {
        let bindings = self
            .resolver
            .resolve(GIT_CREDENTIALS_TYPE, "", platform_dir)?;

        if bindings.is_empty() {
            return Ok(0);
        }

        self.progress.on_progress(&ProgressEvent::CredentialsStarted);

        let mut used = HashSet::new();
        for binding in &bindings {
            let scope =
                ScopeKey::for_binding(binding).map_err(|source| ProvisionError::EntryRead {
                    binding: binding.name.clone(),
                    source,
                })?;

            if !used.insert(scope.clone()) {
                return Err(ProvisionError::DuplicateScope {
                    scope,
                    binding: binding.name.clone(),
                });
            }

            let directive = ConfigDirective::for_binding(scope, binding);
            self.apply(&directive, working_dir)?;
        }

        info!(count = bindings.len(), "Configured git credential helpers");
        self.progress.on_progress(&ProgressEvent::CredentialsConfigured {
            count: bindings.len(),
        });

        Ok(bindings.len())
    }
}
