//! Build phase: exports the revision and configures git credentials

use crate::context::BuildContext;
use crate::credentials::{CredentialManager, ProvisionError};
use crate::phase_trait::BuildpackPhase;
use crate::revision::{RevisionError, RevisionExtractor};
use gitpack_core::output::BuildResult;
use gitpack_core::progress::{EnvScope, ProgressEvent, ProgressHandler};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Layer holding the exported git environment
pub const LAYER_NAME: &str = "git";
pub const REVISION_ENV: &str = "REVISION";
pub const REVISION_LABEL: &str = "org.opencontainers.image.revision";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Revision(#[from] RevisionError),

    #[error("failed to configure given credentials: {0}")]
    Credentials(#[source] ProvisionError),
}

pub struct BuildPhase {
    revision: RevisionExtractor,
    credentials: Arc<dyn CredentialManager>,
    progress: Arc<dyn ProgressHandler>,
}

impl BuildPhase {
    pub fn new(
        revision: RevisionExtractor,
        credentials: Arc<dyn CredentialManager>,
        progress: Arc<dyn ProgressHandler>,
    ) -> Self {
        Self {
            revision,
            credentials,
            progress,
        }
    }
}

impl BuildpackPhase for BuildPhase {
    type Context = BuildContext;
    type Output = BuildResult;
    type Error = BuildError;

    fn name(&self) -> &'static str {
        "build"
    }

    fn execute(&self, context: &BuildContext) -> Result<BuildResult, BuildError> {
        self.progress.on_progress(&ProgressEvent::Title {
            name: context.buildpack.name.clone(),
            version: context.buildpack.version.clone(),
        });

        let mut result = BuildResult::default();

        if let Some(revision) = self.revision.extract(&context.working_dir)? {
            let mut layer = context.layers.get(LAYER_NAME);
            layer.build = true;
            layer.launch = true;
            layer.shared_env.set_default(REVISION_ENV, revision.as_str());

            let variables = layer.shared_env.variables();
            for scope in [EnvScope::Build, EnvScope::Launch] {
                self.progress.on_progress(&ProgressEvent::EnvironmentConfigured {
                    scope,
                    variables: variables.clone(),
                });
            }

            result.layers.push(layer);
            result
                .launch
                .labels
                .insert(REVISION_LABEL.to_string(), revision.to_string());
        }

        let count = self
            .credentials
            .setup(&context.working_dir, &context.platform_dir)
            .map_err(BuildError::Credentials)?;
        debug!(count, "Credential provisioning finished");

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::BuildpackInfo;
    use crate::credentials::MockCredentialManager;
    use crate::exec::{ExecError, MockExecutable};
    use gitpack_core::fs::MockFileSystem;
    use gitpack_core::progress::TextHandler;
    use std::path::{Path, PathBuf};

    fn context() -> BuildContext {
        BuildContext::new(
            Path::new("/mock/working-dir"),
            Path::new("/mock/platform"),
            Path::new("/layers"),
            BuildpackInfo::new("Some Buildpack", "some-version"),
        )
    }

    fn executable_printing(revision: &'static str) -> MockExecutable {
        let mut executable = MockExecutable::new();
        executable.expect_execute().returning(move |_, output| {
            output.extend_from_slice(revision.as_bytes());
            Ok(())
        });
        executable
    }

    fn credentials_ok(count: usize) -> MockCredentialManager {
        let mut credentials = MockCredentialManager::new();
        credentials
            .expect_setup()
            .withf(|working_dir, platform_dir| {
                working_dir == Path::new("/mock/working-dir")
                    && platform_dir == Path::new("/mock/platform")
            })
            .times(1)
            .returning(move |_, _| Ok(count));
        credentials
    }

    fn phase(
        executable: MockExecutable,
        fs: MockFileSystem,
        credentials: MockCredentialManager,
        progress: Arc<TextHandler<Vec<u8>>>,
    ) -> BuildPhase {
        let revision = RevisionExtractor::new(Arc::new(executable), Arc::new(fs), progress.clone());
        BuildPhase::new(revision, Arc::new(credentials), progress)
    }

    #[test]
    fn test_exports_revision_layer_and_label() {
        let fs = MockFileSystem::new();
        fs.add_dir("working-dir/.git");
        let progress = Arc::new(TextHandler::new(Vec::new()));

        let result = phase(
            executable_printing("sha123456789\n"),
            fs,
            credentials_ok(0),
            progress.clone(),
        )
        .execute(&context())
        .unwrap();

        assert_eq!(result.layers.len(), 1);
        let layer = &result.layers[0];
        assert_eq!(layer.name, "git");
        assert_eq!(layer.path, PathBuf::from("/layers/git"));
        assert!(layer.build);
        assert!(layer.launch);
        assert_eq!(
            layer.shared_env.iter().collect::<Vec<_>>(),
            vec![(&"REVISION.default".to_string(), &"sha123456789".to_string())]
        );
        assert_eq!(
            result.launch.labels.get(REVISION_LABEL).map(String::as_str),
            Some("sha123456789")
        );

        assert_eq!(
            progress.contents(),
            "Some Buildpack some-version\n  \
             Configuring build environment\n    REVISION -> \"sha123456789\"\n\n  \
             Configuring launch environment\n    REVISION -> \"sha123456789\"\n\n"
        );
    }

    #[test]
    fn test_no_git_dir_produces_empty_result() {
        let fs = MockFileSystem::new();
        fs.add_dir("working-dir");
        let mut executable = MockExecutable::new();
        executable.expect_execute().never();
        let progress = Arc::new(TextHandler::new(Vec::new()));

        let result = phase(executable, fs, credentials_ok(1), progress.clone())
            .execute(&context())
            .unwrap();

        assert!(result.is_empty());
        assert!(!progress.contents().contains("REVISION"));
    }

    #[test]
    fn test_revision_failure_aborts_before_credentials() {
        let fs = MockFileSystem::new();
        fs.add_dir("working-dir/.git");
        let mut executable = MockExecutable::new();
        executable.expect_execute().returning(|_, _| {
            Err(ExecError::Failed {
                status: "exit status: 128".to_string(),
            })
        });
        let mut credentials = MockCredentialManager::new();
        credentials.expect_setup().never();

        let err = phase(executable, fs, credentials, Arc::new(TextHandler::new(Vec::new())))
            .execute(&context())
            .unwrap_err();

        assert!(matches!(err, BuildError::Revision(_)));
        assert_eq!(
            err.to_string(),
            "failed to execute 'git rev-parse HEAD': command failed: exit status: 128"
        );
    }

    #[test]
    fn test_credential_failure_is_prefixed() {
        let fs = MockFileSystem::new();
        fs.add_dir("working-dir");
        let mut executable = MockExecutable::new();
        executable.expect_execute().never();
        let mut credentials = MockCredentialManager::new();
        credentials.expect_setup().returning(|_, _| {
            Err(ProvisionError::Apply(ExecError::Failed {
                status: "exit status: 255".to_string(),
            }))
        });

        let err = phase(executable, fs, credentials, Arc::new(TextHandler::new(Vec::new())))
            .execute(&context())
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "failed to configure given credentials: command failed: exit status: 255"
        );
    }
}
