//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Title { name, version } => {
                info!(buildpack = %name, version = %version, "Starting build");
            }
            ProgressEvent::EnvironmentConfigured { scope, variables } => {
                for (key, value) in variables {
                    info!(scope = %scope, key = %key, value = %value, "Configured environment variable");
                }
            }
            ProgressEvent::CredentialsStarted => {
                info!("Configuring credentials");
            }
            ProgressEvent::CommandOutput { output } => {
                warn!(output = %output.trim_end(), "Command output");
            }
            ProgressEvent::CredentialsConfigured { count } => {
                debug!(count, "Credential helpers added to git config");
            }
        }
    }
}
