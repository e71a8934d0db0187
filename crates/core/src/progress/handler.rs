//! Progress handler trait and events

use std::collections::BTreeMap;
use std::fmt;

/// Which environment a set of exported variables applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvScope {
    Build,
    Launch,
}

impl fmt::Display for EnvScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvScope::Build => write!(f, "build"),
            EnvScope::Launch => write!(f, "launch"),
        }
    }
}

/// Events emitted while a phase runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Buildpack identity, printed once at the start of the build phase
    Title { name: String, version: String },

    /// Environment variables exported by a layer
    EnvironmentConfigured {
        scope: EnvScope,
        variables: BTreeMap<String, String>,
    },

    /// At least one credential binding was found and is being applied
    CredentialsStarted,

    /// Captured output of a failed external command
    CommandOutput { output: String },

    /// All credential helpers were written to the git config
    CredentialsConfigured { count: usize },
}

/// Trait for handling progress events
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_progress(&self, _event: &ProgressEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_noop_handler() {
        let handler = NoOpHandler;
        handler.on_progress(&ProgressEvent::CredentialsStarted);
    }

    #[test]
    fn test_progress_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_progress(&ProgressEvent::Title {
            name: "Gitpack".to_string(),
            version: "1.0.0".to_string(),
        });
        handler.on_progress(&ProgressEvent::CredentialsStarted);
        handler.on_progress(&ProgressEvent::CredentialsConfigured { count: 2 });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_env_scope_display() {
        assert_eq!(EnvScope::Build.to_string(), "build");
        assert_eq!(EnvScope::Launch.to_string(), "launch");
    }
}
