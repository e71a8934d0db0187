//! Human-readable build narration
//!
//! Writes the indented, line-oriented output buildpack users expect to see
//! in their build logs:
//!
//! ```text
//! Gitpack Buildpack 0.1.0
//!   Configuring build environment
//!     REVISION -> "2df6ac40"
//!
//!   Configuring credentials
//!     Added 1 custom git credential manager(s) to the git config
//!
//! ```

use super::{EnvScope, ProgressEvent, ProgressHandler};
use std::io::Write;
use std::sync::Mutex;

const PROCESS_INDENT: &str = "  ";
const SUBPROCESS_INDENT: &str = "    ";
const DETAIL_INDENT: &str = "        ";

pub struct TextHandler<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> TextHandler<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn render(event: &ProgressEvent) -> Vec<String> {
        match event {
            ProgressEvent::Title { name, version } => vec![format!("{} {}", name, version)],
            ProgressEvent::EnvironmentConfigured { scope, variables } => {
                let heading = match scope {
                    EnvScope::Build => "Configuring build environment",
                    EnvScope::Launch => "Configuring launch environment",
                };
                let mut lines = vec![format!("{}{}", PROCESS_INDENT, heading)];
                lines.extend(
                    variables
                        .iter()
                        .map(|(k, v)| format!("{}{} -> {:?}", SUBPROCESS_INDENT, k, v)),
                );
                lines.push(String::new());
                lines
            }
            ProgressEvent::CredentialsStarted => {
                vec![format!("{}Configuring credentials", PROCESS_INDENT)]
            }
            ProgressEvent::CommandOutput { output } => output
                .lines()
                .map(|line| format!("{}{}", DETAIL_INDENT, line))
                .collect(),
            ProgressEvent::CredentialsConfigured { count } => vec![
                format!(
                    "{}Added {} custom git credential manager(s) to the git config",
                    SUBPROCESS_INDENT, count
                ),
                String::new(),
            ],
        }
    }
}

impl TextHandler<Vec<u8>> {
    /// Everything written so far, for in-memory handlers
    pub fn contents(&self) -> String {
        let buffer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl<W: Write + Send> ProgressHandler for TextHandler<W> {
    fn on_progress(&self, event: &ProgressEvent) {
        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        for line in Self::render(event) {
            // narration is best-effort; a closed stdout must not fail the build
            let _ = writeln!(writer, "{}", line);
        }
        let _ = writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_title_line() {
        let handler = TextHandler::new(Vec::new());
        handler.on_progress(&ProgressEvent::Title {
            name: "Some Buildpack".to_string(),
            version: "some-version".to_string(),
        });

        assert_eq!(handler.contents(), "Some Buildpack some-version\n");
    }

    #[test]
    fn test_environment_block() {
        let handler = TextHandler::new(Vec::new());
        let variables = BTreeMap::from([("REVISION".to_string(), "sha123456789".to_string())]);

        handler.on_progress(&ProgressEvent::EnvironmentConfigured {
            scope: EnvScope::Build,
            variables: variables.clone(),
        });
        handler.on_progress(&ProgressEvent::EnvironmentConfigured {
            scope: EnvScope::Launch,
            variables,
        });

        assert_eq!(
            handler.contents(),
            "  Configuring build environment\n    REVISION -> \"sha123456789\"\n\n  \
             Configuring launch environment\n    REVISION -> \"sha123456789\"\n\n"
        );
    }

    #[test]
    fn test_command_output_is_indented_per_line() {
        let handler = TextHandler::new(Vec::new());
        handler.on_progress(&ProgressEvent::CommandOutput {
            output: "build error stdout\nbuild error stderr\n".to_string(),
        });

        assert_eq!(
            handler.contents(),
            "        build error stdout\n        build error stderr\n"
        );
    }

    #[test]
    fn test_credentials_configured_message() {
        let handler = TextHandler::new(Vec::new());
        handler.on_progress(&ProgressEvent::CredentialsStarted);
        handler.on_progress(&ProgressEvent::CredentialsConfigured { count: 2 });

        let output = handler.contents();
        assert!(output.contains("  Configuring credentials\n"));
        assert!(output.contains("Added 2 custom git credential manager(s) to the git config"));
    }
}
