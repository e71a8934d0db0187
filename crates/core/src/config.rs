use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_GIT_BINARY: &str = "git";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_BUILDPACK_NAME: &str = "Gitpack Buildpack";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone)]
pub struct GitpackConfig {
    pub git_binary: String,
    /// Overrides `<platform>/bindings` as the service binding root
    pub binding_root: Option<PathBuf>,
    pub log_level: String,
    pub log_json: bool,
    pub buildpack_name: String,
    pub buildpack_version: String,
}

impl Default for GitpackConfig {
    fn default() -> Self {
        let git_binary =
            env::var("GITPACK_GIT_BINARY").unwrap_or_else(|_| DEFAULT_GIT_BINARY.to_string());

        let binding_root = env::var("SERVICE_BINDING_ROOT")
            .or_else(|_| env::var("CNB_BINDINGS"))
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let log_level = env::var("GITPACK_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = env::var("GITPACK_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        let buildpack_name = env::var("GITPACK_BUILDPACK_NAME")
            .unwrap_or_else(|_| DEFAULT_BUILDPACK_NAME.to_string());

        Self {
            git_binary,
            binding_root,
            log_level,
            log_json,
            buildpack_name,
            buildpack_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl GitpackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.git_binary.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Git binary must not be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if self.buildpack_name.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Buildpack name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Directory holding service bindings for the given platform directory
    pub fn bindings_dir(&self, platform_dir: &std::path::Path) -> PathBuf {
        self.binding_root
            .clone()
            .unwrap_or_else(|| platform_dir.join("bindings"))
    }
}

impl fmt::Display for GitpackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Gitpack Configuration:")?;
        writeln!(f, "  Git Binary: {}", self.git_binary)?;
        match &self.binding_root {
            Some(root) => writeln!(f, "  Binding Root: {}", root.display())?,
            None => writeln!(f, "  Binding Root: <platform>/bindings")?,
        }
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Log JSON: {}", self.log_json)?;
        writeln!(
            f,
            "  Buildpack: {} {}",
            self.buildpack_name, self.buildpack_version
        )?;
        Ok(())
    }
}
