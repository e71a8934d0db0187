pub mod cli;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Exit code telling the lifecycle to skip this buildpack
pub const EXIT_SKIP: i32 = 100;
pub const EXIT_ERROR: i32 = 1;

/// Parses a log level, falling back to INFO for unknown values
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber on stderr; later calls are ignored.
///
/// `RUST_LOG`, when set, replaces the default `gitpack*` directives.
pub fn init_logging(level: Level, json: bool) {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();

        if std::env::var("RUST_LOG").is_err() {
            for crate_name in ["gitpack", "gitpack_core", "gitpack_pipeline", "gitpack_cli"] {
                if let Ok(directive) = format!("{}={}", crate_name, level).parse() {
                    filter = filter.add_directive(directive);
                }
            }
        }

        if json {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
                .init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("trace"), Level::TRACE);
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("Warn"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
    }

    #[test]
    fn test_parse_level_invalid() {
        assert_eq!(parse_level("invalid"), Level::INFO);
        assert_eq!(parse_level(""), Level::INFO);
    }

    #[test]
    fn test_name_is_gitpack_cli() {
        assert_eq!(NAME, "gitpack-cli");
    }
}
