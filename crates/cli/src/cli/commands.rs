use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Buildpack that exports the git revision and provisions git credentials
#[derive(Parser, Debug)]
#[command(
    name = "gitpack",
    about = "Buildpack that exports the git revision and provisions git credentials",
    version,
    long_about = "gitpack takes part in a buildpack build when the application is a git \
                  checkout or git credentials are bound. The build phase exports the HEAD \
                  revision as REVISION and as the org.opencontainers.image.revision label, \
                  and registers one git credential helper per git-credentials binding."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error logging"
    )]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "text",
        help = "How build progress is reported"
    )]
    pub progress: ProgressFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressFormat {
    /// Indented narration on stdout
    Text,
    /// Structured tracing records on stderr
    Log,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Decide whether the buildpack takes part in the build",
        long_about = "Passes when the working directory contains a .git directory or at least \
                      one git-credentials service binding is present.\n\n\
                      Exit codes: 0 pass, 100 skip, 1 error.\n\n\
                      Examples:\n  \
                      gitpack detect\n  \
                      gitpack detect --working-dir /workspace --platform /platform"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Export the git revision and configure git credentials",
        long_about = "Writes a git layer exporting REVISION, labels the image with the \
                      revision, and runs `git config --global` once per git-credentials \
                      binding.\n\n\
                      Examples:\n  \
                      gitpack build --layers /layers\n  \
                      SERVICE_BINDING_ROOT=/bindings gitpack build"
    )]
    Build(BuildArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        long,
        value_name = "DIR",
        help = "Application directory (defaults to the current directory)"
    )]
    pub working_dir: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        env = "CNB_PLATFORM_DIR",
        default_value = "/platform",
        help = "Platform directory holding service bindings"
    )]
    pub platform: PathBuf,
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(
        long,
        value_name = "DIR",
        help = "Application directory (defaults to the current directory)"
    )]
    pub working_dir: Option<PathBuf>,

    #[arg(
        long,
        value_name = "DIR",
        env = "CNB_PLATFORM_DIR",
        default_value = "/platform",
        help = "Platform directory holding service bindings"
    )]
    pub platform: PathBuf,

    #[arg(
        long,
        value_name = "DIR",
        env = "CNB_LAYERS_DIR",
        default_value = "/layers",
        help = "Directory the git layer and launch metadata are written to"
    )]
    pub layers: PathBuf,
}
