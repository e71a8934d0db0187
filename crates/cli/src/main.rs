use gitpack_cli::cli::{BuildArgs, CliArgs, Commands, DetectArgs, ProgressFormat};
use gitpack_cli::{init_logging, parse_level, EXIT_ERROR, EXIT_SKIP, VERSION};
use gitpack_core::config::GitpackConfig;
use gitpack_core::fs::{FileSystem, RealFileSystem};
use gitpack_core::progress::{LoggingHandler, ProgressHandler, TextHandler};
use gitpack_pipeline::{
    BuildContext, BuildPhase, BuildpackInfo, BuildpackPhase, DetectContext, DetectPhase,
    Executable, FsBindingResolver, GitCredentialManager, GitExecutable, RevisionExtractor,
};

use anyhow::Context;
use clap::Parser;
use gitpack_core::output::BuildResult;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, Level};

fn main() {
    let args = CliArgs::parse();
    let config = GitpackConfig::default();
    init_logging_from_args(&args, &config);

    debug!("gitpack v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your environment variables and command-line arguments.");
        std::process::exit(EXIT_ERROR);
    }
    debug!("{}", config);

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args, &config),
        Commands::Build(build_args) => handle_build(build_args, &config, args.progress),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs, config: &GitpackConfig) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        parse_level(&config.log_level)
    };

    init_logging(level, config.log_json);
}

fn resolve_working_dir(dir: &Option<PathBuf>) -> Option<PathBuf> {
    let dir = match dir {
        Some(dir) => dir.clone(),
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Failed to get current directory: {}", e);
                return None;
            }
        },
    };

    if !dir.is_dir() {
        error!("Working directory is not a directory: {}", dir.display());
        return None;
    }

    Some(dir)
}

fn buildpack_info(config: &GitpackConfig) -> BuildpackInfo {
    BuildpackInfo::new(&config.buildpack_name, &config.buildpack_version)
}

fn run_phase<P: BuildpackPhase>(phase: &P, context: &P::Context) -> Result<P::Output, P::Error> {
    let start = Instant::now();
    info!(phase = phase.name(), "Starting phase");

    let result = phase.execute(context);

    debug!(
        phase = phase.name(),
        ok = result.is_ok(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Phase finished"
    );
    result
}

fn persist(result: &BuildResult, layers_dir: &Path) -> anyhow::Result<()> {
    result
        .write(layers_dir)
        .with_context(|| format!("Failed to persist build output to {}", layers_dir.display()))
}

fn handle_detect(args: &DetectArgs, config: &GitpackConfig) -> i32 {
    let Some(working_dir) = resolve_working_dir(&args.working_dir) else {
        return EXIT_ERROR;
    };
    debug!("Working directory: {}", working_dir.display());
    debug!("Bindings directory: {}", config.bindings_dir(&args.platform).display());

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let resolver = FsBindingResolver::new(fs.clone()).with_root(config.binding_root.clone());
    let phase = DetectPhase::new(Arc::new(resolver), fs);
    let context = DetectContext::new(&working_dir, &args.platform, buildpack_info(config));

    match run_phase(&phase, &context) {
        Ok(_) => {
            info!("Detection passed");
            0
        }
        Err(e) if e.is_ineligible() => {
            println!("{}", e);
            EXIT_SKIP
        }
        Err(e) => {
            error!("Detection failed: {}", e);
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}

fn handle_build(args: &BuildArgs, config: &GitpackConfig, progress: ProgressFormat) -> i32 {
    let Some(working_dir) = resolve_working_dir(&args.working_dir) else {
        return EXIT_ERROR;
    };
    debug!("Working directory: {}", working_dir.display());
    debug!("Layers directory: {}", args.layers.display());

    let progress: Arc<dyn ProgressHandler> = match progress {
        ProgressFormat::Text => Arc::new(TextHandler::new(std::io::stdout())),
        ProgressFormat::Log => Arc::new(LoggingHandler),
    };

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let executable: Arc<dyn Executable> = Arc::new(GitExecutable::new(&config.git_binary));
    let resolver = Arc::new(
        FsBindingResolver::new(fs.clone()).with_root(config.binding_root.clone()),
    );

    let revision = RevisionExtractor::new(executable.clone(), fs, progress.clone());
    let credentials = Arc::new(GitCredentialManager::new(
        resolver,
        executable,
        progress.clone(),
    ));
    let phase = BuildPhase::new(revision, credentials, progress);
    let context = BuildContext::new(
        &working_dir,
        &args.platform,
        &args.layers,
        buildpack_info(config),
    );

    let result = match run_phase(&phase, &context) {
        Ok(result) => result,
        Err(e) => {
            error!("Build failed: {}", e);
            eprintln!("Error: {}", e);
            return EXIT_ERROR;
        }
    };

    if let Err(e) = persist(&result, &args.layers) {
        error!("Failed to write build result: {:#}", e);
        eprintln!("Error: {:#}", e);
        return EXIT_ERROR;
    }

    debug!("{}", result);
    0
}
