pub mod commands;

pub use commands::{BuildArgs, CliArgs, Commands, DetectArgs, ProgressFormat};
