pub mod config;
pub mod fs;
pub mod output;
pub mod progress;

pub use config::{ConfigError, GitpackConfig};
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use output::schema::{BuildResult, Layer, Layers};
pub use progress::{LoggingHandler, ProgressEvent, ProgressHandler, TextHandler};
