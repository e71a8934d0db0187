//! Progress reporting for buildpack phases

mod handler;
mod logging;
mod text;

pub use handler::{EnvScope, NoOpHandler, ProgressEvent, ProgressHandler};
pub use logging::LoggingHandler;
pub use text::TextHandler;
