pub mod build;
pub mod detect;

pub use build::{BuildError, BuildPhase, LAYER_NAME, REVISION_ENV, REVISION_LABEL};
pub use detect::{DetectError, DetectPhase, DetectResult, INELIGIBLE_MESSAGE};
