pub mod schema;

pub use schema::{BuildResult, Environment, Label, LaunchMetadata, Layer, Layers};
