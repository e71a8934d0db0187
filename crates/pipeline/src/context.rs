use gitpack_core::output::Layers;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildpackInfo {
    pub name: String,
    pub version: String,
}

impl BuildpackInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Inputs to the detect phase. Never mutated by the phase.
#[derive(Debug, Clone)]
pub struct DetectContext {
    pub working_dir: PathBuf,
    pub platform_dir: PathBuf,
    pub buildpack: BuildpackInfo,
}

impl DetectContext {
    pub fn new(working_dir: &Path, platform_dir: &Path, buildpack: BuildpackInfo) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            platform_dir: platform_dir.to_path_buf(),
            buildpack,
        }
    }
}

/// Inputs to the build phase. Never mutated by the phase.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub working_dir: PathBuf,
    pub platform_dir: PathBuf,
    pub layers: Layers,
    pub buildpack: BuildpackInfo,
}

impl BuildContext {
    pub fn new(
        working_dir: &Path,
        platform_dir: &Path,
        layers_dir: &Path,
        buildpack: BuildpackInfo,
    ) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            platform_dir: platform_dir.to_path_buf(),
            layers: Layers::new(layers_dir),
            buildpack,
        }
    }
}
