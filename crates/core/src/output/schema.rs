use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable modifications keyed `<NAME>.<action>`, mirroring the
/// file names a layer's `env/` directory holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment(BTreeMap<String, String>);

impl Environment {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets `name` unless the app or an earlier layer already provides it
    pub fn set_default(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(format!("{}.default", name), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Variable names and values with the action suffix stripped
    pub fn variables(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(key, value)| {
                let name = key.rsplit_once('.').map_or(key.as_str(), |(n, _)| n);
                (name.to_string(), value.clone())
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerTypes {
    pub build: bool,
    pub launch: bool,
    pub cache: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LayerDescriptor {
    types: LayerTypes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub name: String,
    pub path: PathBuf,
    pub build: bool,
    pub launch: bool,
    pub cache: bool,
    pub shared_env: Environment,
}

impl Layer {
    fn types(&self) -> LayerTypes {
        LayerTypes {
            build: self.build,
            launch: self.launch,
            cache: self.cache,
        }
    }

    /// Writes `<layers>/<name>.toml` and the `env/` files under the layer path.
    pub fn write(&self, layers_dir: &Path) -> Result<()> {
        let descriptor = LayerDescriptor {
            types: self.types(),
        };
        let toml = toml::to_string(&descriptor)
            .with_context(|| format!("Failed to serialize layer {}", self.name))?;
        let toml_path = layers_dir.join(format!("{}.toml", self.name));
        fs::write(&toml_path, toml)
            .with_context(|| format!("Failed to write {}", toml_path.display()))?;

        let env_dir = self.path.join("env");
        fs::create_dir_all(&env_dir)
            .with_context(|| format!("Failed to create {}", env_dir.display()))?;
        for (key, value) in self.shared_env.iter() {
            let env_path = env_dir.join(key);
            fs::write(&env_path, value)
                .with_context(|| format!("Failed to write {}", env_path.display()))?;
        }

        Ok(())
    }
}

/// Handle on the layers directory handed to the build phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layers {
    pub path: PathBuf,
}

impl Layers {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns a fresh, not yet persisted layer named `name`
    pub fn get(&self, name: &str) -> Layer {
        Layer {
            name: name.to_string(),
            path: self.path.join(name),
            build: false,
            launch: false,
            cache: false,
            shared_env: Environment::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchMetadata {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty", with = "labels")]
    pub labels: BTreeMap<String, String>,
}

impl LaunchMetadata {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// `launch.toml` stores labels as an array of `{ key, value }` tables
mod labels {
    use super::Label;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(labels: &BTreeMap<String, String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries: Vec<Label> = labels
            .iter()
            .map(|(key, value)| Label {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<Label>::deserialize(deserializer)?;
        Ok(entries.into_iter().map(|l| (l.key, l.value)).collect())
    }
}

/// Everything the build phase hands back to the orchestrator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildResult {
    pub layers: Vec<Layer>,
    pub launch: LaunchMetadata,
}

impl BuildResult {
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.launch.is_empty()
    }

    pub fn launch_toml(&self) -> Result<String> {
        toml::to_string(&self.launch).context("Failed to serialize launch metadata")
    }

    /// Persists every layer and, when labels exist, `launch.toml`
    pub fn write(&self, layers_dir: &Path) -> Result<()> {
        fs::create_dir_all(layers_dir)
            .with_context(|| format!("Failed to create {}", layers_dir.display()))?;

        for layer in &self.layers {
            layer.write(layers_dir)?;
        }

        if !self.launch.is_empty() {
            let launch_path = layers_dir.join("launch.toml");
            fs::write(&launch_path, self.launch_toml()?)
                .with_context(|| format!("Failed to write {}", launch_path.display()))?;
        }

        Ok(())
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for layer in &self.layers {
            writeln!(
                f,
                "layer {} (build: {}, launch: {})",
                layer.name, layer.build, layer.launch
            )?;
            for (key, value) in layer.shared_env.iter() {
                writeln!(f, "  {} = {}", key, value)?;
            }
        }
        for (key, value) in &self.launch.labels {
            writeln!(f, "label {} = {}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn revision_layer(layers: &Layers) -> Layer {
        let mut layer = layers.get("git");
        layer.build = true;
        layer.launch = true;
        layer.shared_env.set_default("REVISION", "sha123456789");
        layer
    }

    #[test]
    fn test_environment_default_key() {
        let mut env = Environment::new();
        env.set_default("REVISION", "abc");

        let keys: Vec<&String> = env.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["REVISION.default"]);
        assert_eq!(env.variables().get("REVISION").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_layers_get_uses_layer_path() {
        let layers = Layers::new("/layers");
        let layer = layers.get("git");

        assert_eq!(layer.path, PathBuf::from("/layers/git"));
        assert!(!layer.build);
        assert!(!layer.launch);
        assert!(layer.shared_env.is_empty());
    }

    #[test]
    fn test_launch_toml_labels() {
        let result = BuildResult {
            layers: vec![],
            launch: LaunchMetadata {
                labels: BTreeMap::from([(
                    "org.opencontainers.image.revision".to_string(),
                    "sha123456789".to_string(),
                )]),
            },
        };

        let toml = result.launch_toml().unwrap();
        assert!(toml.contains("[[labels]]"));
        assert!(toml.contains("key = \"org.opencontainers.image.revision\""));
        assert!(toml.contains("value = \"sha123456789\""));

        let parsed: LaunchMetadata = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, result.launch);
    }

    #[test]
    fn test_write_persists_layer_and_labels() {
        let temp = TempDir::new().unwrap();
        let layers = Layers::new(temp.path());
        let result = BuildResult {
            layers: vec![revision_layer(&layers)],
            launch: LaunchMetadata {
                labels: BTreeMap::from([(
                    "org.opencontainers.image.revision".to_string(),
                    "sha123456789".to_string(),
                )]),
            },
        };

        result.write(temp.path()).unwrap();

        let descriptor = fs::read_to_string(temp.path().join("git.toml")).unwrap();
        assert!(descriptor.contains("[types]"));
        assert!(descriptor.contains("build = true"));
        assert!(descriptor.contains("launch = true"));

        let env = fs::read_to_string(temp.path().join("git/env/REVISION.default")).unwrap();
        assert_eq!(env, "sha123456789");

        assert!(temp.path().join("launch.toml").exists());
    }

    #[test]
    fn test_empty_result_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let result = BuildResult::default();

        assert!(result.is_empty());
        result.write(temp.path()).unwrap();

        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }
}
