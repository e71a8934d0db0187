//! Service binding resolution
//!
//! A binding is a directory under the binding root. Its `type` file names
//! the kind of service, an optional `provider` file narrows it further, and
//! every other file is an entry whose value is read lazily through an
//! [`EntryReader`].

use gitpack_core::fs::{FileSystem, FileType};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Binding type carrying git credentials
pub const GIT_CREDENTIALS_TYPE: &str = "git-credentials";

const TYPE_FILE: &str = "type";
const PROVIDER_FILE: &str = "provider";

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("failed to read binding root {}: {source}", path.display())]
    ReadRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read binding {name}: {source}")]
    ReadBinding {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("binding {name} at {} is missing a type file", path.display())]
    MissingType { name: String, path: PathBuf },
}

/// Lazily reads the value of a binding entry
pub trait EntryReader: fmt::Debug + Send + Sync {
    fn read_string(&self) -> io::Result<String>;
}

/// Entry backed by a file, read on every call
pub struct FileEntry {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileEntry").field("path", &self.path).finish()
    }
}

impl EntryReader for FileEntry {
    fn read_string(&self) -> io::Result<String> {
        self.fs.read_to_string(&self.path)
    }
}

/// Entry whose value is already in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineEntry(String);

impl InlineEntry {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl EntryReader for InlineEntry {
    fn read_string(&self) -> io::Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Default)]
pub struct Binding {
    pub name: String,
    pub path: PathBuf,
    pub binding_type: String,
    pub provider: String,
    pub entries: BTreeMap<String, Box<dyn EntryReader>>,
}

impl Binding {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            binding_type: GIT_CREDENTIALS_TYPE.to_string(),
            ..Default::default()
        }
    }

    pub fn with_entry(mut self, key: &str, reader: impl EntryReader + 'static) -> Self {
        self.entries.insert(key.to_string(), Box::new(reader));
        self
    }

    pub fn entry(&self, key: &str) -> Option<&dyn EntryReader> {
        self.entries.get(key).map(|e| e.as_ref())
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait BindingResolver: Send + Sync {
    /// Bindings of `binding_type` under `platform_dir`, in a stable order.
    /// An empty `provider` matches every provider.
    fn resolve(
        &self,
        binding_type: &str,
        provider: &str,
        platform_dir: &Path,
    ) -> Result<Vec<Binding>, BindingError>;
}

/// Resolves bindings from the directory layout mounted by the platform
pub struct FsBindingResolver {
    fs: Arc<dyn FileSystem>,
    root: Option<PathBuf>,
}

impl FsBindingResolver {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs, root: None }
    }

    /// Use `root` instead of `<platform>/bindings`
    pub fn with_root(mut self, root: Option<PathBuf>) -> Self {
        self.root = root;
        self
    }

    fn read_binding(&self, name: &str, path: &Path) -> Result<Binding, BindingError> {
        let read_err = |source| BindingError::ReadBinding {
            name: name.to_string(),
            source,
        };

        let mut children = self.fs.read_dir(path).map_err(read_err)?;
        children.sort_by(|a, b| a.name.cmp(&b.name));

        let mut binding = Binding {
            name: name.to_string(),
            path: path.to_path_buf(),
            ..Default::default()
        };
        let mut has_type = false;

        for child in children {
            if child.file_type() != FileType::File || child.name.starts_with('.') {
                continue;
            }
            match child.file_name() {
                TYPE_FILE => {
                    binding.binding_type =
                        self.fs.read_to_string(child.path()).map_err(read_err)?.trim().to_string();
                    has_type = true;
                }
                PROVIDER_FILE => {
                    binding.provider =
                        self.fs.read_to_string(child.path()).map_err(read_err)?.trim().to_string();
                }
                key => {
                    binding.entries.insert(
                        key.to_string(),
                        Box::new(FileEntry::new(child.path(), self.fs.clone())),
                    );
                }
            }
        }

        if !has_type {
            return Err(BindingError::MissingType {
                name: name.to_string(),
                path: path.to_path_buf(),
            });
        }

        Ok(binding)
    }
}

impl BindingResolver for FsBindingResolver {
    fn resolve(
        &self,
        binding_type: &str,
        provider: &str,
        platform_dir: &Path,
    ) -> Result<Vec<Binding>, BindingError> {
        let root = self
            .root
            .clone()
            .unwrap_or_else(|| platform_dir.join("bindings"));

        let read_root = |source| BindingError::ReadRoot {
            path: root.clone(),
            source,
        };

        if !self.fs.dir_exists(&root).map_err(read_root)? {
            debug!(root = %root.display(), "No binding root present");
            return Ok(Vec::new());
        }

        let mut candidates = self.fs.read_dir(&root).map_err(read_root)?;
        candidates.sort_by(|a, b| a.name.cmp(&b.name));

        let mut bindings = Vec::new();
        for candidate in candidates {
            if candidate.file_type() != FileType::Directory || candidate.name.starts_with('.') {
                continue;
            }

            let binding = self.read_binding(candidate.file_name(), candidate.path())?;
            if !binding.binding_type.eq_ignore_ascii_case(binding_type) {
                continue;
            }
            if !provider.is_empty() && !binding.provider.eq_ignore_ascii_case(provider) {
                continue;
            }

            debug!(binding = %binding.name, binding_type, "Resolved binding");
            bindings.push(binding);
        }

        Ok(bindings)
    }
}
