//! FileSystem trait definition

use std::io;
use std::path::{Path, PathBuf};

/// Metadata about a file
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub file_type: FileType,
}

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

impl FileMetadata {
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// A directory entry returned by read_dir
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }
}

/// Abstraction over file system operations for testability.
///
/// Fallible operations return [`io::Error`] so callers can tell a missing
/// path (`ErrorKind::NotFound`) apart from an unreadable one.
pub trait FileSystem: Send + Sync {
    /// Get file/directory metadata, following symlinks
    fn metadata(&self, path: &Path) -> io::Result<FileMetadata>;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// List the immediate children of a directory
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    /// Check if a path exists, treating any error as absence
    fn exists(&self, path: &Path) -> bool {
        self.metadata(path).is_ok()
    }

    /// Check if path is a directory, treating any error as absence
    fn is_dir(&self, path: &Path) -> bool {
        self.metadata(path).map(|m| m.is_dir()).unwrap_or(false)
    }

    /// Check if path is a regular file, treating any error as absence
    fn is_file(&self, path: &Path) -> bool {
        self.metadata(path).map(|m| m.is_file()).unwrap_or(false)
    }

    /// Strict directory check.
    ///
    /// `Ok(false)` when nothing exists at `path` or when it is not a
    /// directory; any other I/O failure is returned unchanged.
    fn dir_exists(&self, path: &Path) -> io::Result<bool> {
        match self.metadata(path) {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
