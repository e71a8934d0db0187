use super::{DirEntry, FileMetadata, FileSystem, FileType};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<String>,
    pub file_type: FileType,
}

/// In-memory file system. Paths registered with [`MockFileSystem::fail_with`]
/// return the given error kind from every fallible operation.
pub struct MockFileSystem {
    files: RwLock<HashMap<PathBuf, MockEntry>>,
    failures: RwLock<HashMap<PathBuf, io::ErrorKind>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            failures: RwLock::new(HashMap::new()),
            root,
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files_mut();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.files_mut();

        Self::ensure_parents(&mut files, &path);

        files.insert(
            path,
            MockEntry {
                content: None,
                file_type: FileType::Directory,
            },
        );
    }

    pub fn fail_with(&self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        let path = self.normalize_path(path.as_ref());
        self.failures
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path, kind);
    }

    fn files(&self) -> RwLockReadGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.files.read().unwrap_or_else(|e| e.into_inner())
    }

    fn files_mut(&self) -> RwLockWriteGuard<'_, HashMap<PathBuf, MockEntry>> {
        self.files.write().unwrap_or_else(|e| e.into_inner())
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn check_failure(&self, path: &Path) -> io::Result<()> {
        let failures = self.failures.read().unwrap_or_else(|e| e.into_inner());
        match failures.get(path) {
            Some(kind) => Err(io::Error::new(
                *kind,
                format!("injected failure for {}", path.display()),
            )),
            None => Ok(()),
        }
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("path not found: {}", path.display()),
        )
    }

    fn ensure_parents(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                file_type: FileType::Directory,
            });
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        let path = self.normalize_path(path);
        self.check_failure(&path)?;

        let files = self.files();
        let entry = files.get(&path).ok_or_else(|| Self::not_found(&path))?;

        Ok(FileMetadata {
            size: entry.content.as_ref().map(|c| c.len() as u64).unwrap_or(0),
            file_type: entry.file_type,
        })
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let path = self.normalize_path(path);
        self.check_failure(&path)?;

        let files = self.files();
        let entry = files.get(&path).ok_or_else(|| Self::not_found(&path))?;

        entry.content.clone().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a file: {}", path.display()),
            )
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let path = self.normalize_path(path);
        self.check_failure(&path)?;

        let files = self.files();
        if !files.contains_key(&path) {
            return Err(Self::not_found(&path));
        }

        let mut entries = Vec::new();
        for (file_path, entry) in files.iter() {
            if file_path.parent() == Some(path.as_path()) && file_path != &path {
                let name = file_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("")
                    .to_string();

                entries.push(DirEntry {
                    path: file_path.clone(),
                    name,
                    file_type: entry.file_type,
                });
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file() {
        let fs = MockFileSystem::new();
        fs.add_file("test.txt", "hello");

        assert!(fs.exists(Path::new("/mock/test.txt")));
        assert!(fs.is_file(Path::new("/mock/test.txt")));
    }

    #[test]
    fn test_add_dir() {
        let fs = MockFileSystem::new();
        fs.add_dir("subdir");

        assert!(fs.exists(Path::new("/mock/subdir")));
        assert!(fs.is_dir(Path::new("/mock/subdir")));
    }

    #[test]
    fn test_read_dir() {
        let fs = MockFileSystem::new();
        fs.add_dir("subdir");
        fs.add_file("test.txt", "content");
        fs.add_file("subdir/nested.txt", "nested");

        let entries = fs.read_dir(Path::new("/mock")).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.file_name()).collect();

        assert_eq!(names.len(), 2);
        assert!(names.contains(&"test.txt"));
        assert!(names.contains(&"subdir"));
    }

    #[test]
    fn test_parent_directories_created() {
        let fs = MockFileSystem::new();
        fs.add_file("a/b/c/file.txt", "content");

        assert!(fs.is_dir(Path::new("/mock/a")));
        assert!(fs.is_dir(Path::new("/mock/a/b")));
        assert!(fs.is_file(Path::new("/mock/a/b/c/file.txt")));
    }

    #[test]
    fn test_injected_failure() {
        let fs = MockFileSystem::new();
        fs.add_dir("repo/.git");
        fs.fail_with("repo/.git", io::ErrorKind::PermissionDenied);

        let err = fs.dir_exists(Path::new("/mock/repo/.git")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(!fs.exists(Path::new("/mock/repo/.git")));
    }

    #[test]
    fn test_dir_exists_on_file_is_false() {
        let fs = MockFileSystem::new();
        fs.add_file("repo/.git", "gitdir: ../.git/modules/repo");

        assert!(!fs.dir_exists(Path::new("/mock/repo/.git")).unwrap());
    }
}
