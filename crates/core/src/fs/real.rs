use super::{DirEntry, FileMetadata, FileSystem, FileType};
use std::fs;
use std::io;
use std::path::Path;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn file_type_of(meta: &fs::Metadata) -> FileType {
    if meta.is_file() {
        FileType::File
    } else if meta.is_dir() {
        FileType::Directory
    } else {
        FileType::Symlink
    }
}

impl FileSystem for RealFileSystem {
    fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        let meta = fs::metadata(path)?;

        Ok(FileMetadata {
            size: meta.len(),
            file_type: file_type_of(&meta),
        })
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let mut result = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            // follow symlinks: mounted bindings are frequently symlinked
            let file_type = match fs::metadata(&path) {
                Ok(meta) => file_type_of(&meta),
                Err(_) => FileType::Symlink,
            };

            result.push(DirEntry {
                path,
                name,
                file_type,
            });
        }

        Ok(result)
    }
}
